/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and messages.

use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// An accepted move; `pushed` when a crate was displaced.
    Moved { pushed: bool },
    LevelStarted { name: String },
    LevelRestarted { restarts: u32 },
    LevelCleared { name: String, pushes: u32, moves: u32, secs: u32 },
    Deadlocked { name: String },
    LoadFailed { reason: String },
    MapSaved { path: PathBuf },
    SaveFailed { reason: String },
    Quit,
}

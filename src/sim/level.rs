/// Level manager: level list, current level, per-level bookkeeping.
///
/// ## Sources (priority order):
///   1. Map directory (`.txt` files one level deep, sorted by file name)
///   2. Built-in embedded levels (used when the directory is missing or
///      holds no `.txt` files)
///
/// ## Map format: see `domain::board`.
///
/// Tracks what belongs to the level but not to its board: the level name,
/// seconds spent on it, and how many times it was restarted. The clock is
/// driven from outside (`tick_second`), the manager itself never reads time.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::board::Board;
use crate::domain::error::MapError;

use super::game::GameLevel;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{name}: {source}")]
    Map {
        name: String,
        #[source]
        source: MapError,
    },
    #[error("no level named {0:?}")]
    UnknownLevel(String),
}

/// Where the level list currently comes from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LevelSource {
    Directory,
    Embedded,
}

/// The level being played and its bookkeeping.
#[derive(Debug)]
struct CurrentLevel {
    name: String,
    game: GameLevel,
    restarts: u32,
    elapsed_secs: u32,
}

#[derive(Debug)]
pub struct LevelManager {
    map_directory: PathBuf,
    names: Vec<String>,
    source: LevelSource,
    current: Option<CurrentLevel>,
    timer_running: bool,
}

impl LevelManager {
    pub fn new(map_directory: impl Into<PathBuf>) -> Self {
        LevelManager {
            map_directory: map_directory.into(),
            names: vec![],
            source: LevelSource::Embedded,
            current: None,
            timer_running: false,
        }
    }

    pub fn map_directory(&self) -> &Path {
        &self.map_directory
    }

    // ── Level list ──

    /// Rescan the map directory. Falls back to the embedded levels when
    /// the directory cannot be read or has no map files.
    pub fn load_level_names(&mut self) {
        match scan_directory(&self.map_directory) {
            Ok(names) if !names.is_empty() => {
                info!(dir = %self.map_directory.display(), count = names.len(), "level list loaded");
                self.names = names;
                self.source = LevelSource::Directory;
            }
            Ok(_) => {
                info!(dir = %self.map_directory.display(), "no map files, using built-in levels");
                self.use_embedded();
            }
            Err(e) => {
                warn!(dir = %self.map_directory.display(), error = %e, "map directory unreadable, using built-in levels");
                self.use_embedded();
            }
        }
    }

    fn use_embedded(&mut self) {
        self.names = EMBEDDED_LEVELS.iter().map(|(name, _)| name.to_string()).collect();
        self.source = LevelSource::Embedded;
    }

    pub fn level_names(&self) -> &[String] {
        &self.names
    }

    pub fn source(&self) -> LevelSource {
        self.source
    }

    // ── Current level ──

    /// Switch to `name`. On failure nothing changes, including the
    /// current level. The timer is stopped; call `start_timer` to run it.
    pub fn set_level(&mut self, name: &str) -> Result<(), LoadError> {
        let board = self.preview(name)?;
        info!(level = name, rows = board.rows(), cols = board.cols(), "level loaded");
        self.current = Some(CurrentLevel {
            name: name.to_string(),
            game: GameLevel::from_board(board),
            restarts: 0,
            elapsed_secs: 0,
        });
        self.timer_running = false;
        Ok(())
    }

    /// Put the current level back to its layout as loaded and count the
    /// restart. Elapsed time starts over and the timer is stopped. Returns
    /// false when no level is loaded.
    pub fn restart_level(&mut self) -> bool {
        let Some(cur) = self.current.as_mut() else {
            return false;
        };
        cur.game.restart();
        cur.restarts += 1;
        cur.elapsed_secs = 0;
        self.timer_running = false;
        debug!(level = %cur.name, restarts = cur.restarts, "level restarted");
        true
    }

    pub fn reset_restarts(&mut self) {
        if let Some(cur) = self.current.as_mut() {
            cur.restarts = 0;
        }
    }

    /// Level after the current one in list order. `None` for the last.
    pub fn next_level_name(&self) -> Option<&str> {
        let cur = self.current.as_ref()?;
        let idx = self.names.iter().position(|n| *n == cur.name)?;
        self.names.get(idx + 1).map(String::as_str)
    }

    /// Parse a level without switching to it.
    pub fn preview(&self, name: &str) -> Result<Board, LoadError> {
        let text = self.read_level_text(name)?;
        Board::parse(&text).map_err(|source| LoadError::Map { name: name.to_string(), source })
    }

    fn read_level_text(&self, name: &str) -> Result<String, LoadError> {
        if !self.names.iter().any(|n| n == name) {
            return Err(LoadError::UnknownLevel(name.to_string()));
        }
        match self.source {
            LevelSource::Embedded => EMBEDDED_LEVELS
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, text)| text.to_string())
                .ok_or_else(|| LoadError::UnknownLevel(name.to_string())),
            LevelSource::Directory => {
                let path = self.map_directory.join(name);
                fs::read_to_string(&path).map_err(|source| LoadError::Read { path, source })
            }
        }
    }

    pub fn game(&self) -> Option<&GameLevel> {
        self.current.as_ref().map(|c| &c.game)
    }

    pub fn game_mut(&mut self) -> Option<&mut GameLevel> {
        self.current.as_mut().map(|c| &mut c.game)
    }

    pub fn current_level_name(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.name.as_str())
    }

    pub fn restarts(&self) -> u32 {
        self.current.as_ref().map_or(0, |c| c.restarts)
    }

    // ── Clock ──

    pub fn start_timer(&mut self) {
        self.timer_running = true;
    }

    pub fn stop_timer(&mut self) {
        self.timer_running = false;
    }

    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    /// One wall-clock second passed.
    pub fn tick_second(&mut self) {
        if !self.timer_running {
            return;
        }
        if let Some(cur) = self.current.as_mut() {
            cur.elapsed_secs += 1;
        }
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.current.as_ref().map_or(0, |c| c.elapsed_secs)
    }
}

/// `.txt` file names directly inside `dir`, sorted.
fn scan_directory(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = vec![];
    for entry in fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if !path.is_file() || path.extension().map_or(true, |e| e != "txt") {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

const EMBEDDED_LEVELS: &[(&str, &str)] = &[
    ("level01.txt", include_str!("../../levels/level01.txt")),
    ("level02.txt", include_str!("../../levels/level02.txt")),
    ("level03.txt", include_str!("../../levels/level03.txt")),
    ("level04.txt", include_str!("../../levels/level04.txt")),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::map_text;
    use crate::domain::rules::Direction;
    use tempfile::TempDir;

    /// Scratch directory holding the given `(file name, contents)`.
    fn map_dir(files: &[(&str, String)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, text) in files {
            fs::write(dir.path().join(name), text).unwrap();
        }
        dir
    }

    fn valid_map() -> String {
        map_text(&["####", "#@cC", "####"])
    }

    fn manager(files: &[(&str, String)]) -> (LevelManager, TempDir) {
        let dir = map_dir(files);
        let mut lm = LevelManager::new(dir.path());
        lm.load_level_names();
        (lm, dir)
    }

    #[test]
    fn embedded_levels_are_valid() {
        for (name, text) in EMBEDDED_LEVELS {
            let board = Board::parse(text).unwrap_or_else(|e| panic!("{name}: {e}"));
            assert!(!crate::domain::analysis::is_deadlocked(&board), "{name} starts deadlocked");
            assert!(!crate::domain::analysis::is_win(&board), "{name} starts solved");
        }
    }

    #[test]
    fn names_are_sorted_txt_files_only() {
        let (lm, dir) = manager(&[
            ("b.txt", valid_map()),
            ("a.txt", valid_map()),
            ("notes.md", "ignored".into()),
            ("c.txt", valid_map()),
        ]);
        assert_eq!(lm.level_names(), ["a.txt", "b.txt", "c.txt"]);
        assert_eq!(lm.source(), LevelSource::Directory);
        assert_eq!(lm.map_directory(), dir.path());
    }

    #[test]
    fn missing_directory_falls_back_to_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let mut lm = LevelManager::new(dir.path().join("missing"));
        lm.load_level_names();
        assert_eq!(lm.source(), LevelSource::Embedded);
        assert_eq!(lm.level_names().len(), EMBEDDED_LEVELS.len());
        let first = lm.level_names()[0].clone();
        lm.set_level(&first).unwrap();
        assert!(lm.game().is_some());
    }

    #[test]
    fn empty_directory_falls_back_to_embedded() {
        let (lm, _dir) = manager(&[("readme.md", "no maps here".into())]);
        assert_eq!(lm.source(), LevelSource::Embedded);
    }

    #[test]
    fn next_level_follows_list_order() {
        let (mut lm, _dir) = manager(&[("a.txt", valid_map()), ("b.txt", valid_map())]);
        assert_eq!(lm.next_level_name(), None);
        lm.set_level("a.txt").unwrap();
        assert_eq!(lm.next_level_name(), Some("b.txt"));
        lm.set_level("b.txt").unwrap();
        assert_eq!(lm.next_level_name(), None);
    }

    #[test]
    fn failed_load_keeps_the_previous_level() {
        let broken = map_text(&["#####", "#@ccC", "#####"]);
        let (mut lm, _dir) = manager(&[("good.txt", valid_map()), ("bad.txt", broken)]);
        lm.set_level("good.txt").unwrap();
        assert!(lm.game_mut().unwrap().attempt_move(Direction::Right));
        lm.start_timer();
        lm.tick_second();

        let err = lm.set_level("bad.txt").unwrap_err();
        assert!(matches!(err, LoadError::Map { ref name, .. } if name == "bad.txt"));
        assert_eq!(lm.current_level_name(), Some("good.txt"));
        assert_eq!(lm.game().map(|g| g.push_count()), Some(1));
        assert_eq!(lm.elapsed_secs(), 1);

        assert!(matches!(lm.set_level("nope.txt"), Err(LoadError::UnknownLevel(_))));
        assert_eq!(lm.current_level_name(), Some("good.txt"));
    }

    #[test]
    fn restart_counts_and_resets_the_board() {
        let (mut lm, _dir) = manager(&[("a.txt", valid_map())]);
        assert!(!lm.restart_level(), "nothing loaded yet");
        lm.set_level("a.txt").unwrap();
        assert!(lm.game_mut().unwrap().attempt_move(Direction::Right));
        lm.start_timer();
        lm.tick_second();

        assert!(lm.restart_level());
        assert!(lm.restart_level());
        assert_eq!(lm.restarts(), 2);
        assert_eq!(lm.game().map(|g| g.push_count()), Some(0));
        assert_eq!(lm.elapsed_secs(), 0);
        assert!(!lm.timer_running());
        assert!(!lm.game().unwrap().is_win());

        lm.reset_restarts();
        assert_eq!(lm.restarts(), 0);
        lm.set_level("a.txt").unwrap();
        assert_eq!(lm.restarts(), 0);
    }

    #[test]
    fn restart_uses_the_layout_as_loaded() {
        let (mut lm, dir) = manager(&[("a.txt", valid_map())]);
        lm.set_level("a.txt").unwrap();
        let loaded = lm.game().unwrap().cells_snapshot();

        // Editing the file afterwards does not leak into a restart.
        fs::write(dir.path().join("a.txt"), map_text(&["#####", "#@.cC", "#####"])).unwrap();
        assert!(lm.game_mut().unwrap().attempt_move(Direction::Right));
        assert!(lm.restart_level());
        assert_eq!(lm.game().unwrap().cells_snapshot(), loaded);
    }

    #[test]
    fn clock_only_runs_when_started() {
        let (mut lm, _dir) = manager(&[("a.txt", valid_map())]);
        lm.set_level("a.txt").unwrap();
        lm.tick_second();
        assert_eq!(lm.elapsed_secs(), 0);
        lm.start_timer();
        lm.tick_second();
        lm.tick_second();
        lm.stop_timer();
        lm.tick_second();
        assert_eq!(lm.elapsed_secs(), 2);
        // Loading a level zeroes the clock and stops it.
        lm.set_level("a.txt").unwrap();
        assert_eq!(lm.elapsed_secs(), 0);
        assert!(!lm.timer_running());
    }

    #[test]
    fn preview_does_not_switch() {
        let (mut lm, _dir) = manager(&[("a.txt", valid_map()), ("b.txt", valid_map())]);
        lm.set_level("a.txt").unwrap();
        let board = lm.preview("b.txt").unwrap();
        assert_eq!((board.rows(), board.cols()), (3, 4));
        assert_eq!(lm.current_level_name(), Some("a.txt"));
    }
}

/// Keyboard input collector.
///
/// Sokoban moves are discrete, so nothing here tracks held keys: every
/// Press event becomes one entry in `presses`, in arrival order. Repeat
/// and Release events (reported only when the terminal supports keyboard
/// enhancement) are dropped, so holding an arrow moves the player once.
///
/// `key_action` turns a key into a step `Action` for one phase;
/// `apply_presses` maps and steps the keys one at a time, so a key that
/// changes the phase hands the next key to the new phase.
///
/// ## Keys
/// ┌──────────────┬──────────────────────────────────────────────────────┐
/// │ Phase        │ Keys                                                 │
/// ├──────────────┼──────────────────────────────────────────────────────┤
/// │ (most)       │ ←↑↓→/WASD move, ENTER/SPACE confirm, ESC back, R     │
/// │ MainMenu     │ Q quits                                              │
/// │ LevelSelect  │ R rescan, E edit                                     │
/// │ ConfirmQuit  │ Y / N                                                │
/// │ Editor       │ arrows, SPACE paint, 1-7 brush, [ ] rows, - = cols,  │
/// │              │ N new grid, S save                                   │
/// │ Settings     │ T toggle sound                                       │
/// └──────────────┴──────────────────────────────────────────────────────┘

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll};

use crate::domain::editor::Brush;
use crate::domain::rules::Direction;
use crate::sim::event::GameEvent;
use crate::sim::step::{self, Action, FrameInput};
use crate::sim::world::{Phase, WorldState};

pub struct InputState {
    /// Key presses collected during the most recent drain, oldest first.
    presses: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { presses: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.presses.clear();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.push_event(key);
            }
        }
    }

    fn push_event(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Press {
            self.presses.push(key);
        }
    }

    /// Presses this frame, oldest first.
    pub fn pressed_keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.presses.iter().map(|k| k.code)
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.presses.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
        })
    }
}

fn arrow(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down => Some(Direction::Down),
        KeyCode::Left => Some(Direction::Left),
        KeyCode::Right => Some(Direction::Right),
        _ => None,
    }
}

/// Map one key press to an action for `phase`.
pub fn key_action(phase: Phase, code: KeyCode) -> Option<Action> {
    if let Some(dir) = arrow(code) {
        return Some(Action::Move(dir));
    }
    if code == KeyCode::Esc {
        return Some(Action::Cancel);
    }
    let KeyCode::Char(ch) = code else {
        return (code == KeyCode::Enter && phase != Phase::Editor).then_some(Action::Confirm);
    };
    let ch = ch.to_ascii_lowercase();

    // The editor uses letters for commands, so no WASD there.
    if phase == Phase::Editor {
        return match ch {
            ' ' => Some(Action::Paint),
            '1'..='7' => Brush::from_index(ch as usize - '1' as usize).map(Action::SelectBrush),
            '[' => Some(Action::Resize { rows: -1, cols: 0 }),
            ']' => Some(Action::Resize { rows: 1, cols: 0 }),
            '-' => Some(Action::Resize { rows: 0, cols: -1 }),
            '=' | '+' => Some(Action::Resize { rows: 0, cols: 1 }),
            'n' => Some(Action::NewGrid),
            's' => Some(Action::Save),
            _ => None,
        };
    }

    match (phase, ch) {
        (_, ' ') => Some(Action::Confirm),
        (Phase::MainMenu, 'q') => Some(Action::Cancel),
        (Phase::LevelSelect, 'r') => Some(Action::Rescan),
        (Phase::LevelSelect, 'e') => Some(Action::Edit),
        (Phase::ConfirmQuit, 'y') => Some(Action::Confirm),
        (Phase::ConfirmQuit, 'n') => Some(Action::Cancel),
        (Phase::Settings, 't') => Some(Action::ToggleSound),
        (_, 'r') => Some(Action::Restart),
        _ => Direction::from_key(ch).map(Action::Move),
    }
}

/// Step the world once per key, each mapped against the phase current at
/// that point. Stops after a key that asks to quit.
pub fn apply_presses<I>(world: &mut WorldState, keys: I) -> Vec<GameEvent>
where
    I: IntoIterator<Item = KeyCode>,
{
    let mut events = Vec::new();
    for code in keys {
        let Some(action) = key_action(world.phase, code) else {
            continue;
        };
        events.extend(step::step(world, FrameInput { actions: vec![action] }));
        if events.contains(&GameEvent::Quit) {
            break;
        }
    }
    events
}

/// The step function: applies one frame of input to the world.
///
/// Input arrives as a list of discrete `Action`s, one per key press, so a
/// held key never repeats a move. Each action is routed by the phase that
/// is current when it is handled; an action that changes the phase hands
/// the rest of the frame to the new phase.
///
/// ## Phase transitions
/// ┌──────────────┬─────────────────────────┬────────────────────────────┐
/// │ Phase        │ Action                  │ Next                       │
/// ├──────────────┼─────────────────────────┼────────────────────────────┤
/// │ MainMenu     │ Confirm on entry        │ LevelSelect/Editor/Settings│
/// │ LevelSelect  │ Confirm                 │ Playing (load ok)          │
/// │ Playing      │ Move → win              │ LevelCleared               │
/// │ Playing      │ Move → deadlock         │ Deadlocked                 │
/// │ Playing      │ Cancel                  │ ConfirmQuit                │
/// │ LevelCleared │ Confirm                 │ Playing next / LevelSelect │
/// │ Deadlocked   │ Confirm / Restart       │ Playing (restarted)        │
/// │ ConfirmQuit  │ Confirm / Cancel        │ MainMenu / Playing         │
/// │ Editor       │ Cancel                  │ MainMenu                   │
/// │ Settings     │ Cancel                  │ MainMenu                   │
/// └──────────────┴─────────────────────────┴────────────────────────────┘
/// Win is checked before deadlock: a solved board is never "deadlocked".

use tracing::{debug, info, warn};

use crate::domain::analysis;
use crate::domain::board::Pos;
use crate::domain::editor::{Brush, MAX_EDITOR_SIZE};
use crate::domain::rules::{Direction, MoveOutcome};
use super::event::GameEvent;
use super::world::{MenuItem, Phase, Preview, WorldState};

/// Rows visible in the level select list.
pub const SELECT_VISIBLE: usize = 16;

const MSG_SHORT: u32 = 20;
const MSG_LONG: u32 = 40;

/// One discrete input, already mapped from keyboard or gamepad.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Move(Direction),
    Confirm,
    Cancel,
    Restart,
    /// Rescan the map directory (level select).
    Rescan,
    /// Open the highlighted level in the editor (level select).
    Edit,
    Paint,
    SelectBrush(Brush),
    Resize { rows: isize, cols: isize },
    NewGrid,
    Save,
    ToggleSound,
}

#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    pub actions: Vec<Action>,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for action in input.actions {
        match world.phase {
            Phase::MainMenu => main_menu(world, action, &mut events),
            Phase::LevelSelect => level_select(world, action, &mut events),
            Phase::Playing => playing(world, action, &mut events),
            Phase::LevelCleared => level_cleared(world, action, &mut events),
            Phase::Deadlocked => deadlocked(world, action, &mut events),
            Phase::ConfirmQuit => confirm_quit(world, action),
            Phase::Editor => editor(world, action, &mut events),
            Phase::Settings => settings(world, action),
        }
    }
    events
}

/// Once per wall-clock second. Only a running level clock advances.
pub fn tick_second(world: &mut WorldState) {
    world.levels.tick_second();
}

/// Once per UI tick: animation counter and message bar.
pub fn tick_frame(world: &mut WorldState) {
    world.anim_tick = world.anim_tick.wrapping_add(1);
    world.tick_message();
}

// ══════════════════════════════════════════════════════════════
// Menus
// ══════════════════════════════════════════════════════════════

fn main_menu(world: &mut WorldState, action: Action, events: &mut Vec<GameEvent>) {
    let count = MenuItem::ALL.len();
    match action {
        Action::Move(Direction::Up) => world.menu_cursor = (world.menu_cursor + count - 1) % count,
        Action::Move(Direction::Down) => world.menu_cursor = (world.menu_cursor + 1) % count,
        Action::Confirm => match world.menu_item() {
            MenuItem::Play => open_level_select(world),
            MenuItem::Editor => open_editor(world),
            MenuItem::Settings => world.phase = Phase::Settings,
            MenuItem::Quit => events.push(GameEvent::Quit),
        },
        Action::Cancel => events.push(GameEvent::Quit),
        _ => {}
    }
}

fn settings(world: &mut WorldState, action: Action) {
    match action {
        Action::ToggleSound | Action::Confirm => {
            world.sound_fx = !world.sound_fx;
            info!(sound_fx = world.sound_fx, "sound toggled");
        }
        Action::Cancel => world.phase = Phase::MainMenu,
        _ => {}
    }
}

// ══════════════════════════════════════════════════════════════
// Level select
// ══════════════════════════════════════════════════════════════

pub fn open_level_select(world: &mut WorldState) {
    if world.levels.level_names().is_empty() {
        world.levels.load_level_names();
    }
    // Keep the cursor on the level just played, if any.
    if let Some(cur) = world.levels.current_level_name() {
        if let Some(idx) = world.levels.level_names().iter().position(|n| n == cur) {
            world.select_cursor = idx;
        }
    }
    clamp_select_cursor(world);
    world.phase = Phase::LevelSelect;
    world.anim_tick = 0;
    refresh_preview(world);
}

fn level_select(world: &mut WorldState, action: Action, events: &mut Vec<GameEvent>) {
    let total = world.levels.level_names().len();
    match action {
        Action::Move(Direction::Up) => {
            world.select_cursor = world.select_cursor.saturating_sub(1);
            clamp_select_cursor(world);
            refresh_preview(world);
        }
        Action::Move(Direction::Down) => {
            if world.select_cursor + 1 < total {
                world.select_cursor += 1;
            }
            clamp_select_cursor(world);
            refresh_preview(world);
        }
        Action::Rescan => {
            world.levels.load_level_names();
            world.preview = None;
            clamp_select_cursor(world);
            refresh_preview(world);
            let n = world.levels.level_names().len();
            world.set_message(&format!("{n} levels found"), MSG_SHORT);
        }
        Action::Edit => {
            if let Some((_, Preview::Board(board))) = &world.preview {
                world.editor = crate::domain::editor::LevelEditor::from_board(board);
                world.editor_cursor = Pos::new(0, 0);
                world.phase = Phase::Editor;
            }
        }
        Action::Confirm => {
            if let Some(name) = world.selected_level().map(str::to_string) {
                start_level(world, &name, events);
            }
        }
        Action::Cancel => world.phase = Phase::MainMenu,
        _ => {}
    }
}

fn clamp_select_cursor(world: &mut WorldState) {
    let total = world.levels.level_names().len();
    world.select_cursor = world.select_cursor.min(total.saturating_sub(1));
    if world.select_cursor < world.select_scroll {
        world.select_scroll = world.select_cursor;
    } else if world.select_cursor >= world.select_scroll + SELECT_VISIBLE {
        world.select_scroll = world.select_cursor + 1 - SELECT_VISIBLE;
    }
}

/// Re-parse the highlighted level if the cursor moved to a new name.
fn refresh_preview(world: &mut WorldState) {
    let Some(name) = world.selected_level().map(str::to_string) else {
        world.preview = None;
        return;
    };
    if world.preview.as_ref().is_some_and(|(n, _)| *n == name) {
        return;
    }
    let preview = match world.levels.preview(&name) {
        Ok(board) => Preview::Board(board),
        Err(e) => Preview::Error(e.to_string()),
    };
    world.preview = Some((name, preview));
}

/// Load `name` and start playing. On failure stay where we are.
fn start_level(world: &mut WorldState, name: &str, events: &mut Vec<GameEvent>) {
    match world.levels.set_level(name) {
        Ok(()) => {
            world.levels.start_timer();
            world.frozen.clear();
            world.phase = Phase::Playing;
            center_camera(world);
            world.set_message(name, MSG_LONG);
            events.push(GameEvent::LevelStarted { name: name.to_string() });
        }
        Err(e) => {
            warn!(level = name, error = %e, "level failed to load");
            let reason = e.to_string();
            world.set_message(&reason, MSG_LONG);
            events.push(GameEvent::LoadFailed { reason });
        }
    }
}

fn center_camera(world: &mut WorldState) {
    if let Some(board) = world.levels.game().map(|g| g.board()) {
        let (player, w, h) = (board.player(), board.cols(), board.rows());
        world.camera.center_on(player, w, h);
    }
}

// ══════════════════════════════════════════════════════════════
// Gameplay
// ══════════════════════════════════════════════════════════════

fn playing(world: &mut WorldState, action: Action, events: &mut Vec<GameEvent>) {
    match action {
        Action::Move(dir) => resolve_move(world, dir, events),
        Action::Restart => restart(world, events),
        Action::Cancel => {
            world.levels.stop_timer();
            world.phase = Phase::ConfirmQuit;
        }
        _ => {}
    }
}

fn resolve_move(world: &mut WorldState, dir: Direction, events: &mut Vec<GameEvent>) {
    let Some(game) = world.levels.game_mut() else { return };
    let outcome = game.apply_move(dir);
    if !outcome.accepted() {
        return;
    }
    debug!(?dir, ?outcome, pushes = game.push_count(), moves = game.move_count(), "move");
    events.push(GameEvent::Moved { pushed: outcome == MoveOutcome::Pushed });
    resolve_end(world, events);
}

/// Win first, then deadlock.
fn resolve_end(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let Some(game) = world.levels.game() else { return };
    let name = world.levels.current_level_name().unwrap_or_default().to_string();

    if game.is_win() {
        let (pushes, moves) = (game.push_count(), game.move_count());
        world.levels.stop_timer();
        let secs = world.levels.elapsed_secs();
        info!(level = %name, pushes, moves, secs, "level cleared");
        world.phase = Phase::LevelCleared;
        events.push(GameEvent::LevelCleared { name, pushes, moves, secs });
    } else if game.is_deadlocked() {
        world.frozen = analysis::frozen_crates(game.board());
        world.levels.stop_timer();
        info!(level = %name, frozen = world.frozen.len(), "deadlocked");
        world.phase = Phase::Deadlocked;
        events.push(GameEvent::Deadlocked { name });
    }
}

fn restart(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if !world.levels.restart_level() {
        return;
    }
    world.levels.start_timer();
    world.frozen.clear();
    world.phase = Phase::Playing;
    center_camera(world);
    let restarts = world.levels.restarts();
    world.set_message("Level restarted", MSG_SHORT);
    events.push(GameEvent::LevelRestarted { restarts });
}

fn back_to_level_select(world: &mut WorldState) {
    world.levels.reset_restarts();
    world.frozen.clear();
    open_level_select(world);
}

fn level_cleared(world: &mut WorldState, action: Action, events: &mut Vec<GameEvent>) {
    match action {
        Action::Confirm => match world.levels.next_level_name().map(str::to_string) {
            Some(next) => start_level(world, &next, events),
            None => {
                back_to_level_select(world);
                world.set_message("Last level cleared!", MSG_LONG);
            }
        },
        Action::Cancel => back_to_level_select(world),
        _ => {}
    }
}

fn deadlocked(world: &mut WorldState, action: Action, events: &mut Vec<GameEvent>) {
    match action {
        Action::Confirm | Action::Restart => restart(world, events),
        Action::Cancel => back_to_level_select(world),
        _ => {}
    }
}

fn confirm_quit(world: &mut WorldState, action: Action) {
    match action {
        Action::Confirm => {
            world.levels.stop_timer();
            world.levels.reset_restarts();
            world.frozen.clear();
            world.phase = Phase::MainMenu;
        }
        Action::Cancel => {
            world.levels.start_timer();
            world.phase = Phase::Playing;
        }
        _ => {}
    }
}

// ══════════════════════════════════════════════════════════════
// Editor
// ══════════════════════════════════════════════════════════════

fn open_editor(world: &mut WorldState) {
    world.phase = Phase::Editor;
    clamp_editor_cursor(world);
}

fn editor(world: &mut WorldState, action: Action, events: &mut Vec<GameEvent>) {
    match action {
        Action::Move(dir) => {
            let (dr, dc) = dir.delta();
            let cur = world.editor_cursor;
            world.editor_cursor = Pos::new(
                cur.row.saturating_add_signed(dr),
                cur.col.saturating_add_signed(dc),
            );
            clamp_editor_cursor(world);
        }
        Action::Paint => {
            let Pos { row, col } = world.editor_cursor;
            world.editor.set_tile(world.brush, row, col);
        }
        Action::SelectBrush(brush) => {
            world.brush = brush;
            world.set_message(brush.name(), MSG_SHORT);
        }
        Action::Resize { rows, cols } => {
            let r = world.editor.rows().saturating_add_signed(rows).clamp(1, MAX_EDITOR_SIZE);
            let c = world.editor.cols().saturating_add_signed(cols).clamp(1, MAX_EDITOR_SIZE);
            if (r, c) != (world.editor.rows(), world.editor.cols()) {
                world.editor.change_size(r, c);
                clamp_editor_cursor(world);
            }
        }
        Action::NewGrid => {
            let (r, c) = world.editor_default_size;
            world.editor.change_size(r, c);
            world.editor_cursor = Pos::new(0, 0);
        }
        Action::Save => match world.editor.save(&world.editor_save_dir) {
            Ok(path) => {
                let file = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                world.set_message(&format!("Saved {file}"), MSG_LONG);
                // The new map shows up in level select right away.
                world.levels.load_level_names();
                world.preview = None;
                events.push(GameEvent::MapSaved { path });
            }
            Err(e) => {
                warn!(error = %e, "map not saved");
                let reason = e.to_string();
                world.set_message(&reason, MSG_LONG);
                events.push(GameEvent::SaveFailed { reason });
            }
        },
        Action::Cancel => world.phase = Phase::MainMenu,
        _ => {}
    }
}

fn clamp_editor_cursor(world: &mut WorldState) {
    let Pos { row, col } = world.editor_cursor;
    world.editor_cursor = Pos::new(
        row.min(world.editor.rows().saturating_sub(1)),
        col.min(world.editor.cols().saturating_sub(1)),
    );
}

/// WorldState: everything the front-end loop owns between frames.
///
/// ## Ownership
///
/// No globals. The level manager, the editor and the settings all live
/// here and are passed by `&mut` into `step`. The renderer only ever sees
/// `&WorldState` and reaches boards through `&Board`.
///
/// ## Camera / Viewport
///
/// Board coordinates and screen coordinates are separate:
///   - `camera`: viewport into the board (top-left corner + size)
///   - Renderer maps: `screen(sx, sy) = board(camera.x + sx, camera.y + sy)`
///   - Camera follows the player with a dead-zone approach
///   - Boards smaller than the viewport are centered

use std::path::PathBuf;

use crate::config::GameConfig;
use crate::domain::board::{Board, Pos};
use crate::domain::editor::{Brush, LevelEditor};
use crate::sim::level::LevelManager;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    MainMenu,
    LevelSelect,
    Playing,
    LevelCleared,
    Deadlocked,
    ConfirmQuit,
    Editor,
    Settings,
}

/// Main menu entries, top to bottom.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuItem {
    Play,
    Editor,
    Settings,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 4] = [MenuItem::Play, MenuItem::Editor, MenuItem::Settings, MenuItem::Quit];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Play => "Play",
            MenuItem::Editor => "Level Editor",
            MenuItem::Settings => "About / Settings",
            MenuItem::Quit => "Quit",
        }
    }
}

/// Camera: a viewport into the board.
///
/// `(x, y)` is the board coordinate (col, row) of the top-left visible cell.
/// `(view_w, view_h)` is how many board cells fit in the viewport.
/// These are computed from terminal size and set during `render()`.
#[derive(Clone, Debug, Default)]
pub struct Camera {
    /// Board column of the top-left visible cell (negative when centering)
    pub x: i32,
    /// Board row of the top-left visible cell
    pub y: i32,
    pub view_w: usize,
    pub view_h: usize,
}

impl Camera {
    pub fn new() -> Self {
        Camera::default()
    }

    /// Follow a target with a dead zone: scroll only when the target gets
    /// within 20% of a viewport edge.
    pub fn follow(&mut self, target: Pos, board_w: usize, board_h: usize) {
        if self.view_w == 0 || self.view_h == 0 {
            return;
        }
        self.x = follow_axis(self.x, target.col as i32, self.view_w as i32, board_w as i32);
        self.y = follow_axis(self.y, target.row as i32, self.view_h as i32, board_h as i32);
    }

    /// Snap to center on a position (no dead zone). Used on load / restart.
    pub fn center_on(&mut self, target: Pos, board_w: usize, board_h: usize) {
        if self.view_w == 0 || self.view_h == 0 {
            return;
        }
        self.x = center_axis(target.col as i32, self.view_w as i32, board_w as i32);
        self.y = center_axis(target.row as i32, self.view_h as i32, board_h as i32);
    }

    /// Board position to viewport `(vx, vy)`. `None` if not visible.
    pub fn world_to_view(&self, pos: Pos) -> Option<(usize, usize)> {
        let vx = pos.col as i32 - self.x;
        let vy = pos.row as i32 - self.y;
        if vx >= 0 && vx < self.view_w as i32 && vy >= 0 && vy < self.view_h as i32 {
            Some((vx as usize, vy as usize))
        } else {
            None
        }
    }
}

fn follow_axis(cur: i32, target: i32, view: i32, world: i32) -> i32 {
    if world <= view {
        return -((view - world) / 2);
    }
    let margin = view / 5;
    let mut next = cur;
    if target < cur + margin {
        next = target - margin;
    } else if target > cur + view - margin - 1 {
        next = target - view + margin + 1;
    }
    next.clamp(0, (world - view).max(0))
}

fn center_axis(target: i32, view: i32, world: i32) -> i32 {
    if world <= view {
        -((view - world) / 2)
    } else {
        (target - view / 2).clamp(0, (world - view).max(0))
    }
}

/// Preview of the highlighted entry on the level select screen.
#[derive(Clone, Debug)]
pub enum Preview {
    Board(Board),
    Error(String),
}

pub struct WorldState {
    pub phase: Phase,
    pub levels: LevelManager,

    // ── Settings ──
    pub sound_fx: bool,

    // ── Main menu ──
    pub menu_cursor: usize,

    // ── Level select ──
    pub select_cursor: usize,
    pub select_scroll: usize,
    /// `(level name, preview)` for the highlighted entry.
    pub preview: Option<(String, Preview)>,

    // ── Gameplay ──
    /// Frozen crates, highlighted once a deadlock is detected.
    pub frozen: Vec<Pos>,

    // ── Editor ──
    pub editor: LevelEditor,
    pub editor_cursor: Pos,
    pub brush: Brush,
    pub editor_save_dir: PathBuf,
    pub editor_default_size: (usize, usize),

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
    pub anim_tick: u32,
    pub camera: Camera,
}

// ── Construction ──

impl WorldState {
    pub fn new(config: &GameConfig) -> Self {
        let (rows, cols) = (config.editor.rows, config.editor.cols);
        WorldState {
            phase: Phase::MainMenu,
            levels: LevelManager::new(&config.levels_dir),
            sound_fx: config.audio.sound_fx,
            menu_cursor: 0,
            select_cursor: 0,
            select_scroll: 0,
            preview: None,
            frozen: vec![],
            editor: LevelEditor::new(rows, cols),
            editor_cursor: Pos::new(0, 0),
            brush: Brush::Wall,
            editor_save_dir: config.editor.save_dir.clone(),
            editor_default_size: (rows, cols),
            message: String::new(),
            message_timer: 0,
            anim_tick: 0,
            camera: Camera::new(),
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Count down the message bar; clears the text when it expires.
    /// A duration of 0 keeps the message until replaced.
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }

    pub fn menu_item(&self) -> MenuItem {
        MenuItem::ALL[self.menu_cursor.min(MenuItem::ALL.len() - 1)]
    }

    /// Name under the level select cursor.
    pub fn selected_level(&self) -> Option<&str> {
        self.levels.level_names().get(self.select_cursor).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(view_w: usize, view_h: usize) -> Camera {
        Camera { x: 0, y: 0, view_w, view_h }
    }

    #[test]
    fn small_boards_are_centered() {
        let mut cam = camera(20, 10);
        cam.center_on(Pos::new(1, 1), 6, 4);
        assert_eq!((cam.x, cam.y), (-7, -3));
        assert_eq!(cam.world_to_view(Pos::new(0, 0)), Some((7, 3)));
    }

    #[test]
    fn large_boards_scroll_with_the_player() {
        let mut cam = camera(10, 10);
        cam.center_on(Pos::new(0, 0), 40, 40);
        assert_eq!((cam.x, cam.y), (0, 0));
        cam.follow(Pos::new(5, 9), 40, 40);
        assert_eq!(cam.x, 2);
        assert_eq!(cam.y, 0);
        assert_eq!(cam.world_to_view(Pos::new(0, 0)), None);
        cam.follow(Pos::new(39, 39), 40, 40);
        assert_eq!((cam.x, cam.y), (30, 30));
    }

    #[test]
    fn unsized_camera_does_nothing() {
        let mut cam = Camera::new();
        cam.center_on(Pos::new(3, 3), 5, 5);
        assert_eq!((cam.x, cam.y), (0, 0));
        assert_eq!(cam.world_to_view(Pos::new(0, 0)), None);
    }
}

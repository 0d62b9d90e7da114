/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The renderer reads the world and never changes game state. The one
/// exception is the camera, whose viewport size depends on the terminal.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::board::{Board, Pos};
use crate::domain::editor::Brush;
use crate::domain::tile::{Cell as Tile, Occupant};
use crate::sim::level::LevelSource;
use crate::sim::step::SELECT_VISIBLE;
use crate::sim::world::{MenuItem, Phase, Preview, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// Using the same RGB for `Clear(ClearType::All)` and every cell keeps
    /// VTE terminals from showing gap lines between rows.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 4],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    /// Color::Reset → BASE_BG, so no cell ever uses the terminal default.
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn from_char_wide(c: char, bg: Color) -> Self {
        let mut cell = Self::from_char(c, Color::Reset, bg);
        cell.wide = true;
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or("")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::from_char(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }
}

// ── Palette ──

const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const HI: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const DIM: Color = Color::DarkGrey;
const ERR: Color = Color::Rgb { r: 255, g: 90, b: 70 };
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const CURSOR_BG: Color = Color::Rgb { r: 30, g: 60, b: 30 };
const BOX_BG: Color = Color::Rgb { r: 40, g: 40, b: 40 };
const FLOOR_BG: Color = Color::Rgb { r: 38, g: 34, b: 30 };
const DEST_BG: Color = Color::Rgb { r: 80, g: 64, b: 16 };
const DONE_BG: Color = Color::Rgb { r: 30, g: 110, b: 40 };
const FROZEN_BG: Color = Color::Rgb { r: 150, g: 30, b: 30 };

// ── Renderer ──

/// Each board cell is 2 terminal columns wide.
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

/// Level select layout
const LIST_TOP: usize = 6;
const PREVIEW_COL: usize = 52;

/// Editor layout
const EDITOR_TOP: usize = 4;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.front.resize(tw as usize, th as usize);
        self.back.resize(tw as usize, th as usize);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &mut WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.front.width || th as usize != self.front.height {
            self.front.resize(tw as usize, th as usize);
            self.back.resize(tw as usize, th as usize);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change → clear for a clean transition
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.layout(world);
        self.compose(world);
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    /// Size the camera to the terminal and keep the player in view.
    fn layout(&self, world: &mut WorldState) {
        let Some(board) = world.levels.game().map(|g| g.board()) else { return };
        let reserved_rows = MAP_ROW + 4; // HUD + gap + msg + help
        let (player, bw, bh) = (board.player(), board.cols(), board.rows());

        world.camera.view_w = (self.front.width / CELL_W).max(1);
        // Cap height to the board so the message bar sits right below it.
        world.camera.view_h = self.front.height.saturating_sub(reserved_rows).max(1).min(bh);
        if is_board_phase(world.phase) {
            world.camera.follow(player, bw, bh);
        }
    }

    fn compose(&mut self, w: &WorldState) {
        self.front.clear();
        match w.phase {
            Phase::MainMenu => self.compose_menu(w),
            Phase::LevelSelect => self.compose_level_select(w),
            Phase::Playing => self.compose_game(w),
            Phase::LevelCleared => {
                self.compose_game(w);
                self.compose_cleared(w);
            }
            Phase::Deadlocked => {
                self.compose_game(w);
                self.compose_prompt(
                    w,
                    &[
                        "DEADLOCK",
                        "",
                        "A crate can no longer reach a destination.",
                        "",
                        "ENTER / R: Restart    ESC: Level select",
                    ],
                    ERR,
                );
            }
            Phase::ConfirmQuit => {
                self.compose_game(w);
                self.compose_prompt(
                    w,
                    &["Quit this level?", "", "ENTER: Quit to menu    ESC: Keep playing"],
                    GOLD,
                );
            }
            Phase::Editor => self.compose_editor(w),
            Phase::Settings => self.compose_settings(w),
        }
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the
        // terminal's own default.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Board cells ──

    /// One board cell, 2 columns wide. `bg` overrides the cell background.
    fn put_tile(&mut self, tile: Tile, col: usize, row: usize, bg: Option<Color>) {
        let base_bg = match tile {
            Tile::Wall => Color::Rgb { r: 70, g: 70, b: 70 },
            Tile::DestinationFloor(Some(Occupant::Crate)) => DONE_BG,
            Tile::DestinationFloor(_) => DEST_BG,
            Tile::Floor(_) => FLOOR_BG,
        };
        let bg = bg.unwrap_or(base_bg);
        match tile {
            Tile::Wall => {
                let fg = Color::Rgb { r: 120, g: 120, b: 120 };
                self.front.set(col, row, Cell::from_char('█', fg, bg));
                self.front.set(col + 1, row, Cell::from_char('█', fg, bg));
            }
            Tile::Floor(None) => {
                self.front.set(col, row, Cell::from_char(' ', Color::Reset, bg));
                self.front.set(col + 1, row, Cell::from_char(' ', Color::Reset, bg));
            }
            Tile::DestinationFloor(None) => {
                self.front.set(col, row, Cell::from_char('<', GOLD, bg));
                self.front.set(col + 1, row, Cell::from_char('>', GOLD, bg));
            }
            Tile::Floor(Some(occ)) | Tile::DestinationFloor(Some(occ)) => {
                let ch = match occ {
                    Occupant::Player => '🧍',
                    Occupant::Crate => '📦',
                };
                self.front.set(col, row, Cell::from_char_wide(ch, bg));
                self.front.set(col + 1, row, Cell::WIDE_CONT);
            }
        }
    }

    /// Board through the camera, from MAP_ROW down.
    fn compose_board_view(&mut self, w: &WorldState, board: &Board) {
        let cam = &w.camera;
        // Frozen crates blink red while the deadlock prompt is up.
        let show_frozen = w.phase == Phase::Deadlocked && (w.anim_tick / 4) % 2 == 0;

        for (pos, tile) in board.iter() {
            let Some((vx, vy)) = cam.world_to_view(pos) else { continue };
            let (col, row) = (vx * CELL_W, MAP_ROW + vy);
            if row >= self.front.height || col + 1 >= self.front.width {
                continue;
            }
            let bg = (show_frozen && w.frozen.contains(&pos)).then_some(FROZEN_BG);
            self.put_tile(tile, col, row, bg);
        }
    }

    // ── Gameplay ──

    fn compose_game(&mut self, w: &WorldState) {
        let Some(game) = w.levels.game() else { return };
        let board = game.board();
        let name = w.levels.current_level_name().unwrap_or("?");

        let hud = format!(
            " {}  │ Time {}  │ Pushes {}  │ Moves {}  │ Restarts {}  │ Crates {}/{} ",
            name,
            clock(w.levels.elapsed_secs()),
            game.push_count(),
            game.move_count(),
            w.levels.restarts(),
            board.crates_on_destinations(),
            board.destination_count(),
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        self.compose_board_view(w, board);

        let msg_row = MAP_ROW + w.camera.view_h + 1;
        self.compose_message(w, msg_row);

        let help_row = msg_row + 1;
        let help = " ←↑↓→/WASD: Move   R: Restart   ESC: Quit level   │  Pad: D-pad  Y: Restart  B: Quit";
        self.front.put_str(0, help_row, help, DIM, Color::Reset);
    }

    fn compose_cleared(&mut self, w: &WorldState) {
        let Some(game) = w.levels.game() else { return };
        let stats = format!(
            "Pushes {}   Moves {}   Time {}",
            game.push_count(),
            game.move_count(),
            clock(w.levels.elapsed_secs())
        );
        let next = if w.levels.next_level_name().is_some() {
            "ENTER: Next level    ESC: Level select"
        } else {
            "ENTER / ESC: Level select"
        };
        self.compose_prompt(w, &["★ LEVEL CLEARED ★", "", stats.as_str(), "", next], HI);
    }

    /// Centered box over the board area. The first line is the title.
    fn compose_prompt(&mut self, w: &WorldState, lines: &[&str], title_fg: Color) {
        let inner_w = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let box_w = inner_w + 6;
        let box_h = lines.len() + 2;
        let view_cols = (w.camera.view_w * CELL_W).min(self.front.width);
        let box_x = view_cols.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + w.camera.view_h.saturating_sub(box_h) / 2;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::from_char(' ', Color::Reset, BOX_BG));
            }
        }
        for (i, line) in lines.iter().enumerate() {
            let fg = if i == 0 { title_fg } else { Color::White };
            let x = box_x + (box_w - line.chars().count()) / 2;
            self.front.put_str(x, box_y + 1 + i, line, fg, BOX_BG);
        }
    }

    fn compose_message(&mut self, w: &WorldState, row: usize) {
        if w.message.is_empty() || row >= self.front.height {
            return;
        }
        self.front.fill_row(row, MSG_BG);
        self.front.put_str(0, row, &format!(" ◈ {} ", w.message), Color::Black, MSG_BG);
    }

    // ── Menus ──

    fn compose_menu(&mut self, w: &WorldState) {
        let title = [
            r"  ___  ___  _  _____  _____ ___ ___ __  __ ",
            r" / __|/ _ \| |/ / _ \|_   _| __| _ \  \/  |",
            r" \__ \ (_) | ' < (_) | | | | _||   / |\/| |",
            r" |___/\___/|_|\_\___/  |_| |___|_|_\_|  |_|",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 1 + i, line, GOLD, Color::Reset);
        }
        self.front.put_str(4, 6, "━━━ push every crate home ━━━", Color::Rgb { r: 180, g: 140, b: 50 }, Color::Reset);

        let menu_base = 9;
        for (i, item) in MenuItem::ALL.iter().enumerate() {
            let row = menu_base + i;
            if i == w.menu_cursor {
                for x in 6..30.min(self.front.width) {
                    self.front.set(x, row, Cell::from_char(' ', Color::White, CURSOR_BG));
                }
                self.front.put_str(7, row, &format!("▸ {}", item.label()), HI, CURSOR_BG);
            } else {
                self.front.put_str(9, row, item.label(), Color::White, Color::Reset);
            }
        }

        let help = [
            "Controls",
            "  ←↑↓→ / WASD   Move            R     Restart level",
            "  ENTER / SPACE Confirm         ESC   Back / Quit",
            "  Gamepad: D-pad Move  A Confirm  B Back  Y Restart",
        ];
        let help_base = menu_base + MenuItem::ALL.len() + 2;
        for (i, line) in help.iter().enumerate() {
            let fg = if i == 0 { GOLD } else { Color::White };
            self.front.put_str(6, help_base + i, line, fg, Color::Reset);
        }

        let msg_row = self.front.height.saturating_sub(1);
        if msg_row > help_base + help.len() {
            self.compose_message(w, msg_row);
        }
    }

    fn compose_level_select(&mut self, w: &WorldState) {
        let names = w.levels.level_names();

        self.front.put_str(2, 1, "╔═══════════════════════════════════════════╗", GOLD, Color::Reset);
        self.front.put_str(2, 2, "║             LEVEL  SELECT                 ║", GOLD, Color::Reset);
        self.front.put_str(2, 3, "╚═══════════════════════════════════════════╝", GOLD, Color::Reset);

        let source = match w.levels.source() {
            LevelSource::Directory => format!("  Maps: {}", w.levels.map_directory().display()),
            LevelSource::Embedded => format!(
                "  Built-in levels (no maps in {})",
                w.levels.map_directory().display()
            ),
        };
        self.front.put_str(2, 4, &source, Color::Rgb { r: 255, g: 180, b: 80 }, Color::Reset);

        let visible = SELECT_VISIBLE.min(self.front.height.saturating_sub(LIST_TOP + 4));
        let scroll = w.select_scroll;
        if scroll > 0 {
            self.front.put_str(2, LIST_TOP - 1, "    ▲ ▲ ▲", DIM, Color::Reset);
        }

        for (i, name) in names.iter().enumerate().skip(scroll).take(visible) {
            let row = LIST_TOP + i - scroll;
            let num = format!("{:>3}.", i + 1);
            let shown = truncate(name, 40);
            if i == w.select_cursor {
                let blink = (w.anim_tick / 5) % 2 == 0;
                for x in 0..48.min(self.front.width) {
                    self.front.set(x, row, Cell::from_char(' ', Color::White, CURSOR_BG));
                }
                self.front.put_str(2, row, if blink { "▸" } else { " " }, HI, CURSOR_BG);
                self.front.put_str(3, row, &num, HI, CURSOR_BG);
                self.front.put_str(8, row, &shown, HI, CURSOR_BG);
            } else {
                self.front.put_str(3, row, &num, DIM, Color::Reset);
                self.front.put_str(8, row, &shown, Color::White, Color::Reset);
            }
        }

        if scroll + visible < names.len() {
            self.front.put_str(2, LIST_TOP + visible, "    ▼ ▼ ▼", DIM, Color::Reset);
        }

        self.compose_preview(w);

        let footer_row = LIST_TOP + visible + 2;
        let footer = "  ENTER: Play   ↑↓: Select   E: Edit   R: Rescan   ESC: Back";
        self.front.put_str(2, footer_row, footer, DIM, Color::Reset);
        if !names.is_empty() {
            let count = format!("  {}/{} levels", w.select_cursor + 1, names.len());
            self.front.put_str(2, footer_row + 1, &count, DIM, Color::Reset);
        }
        self.compose_message(w, footer_row + 3);
    }

    /// Compact one-column-per-cell preview of the highlighted level.
    fn compose_preview(&mut self, w: &WorldState) {
        let Some((_, preview)) = &w.preview else { return };
        match preview {
            Preview::Board(board) => {
                let info = format!(
                    "{} x {}, {} crates",
                    board.rows(),
                    board.cols(),
                    board.destination_count()
                );
                self.front.put_str(PREVIEW_COL, LIST_TOP - 1, &info, DIM, Color::Reset);
                for (pos, tile) in board.iter() {
                    let fg = match tile {
                        Tile::Wall => Color::Rgb { r: 140, g: 140, b: 140 },
                        Tile::DestinationFloor(Some(Occupant::Crate)) => HI,
                        Tile::DestinationFloor(_) => GOLD,
                        Tile::Floor(Some(Occupant::Player)) => Color::Cyan,
                        Tile::Floor(Some(Occupant::Crate)) => Color::Rgb { r: 200, g: 140, b: 70 },
                        Tile::Floor(None) => DIM,
                    };
                    self.front.set(
                        PREVIEW_COL + pos.col,
                        LIST_TOP + pos.row,
                        Cell::from_char(tile.symbol(), fg, Color::Reset),
                    );
                }
            }
            Preview::Error(reason) => {
                self.front.put_str(PREVIEW_COL, LIST_TOP - 1, "Cannot load this level:", ERR, Color::Reset);
                for (i, line) in wrap(reason, 36).iter().enumerate() {
                    self.front.put_str(PREVIEW_COL, LIST_TOP + i, line, ERR, Color::Reset);
                }
            }
        }
    }

    fn compose_settings(&mut self, w: &WorldState) {
        self.front.put_str(2, 1, "╔═══════════════════════════════════════════╗", GOLD, Color::Reset);
        self.front.put_str(2, 2, "║            ABOUT  /  SETTINGS             ║", GOLD, Color::Reset);
        self.front.put_str(2, 3, "╚═══════════════════════════════════════════╝", GOLD, Color::Reset);

        let version = format!("  sokoterm {}", env!("CARGO_PKG_VERSION"));
        self.front.put_str(2, 5, &version, Color::White, Color::Reset);
        self.front.put_str(2, 6, "  Push every crate onto a destination.", Color::White, Color::Reset);
        self.front.put_str(2, 7, "  Crates cannot be pulled; mind the corners.", Color::White, Color::Reset);

        let (state, fg) = if w.sound_fx { ("[ ON  ]", HI) } else { ("[ OFF ]", ERR) };
        self.front.put_str(4, 9, "Sound effects", Color::White, Color::Reset);
        self.front.put_str(20, 9, state, fg, Color::Reset);

        let dir = format!("Map directory   {}", w.levels.map_directory().display());
        self.front.put_str(4, 10, &dir, DIM, Color::Reset);
        let save = format!("Editor saves to {}", w.editor_save_dir.display());
        self.front.put_str(4, 11, &save, DIM, Color::Reset);

        self.front.put_str(2, 13, "  T / ENTER: Toggle sound   ESC: Back", DIM, Color::Reset);
    }

    // ── Editor ──

    fn compose_editor(&mut self, w: &WorldState) {
        let ed = &w.editor;
        let header = format!(
            " LEVEL EDITOR  │ {} x {}  │ Brush: {}  │ Cursor {},{} ",
            ed.rows(),
            ed.cols(),
            w.brush.name(),
            w.editor_cursor.row,
            w.editor_cursor.col,
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &header, Color::White, HUD_BG);

        let (status, fg) = match ed.validate() {
            Ok(()) => ("Ready to save".to_string(), HI),
            Err(e) => (format!("Not playable yet: {e}"), Color::Rgb { r: 255, g: 170, b: 60 }),
        };
        self.front.put_str(1, 2, &status, fg, Color::Reset);

        // Grid
        let cursor_on = (w.anim_tick / 4) % 2 == 0;
        for (r, line) in ed.grid().iter().enumerate() {
            let row = EDITOR_TOP + r;
            if row >= self.front.height { break; }
            for (c, brush) in line.iter().enumerate() {
                let col = 2 + c * CELL_W;
                if col + 1 >= self.front.width { break; }
                let here = w.editor_cursor == Pos::new(r, c);
                let bg = (here && cursor_on).then_some(Color::Rgb { r: 90, g: 160, b: 220 });
                self.put_tile(brush.to_cell(), col, row, bg);
            }
        }

        // Palette
        let pal_x = 2 + ed.cols() * CELL_W + 4;
        self.front.put_str(pal_x, EDITOR_TOP, "Brushes", GOLD, Color::Reset);
        for (i, brush) in Brush::ALL.iter().enumerate() {
            let row = EDITOR_TOP + 1 + i;
            let selected = *brush == w.brush;
            let bg = if selected { CURSOR_BG } else { Color::Reset };
            let fg = if selected { HI } else { Color::White };
            self.front.put_str(pal_x, row, &format!("{} ", i + 1), fg, bg);
            self.put_tile(brush.to_cell(), pal_x + 2, row, None);
            self.front.put_str(pal_x + 5, row, brush.name(), fg, bg);
        }

        let help_row = EDITOR_TOP + ed.rows().max(Brush::ALL.len() + 1) + 1;
        let help = [
            " ←↑↓→: Cursor   SPACE: Paint   1-7: Brush",
            " [ ]: Rows -/+   - =: Cols -/+   N: New grid   S: Save   ESC: Menu",
        ];
        for (i, line) in help.iter().enumerate() {
            self.front.put_str(0, help_row + i, line, DIM, Color::Reset);
        }
        self.compose_message(w, help_row + help.len() + 1);
    }
}

fn is_board_phase(phase: Phase) -> bool {
    matches!(phase, Phase::Playing | Phase::LevelCleared | Phase::Deadlocked | Phase::ConfirmQuit)
}

/// `mm:ss`; minutes keep growing past 99.
fn clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

/// Greedy word wrap.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = vec![];
    let mut cur = String::new();
    for word in text.split_whitespace() {
        if !cur.is_empty() && cur.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut cur));
        }
        if !cur.is_empty() {
            cur.push(' ');
        }
        cur.push_str(word);
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::rules::Direction;
    use crate::sim::step::{step, Action, FrameInput};

    fn world() -> WorldState {
        let root = tempfile::tempdir().unwrap();
        let mut config = GameConfig::default();
        config.levels_dir = root.path().join("missing");
        let mut w = WorldState::new(&config);
        w.levels.load_level_names();
        w
    }

    fn sized(w: usize, h: usize) -> Renderer {
        let mut r = Renderer::new();
        r.front.resize(w, h);
        r.back.resize(w, h);
        r
    }

    fn row_text(r: &Renderer, y: usize) -> String {
        (0..r.front.width)
            .map(|x| r.front.get(x, y))
            .filter(|c| !c.cont)
            .map(|c| c.as_str().to_string())
            .collect()
    }

    fn screen(r: &Renderer) -> String {
        (0..r.front.height).map(|y| row_text(r, y)).collect::<Vec<_>>().join("\n")
    }

    fn act(w: &mut WorldState, actions: &[Action]) {
        step(w, FrameInput { actions: actions.to_vec() });
    }

    #[test]
    fn menu_highlights_cursor() {
        let mut w = world();
        w.menu_cursor = 1;
        let mut r = sized(100, 30);
        r.compose(&w);
        let text = screen(&r);
        assert!(text.contains("▸ Level Editor"));
        assert!(text.contains("Quit"));
    }

    #[test]
    fn level_select_shows_names_and_preview() {
        let mut w = world();
        act(&mut w, &[Action::Confirm]);
        let mut r = sized(100, 30);
        r.compose(&w);
        let text = screen(&r);
        assert!(text.contains("level01.txt"));
        assert!(text.contains("Built-in levels"));
        // Preview row 1 of level01 uses map symbols.
        assert!(row_text(&r, LIST_TOP + 1).contains("#@.c.C#"));
    }

    #[test]
    fn hud_tracks_counters() {
        let mut w = world();
        act(&mut w, &[Action::Confirm, Action::Confirm, Action::Move(Direction::Down)]);
        let mut r = sized(120, 30);
        r.layout(&mut w);
        r.compose(&w);
        let hud = row_text(&r, HUD_ROW);
        assert!(hud.contains("level01.txt"), "{hud}");
        assert!(hud.contains("Moves 1"), "{hud}");
        assert!(hud.contains("Pushes 0"), "{hud}");
        assert!(hud.contains("Time 00:00"), "{hud}");
    }

    #[test]
    fn layout_sizes_camera_to_terminal() {
        let mut w = world();
        act(&mut w, &[Action::Confirm, Action::Confirm]);
        let r = sized(80, 40);
        r.layout(&mut w);
        assert_eq!(w.camera.view_w, 40);
        assert_eq!(w.camera.view_h, 5);
        // 7-wide board centered in 40 columns of cells.
        assert_eq!(w.camera.x, -16);
    }

    #[test]
    fn board_is_drawn_through_the_camera() {
        let mut w = world();
        act(&mut w, &[Action::Confirm, Action::Confirm]);
        let mut r = sized(80, 40);
        r.layout(&mut w);
        r.compose(&w);
        let player = w.levels.game().unwrap().board().player();
        let (vx, vy) = w.camera.world_to_view(player).unwrap();
        assert_eq!(r.front.get(vx * CELL_W, MAP_ROW + vy).as_str(), "🧍");
        assert!(r.front.get(vx * CELL_W + 1, MAP_ROW + vy).cont);
    }

    #[test]
    fn quit_prompt_is_drawn_over_board() {
        let mut w = world();
        act(&mut w, &[Action::Confirm, Action::Confirm, Action::Cancel]);
        let mut r = sized(120, 30);
        r.layout(&mut w);
        r.compose(&w);
        assert!(screen(&r).contains("Quit this level?"));
    }

    #[test]
    fn editor_reports_validation() {
        let mut w = world();
        act(&mut w, &[Action::Move(Direction::Down), Action::Confirm]);
        let mut r = sized(120, 30);
        r.compose(&w);
        let text = screen(&r);
        assert!(text.contains("LEVEL EDITOR"));
        assert!(text.contains("Not playable yet"));
        assert!(text.contains("Crate on Destination"));
    }

    #[test]
    fn settings_show_sound_state() {
        let mut w = world();
        w.phase = Phase::Settings;
        w.sound_fx = false;
        let mut r = sized(100, 20);
        r.compose(&w);
        assert!(screen(&r).contains("[ OFF ]"));
    }

    #[test]
    fn small_helpers() {
        assert_eq!(clock(0), "00:00");
        assert_eq!(clock(125), "02:05");
        assert_eq!(truncate("abcdefgh", 6), "abc...");
        assert_eq!(truncate("abc", 6), "abc");
        assert_eq!(wrap("one two three four", 9), vec!["one two", "three", "four"]);
    }
}

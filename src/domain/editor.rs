/// Level editor model: a brush grid that saves in the map text format.
///
/// Painting never fails; the grid may be in any state while editing.
/// Validity is checked on save with the same validator the parser uses,
/// so a saved map always loads and a loadable map always saves.
///
/// Player rule: at most one player brush on the grid. Painting a player
/// somewhere new turns the old player cell back into what was under it
/// (`Dest` for `PlayerOnDest`, `Tile` for `PlayerOnTile`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::board::{validate_counts, Board, Pos};
use super::error::BoardStateError;
use super::tile::{Cell, Occupant};

/// Largest grid edge the editor will produce.
pub const MAX_EDITOR_SIZE: usize = 40;

/// One paint value. Maps 1:1 onto a map symbol.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Brush {
    Tile,
    PlayerOnTile,
    PlayerOnDest,
    CrateOnTile,
    CrateOnDest,
    Wall,
    Dest,
}

impl Brush {
    /// Palette order (keys 1..=7).
    pub const ALL: [Brush; 7] = [
        Brush::Tile,
        Brush::PlayerOnTile,
        Brush::PlayerOnDest,
        Brush::CrateOnTile,
        Brush::CrateOnDest,
        Brush::Wall,
        Brush::Dest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Brush::Tile => "Tile",
            Brush::PlayerOnTile => "Player on Tile",
            Brush::PlayerOnDest => "Player on Destination",
            Brush::CrateOnTile => "Crate on Tile",
            Brush::CrateOnDest => "Crate on Destination",
            Brush::Wall => "Wall",
            Brush::Dest => "Destination",
        }
    }

    pub fn symbol(self) -> char {
        self.to_cell().symbol()
    }

    pub fn to_cell(self) -> Cell {
        match self {
            Brush::Tile => Cell::Floor(None),
            Brush::PlayerOnTile => Cell::Floor(Some(Occupant::Player)),
            Brush::PlayerOnDest => Cell::DestinationFloor(Some(Occupant::Player)),
            Brush::CrateOnTile => Cell::Floor(Some(Occupant::Crate)),
            Brush::CrateOnDest => Cell::DestinationFloor(Some(Occupant::Crate)),
            Brush::Wall => Cell::Wall,
            Brush::Dest => Cell::DestinationFloor(None),
        }
    }

    pub fn from_cell(cell: Cell) -> Brush {
        match cell {
            Cell::Wall => Brush::Wall,
            Cell::Floor(None) => Brush::Tile,
            Cell::Floor(Some(Occupant::Player)) => Brush::PlayerOnTile,
            Cell::Floor(Some(Occupant::Crate)) => Brush::CrateOnTile,
            Cell::DestinationFloor(None) => Brush::Dest,
            Cell::DestinationFloor(Some(Occupant::Player)) => Brush::PlayerOnDest,
            Cell::DestinationFloor(Some(Occupant::Crate)) => Brush::CrateOnDest,
        }
    }

    /// Palette slot, 0-based.
    pub fn from_index(idx: usize) -> Option<Brush> {
        Brush::ALL.get(idx).copied()
    }

    pub fn is_player(self) -> bool {
        matches!(self, Brush::PlayerOnTile | Brush::PlayerOnDest)
    }
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("could not save map: {0}")]
    Invalid(#[from] BoardStateError),
    #[error("could not write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Clone, Debug)]
pub struct LevelEditor {
    rows: usize,
    cols: usize,
    map: Vec<Vec<Brush>>,
    player: Option<Pos>,
}

impl LevelEditor {
    /// Fresh grid, every cell `Tile`.
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.clamp(1, MAX_EDITOR_SIZE);
        let cols = cols.clamp(1, MAX_EDITOR_SIZE);
        LevelEditor { rows, cols, map: vec![vec![Brush::Tile; cols]; rows], player: None }
    }

    /// Open an existing board for editing.
    pub fn from_board(board: &Board) -> Self {
        let map: Vec<Vec<Brush>> = board
            .grid()
            .iter()
            .map(|row| row.iter().map(|&c| Brush::from_cell(c)).collect::<Vec<_>>())
            .collect();
        LevelEditor { rows: board.rows(), cols: board.cols(), map, player: Some(board.player()) }
    }

    /// Resize and wipe.
    pub fn change_size(&mut self, rows: usize, cols: usize) {
        *self = LevelEditor::new(rows, cols);
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn brush_at(&self, row: usize, col: usize) -> Option<Brush> {
        self.map.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn grid(&self) -> &[Vec<Brush>] {
        &self.map
    }

    /// Paint one cell. Out-of-range coordinates are ignored.
    pub fn set_tile(&mut self, brush: Brush, row: usize, col: usize) {
        if row >= self.rows || col >= self.cols {
            return;
        }
        let here = Pos::new(row, col);
        if brush.is_player() {
            if let Some(old) = self.player.filter(|&p| p != here) {
                let left_behind = match self.map[old.row][old.col] {
                    Brush::PlayerOnDest => Brush::Dest,
                    Brush::PlayerOnTile => Brush::Tile,
                    other => other,
                };
                self.map[old.row][old.col] = left_behind;
            }
            self.player = Some(here);
        } else if self.player == Some(here) {
            self.player = None;
        }
        self.map[row][col] = brush;
    }

    /// Same checks as loading: size, crates, balance, exactly one player.
    pub fn validate(&self) -> Result<(), BoardStateError> {
        let (mut players, mut crates, mut destinations) = (0, 0, 0);
        for cell in self.map.iter().flatten().map(|b| b.to_cell()) {
            match cell.occupant() {
                Some(Occupant::Player) => players += 1,
                Some(Occupant::Crate) => crates += 1,
                None => {}
            }
            if cell.is_destination() {
                destinations += 1;
            }
        }
        validate_counts(self.rows, self.cols, players, crates, destinations)
    }

    /// Map text for the current grid (header + rows, trailing newline).
    pub fn to_map_string(&self) -> String {
        let mut out = format!("{}\n{}\n", self.rows, self.cols);
        for row in &self.map {
            out.extend(row.iter().map(|b| b.symbol()));
            out.push('\n');
        }
        out
    }

    /// Validate, then write `custom_NN.txt` (first unused NN) into `dir`.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, SaveError> {
        self.validate()?;
        fs::create_dir_all(dir).map_err(|source| SaveError::Io { path: dir.to_path_buf(), source })?;
        let path = next_free_name(dir);
        fs::write(&path, self.to_map_string())
            .map_err(|source| SaveError::Io { path: path.clone(), source })?;
        tracing::info!(path = %path.display(), rows = self.rows, cols = self.cols, "map saved");
        Ok(path)
    }
}

fn next_free_name(dir: &Path) -> PathBuf {
    (1..)
        .map(|n| dir.join(format!("custom_{n:02}.txt")))
        .find(|p| !p.exists())
        .unwrap_or_else(|| dir.join("custom.txt"))
}

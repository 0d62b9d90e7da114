/// GameLevel: one playable level instance.
///
/// Owns the live board, a pristine copy for restarts, and the per-level
/// counters. Every board change goes through `rules::attempt_move`.
///
/// ## Counters
///   - `pushes` +1 on every move that displaced a crate
///   - `moves`  +1 on every accepted move (walk or push)
/// Both are zeroed only by loading or restarting.

use std::fs;
use std::path::Path;

use crate::domain::analysis;
use crate::domain::board::Board;
use crate::domain::rules::{self, Direction, MoveOutcome};
use crate::domain::tile::Cell;

use super::level::LoadError;

#[derive(Clone, Debug)]
pub struct GameLevel {
    board: Board,
    initial: Board,
    pushes: u32,
    moves: u32,
}

impl GameLevel {
    pub fn from_board(board: Board) -> Self {
        GameLevel { initial: board.clone(), board, pushes: 0, moves: 0 }
    }

    /// Read and parse a map file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path)
            .map_err(|source| LoadError::Read { path: path.to_path_buf(), source })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let board = Board::parse(&text).map_err(|source| LoadError::Map { name, source })?;
        Ok(GameLevel::from_board(board))
    }

    /// Apply one move and update the counters.
    pub fn apply_move(&mut self, dir: Direction) -> MoveOutcome {
        let outcome = rules::attempt_move(&mut self.board, dir);
        match outcome {
            MoveOutcome::Blocked => {}
            MoveOutcome::Walked => self.moves += 1,
            MoveOutcome::Pushed => {
                self.moves += 1;
                self.pushes += 1;
            }
        }
        outcome
    }

    /// Bool form of `apply_move`: did the board change?
    pub fn attempt_move(&mut self, dir: Direction) -> bool {
        self.apply_move(dir).accepted()
    }

    pub fn is_win(&self) -> bool {
        analysis::is_win(&self.board)
    }

    pub fn is_deadlocked(&self) -> bool {
        analysis::is_deadlocked(&self.board)
    }

    pub fn push_count(&self) -> u32 {
        self.pushes
    }

    pub fn move_count(&self) -> u32 {
        self.moves
    }

    pub fn cells_snapshot(&self) -> Vec<Vec<Cell>> {
        self.board.cells_snapshot()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Back to the layout as loaded, counters zeroed.
    pub fn restart(&mut self) {
        self.board = self.initial.clone();
        self.pushes = 0;
        self.moves = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::{map_text, Pos};
    use crate::domain::error::{BoardStateError, MapError};

    fn level(rows: &[&str]) -> GameLevel {
        GameLevel::from_board(Board::parse(&map_text(rows)).expect("valid test map"))
    }

    #[test]
    fn scenario_a_push_counter_and_win() {
        let mut g = level(&["####", "#@cC", "####"]);
        assert!(g.attempt_move(Direction::Right));
        assert_eq!(g.push_count(), 1);
        assert_eq!(g.move_count(), 1);
        assert!(g.is_win());
        assert!(!g.is_deadlocked());
    }

    #[test]
    fn scenario_b_push_against_wall_changes_nothing() {
        let mut g = level(&[
            "######",
            "#@c.##",
            "#...C#",
            "######",
        ]);
        assert!(g.attempt_move(Direction::Right));
        assert_eq!(g.push_count(), 1);
        let before = g.cells_snapshot();

        // Crate now rests against the wall.
        assert!(!g.attempt_move(Direction::Right));
        assert_eq!(g.push_count(), 1);
        assert_eq!(g.move_count(), 1);
        assert_eq!(g.cells_snapshot(), before);
    }

    #[test]
    fn walking_counts_moves_but_not_pushes() {
        let mut g = level(&[
            "#####",
            "#@..#",
            "#.cC#",
            "#####",
        ]);
        assert!(g.attempt_move(Direction::Right));
        assert!(g.attempt_move(Direction::Right));
        assert!(!g.attempt_move(Direction::Right));
        assert_eq!(g.move_count(), 2);
        assert_eq!(g.push_count(), 0);
        assert_eq!(g.board().player(), Pos::new(1, 3));
    }

    #[test]
    fn restart_restores_layout_and_counters() {
        let mut g = level(&[
            "######",
            "#@c.C#",
            "######",
        ]);
        let initial = g.cells_snapshot();
        assert!(g.attempt_move(Direction::Right));
        assert!(g.attempt_move(Direction::Right));
        assert!(g.is_win());
        g.restart();
        assert_eq!(g.cells_snapshot(), initial);
        assert_eq!((g.push_count(), g.move_count()), (0, 0));
        assert!(!g.is_win());
    }

    #[test]
    fn load_reports_map_errors_with_the_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.txt");
        fs::write(&path, map_text(&["#####", "#@ccC", "#####"])).unwrap();

        match GameLevel::load(&path) {
            Err(LoadError::Map { name, source }) => {
                assert_eq!(name, "broken.txt");
                assert_eq!(
                    source,
                    MapError::InvalidBoardState(BoardStateError::Unbalanced { crates: 2, destinations: 1 })
                );
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(GameLevel::load(&dir.path().join("missing.txt")), Err(LoadError::Read { .. })));
    }
}

/// Read-only evaluators over a board: win and deadlock.
///
/// ## Deadlock heuristic (corner/freeze)
///
/// A crate NOT on a destination is frozen when it is walled in on both axes:
/// ┌───────────────────────────────┬──────────────────────────────┬─────────┐
/// │ Horizontal                    │ Vertical                     │ Frozen? │
/// ├───────────────────────────────┼──────────────────────────────┼─────────┤
/// │ left Wall OR right Wall       │ up Wall OR down Wall         │ yes     │
/// │ left Wall OR right Wall       │ neither                      │ no      │
/// │ neither                       │ up Wall OR down Wall         │ no      │
/// └───────────────────────────────┴──────────────────────────────┴─────────┘
/// Out-of-bounds neighbours read as Wall. Crates do not count as walls here:
/// a crate beside another crate may still be freed by pushing its neighbour.
///
/// The check is conservative. A cornered crate can never be pushed again,
/// so a flagged board is unsolvable; some unsolvable boards go unflagged.

use super::board::{Board, Pos};
use super::rules::Direction;

/// True iff every destination holds a crate.
pub fn is_win(board: &Board) -> bool {
    board
        .iter()
        .filter(|(_, cell)| cell.is_destination())
        .all(|(_, cell)| cell.has_crate())
}

/// Any frozen crate off its destination?
pub fn is_deadlocked(board: &Board) -> bool {
    board
        .iter()
        .any(|(pos, cell)| cell.has_crate() && !cell.is_destination() && is_cornered(board, pos))
}

/// Positions of every frozen, non-destination crate (row-major).
pub fn frozen_crates(board: &Board) -> Vec<Pos> {
    board
        .crate_positions()
        .into_iter()
        .filter(|&pos| !board.cell_or_wall(pos).is_destination() && is_cornered(board, pos))
        .collect()
}

fn is_cornered(board: &Board, pos: Pos) -> bool {
    let wall = |dir: Direction| match board.neighbor(pos, dir) {
        Some(p) => board.cell_or_wall(p).is_wall(),
        None => true,
    };
    (wall(Direction::Left) || wall(Direction::Right)) && (wall(Direction::Up) || wall(Direction::Down))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::map_text;
    use crate::domain::rules::{attempt_move, MoveOutcome};

    fn board(rows: &[&str]) -> Board {
        Board::parse(&map_text(rows)).expect("valid test map")
    }

    // ── Win ──

    #[test]
    fn scenario_a_push_onto_destination_wins() {
        let mut b = board(&[
            "####",
            "#@cC",
            "####",
        ]);
        assert!(!is_win(&b));
        assert_eq!(attempt_move(&mut b, Direction::Right), MoveOutcome::Pushed);
        assert_eq!(b.player(), Pos::new(1, 2));
        assert!(b.cell(Pos::new(1, 3)).is_some_and(|c| c.is_destination() && c.has_crate()));
        assert!(is_win(&b));
    }

    #[test]
    fn win_requires_every_destination_filled() {
        let solved = board(&[
            "#####",
            "#$$@#",
            "#####",
        ]);
        assert!(is_win(&solved));

        // One crate off its destination flips the result.
        let one_off = board(&[
            "######",
            "#$C@c#",
            "######",
        ]);
        assert!(!is_win(&one_off));
    }

    #[test]
    fn player_on_destination_is_not_a_win() {
        let b = board(&[
            "#####",
            "#&c.#",
            "#####",
        ]);
        assert!(!is_win(&b));
    }

    #[test]
    fn removing_a_crate_from_its_destination_breaks_the_win() {
        let mut b = board(&[
            "#######",
            "#..@$.#",
            "#.....#",
            "#######",
        ]);
        assert!(is_win(&b));
        // Push it off the destination, right onto plain floor.
        assert_eq!(attempt_move(&mut b, Direction::Right), MoveOutcome::Pushed);
        assert!(!is_win(&b));
    }

    // ── Deadlock ──

    #[test]
    fn scenario_c_cornered_crate_is_deadlocked() {
        let b = board(&[
            "#####",
            "#c..#",
            "#.@C#",
            "#####",
        ]);
        assert!(is_deadlocked(&b));
        assert_eq!(frozen_crates(&b), vec![Pos::new(1, 1)]);
    }

    #[test]
    fn scenario_c_cornered_crate_on_destination_is_fine() {
        let b = board(&[
            "#####",
            "#$..#",
            "#.@.#",
            "#####",
        ]);
        assert!(!is_deadlocked(&b));
        assert!(frozen_crates(&b).is_empty());
    }

    #[test]
    fn crate_along_a_single_wall_is_not_deadlocked() {
        let b = board(&[
            "######",
            "#.c..#",
            "#..@.#",
            "#...C#",
            "######",
        ]);
        assert!(!is_deadlocked(&b));
    }

    #[test]
    fn board_edge_counts_as_wall() {
        let b = board(&[
            "c..",
            ".@.",
            "..C",
        ]);
        assert!(is_deadlocked(&b));
    }

    #[test]
    fn neighbouring_crates_are_not_walls() {
        let b = board(&[
            "######",
            "#....#",
            "#.cc.#",
            "#.@CC#",
            "######",
        ]);
        assert!(!is_deadlocked(&b));
    }

    #[test]
    fn pushing_into_a_corner_creates_a_deadlock() {
        let mut b = board(&[
            "#####",
            "#.c@#",
            "#C..#",
            "#####",
        ]);
        assert!(!is_deadlocked(&b));
        assert_eq!(attempt_move(&mut b, Direction::Left), MoveOutcome::Pushed);
        assert!(is_deadlocked(&b));
    }
}

/// Movement and push rules, truth-table driven.
///
/// `attempt_move` is the only code path that changes a board after it has
/// been parsed. Every rejection happens before the first write, so a move
/// either fully applies (player, plus crate when pushing) or leaves the
/// board untouched.
///
/// ## Move Truth Table
///
/// `target` = player + delta, `beyond` = target + delta.
/// ┌──────────────────────────────────┬──────────┬──────────────────┐
/// │ Condition (checked in order)      │ Outcome  │ Effect           │
/// ├──────────────────────────────────┼──────────┼──────────────────┤
/// │ target out of bounds              │ Blocked  │ none             │
/// │ target is Wall                    │ Blocked  │ none             │
/// │ target vacant                     │ Walked   │ player → target  │
/// │ target crate, beyond out of bounds│ Blocked  │ none             │
/// │ target crate, beyond Wall         │ Blocked  │ none             │
/// │ target crate, beyond crate        │ Blocked  │ none             │
/// │ target crate, beyond vacant       │ Pushed   │ crate → beyond,  │
/// │                                   │          │ player → target  │
/// └──────────────────────────────────┴──────────┴──────────────────┘
///
/// The floor kind under an occupant (plain or destination) never changes;
/// only the occupant slot is cleared or set.

use super::board::{Board, Pos};
use super::tile::Occupant;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// (row delta, col delta)
    #[inline]
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// WASD key mapping, case-insensitive.
    pub fn from_key(ch: char) -> Option<Direction> {
        match ch.to_ascii_lowercase() {
            'w' => Some(Direction::Up),
            's' => Some(Direction::Down),
            'a' => Some(Direction::Left),
            'd' => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Result of one move attempt.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    /// Rejected, nothing changed.
    Blocked,
    /// Player stepped onto a vacant cell.
    Walked,
    /// Player stepped into the crate's cell, crate moved one further.
    Pushed,
}

impl MoveOutcome {
    /// Did the board change?
    pub fn accepted(self) -> bool {
        !matches!(self, MoveOutcome::Blocked)
    }
}

/// Apply one directional move. See truth table above.
pub fn attempt_move(board: &mut Board, dir: Direction) -> MoveOutcome {
    let from = board.player();
    let Some(target) = board.neighbor(from, dir) else {
        return MoveOutcome::Blocked;
    };
    let target_cell = board.cell_or_wall(target);

    if target_cell.is_wall() {
        return MoveOutcome::Blocked;
    }

    match target_cell.occupant() {
        None => {
            step_player(board, from, target);
            MoveOutcome::Walked
        }
        Some(Occupant::Crate) => {
            let Some(beyond) = can_push_to(board, target, dir) else {
                return MoveOutcome::Blocked;
            };
            board.set_occupant(beyond, Some(Occupant::Crate));
            step_player(board, from, target);
            MoveOutcome::Pushed
        }
        // Single-player invariant: the target can't hold a second player.
        Some(Occupant::Player) => MoveOutcome::Blocked,
    }
}

/// Where a crate at `crate_pos` would land if pushed in `dir`,
/// or `None` when the push is illegal. Pure query.
pub fn can_push_to(board: &Board, crate_pos: Pos, dir: Direction) -> Option<Pos> {
    let beyond = board.neighbor(crate_pos, dir)?;
    board.cell(beyond).filter(|c| c.is_vacant()).map(|_| beyond)
}

fn step_player(board: &mut Board, from: Pos, to: Pos) {
    board.set_occupant(from, None);
    board.set_occupant(to, Some(Occupant::Player));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::map_text;
    use crate::domain::tile::Cell;

    fn board(rows: &[&str]) -> Board {
        Board::parse(&map_text(rows)).expect("valid test map")
    }

    fn grid_of(b: &Board) -> Vec<String> {
        b.grid().iter().map(|r| r.iter().map(|c| c.symbol()).collect()).collect()
    }

    // ── Wall blocking ──

    #[test]
    fn wall_blocks_and_changes_nothing() {
        let mut b = board(&[
            "#####",
            "#@cC#",
            "#####",
        ]);
        let before = b.clone();
        assert_eq!(attempt_move(&mut b, Direction::Up), MoveOutcome::Blocked);
        assert_eq!(attempt_move(&mut b, Direction::Left), MoveOutcome::Blocked);
        assert_eq!(attempt_move(&mut b, Direction::Down), MoveOutcome::Blocked);
        assert_eq!(b, before);
    }

    #[test]
    fn board_edge_blocks() {
        let mut b = board(&[
            "@cC",
            "...",
            "...",
        ]);
        let before = b.clone();
        assert_eq!(attempt_move(&mut b, Direction::Up), MoveOutcome::Blocked);
        assert_eq!(attempt_move(&mut b, Direction::Left), MoveOutcome::Blocked);
        assert_eq!(b, before);
    }

    // ── Simple walk ──

    #[test]
    fn walk_onto_floor() {
        let mut b = board(&[
            "#####",
            "#@.C#",
            "#c..#",
            "#####",
        ]);
        assert_eq!(attempt_move(&mut b, Direction::Right), MoveOutcome::Walked);
        assert_eq!(b.player(), Pos::new(1, 2));
        assert_eq!(grid_of(&b)[1], "#.@C#");
    }

    #[test]
    fn walking_over_a_destination_keeps_it() {
        let mut b = board(&[
            "#####",
            "#@C.#",
            "#..c#",
            "#####",
        ]);
        assert_eq!(attempt_move(&mut b, Direction::Right), MoveOutcome::Walked);
        assert_eq!(grid_of(&b)[1], "#.&.#");
        assert_eq!(attempt_move(&mut b, Direction::Right), MoveOutcome::Walked);
        assert_eq!(grid_of(&b)[1], "#.C@#");
    }

    // ── Push ──

    #[test]
    fn push_moves_crate_and_player() {
        let mut b = board(&[
            "######",
            "#@c.C#",
            "######",
        ]);
        assert_eq!(attempt_move(&mut b, Direction::Right), MoveOutcome::Pushed);
        assert_eq!(grid_of(&b)[1], "#.@cC#");
        assert_eq!(attempt_move(&mut b, Direction::Right), MoveOutcome::Pushed);
        assert_eq!(grid_of(&b)[1], "#..@$#");
    }

    #[test]
    fn push_off_a_destination_leaves_destination_behind() {
        let mut b = board(&[
            "######",
            "#@$.C#",
            "#c...#",
            "######",
        ]);
        assert_eq!(attempt_move(&mut b, Direction::Right), MoveOutcome::Pushed);
        assert_eq!(b.cell(Pos::new(1, 2)), Some(Cell::DestinationFloor(Some(Occupant::Player))));
        assert_eq!(b.cell(Pos::new(1, 3)), Some(Cell::Floor(Some(Occupant::Crate))));
    }

    #[test]
    fn push_into_wall_is_rejected() {
        let mut b = board(&[
            "#####",
            "#C@c#",
            "#####",
        ]);
        let before = b.clone();
        assert_eq!(attempt_move(&mut b, Direction::Right), MoveOutcome::Blocked);
        assert_eq!(b, before);
    }

    #[test]
    fn push_into_crate_is_rejected() {
        let mut b = board(&[
            "######",
            "#@cc.#",
            "#CC..#",
            "######",
        ]);
        let before = b.clone();
        assert_eq!(attempt_move(&mut b, Direction::Right), MoveOutcome::Blocked);
        assert_eq!(b, before);
    }

    #[test]
    fn push_past_board_edge_is_rejected() {
        let mut b = board(&[
            ".@c",
            "...",
            "C..",
        ]);
        let before = b.clone();
        assert_eq!(attempt_move(&mut b, Direction::Right), MoveOutcome::Blocked);
        assert_eq!(b, before);
    }

    // ── Queries ──

    #[test]
    fn wasd_mapping() {
        assert_eq!(Direction::from_key('w'), Some(Direction::Up));
        assert_eq!(Direction::from_key('A'), Some(Direction::Left));
        assert_eq!(Direction::from_key('s'), Some(Direction::Down));
        assert_eq!(Direction::from_key('d'), Some(Direction::Right));
        assert_eq!(Direction::from_key('x'), None);
    }
}

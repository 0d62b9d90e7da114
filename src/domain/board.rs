/// Board: a validated rectangular grid of cells.
///
/// ## Map text format (load and save):
///   ```text
///   <rows>
///   <cols>
///   <rows lines, each exactly cols symbols>
///   ```
/// See `tile.rs` for the symbol legend.
///
/// ## Invariants (checked once, at construction):
///   - rows >= 3, cols >= 3, every row has `cols` cells
///   - exactly one player
///   - crates == destinations >= 1
///
/// Outside the crate a Board is read-only. Occupant changes are
/// `pub(crate)` and only the move engine (`rules.rs`) calls them, so the
/// invariants above hold for the lifetime of the value.

use std::fmt;
use std::str::FromStr;

use super::error::{BoardStateError, MapError};
use super::rules::Direction;
use super::tile::{Cell, Occupant};

/// Smallest legal board edge.
pub const MIN_SIZE: usize = 3;

/// Grid coordinate, row-major.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Pos { row, col }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<Cell>>,
    player: Pos,
}

// ── Construction ──

impl Board {
    /// Parse a map file's contents.
    pub fn parse(text: &str) -> Result<Board, MapError> {
        let mut lines = text.lines();
        let rows = parse_header(lines.next(), 1)?;
        let cols = parse_header(lines.next(), 2)?;

        let mut grid: Vec<&str> = lines.collect();
        // Saved maps end with a newline; tolerate blank tail lines.
        while grid.last().map_or(false, |l| l.trim().is_empty()) {
            grid.pop();
        }
        if grid.len() != rows {
            return Err(MapError::RowCountMismatch { expected: rows, found: grid.len() });
        }

        let mut cells = Vec::with_capacity(rows);
        for (r, line) in grid.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(MapError::ColumnCountMismatch { row: r, expected: cols, found });
            }
            let mut row = Vec::with_capacity(cols);
            for (c, ch) in line.chars().enumerate() {
                let cell = Cell::from_symbol(ch)
                    .ok_or(MapError::UnknownSymbol { row: r, col: c, symbol: ch })?;
                row.push(cell);
            }
            cells.push(row);
        }

        Board::from_cells(cells)
    }

    /// Build a board from an already decoded grid, running the shared validator.
    pub fn from_cells(cells: Vec<Vec<Cell>>) -> Result<Board, MapError> {
        let rows = cells.len();
        let cols = cells.first().map_or(0, |r| r.len());
        for (r, row) in cells.iter().enumerate() {
            if row.len() != cols {
                return Err(MapError::ColumnCountMismatch { row: r, expected: cols, found: row.len() });
            }
        }

        let mut players = vec![];
        let mut crates = 0;
        let mut destinations = 0;
        for (r, row) in cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell.occupant() {
                    Some(Occupant::Player) => players.push(Pos::new(r, c)),
                    Some(Occupant::Crate) => crates += 1,
                    None => {}
                }
                if cell.is_destination() {
                    destinations += 1;
                }
            }
        }

        validate_counts(rows, cols, players.len(), crates, destinations)?;

        Ok(Board { rows, cols, cells, player: players[0] })
    }
}

/// The one validator shared by the map parser and the level editor.
///
/// Check order: size, crates present, balance, player count.
pub fn validate_counts(
    rows: usize,
    cols: usize,
    players: usize,
    crates: usize,
    destinations: usize,
) -> Result<(), BoardStateError> {
    if rows < MIN_SIZE || cols < MIN_SIZE {
        return Err(BoardStateError::TooSmall { rows, cols });
    }
    if crates == 0 || destinations == 0 {
        return Err(BoardStateError::NoCrates);
    }
    if crates != destinations {
        return Err(BoardStateError::Unbalanced { crates, destinations });
    }
    if players != 1 {
        return Err(BoardStateError::PlayerCount(players));
    }
    Ok(())
}

fn parse_header(line: Option<&str>, line_no: usize) -> Result<usize, MapError> {
    line.and_then(|l| l.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .ok_or(MapError::MalformedHeader { line: line_no })
}

impl FromStr for Board {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::parse(s)
    }
}

// ── Read-only queries ──

impl Board {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Where the player currently stands.
    pub fn player(&self) -> Pos {
        self.player
    }

    #[inline]
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Cell at `pos`, `None` when out of bounds.
    #[inline]
    pub fn cell(&self, pos: Pos) -> Option<Cell> {
        self.cells.get(pos.row).and_then(|r| r.get(pos.col)).copied()
    }

    /// Cell at `pos`, out of bounds reads as a wall.
    #[inline]
    pub fn cell_or_wall(&self, pos: Pos) -> Cell {
        self.cell(pos).unwrap_or(Cell::Wall)
    }

    /// Adjacent position in `dir`, `None` when it would leave the grid.
    pub fn neighbor(&self, pos: Pos, dir: Direction) -> Option<Pos> {
        let (dr, dc) = dir.delta();
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        let next = Pos::new(row, col);
        self.in_bounds(next).then_some(next)
    }

    /// Borrowed rows for rendering. Shared references only.
    pub fn grid(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    /// Owned copy of the current layout.
    pub fn cells_snapshot(&self) -> Vec<Vec<Cell>> {
        self.cells.clone()
    }

    /// Every position, row-major, with its cell.
    pub fn iter(&self) -> impl Iterator<Item = (Pos, Cell)> + '_ {
        self.cells.iter().enumerate().flat_map(|(r, row)| {
            row.iter().enumerate().map(move |(c, cell)| (Pos::new(r, c), *cell))
        })
    }

    pub fn crate_positions(&self) -> Vec<Pos> {
        self.iter().filter(|(_, c)| c.has_crate()).map(|(p, _)| p).collect()
    }

    pub fn destination_count(&self) -> usize {
        self.iter().filter(|(_, c)| c.is_destination()).count()
    }

    pub fn crates_on_destinations(&self) -> usize {
        self.iter().filter(|(_, c)| c.is_destination() && c.has_crate()).count()
    }

    /// Serialize in the map text format (header + grid, trailing newline).
    pub fn to_map_string(&self) -> String {
        self.to_string()
    }
}

// ── Mutation (move engine only) ──

impl Board {
    /// Replace the occupant at `pos`, keeping the floor underneath.
    pub(crate) fn set_occupant(&mut self, pos: Pos, occupant: Option<Occupant>) {
        if let Some(cell) = self.cells.get_mut(pos.row).and_then(|r| r.get_mut(pos.col)) {
            *cell = cell.with_occupant(occupant);
            if occupant == Some(Occupant::Player) {
                self.player = pos;
            }
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.rows)?;
        writeln!(f, "{}", self.cols)?;
        for row in &self.cells {
            let line: String = row.iter().map(|c| c.symbol()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Test helper: wrap grid rows in the map header.
#[cfg(test)]
pub(crate) fn map_text(rows: &[&str]) -> String {
    let mut s = format!("{}\n{}\n", rows.len(), rows[0].chars().count());
    for r in rows {
        s.push_str(r);
        s.push('\n');
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_scenario_a_layout() {
        let b = Board::parse(&map_text(&["####", "#@cC", "####"])).unwrap();
        assert_eq!((b.rows(), b.cols()), (3, 4));
        assert_eq!(b.player(), Pos::new(1, 1));
        assert_eq!(b.cell(Pos::new(1, 2)), Some(Cell::Floor(Some(Occupant::Crate))));
        assert_eq!(b.cell(Pos::new(1, 3)), Some(Cell::DESTINATION));
        assert_eq!(b.cell(Pos::new(0, 0)), Some(Cell::Wall));
    }

    #[test]
    fn accepts_crlf_and_trailing_blank_lines() {
        let text = "3\r\n3\r\n#&#\r\n#c#\r\n###\r\n\r\n\r\n";
        let b = Board::parse(text).unwrap();
        assert_eq!(b.player(), Pos::new(0, 1));
        assert_eq!(b.cell(Pos::new(0, 1)), Some(Cell::DestinationFloor(Some(Occupant::Player))));
    }

    #[test]
    fn malformed_header() {
        assert_eq!(Board::parse(""), Err(MapError::MalformedHeader { line: 1 }));
        assert_eq!(Board::parse("three\n3\n"), Err(MapError::MalformedHeader { line: 1 }));
        assert_eq!(Board::parse("3\n0\n"), Err(MapError::MalformedHeader { line: 2 }));
        assert_eq!(Board::parse("3\n-4\n"), Err(MapError::MalformedHeader { line: 2 }));
        assert_eq!(Board::parse("3"), Err(MapError::MalformedHeader { line: 2 }));
    }

    #[test]
    fn row_count_mismatch() {
        let text = "4\n4\n####\n#@cC\n####\n";
        assert_eq!(Board::parse(text), Err(MapError::RowCountMismatch { expected: 4, found: 3 }));
    }

    #[test]
    fn column_count_mismatch() {
        let text = "3\n4\n####\n#@cC#\n####\n";
        assert_eq!(
            Board::parse(text),
            Err(MapError::ColumnCountMismatch { row: 1, expected: 4, found: 5 })
        );
    }

    #[test]
    fn unknown_symbol() {
        let err = Board::parse(&map_text(&["####", "#@xC", "####"])).unwrap_err();
        assert_eq!(err, MapError::UnknownSymbol { row: 1, col: 2, symbol: 'x' });
    }

    #[test]
    fn unbalanced_crates_and_destinations() {
        let err = Board::parse(&map_text(&["#####", "#@ccC", "#####"])).unwrap_err();
        assert_eq!(
            err,
            MapError::InvalidBoardState(BoardStateError::Unbalanced { crates: 2, destinations: 1 })
        );
    }

    #[test]
    fn two_players() {
        let err = Board::parse(&map_text(&["#####", "#@c@C", "#####"])).unwrap_err();
        assert_eq!(err, MapError::InvalidBoardState(BoardStateError::PlayerCount(2)));
    }

    #[test]
    fn no_player() {
        let err = Board::parse(&map_text(&["####", "#.cC", "####"])).unwrap_err();
        assert_eq!(err, MapError::InvalidBoardState(BoardStateError::PlayerCount(0)));
    }

    #[test]
    fn zero_crates() {
        let err = Board::parse(&map_text(&["###", "#@#", "###"])).unwrap_err();
        assert_eq!(err, MapError::InvalidBoardState(BoardStateError::NoCrates));
    }

    #[test]
    fn too_small() {
        let err = Board::parse(&map_text(&["@cC", "###"])).unwrap_err();
        assert_eq!(err, MapError::InvalidBoardState(BoardStateError::TooSmall { rows: 2, cols: 3 }));
    }

    #[test]
    fn serialization_matches_input_text() {
        let text = map_text(&["#####", "#&c.#", "#.$.#", "#####"]);
        let b = Board::parse(&text).unwrap();
        assert_eq!(b.to_map_string(), text);
    }

    #[test]
    fn neighbor_stops_at_the_edge() {
        let b = Board::parse(&map_text(&["@cC", "...", "..."])).unwrap();
        assert_eq!(b.neighbor(Pos::new(0, 0), Direction::Up), None);
        assert_eq!(b.neighbor(Pos::new(0, 0), Direction::Left), None);
        assert_eq!(b.neighbor(Pos::new(0, 0), Direction::Right), Some(Pos::new(0, 1)));
        assert_eq!(b.neighbor(Pos::new(2, 2), Direction::Down), None);
        assert_eq!(b.cell_or_wall(Pos::new(5, 5)), Cell::Wall);
    }

    #[test]
    fn counting_queries() {
        let b = Board::parse(&map_text(&["#####", "#@c$#", "#C..#", "#####"])).unwrap();
        assert_eq!(b.crate_positions(), vec![Pos::new(1, 2), Pos::new(1, 3)]);
        assert_eq!(b.destination_count(), 2);
        assert_eq!(b.crates_on_destinations(), 1);
    }

    /// Valid boards: walls/floors at random, one player, `n` crates and
    /// `n` destinations, some crates already sitting on their destination.
    fn arb_board() -> impl Strategy<Value = Board> {
        (3usize..8, 3usize..8)
            .prop_flat_map(|(rows, cols)| {
                let n_cells = rows * cols;
                (
                    Just(rows),
                    Just(cols),
                    proptest::collection::vec(any::<bool>(), n_cells),
                    Just((0..n_cells).collect::<Vec<_>>()).prop_shuffle(),
                    1usize..=4,
                    proptest::collection::vec(any::<bool>(), 4),
                )
            })
            .prop_map(|(rows, cols, walls, order, n, merged)| {
                let mut cells: Vec<Vec<Cell>> = (0..rows)
                    .map(|r| {
                        (0..cols)
                            .map(|c| if walls[r * cols + c] { Cell::Wall } else { Cell::FLOOR })
                            .collect()
                    })
                    .collect();
                let mut put = |idx: usize, cell: Cell| cells[idx / cols][idx % cols] = cell;
                put(order[0], Cell::Floor(Some(Occupant::Player)));
                for i in 0..n {
                    if merged[i] {
                        put(order[1 + i], Cell::DestinationFloor(Some(Occupant::Crate)));
                        put(order[1 + n + i], Cell::FLOOR);
                    } else {
                        put(order[1 + i], Cell::Floor(Some(Occupant::Crate)));
                        put(order[1 + n + i], Cell::DESTINATION);
                    }
                }
                Board::from_cells(cells).expect("generated board is valid")
            })
    }

    proptest! {
        #[test]
        fn parse_of_serialize_is_identity(board in arb_board()) {
            let reparsed = Board::parse(&board.to_map_string()).unwrap();
            prop_assert_eq!(reparsed, board);
        }
    }
}

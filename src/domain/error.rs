/// Map error taxonomy.
///
/// Structural errors come from turning text into a grid; `InvalidBoardState`
/// comes from the shared validator once the grid parsed. The move engine and
/// the evaluators never fail on a validated board.

use thiserror::Error;

/// Why a structurally sound grid is not a playable board.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardStateError {
    #[error("minimum size is 3 rows and 3 cols (got {rows}x{cols})")]
    TooSmall { rows: usize, cols: usize },
    #[error("map must contain exactly one player (found {0})")]
    PlayerCount(usize),
    #[error("map must contain at least one crate and one destination")]
    NoCrates,
    #[error("imbalanced number of crates ({crates}) and destinations ({destinations})")]
    Unbalanced { crates: usize, destinations: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("malformed header on line {line}: expected a positive integer")]
    MalformedHeader { line: usize },
    #[error("expected {expected} rows, found {found}")]
    RowCountMismatch { expected: usize, found: usize },
    #[error("row {row}: expected {expected} columns, found {found}")]
    ColumnCountMismatch { row: usize, expected: usize, found: usize },
    #[error("unknown symbol {symbol:?} at row {row}, col {col}")]
    UnknownSymbol { row: usize, col: usize, symbol: char },
    #[error("invalid map: {0}")]
    InvalidBoardState(#[from] BoardStateError),
}

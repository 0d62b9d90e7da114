pub mod analysis;
pub mod board;
pub mod editor;
pub mod error;
pub mod rules;
pub mod tile;

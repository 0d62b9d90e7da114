/// Sokoterm: terminal Sokoban with a level editor.
///
/// Layers, innermost first:
///   - `domain`: board model, map parsing, move rules, win/deadlock checks, editor grid
///   - `sim`: levels, world state and the per-frame step function
///   - `ui`: terminal input, gamepad, sound and rendering
///
/// `domain` and `sim` never touch the terminal; everything they do is
/// testable without one.

pub mod config;
pub mod domain;
pub mod logging;
pub mod sim;
pub mod ui;

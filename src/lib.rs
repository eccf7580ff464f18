//! Bimaru (Battleship Solitaire) Solver Library
//!
//! Provides the core deduction machinery for Bimaru puzzles: a board with
//! per-line ship-cell counters, a fixed-point constraint propagator, a
//! placement generator and applier, and a generic depth-first search driver
//! that ties them together.

pub mod board;
pub mod fleet;
pub mod logging;
pub mod moves;
pub mod parse;
pub mod propagate;
pub mod puzzle;
pub mod search;

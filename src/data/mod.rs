//! Data module: per-rank tiles and the assembled grid

pub mod grid;
pub mod tile;

pub use grid::Grid;
pub use tile::{Tile, TilePair};

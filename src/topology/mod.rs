//! Process topology: which rank owns which rows of the global grid.

pub mod decomposition;

pub use decomposition::{RankRows, RowDecomposition};

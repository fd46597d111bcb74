//! Grid I/O for the coordinator.
//!
//! The only format is plain text: one grid row per line, values separated by
//! whitespace. See [`grid_text`].

pub mod grid_text;

use crate::data::Grid;
use crate::heat_error::HeatError;
use std::io::{Read, Write};

pub use grid_text::{
    DEFAULT_OUTPUT_FILE, TextGridReader, TextGridWriter, load_grid, print_grid, read_grid,
    save_grid,
};

/// Trait for readers that reconstruct an assembled grid.
pub trait GridReader {
    /// Parse a grid from a reader.
    fn read<R: Read>(&self, reader: R) -> Result<Grid, HeatError>;
}

/// Trait for writers that serialize an assembled grid.
pub trait GridWriter {
    /// Write `grid` to a writer.
    fn write<W: Write>(&self, writer: W, grid: &Grid) -> Result<(), HeatError>;
}

//! Whitespace-separated text rendering of a grid.
//!
//! Every value is printed with `f64`'s shortest round-trip `Display` and
//! followed by one space; each row ends with a newline. Reading accepts any
//! whitespace between values and requires a square grid.

use super::{GridReader, GridWriter};
use crate::data::Grid;
use crate::heat_error::HeatError;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// File the coordinator writes when no path is given.
pub const DEFAULT_OUTPUT_FILE: &str = "output_grid.txt";

const CONSOLE_SEPARATOR: &str = "---------------------------------------";

#[derive(Clone, Copy, Debug, Default)]
pub struct TextGridWriter;

impl GridWriter for TextGridWriter {
    fn write<W: Write>(&self, mut writer: W, grid: &Grid) -> Result<(), HeatError> {
        for row in grid.rows() {
            for value in row {
                write!(writer, "{value} ")?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TextGridReader;

impl GridReader for TextGridReader {
    fn read<R: Read>(&self, reader: R) -> Result<Grid, HeatError> {
        let mut data = Vec::new();
        let mut width = None;
        let mut rows = 0usize;
        for (lineno, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let before = data.len();
            for tok in line.split_whitespace() {
                let v: f64 = tok.parse().map_err(|e| {
                    HeatError::Parse(format!("line {}: invalid value `{tok}`: {e}", lineno + 1))
                })?;
                data.push(v);
            }
            let n = data.len() - before;
            match width {
                None => width = Some(n),
                Some(w) if w != n => {
                    return Err(HeatError::Parse(format!(
                        "line {}: expected {w} values, found {n}",
                        lineno + 1
                    )));
                }
                Some(_) => {}
            }
            rows += 1;
        }
        let size = width.unwrap_or(0);
        if rows != size {
            return Err(HeatError::Parse(format!(
                "grid is not square: {rows} rows of {size} values"
            )));
        }
        Grid::from_vec(size, data)
    }
}

/// Write `grid` to `path`, replacing any existing file.
pub fn save_grid(grid: &Grid, path: impl AsRef<Path>) -> Result<(), HeatError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    TextGridWriter.write(BufWriter::new(file), grid)?;
    log::info!("wrote {}x{} grid to {}", grid.size(), grid.size(), path.display());
    Ok(())
}

/// Console dump: the text rows followed by a separator line.
pub fn print_grid<W: Write>(grid: &Grid, mut out: W) -> Result<(), HeatError> {
    TextGridWriter.write(&mut out, grid)?;
    writeln!(out, "{CONSOLE_SEPARATOR}")?;
    Ok(())
}

/// Read a grid previously written with [`save_grid`].
pub fn load_grid(path: impl AsRef<Path>) -> Result<Grid, HeatError> {
    TextGridReader.read(File::open(path)?)
}

/// Convenience for in-memory buffers.
pub fn read_grid<R: BufRead>(reader: R) -> Result<Grid, HeatError> {
    TextGridReader.read(reader)
}

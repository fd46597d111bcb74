//! Per-rank tile storage.
//!
//! A [`Tile`] holds a rank's `localRows` authoritative rows plus one halo row
//! above (index 0) and one below (index `localRows + 1`), stored row-major in
//! a single contiguous buffer so that any run of whole rows can be handed to
//! the communicator as one slice.
//!
//! [`TilePair`] owns the `current`/`next` generations. The stencil reads
//! `current` and writes `next`; [`TilePair::swap`] then exchanges ownership of
//! the two buffers without copying.

use crate::debug_invariants::{DebugInvariants, check_finite};
use crate::heat_error::HeatError;
use crate::topology::RankRows;

/// `(localRows + 2) × cols` block of the grid, halo rows included.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    local_rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Tile {
    /// Zero-filled tile with `local_rows` authoritative rows.
    pub fn zeros(local_rows: usize, cols: usize) -> Self {
        Self {
            local_rows,
            cols,
            data: vec![0.0; (local_rows + 2) * cols],
        }
    }

    /// Number of authoritative rows.
    #[inline]
    pub fn local_rows(&self) -> usize {
        self.local_rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Rows including both halos.
    #[inline]
    pub fn total_rows(&self) -> usize {
        self.local_rows + 2
    }

    /// Index of the bottom halo row.
    #[inline]
    pub fn bottom_halo_index(&self) -> usize {
        self.local_rows + 1
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.cols + j] = value;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Row 0, cached from the neighbor above.
    pub fn top_halo(&self) -> &[f64] {
        self.row(0)
    }

    /// Row `localRows + 1`, cached from the neighbor below.
    pub fn bottom_halo(&self) -> &[f64] {
        self.row(self.bottom_halo_index())
    }

    /// Row 1, the first authoritative row.
    pub fn first_owned(&self) -> &[f64] {
        self.row(1)
    }

    /// Row `localRows`, the last authoritative row.
    pub fn last_owned(&self) -> &[f64] {
        self.row(self.local_rows)
    }

    /// Rows `1..=localRows` as one contiguous slice.
    pub fn owned(&self) -> &[f64] {
        &self.data[self.cols..(self.local_rows + 1) * self.cols]
    }

    pub fn owned_mut(&mut self) -> &mut [f64] {
        &mut self.data[self.cols..(self.local_rows + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

impl DebugInvariants for Tile {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Tile");
    }

    fn validate_invariants(&self) -> Result<(), HeatError> {
        let expected = (self.local_rows + 2) * self.cols;
        if self.data.len() != expected {
            return Err(HeatError::ShapeMismatch {
                expected,
                found: self.data.len(),
            });
        }
        check_finite(&self.data, self.cols, "Tile")
    }
}

/// Double buffer: the state entering the next step and the one being built.
#[derive(Clone, Debug)]
pub struct TilePair {
    current: Tile,
    next: Tile,
}

impl TilePair {
    /// Two zero-filled tiles of identical shape.
    pub fn zeros(local_rows: usize, cols: usize) -> Self {
        Self {
            current: Tile::zeros(local_rows, cols),
            next: Tile::zeros(local_rows, cols),
        }
    }

    /// Initial condition for `rank`.
    ///
    /// Only the coordinator's first authoritative row (global row 0) of
    /// `current` is hot; `next` starts all zero. The kernel never writes edge
    /// columns, so the edge cells of that row read 100/0 with buffer parity.
    pub fn initialize(rank: &RankRows, cols: usize, source_temperature: f64) -> Self {
        let mut pair = Self::zeros(rank.rows, cols);
        if rank.is_coordinator() {
            pair.current.row_mut(1).fill(source_temperature);
        }
        pair
    }

    /// Copy row 1 of `current` into `next`, so a row the kernel skips keeps
    /// its value across swaps.
    pub fn pin_first_owned(&mut self) {
        let (current, next) = (&self.current, &mut self.next);
        next.row_mut(1).copy_from_slice(current.first_owned());
    }

    pub fn current(&self) -> &Tile {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut Tile {
        &mut self.current
    }

    pub fn next(&self) -> &Tile {
        &self.next
    }

    /// Borrow `current` for reading and `next` for writing at once.
    pub fn split_mut(&mut self) -> (&Tile, &mut Tile) {
        (&self.current, &mut self.next)
    }

    /// Promote `next` to `current`.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    pub fn into_current(self) -> Tile {
        self.current
    }
}

impl DebugInvariants for TilePair {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "TilePair");
    }

    fn validate_invariants(&self) -> Result<(), HeatError> {
        self.current.validate_invariants()?;
        self.next.validate_invariants()?;
        if self.current.local_rows != self.next.local_rows || self.current.cols != self.next.cols {
            return Err(HeatError::ShapeMismatch {
                expected: self.current.data.len(),
                found: self.next.data.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemainderPolicy;
    use crate::topology::RowDecomposition;

    #[test]
    fn tile_shape_and_views() {
        let mut t = Tile::zeros(3, 4);
        assert_eq!(t.total_rows(), 5);
        assert_eq!(t.as_slice().len(), 20);
        t.row_mut(1).fill(1.0);
        t.row_mut(3).fill(3.0);
        assert_eq!(t.first_owned(), &[1.0; 4]);
        assert_eq!(t.last_owned(), &[3.0; 4]);
        assert_eq!(t.owned().len(), 12);
        assert_eq!(t.top_halo(), &[0.0; 4]);
        assert_eq!(t.bottom_halo(), &[0.0; 4]);
        t.validate_invariants().unwrap();
    }

    #[test]
    fn only_coordinator_is_seeded() {
        let d = RowDecomposition::new(4, 2, RemainderPolicy::Truncate).unwrap();
        let p0 = TilePair::initialize(&d.rank_rows(0), 4, 100.0);
        let p1 = TilePair::initialize(&d.rank_rows(1), 4, 100.0);
        assert_eq!(p0.current().row(1), &[100.0; 4]);
        assert_eq!(p0.next().row(1), &[0.0; 4]);
        assert_eq!(p0.current().row(0), &[0.0; 4]);
        assert_eq!(p0.current().row(2), &[0.0; 4]);
        assert!(p1.current().as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn pinned_row_survives_swaps() {
        let d = RowDecomposition::new(4, 2, RemainderPolicy::Truncate).unwrap();
        let mut pair = TilePair::initialize(&d.rank_rows(0), 4, 100.0);
        pair.pin_first_owned();
        pair.swap();
        assert_eq!(pair.current().first_owned(), &[100.0; 4]);
        pair.swap();
        assert_eq!(pair.current().first_owned(), &[100.0; 4]);
    }

    #[test]
    fn swap_exchanges_generations() {
        let mut pair = TilePair::zeros(1, 2);
        {
            let (_cur, next) = pair.split_mut();
            next.set(1, 0, 5.0);
        }
        pair.swap();
        assert_eq!(pair.current().get(1, 0), 5.0);
        assert_eq!(pair.next().get(1, 0), 0.0);
        pair.validate_invariants().unwrap();
    }
}

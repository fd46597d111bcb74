//! The assembled `N × N` temperature field.
//!
//! Only the coordinator ever materializes a full [`Grid`], after the gather.

use crate::debug_invariants::{DebugInvariants, check_finite};
use crate::heat_error::HeatError;

#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    size: usize,
    data: Vec<f64>,
}

impl Grid {
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size],
        }
    }

    /// Initial condition of the whole domain: row 0 at `source_temperature`,
    /// everything else 0.0.
    pub fn initial(size: usize, source_temperature: f64) -> Self {
        let mut grid = Self::zeros(size);
        if size > 0 {
            grid.row_mut(0).fill(source_temperature);
        }
        grid
    }

    /// Build from row-major values; `data.len()` must be `size * size`.
    pub fn from_vec(size: usize, data: Vec<f64>) -> Result<Self, HeatError> {
        if data.len() != size * size {
            return Err(HeatError::ShapeMismatch {
                expected: size * size,
                found: data.len(),
            });
        }
        Ok(Self { size, data })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.size..(i + 1) * self.size]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.size..(i + 1) * self.size]
    }

    /// `count` consecutive rows starting at `first`, as one slice.
    pub fn rows_mut(&mut self, first: usize, count: usize) -> &mut [f64] {
        &mut self.data[first * self.size..(first + count) * self.size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.size.max(1))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}

impl DebugInvariants for Grid {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Grid");
    }

    fn validate_invariants(&self) -> Result<(), HeatError> {
        if self.data.len() != self.size * self.size {
            return Err(HeatError::ShapeMismatch {
                expected: self.size * self.size,
                found: self.data.len(),
            });
        }
        check_finite(&self.data, self.size, "Grid")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_condition() {
        let g = Grid::initial(3, 100.0);
        assert_eq!(g.row(0), &[100.0; 3]);
        assert_eq!(g.row(1), &[0.0; 3]);
        assert_eq!(g.rows().count(), 3);
        g.validate_invariants().unwrap();
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(Grid::from_vec(2, vec![1.0, 2.0, 3.0, 4.0]).is_ok());
        assert!(matches!(
            Grid::from_vec(2, vec![1.0]),
            Err(HeatError::ShapeMismatch { expected: 4, found: 1 })
        ));
    }

    #[test]
    fn rows_mut_spans_consecutive_rows() {
        let mut g = Grid::zeros(3);
        g.rows_mut(1, 2).fill(7.0);
        assert_eq!(g.row(0), &[0.0; 3]);
        assert_eq!(g.row(2), &[7.0; 3]);
    }

    #[test]
    fn non_finite_is_reported() {
        let g = Grid::from_vec(1, vec![f64::INFINITY]).unwrap();
        assert!(g.validate_invariants().is_err());
    }
}

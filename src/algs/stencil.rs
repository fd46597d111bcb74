//! Explicit 5-point diffusion update.
//!
//! For every interior cell `(i, j)` of the authoritative rows,
//!
//! ```text
//! next[i][j] = cur[i][j] + α·(cur[i-1][j] + cur[i+1][j] + cur[i][j-1] + cur[i][j+1] − 4·cur[i][j])
//! ```
//!
//! Only columns `1..N-1` are written. Halo rows and the two edge columns of
//! `next` keep whatever the buffer held, so the edges behave as fixed values
//! and the halos stay stale until the following exchange refreshes them.

use crate::data::Tile;
use std::ops::RangeInclusive;

/// Update all authoritative rows `1..=localRows` of `next` from `current`.
#[inline]
pub fn apply(current: &Tile, next: &mut Tile, alpha: f64) {
    apply_rows(current, next, alpha, 1..=current.local_rows());
}

/// Update the tile rows in `rows` (local indices, halos excluded).
///
/// Rows outside `1..=localRows` are clamped away.
pub fn apply_rows(current: &Tile, next: &mut Tile, alpha: f64, rows: RangeInclusive<usize>) {
    debug_assert_eq!(current.local_rows(), next.local_rows());
    debug_assert_eq!(current.cols(), next.cols());

    let cols = current.cols();
    if cols < 3 {
        return;
    }
    let first = (*rows.start()).max(1);
    let last = (*rows.end()).min(current.local_rows());
    for i in first..=last {
        let above = current.row(i - 1);
        let here = current.row(i);
        let below = current.row(i + 1);
        let out = next.row_mut(i);
        for j in 1..cols - 1 {
            let c = here[j];
            out[j] = c + alpha * (above[j] + below[j] + here[j - 1] + here[j + 1] - 4.0 * c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hot_row_over_cold_rows() {
        // rank 0 of N=4, P=2 before its first step
        let mut cur = Tile::zeros(2, 4);
        cur.row_mut(1).fill(100.0);
        let mut next = cur.clone();
        apply(&cur, &mut next, 0.01);
        assert!((next.get(1, 1) - 98.0).abs() < 1e-12);
        assert!((next.get(1, 2) - 98.0).abs() < 1e-12);
        assert!((next.get(2, 1) - 1.0).abs() < 1e-12);
        assert!((next.get(2, 2) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn edges_and_halos_untouched() {
        let mut cur = Tile::zeros(2, 5);
        for i in 0..4 {
            cur.row_mut(i).fill(10.0 * i as f64);
        }
        let mut next = Tile::zeros(2, 5);
        next.row_mut(0).fill(-1.0);
        next.row_mut(3).fill(-3.0);
        apply(&cur, &mut next, 0.1);
        assert_eq!(next.row(0), &[-1.0; 5]);
        assert_eq!(next.row(3), &[-3.0; 5]);
        for i in 1..=2 {
            assert_eq!(next.get(i, 0), 0.0);
            assert_eq!(next.get(i, 4), 0.0);
        }
    }

    #[test]
    fn uniform_field_is_fixed_point() {
        let mut cur = Tile::zeros(3, 6);
        for i in 0..cur.total_rows() {
            cur.row_mut(i).fill(42.0);
        }
        let mut next = cur.clone();
        apply(&cur, &mut next, 0.2);
        assert_eq!(cur, next);
    }

    #[test]
    fn row_subset_and_narrow_tiles() {
        let mut cur = Tile::zeros(2, 3);
        cur.row_mut(1).fill(100.0);
        let mut next = cur.clone();
        apply_rows(&cur, &mut next, 0.01, 2..=2);
        assert_eq!(next.get(1, 1), 100.0);
        assert!((next.get(2, 1) - 1.0).abs() < 1e-12);

        // no interior columns at all
        let cur = Tile::zeros(2, 2);
        let mut next = Tile::zeros(2, 2);
        next.set(1, 1, 3.0);
        apply(&cur, &mut next, 0.5);
        assert_eq!(next.get(1, 1), 3.0);
    }
}

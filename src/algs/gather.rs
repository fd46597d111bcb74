//! Many-to-one collection of authoritative rows at the coordinator (rank 0).
//!
//! Every other rank sends its owned rows as one contiguous block; the
//! coordinator receives them in increasing rank order, so assembly is
//! deterministic whatever order the transport completes them in.

use crate::algs::communicator::{Communicator, GATHER_TAG};
use crate::algs::wire::{recv_f64s_into, send_f64s};
use crate::data::{Grid, Tile};
use crate::heat_error::HeatError;
use crate::topology::RowDecomposition;

/// Assemble the full grid on rank 0.
///
/// Returns `Some(grid)` on the coordinator and `None` everywhere else. Rows
/// no rank owns (see [`crate::config::RemainderPolicy::Truncate`]) stay 0.0.
pub fn gather_to_coordinator<C: Communicator>(
    decomp: &RowDecomposition,
    tile: &Tile,
    comm: &C,
) -> Result<Option<Grid>, HeatError> {
    let rank = comm.rank();
    let n = decomp.grid_size();
    let expected_rows = decomp.rows_of(rank);
    if tile.local_rows() != expected_rows || tile.cols() != n {
        return Err(HeatError::ShapeMismatch {
            expected: expected_rows * n,
            found: tile.owned().len(),
        });
    }

    if rank != 0 {
        log::debug!("[rank {rank}] gather: send {expected_rows} rows -> 0");
        send_f64s(comm, 0, GATHER_TAG, tile.owned())?;
        return Ok(None);
    }

    let mut grid = Grid::zeros(n);
    grid.rows_mut(0, expected_rows).copy_from_slice(tile.owned());
    for part in decomp.iter().skip(1) {
        recv_f64s_into(
            comm,
            part.rank,
            GATHER_TAG,
            grid.rows_mut(part.offset, part.rows),
        )?;
    }
    let dropped = decomp.dropped_rows();
    if dropped > 0 {
        log::warn!(
            "gather: {dropped} trailing row(s) of the {n}x{n} grid are not owned by any of {} workers and stay 0.0",
            decomp.workers()
        );
    }
    log::info!("gather: assembled {n}x{n} grid from {} ranks", decomp.workers());
    Ok(Some(grid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::{LocalComm, NoComm};
    use crate::config::RemainderPolicy;

    fn filled_tile(rows: usize, cols: usize, value: f64) -> Tile {
        let mut t = Tile::zeros(rows, cols);
        t.owned_mut().fill(value);
        t.row_mut(0).fill(-1.0);
        t.row_mut(rows + 1).fill(-1.0);
        t
    }

    fn gather_local(decomp: RowDecomposition, cols: usize) -> Grid {
        let world = LocalComm::world(decomp.workers());
        std::thread::scope(|s| {
            for comm in world.iter().skip(1) {
                s.spawn(move || {
                    let rows = decomp.rows_of(comm.rank());
                    let tile = filled_tile(rows, cols, comm.rank() as f64 + 1.0);
                    assert!(gather_to_coordinator(&decomp, &tile, comm).unwrap().is_none());
                });
            }
            let tile = filled_tile(decomp.rows_of(0), cols, 1.0);
            gather_to_coordinator(&decomp, &tile, &world[0])
                .unwrap()
                .expect("coordinator gets the grid")
        })
    }

    #[test]
    fn rows_land_at_rank_offsets() {
        let d = RowDecomposition::new(6, 3, RemainderPolicy::Truncate).unwrap();
        let g = gather_local(d, 6);
        for i in 0..6 {
            assert_eq!(g.row(i), &[(i / 2 + 1) as f64; 6], "row {i}");
        }
    }

    #[test]
    fn truncated_rows_stay_zero() {
        let d = RowDecomposition::new(5, 2, RemainderPolicy::Truncate).unwrap();
        let g = gather_local(d, 5);
        assert_eq!(g.row(3), &[2.0; 5]);
        assert_eq!(g.row(4), &[0.0; 5]);
    }

    #[test]
    fn last_rank_remainder_is_gathered() {
        let d = RowDecomposition::new(5, 2, RemainderPolicy::AssignToLast).unwrap();
        let g = gather_local(d, 5);
        assert_eq!(g.row(1), &[1.0; 5]);
        assert_eq!(g.row(2), &[2.0; 5]);
        assert_eq!(g.row(4), &[2.0; 5]);
    }

    #[test]
    fn single_rank_copies_own_rows() {
        let d = RowDecomposition::new(3, 1, RemainderPolicy::Truncate).unwrap();
        let tile = filled_tile(3, 3, 9.0);
        let g = gather_to_coordinator(&d, &tile, &NoComm).unwrap().unwrap();
        assert!(g.as_slice().iter().all(|&v| v == 9.0));
    }

    #[test]
    fn wrong_tile_shape_is_rejected() {
        let d = RowDecomposition::new(4, 1, RemainderPolicy::Truncate).unwrap();
        let tile = Tile::zeros(3, 4);
        assert!(matches!(
            gather_to_coordinator(&d, &tile, &NoComm),
            Err(HeatError::ShapeMismatch { .. })
        ));
    }
}

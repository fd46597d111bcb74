//! Time loop and launchers.
//!
//! One rank runs, for each of the `T` steps:
//! 1. the stencil from `current` into `next`,
//! 2. a buffer swap,
//! 3. the halo exchange on the new `current`.
//!
//! The kernel of step `t + 1` therefore only ever reads halos that step `t`'s
//! exchange finished writing; the blocking pairwise transfers act as the
//! barrier between steps. After the last step the owned rows are gathered at
//! rank 0.

use crate::algs::communicator::{Communicator, LocalComm, NoComm};
use crate::algs::gather::gather_to_coordinator;
use crate::algs::halo::exchange_halos;
use crate::algs::stencil;
use crate::config::SimulationConfig;
use crate::data::{Grid, TilePair};
use crate::debug_invariants::DebugInvariants;
use crate::heat_error::HeatError;
use crate::topology::{RankRows, RowDecomposition};
use std::time::Instant;

/// Mutable state of one rank between steps.
#[derive(Clone, Debug)]
pub struct RankState {
    rows: RankRows,
    tiles: TilePair,
    alpha: f64,
    first_row: usize,
    steps_done: usize,
}

impl RankState {
    /// Fresh state at `t = 0` for `rank`.
    pub fn new(cfg: &SimulationConfig, decomp: &RowDecomposition, rank: usize) -> Self {
        let rows = decomp.rank_rows(rank);
        let mut tiles = TilePair::initialize(&rows, decomp.grid_size(), cfg.source_temperature);
        // a pinned source row is never handed to the kernel
        let first_row = if cfg.pin_source && rows.is_coordinator() {
            tiles.pin_first_owned();
            2
        } else {
            1
        };
        tiles.debug_assert_invariants();
        Self {
            rows,
            tiles,
            alpha: cfg.alpha,
            first_row,
            steps_done: 0,
        }
    }

    pub fn rows(&self) -> &RankRows {
        &self.rows
    }

    pub fn tiles(&self) -> &TilePair {
        &self.tiles
    }

    pub fn steps_done(&self) -> usize {
        self.steps_done
    }

    /// Compute, swap, exchange.
    pub fn step<C: Communicator>(&mut self, comm: &C) -> Result<(), HeatError> {
        let (current, next) = self.tiles.split_mut();
        stencil::apply_rows(current, next, self.alpha, self.first_row..=self.rows.rows);
        self.tiles.swap();
        exchange_halos(&self.rows, self.tiles.current_mut(), comm)?;
        self.steps_done += 1;
        Ok(())
    }

    pub fn run_steps<C: Communicator>(&mut self, steps: usize, comm: &C) -> Result<(), HeatError> {
        for _ in 0..steps {
            self.step(comm)?;
        }
        Ok(())
    }
}

/// Full run of the calling rank: returns the grid on rank 0, `None` elsewhere.
pub fn run_rank<C: Communicator>(
    cfg: &SimulationConfig,
    comm: &C,
) -> Result<Option<Grid>, HeatError> {
    let rank = comm.rank();
    cfg.validate(comm.size())?;
    let decomp = RowDecomposition::new(cfg.grid_size, comm.size(), cfg.remainder)?;
    let mut state = RankState::new(cfg, &decomp, rank);
    log::debug!(
        "[rank {rank}] owns global rows {:?}, up={:?} down={:?}",
        state.rows().global_range(),
        state.rows().up,
        state.rows().down
    );

    let started = Instant::now();
    state.run_steps(cfg.time_steps, comm)?;
    log::debug!(
        "[rank {rank}] {} steps in {:.3?}",
        state.steps_done(),
        started.elapsed()
    );

    gather_to_coordinator(&decomp, state.tiles().current(), comm)
}

/// Run on `workers` threads of this process, one [`LocalComm`] rank each.
pub fn run_local(cfg: &SimulationConfig, workers: usize) -> Result<Grid, HeatError> {
    cfg.validate(workers)?;
    log::debug!(
        "local run: N={} T={} alpha={} on {workers} worker(s)",
        cfg.grid_size,
        cfg.time_steps,
        cfg.alpha
    );

    let results = std::thread::scope(|s| -> Result<Vec<_>, HeatError> {
        let mut handles = Vec::with_capacity(workers);
        for comm in LocalComm::world(workers) {
            let rank = comm.rank();
            let handle = std::thread::Builder::new()
                .name(format!("heat-rank-{rank}"))
                .spawn_scoped(s, move || run_rank(cfg, &comm))?;
            handles.push((rank, handle));
        }
        Ok(handles
            .into_iter()
            .map(|(rank, h)| h.join().unwrap_or(Err(HeatError::WorkerPanicked(rank))))
            .collect())
    })?;

    let mut coordinator = None;
    let mut failures = Vec::new();
    for (rank, result) in results.into_iter().enumerate() {
        match result {
            Ok(Some(grid)) if rank == 0 => coordinator = Some(grid),
            Ok(_) => {}
            Err(e) => failures.push(e),
        }
    }
    // report the failing rank, not the neighbors that lost it
    if let Some(pos) = failures
        .iter()
        .position(|e| !matches!(e, HeatError::CommError { .. }))
    {
        return Err(failures.swap_remove(pos));
    }
    if let Some(err) = failures.into_iter().next() {
        return Err(err);
    }
    coordinator.ok_or_else(|| HeatError::InvalidConfig("coordinator produced no grid".into()))
}

/// Single-rank reference run.
pub fn run_serial(cfg: &SimulationConfig) -> Result<Grid, HeatError> {
    run_rank(cfg, &NoComm)?
        .ok_or_else(|| HeatError::InvalidConfig("coordinator produced no grid".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny(steps: usize) -> SimulationConfig {
        SimulationConfig::default()
            .with_grid_size(4)
            .with_time_steps(steps)
    }

    #[test]
    fn zero_steps_is_initial_condition() {
        let g = run_serial(&tiny(0)).unwrap();
        assert_eq!(g, Grid::initial(4, 100.0));
    }

    #[test]
    fn one_step_four_by_four() {
        let g = run_local(&tiny(1), 2).unwrap();
        // the hot row's edge cells come from the unseeded buffer after one swap
        let expected = [
            [0.0, 98.0, 98.0, 0.0],
            [0.0, 1.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
        ];
        for (i, row) in expected.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                assert!((g.get(i, j) - v).abs() < 1e-12, "({i},{j}) = {}", g.get(i, j));
            }
        }
    }

    #[test]
    fn second_step_reads_edge_cells_by_buffer_parity() {
        let g = run_serial(&tiny(2)).unwrap();
        // 98 + 0.01 * (0 + 1 + 0 + 98 - 4 * 98)
        assert!((g.get(0, 1) - 95.07).abs() < 1e-12, "(0,1) = {}", g.get(0, 1));
        assert_eq!(g.get(0, 0), 100.0);
        assert_eq!(g.get(0, 3), 100.0);
        assert_eq!(run_local(&tiny(2), 2).unwrap(), g);
    }

    #[test]
    fn state_counts_steps_and_keeps_shape() {
        let cfg = tiny(3);
        let d = RowDecomposition::new(4, 1, cfg.remainder).unwrap();
        let mut st = RankState::new(&cfg, &d, 0);
        st.run_steps(3, &NoComm).unwrap();
        assert_eq!(st.steps_done(), 3);
        st.tiles().validate_invariants().unwrap();
    }

    #[test]
    fn pinned_source_row_never_moves() {
        let cfg = tiny(5).with_pin_source(true);
        let g = run_local(&cfg, 2).unwrap();
        assert_eq!(g.row(0), &[100.0; 4]);
        assert!(g.get(1, 1) > 0.0);
    }

    #[test]
    fn validation_happens_before_spawning() {
        assert!(matches!(
            run_local(&tiny(1), 5),
            Err(HeatError::EmptyPartition { .. })
        ));
        assert!(run_local(&tiny(1), 0).is_err());
    }
}

#![cfg_attr(docsrs, feature(doc_cfg))]
//! # heat-stencil
//!
//! heat-stencil evolves a 2-D heat-diffusion problem on an `N × N` grid with an
//! explicit 5-point finite-difference stencil, split row-wise over a fixed set
//! of cooperating ranks. It is a compact, illustrative example of
//! bulk-synchronous domain decomposition: partition, compute locally, trade
//! boundary rows with neighbors, repeat, then gather at a coordinator.
//!
//! ## Features
//! - Row-block decomposition with an explicit policy for leftover rows
//! - Double-buffered per-rank tiles with one halo row on each side
//! - Deadlock-free nearest-neighbor halo exchange, modelled as a state machine
//! - Deterministic gather of all owned rows at rank 0
//! - Pluggable communication backends (serial, in-process threads, MPI)
//! - Plain-text grid output for post-processing
//!
//! ## Determinism
//!
//! The numeric path has no randomness and no reductions whose order depends on
//! scheduling. For fixed parameters and worker count the gathered grid is
//! bit-identical between runs. When every rank owns at least two rows it also
//! matches the single-rank result on every owned row. A rank 0 holding only
//! the hot row hides it from rank 1 for the first step, because halos are
//! first filled by the exchange that follows step 1.
//!
//! ## Usage
//!
//! ```no_run
//! use heat_stencil::prelude::*;
//!
//! let cfg = SimulationConfig::default().with_grid_size(64).with_time_steps(100);
//! let grid = run_local(&cfg, 4).expect("simulation failed");
//! save_grid(&grid, DEFAULT_OUTPUT_FILE).expect("write failed");
//! ```
//!
//! Under `mpirun`, enable the `mpi-support` feature and call
//! [`solver::run_rank`] with an `MpiComm` on every process.

pub mod algs;
pub mod config;
pub mod data;
pub mod debug_invariants;
pub mod heat_error;
pub mod io;
pub mod solver;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::communicator::{Communicator, LocalComm, NoComm};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::gather::gather_to_coordinator;
    pub use crate::algs::halo::{HaloExchange, HaloState, exchange_halos};
    pub use crate::config::{RemainderPolicy, SimulationConfig};
    pub use crate::data::{Grid, Tile, TilePair};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::heat_error::HeatError;
    pub use crate::io::{DEFAULT_OUTPUT_FILE, print_grid, save_grid};
    pub use crate::solver::{RankState, run_local, run_rank, run_serial};
    pub use crate::topology::{RankRows, RowDecomposition};
}

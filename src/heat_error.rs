//! HeatError: Unified error type for heat-stencil public APIs
//!
//! Every fallible operation at the crate boundary (configuration, decomposition,
//! communication payload checks, text I/O) reports through this enum. The numeric
//! core itself has no failure modes.

use thiserror::Error;

/// Unified error type for heat-stencil operations.
#[derive(Debug, Error)]
pub enum HeatError {
    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// `RemainderPolicy::Reject` and the grid does not split evenly.
    #[error("grid size {grid_size} is not divisible by worker count {workers}")]
    NonDividingWorkers { grid_size: usize, workers: usize },
    /// A rank would own zero authoritative rows.
    #[error("rank {rank} owns no rows (grid size {grid_size}, {workers} workers)")]
    EmptyPartition {
        rank: usize,
        grid_size: usize,
        workers: usize,
    },
    /// A buffer or grid did not have the expected number of elements.
    #[error("shape mismatch: expected {expected} values, found {found}")]
    ShapeMismatch { expected: usize, found: usize },
    /// Communication with a neighbor failed in a detectable way.
    #[error("communication with rank {neighbor} failed: {source}")]
    CommError {
        neighbor: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A worker thread of the in-process collective panicked.
    #[error("worker for rank {0} panicked")]
    WorkerPanicked(usize),
    /// Underlying file or stream error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Grid text could not be parsed.
    #[error("grid parse error: {0}")]
    Parse(String),
    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(String),
}

impl HeatError {
    pub(crate) fn comm(neighbor: usize, msg: impl Into<String>) -> Self {
        HeatError::CommError {
            neighbor,
            source: msg.into().into(),
        }
    }
}

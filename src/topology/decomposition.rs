//! Row-wise ownership of the global grid.
//!
//! Every rank receives `N / P` consecutive rows (floor division). Rank `r`
//! owns global rows `r * (N / P) ..` and talks to at most two neighbors:
//! `r - 1` above and `r + 1` below. What happens to the `N mod P` leftover
//! rows is governed by [`RemainderPolicy`].

use crate::config::RemainderPolicy;
use crate::heat_error::HeatError;

/// Rows owned by one rank and its position in the linear chain of workers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RankRows {
    pub rank: usize,
    /// Global index of the first owned row.
    pub offset: usize,
    /// Number of authoritative rows (`localRows`).
    pub rows: usize,
    /// Neighbor holding the rows directly above, if any.
    pub up: Option<usize>,
    /// Neighbor holding the rows directly below, if any.
    pub down: Option<usize>,
}

impl RankRows {
    /// Global row range owned by this rank.
    pub fn global_range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.rows
    }

    pub fn is_coordinator(&self) -> bool {
        self.rank == 0
    }
}

/// Fixed partition of an `N × N` grid over `P` ranks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RowDecomposition {
    grid_size: usize,
    workers: usize,
    base_rows: usize,
    policy: RemainderPolicy,
}

impl RowDecomposition {
    /// Compute ownership for `workers` ranks.
    ///
    /// Fails if any rank would end up with zero rows, or if `policy` is
    /// [`RemainderPolicy::Reject`] and `workers` does not divide `grid_size`.
    pub fn new(
        grid_size: usize,
        workers: usize,
        policy: RemainderPolicy,
    ) -> Result<Self, HeatError> {
        if workers == 0 {
            return Err(HeatError::InvalidConfig("worker count must be positive".into()));
        }
        let base_rows = grid_size / workers;
        if base_rows == 0 {
            return Err(HeatError::EmptyPartition {
                rank: workers - 1,
                grid_size,
                workers,
            });
        }
        if policy == RemainderPolicy::Reject && grid_size % workers != 0 {
            return Err(HeatError::NonDividingWorkers { grid_size, workers });
        }
        log::debug!(
            "row decomposition: N={grid_size} P={workers} localRows={base_rows} remainder={} ({policy:?})",
            grid_size % workers
        );
        Ok(Self {
            grid_size,
            workers,
            base_rows,
            policy,
        })
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn policy(&self) -> RemainderPolicy {
        self.policy
    }

    /// `N / P`, the uniform per-rank row count.
    pub fn local_rows(&self) -> usize {
        self.base_rows
    }

    /// `N mod P`.
    pub fn remainder(&self) -> usize {
        self.grid_size % self.workers
    }

    /// Rows that no rank owns; they stay at their initial value.
    pub fn dropped_rows(&self) -> usize {
        match self.policy {
            RemainderPolicy::AssignToLast => 0,
            RemainderPolicy::Truncate | RemainderPolicy::Reject => self.remainder(),
        }
    }

    /// Global row offset of `rank`'s data, `rank * localRows`.
    pub fn row_offset(&self, rank: usize) -> usize {
        rank * self.base_rows
    }

    /// Number of authoritative rows held by `rank`.
    pub fn rows_of(&self, rank: usize) -> usize {
        if rank + 1 == self.workers && self.policy == RemainderPolicy::AssignToLast {
            self.base_rows + self.remainder()
        } else {
            self.base_rows
        }
    }

    pub fn up_neighbor(&self, rank: usize) -> Option<usize> {
        rank.checked_sub(1)
    }

    pub fn down_neighbor(&self, rank: usize) -> Option<usize> {
        (rank + 1 < self.workers).then_some(rank + 1)
    }

    /// Full ownership record for `rank`.
    pub fn rank_rows(&self, rank: usize) -> RankRows {
        debug_assert!(rank < self.workers, "rank {rank} out of range");
        RankRows {
            rank,
            offset: self.row_offset(rank),
            rows: self.rows_of(rank),
            up: self.up_neighbor(rank),
            down: self.down_neighbor(rank),
        }
    }

    /// Ownership records of all ranks, in rank order.
    pub fn iter(&self) -> impl Iterator<Item = RankRows> + '_ {
        (0..self.workers).map(|r| self.rank_rows(r))
    }
}

//! Per-step boundary-row exchange between row neighbors.
//!
//! Each rank walks the same fixed sequence of blocking transfers:
//!
//! ```text
//! AwaitUpSend   --send row 1 to r-1-------------->  AwaitUpRecv
//! AwaitUpRecv   --recv row 0 from r-1------------>  AwaitDownRecv | Done
//! AwaitDownRecv --recv row localRows+1 from r+1-->  AwaitDownSend
//! AwaitDownSend --send row localRows to r+1------>  Done
//! ```
//!
//! States for a missing neighbor are skipped. On every edge `(r, r+1)` the
//! lower rank receives first while the upper rank sends first, so two
//! rendezvous-style blocking transfers can never wait on each other. The
//! order must not be changed.

use crate::algs::communicator::{Communicator, HALO_TAG};
use crate::algs::wire::{recv_f64s_into, send_f64s};
use crate::data::Tile;
use crate::heat_error::HeatError;
use crate::topology::RankRows;

/// Position of one rank inside a single halo exchange.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HaloState {
    AwaitUpSend,
    AwaitUpRecv,
    AwaitDownRecv,
    AwaitDownSend,
    Done,
}

/// One rank's halo exchange for one time step.
#[derive(Clone, Debug)]
pub struct HaloExchange {
    rows: RankRows,
    state: HaloState,
}

impl HaloExchange {
    pub fn new(rows: RankRows) -> Self {
        let state = if rows.up.is_some() {
            HaloState::AwaitUpSend
        } else {
            Self::after_up(&rows)
        };
        Self { rows, state }
    }

    fn after_up(rows: &RankRows) -> HaloState {
        if rows.down.is_some() {
            HaloState::AwaitDownRecv
        } else {
            HaloState::Done
        }
    }

    pub fn state(&self) -> HaloState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == HaloState::Done
    }

    /// Perform the transfer owed in the current state, then move on.
    pub fn advance<C: Communicator>(
        &mut self,
        tile: &mut Tile,
        comm: &C,
    ) -> Result<HaloState, HeatError> {
        let r = self.rows.rank;
        self.state = match (self.state, self.rows.up, self.rows.down) {
            (HaloState::AwaitUpSend, Some(up), _) => {
                log::trace!("[rank {r}] halo: send row 1 -> {up}");
                send_f64s(comm, up, HALO_TAG, tile.first_owned())?;
                HaloState::AwaitUpRecv
            }
            (HaloState::AwaitUpRecv, Some(up), _) => {
                log::trace!("[rank {r}] halo: recv row 0 <- {up}");
                recv_f64s_into(comm, up, HALO_TAG, tile.row_mut(0))?;
                Self::after_up(&self.rows)
            }
            (HaloState::AwaitDownRecv, _, Some(down)) => {
                let idx = tile.bottom_halo_index();
                log::trace!("[rank {r}] halo: recv row {idx} <- {down}");
                recv_f64s_into(comm, down, HALO_TAG, tile.row_mut(idx))?;
                HaloState::AwaitDownSend
            }
            (HaloState::AwaitDownSend, _, Some(down)) => {
                log::trace!("[rank {r}] halo: send row {} -> {down}", tile.local_rows());
                send_f64s(comm, down, HALO_TAG, tile.last_owned())?;
                HaloState::Done
            }
            (HaloState::Done, _, _) => HaloState::Done,
            (state, _, _) => {
                return Err(HeatError::InvalidConfig(format!(
                    "halo state {state:?} without the matching neighbor on rank {r}"
                )));
            }
        };
        Ok(self.state)
    }

    /// Drive the exchange to completion.
    pub fn run<C: Communicator>(mut self, tile: &mut Tile, comm: &C) -> Result<(), HeatError> {
        while !self.is_done() {
            self.advance(tile, comm)?;
        }
        Ok(())
    }
}

/// Refresh both halo rows of `tile` from its neighbors.
pub fn exchange_halos<C: Communicator>(
    rows: &RankRows,
    tile: &mut Tile,
    comm: &C,
) -> Result<(), HeatError> {
    HaloExchange::new(*rows).run(tile, comm)
}

//! Thin façade over intra-process (thread) or inter-process (MPI) message passing.
//!
//! Messages are *contiguous byte slices* addressed by `(peer rank, tag)`.
//! Delivery between one ordered pair of ranks on one tag is FIFO.
//! Handles are **waitable**: a receive is only complete after `.wait()`
//! returns its payload. Callers that need blocking semantics wait on the
//! handle immediately (see [`crate::algs::wire::send_f64s`]).

use bytes::Bytes;
use hashbrown::HashMap;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;

/// Point-to-point communication interface (minimal by design).
pub trait Communicator {
    /// Handle returned by `isend`.
    type SendHandle: Wait;
    /// Handle returned by `irecv`.
    type RecvHandle: Wait;

    /// This process's 0-based identity.
    fn rank(&self) -> usize;
    /// Number of ranks in the collective, fixed for the run.
    fn size(&self) -> usize;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle;
    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle;
}

/// Anything that can be waited on.
pub trait Wait {
    /// Wait for completion and return the received data (if any).
    fn wait(self) -> Option<Vec<u8>>;
}

/// Typed message tag, one per logical channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CommTag(pub u16);

impl CommTag {
    pub const fn new(tag: u16) -> Self {
        Self(tag)
    }

    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

/// Boundary-row traffic between row neighbors.
pub const HALO_TAG: CommTag = CommTag(0x0100);
/// Owned-row blocks flowing to the coordinator.
pub const GATHER_TAG: CommTag = CommTag(0x0200);

/// Single-rank communicator. Nothing is ever delivered.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Wait for () {
    fn wait(self) -> Option<Vec<u8>> {
        None
    }
}

impl Communicator for NoComm {
    type SendHandle = ();
    type RecvHandle = ();

    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn isend(&self, _peer: usize, _tag: u16, _buf: &[u8]) {}
    fn irecv(&self, _peer: usize, _tag: u16, _buf: &mut [u8]) {}
}

// --- LocalComm: intra-process / one thread per rank ---
type Key = (usize, usize, u16); // (src, dst, tag)

#[derive(Debug)]
struct MailboxState {
    queues: HashMap<Key, VecDeque<Bytes>>,
    alive: Vec<bool>,
}

#[derive(Debug)]
struct Mailbox {
    state: Mutex<MailboxState>,
    ready: Condvar,
}

/// One rank of an in-process collective created by [`LocalComm::world`].
///
/// Sends are buffered and never block. A receive blocks until the matching
/// message arrives, or returns `None` once the sending rank's communicator
/// has been dropped with nothing left in flight.
#[derive(Debug)]
pub struct LocalComm {
    rank: usize,
    size: usize,
    mailbox: Arc<Mailbox>,
}

impl LocalComm {
    /// Create `size` connected communicators, index `r` being rank `r`.
    pub fn world(size: usize) -> Vec<LocalComm> {
        let mailbox = Arc::new(Mailbox {
            state: Mutex::new(MailboxState {
                queues: HashMap::new(),
                alive: vec![true; size],
            }),
            ready: Condvar::new(),
        });
        (0..size)
            .map(|rank| LocalComm {
                rank,
                size,
                mailbox: Arc::clone(&mailbox),
            })
            .collect()
    }
}

impl Drop for LocalComm {
    fn drop(&mut self) {
        let mut state = self.mailbox.state.lock();
        state.alive[self.rank] = false;
        drop(state);
        self.mailbox.ready.notify_all();
    }
}

pub struct LocalHandle {
    mailbox: Arc<Mailbox>,
    key: Key,
}

impl Wait for LocalHandle {
    fn wait(self) -> Option<Vec<u8>> {
        let (src, _, _) = self.key;
        let mut state = self.mailbox.state.lock();
        loop {
            if let Some(bytes) = state.queues.get_mut(&self.key).and_then(VecDeque::pop_front) {
                return Some(bytes.to_vec());
            }
            if !state.alive[src] {
                return None;
            }
            self.mailbox.ready.wait(&mut state);
        }
    }
}

impl Communicator for LocalComm {
    type SendHandle = ();
    type RecvHandle = LocalHandle;

    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle {
        let key = (self.rank, peer, tag);
        let data = Bytes::copy_from_slice(buf);
        self.mailbox
            .state
            .lock()
            .queues
            .entry(key)
            .or_default()
            .push_back(data);
        self.mailbox.ready.notify_all();
    }

    fn irecv(&self, peer: usize, tag: u16, _buf: &mut [u8]) -> Self::RecvHandle {
        LocalHandle {
            mailbox: Arc::clone(&self.mailbox),
            key: (peer, self.rank, tag),
        }
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::{Communicator, Wait};
    use crate::heat_error::HeatError;
    use mpi::environment::Universe;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::{Communicator as _, Destination, Source};

    /// World communicator of an `mpirun` launch.
    ///
    /// Transfers are blocking: `isend`/`irecv` complete before returning and
    /// the handle only carries the result.
    pub struct MpiComm {
        pub world: SimpleCommunicator,
        rank: usize,
        size: usize,
        _universe: Universe,
    }

    impl MpiComm {
        /// Initialize MPI; fails if it was already initialized.
        pub fn new() -> Result<Self, HeatError> {
            let universe = mpi::initialize()
                .ok_or_else(|| HeatError::InvalidConfig("MPI already initialized".into()))?;
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Ok(Self {
                world,
                rank,
                size,
                _universe: universe,
            })
        }
    }

    pub struct MpiHandle(Option<Vec<u8>>);

    impl Wait for MpiHandle {
        fn wait(self) -> Option<Vec<u8>> {
            self.0
        }
    }

    impl Communicator for MpiComm {
        type SendHandle = MpiHandle;
        type RecvHandle = MpiHandle;

        fn rank(&self) -> usize {
            self.rank
        }

        fn size(&self) -> usize {
            self.size
        }

        fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> MpiHandle {
            self.world
                .process_at_rank(peer as i32)
                .send_with_tag(buf, tag as i32);
            MpiHandle(None)
        }

        fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> MpiHandle {
            self.world
                .process_at_rank(peer as i32)
                .receive_into_with_tag(&mut buf[..], tag as i32);
            MpiHandle(Some(buf.to_vec()))
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;

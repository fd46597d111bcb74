//! Re-export public algorithms.

pub mod communicator;
pub mod gather;
pub mod halo;
pub mod stencil;
pub mod wire;

pub use gather::gather_to_coordinator;
pub use halo::{HaloExchange, HaloState, exchange_halos};

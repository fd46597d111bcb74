//! Row payloads on the wire.
//!
//! Rows travel as the raw bytes of contiguous `f64` runs in native byte
//! order; every rank of one collective shares the same architecture. The
//! receive side copies into the destination's own bytes rather than casting
//! the incoming buffer, so no alignment is assumed for it.

use crate::algs::communicator::{CommTag, Communicator, Wait};
use crate::heat_error::HeatError;
use bytemuck::Pod;
use static_assertions::assert_eq_size;

assert_eq_size!(f64, [u8; 8]);

pub fn cast_slice<T: Pod>(v: &[T]) -> &[u8] {
    bytemuck::cast_slice(v)
}

pub fn cast_slice_mut<T: Pod>(v: &mut [T]) -> &mut [u8] {
    bytemuck::cast_slice_mut(v)
}

pub fn expect_exact_len(actual: usize, expected: usize) -> Result<(), String> {
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected {expected} bytes, got {actual}"))
    }
}

/// `peer` must be another rank of the same collective.
fn check_peer<C: Communicator>(comm: &C, peer: usize) -> Result<(), HeatError> {
    if peer >= comm.size() || peer == comm.rank() {
        return Err(HeatError::comm(
            peer,
            format!(
                "rank {} of {} has no peer {peer}",
                comm.rank(),
                comm.size()
            ),
        ));
    }
    Ok(())
}

/// Blocking send of `values` to `peer`.
pub fn send_f64s<C: Communicator>(
    comm: &C,
    peer: usize,
    tag: CommTag,
    values: &[f64],
) -> Result<(), HeatError> {
    check_peer(comm, peer)?;
    let _ = comm.isend(peer, tag.as_u16(), cast_slice(values)).wait();
    Ok(())
}

/// Blocking receive of exactly `out.len()` values from `peer` into `out`.
pub fn recv_f64s_into<C: Communicator>(
    comm: &C,
    peer: usize,
    tag: CommTag,
    out: &mut [f64],
) -> Result<(), HeatError> {
    check_peer(comm, peer)?;
    let bytes = cast_slice_mut(out);
    let raw = comm
        .irecv(peer, tag.as_u16(), bytes)
        .wait()
        .ok_or_else(|| HeatError::comm(peer, format!("no message from rank {peer}")))?;
    expect_exact_len(raw.len(), bytes.len()).map_err(|e| HeatError::comm(peer, e))?;
    bytes.copy_from_slice(&raw);
    Ok(())
}

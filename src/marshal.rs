//! Flat-buffer allocation discipline for the bulk get path.
//!
//! A kernel bulk get always fills several parallel buffers: the data buffer
//! the caller asked for, plus the per-entity side channels the kernel API
//! requires (reference tags, corner/required/ridge flags) even though only
//! the data buffer crosses the boundary. This module implements the
//! "allocate N, use 1, discard N−1, roll back all on any failure" pattern
//! once, generically over buffer count and element type:
//!
//! - every buffer is allocated fallibly through [`try_buffer`] /
//!   [`try_buffers`]; a failed allocation surfaces
//!   [`BridgeError::AllocationFailed`] and the buffers allocated earlier in
//!   the same call are dropped on the early return out of the `?` — never a
//!   partially populated result, never a leak;
//! - after the kernel call, side buffers drop and the data buffer is promoted
//!   into a [`BulkData`], whose ownership moves to the caller;
//! - on kernel failure the data buffer drops too, so a failed get leaves no
//!   buffer owned by neither side.

use crate::error::BridgeError;
use crate::kernel::KernelIndex;
use crate::variant::SideChannel;
use bytemuck::Zeroable;

/// One bulk-get result: a freshly allocated flat buffer and the entity count
/// it covers. `values.len()` is `count × stride` for the entity kind queried.
///
/// Ownership transfers to the caller on return; the bridge retains no
/// reference, so release is simply dropping the carrier (the `capi` layer
/// re-exposes this as an explicit `free_array` on a registered pointer).
#[derive(Clone, Debug, PartialEq)]
pub struct BulkData<T> {
    pub values: Vec<T>,
    pub count: KernelIndex,
}

/// Allocate one zero-initialized flat buffer of `len` elements, fallibly.
pub fn try_buffer<T: Zeroable + Clone>(len: usize) -> Result<Vec<T>, BridgeError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| BridgeError::AllocationFailed { elements: len })?;
    buffer.resize(len, T::zeroed());
    Ok(buffer)
}

/// Allocate a group of flat buffers, all-or-nothing: on any failure the
/// buffers already allocated are released before the error is returned.
pub fn try_buffers<T: Zeroable + Clone>(lens: &[usize]) -> Result<Vec<Vec<T>>, BridgeError> {
    let mut group = Vec::new();
    group
        .try_reserve_exact(lens.len())
        .map_err(|_| BridgeError::AllocationFailed { elements: lens.len() })?;
    for &len in lens {
        group.push(try_buffer(len)?);
    }
    Ok(group)
}

/// Allocate one side buffer per declared channel, `count` entries each.
/// The kernel fills them in declaration order; the bridge discards them.
pub fn try_side_buffers(
    channels: &[SideChannel],
    count: usize,
) -> Result<Vec<Vec<KernelIndex>>, BridgeError> {
    log::trace!("allocating {} side buffers of {count} entries", channels.len());
    try_buffers(&vec![count; channels.len()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::PLANAR;

    #[test]
    fn buffers_come_back_zeroed_at_the_requested_length() {
        let buf = try_buffer::<f64>(6).unwrap();
        assert_eq!(buf, vec![0.0; 6]);
        let empty = try_buffer::<KernelIndex>(0).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn side_buffer_group_matches_channel_declaration() {
        let sides = try_side_buffers(PLANAR.vertex_side_channels, 5).unwrap();
        assert_eq!(sides.len(), 3);
        assert!(sides.iter().all(|s| s.len() == 5));
    }

    #[test]
    fn oversized_request_fails_cleanly() {
        // Larger than any allocator will grant, small enough not to overflow
        // the length computation.
        let request = isize::MAX as usize / 16;
        match try_buffer::<f64>(request) {
            Err(BridgeError::AllocationFailed { elements }) => assert_eq!(elements, request),
            Ok(_) => panic!("absurd allocation unexpectedly succeeded"),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
        // Group allocation rolls back: the failing request poisons nothing.
        assert!(try_buffers::<f64>(&[4, request, 4]).is_err());
        assert_eq!(try_buffers::<f64>(&[4, 4]).unwrap().len(), 2);
    }
}

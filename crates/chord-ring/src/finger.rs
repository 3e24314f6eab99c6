//! Finger table construction.

use chord_types::{FingerEntry, FingerTable, NodeId};

use crate::error::RingError;
use crate::ring::RingState;

/// Compute the finger table of member `node`.
///
/// Row `k` (for `k` in `0..M`) targets `start = node + 2^k` and records the
/// first member found scanning clockwise from `start`. Rows are emitted in
/// increasing order of offset.
pub fn build_finger_table(ring: &RingState, node: NodeId) -> Result<FingerTable, RingError> {
    if ring.is_empty() {
        return Err(RingError::EmptyRing);
    }
    let node = ring.space().check(node)?;
    if !ring.contains(node) {
        return Err(RingError::NotFound(node));
    }
    Ok(finger_rows(ring, node))
}

/// Finger rows for a node known to be a member.
pub(crate) fn finger_rows(ring: &RingState, node: NodeId) -> FingerTable {
    let space = ring.space();
    let size = i64::from(space.size());
    let base = i64::from(node.get());

    let entries = (0..space.bits())
        .map(|k| {
            let offset = 1i64 << k;
            let start = space.wrap(base + offset);
            // Linear forward scan; falls back to a self-loop if nothing else
            // is found within one full turn.
            let successor = (0..size)
                .map(|j| space.wrap(base + offset + j))
                .find(|candidate| ring.contains(*candidate))
                .unwrap_or(node);
            FingerEntry { start, successor }
        })
        .collect();

    FingerTable::new(entries)
}

//! Key ownership assignment.

use chord_types::{KeySet, NodeId};

use crate::error::RingError;
use crate::ring::RingState;

/// Compute the identifiers member `node` is responsible for.
///
/// A lone member owns the whole space. Otherwise `node` owns the clockwise
/// arc `(predecessor, node]`; for the smallest member that arc wraps through
/// `0`, giving the tail `predecessor+1 ..= N-1` followed by the head
/// `0 ..= node`.
pub fn assign_keys(ring: &RingState, node: NodeId) -> Result<KeySet, RingError> {
    if ring.is_empty() {
        return Err(RingError::EmptyRing);
    }
    let node = ring.space().check(node)?;
    if !ring.contains(node) {
        return Err(RingError::NotFound(node));
    }
    key_arc(ring, node)
}

/// Key arc for a node known to be a member.
pub(crate) fn key_arc(ring: &RingState, node: NodeId) -> Result<KeySet, RingError> {
    let space = ring.space();

    if ring.len() == 1 {
        return Ok(KeySet::new((0..space.size()).map(NodeId::new).collect()));
    }

    let predecessor = ring.predecessor_of(node)?;
    let span = space.distance(predecessor, node);
    let base = i64::from(predecessor.get());
    let keys = (1..=i64::from(span))
        .map(|step| space.wrap(base + step))
        .collect();

    Ok(KeySet::new(keys))
}

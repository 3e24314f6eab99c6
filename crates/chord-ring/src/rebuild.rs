//! Derived routing state for a whole ring.

use std::collections::BTreeMap;

use chord_types::{FingerTable, KeyMigration, KeySet, NodeId};
use tracing::debug;

use crate::error::RingError;
use crate::finger::finger_rows;
use crate::keys::key_arc;
use crate::ring::RingState;

/// Finger tables and key sets of every member of one [`RingState`].
///
/// Always produced whole by [`rebuild`]; there is no way to update a single
/// member's entry, so a `Topology` is never partially stale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    fingers: BTreeMap<NodeId, FingerTable>,
    keys: BTreeMap<NodeId, KeySet>,
}

/// Recompute the finger table and key set of every member.
///
/// An empty ring yields an empty topology.
pub fn rebuild(ring: &RingState) -> Result<Topology, RingError> {
    let mut topology = Topology::default();
    for node in ring.iter() {
        topology.fingers.insert(node, finger_rows(ring, node));
        topology.keys.insert(node, key_arc(ring, node)?);
    }
    debug!(
        bits = ring.space().bits(),
        members = ring.len(),
        "rebuilt routing state"
    );
    Ok(topology)
}

impl Topology {
    /// Finger table of `node`, if it is a member.
    pub fn finger_table(&self, node: NodeId) -> Option<&FingerTable> {
        self.fingers.get(&node)
    }

    /// Key set of `node`, if it is a member.
    pub fn key_set(&self, node: NodeId) -> Option<&KeySet> {
        self.keys.get(&node)
    }

    /// All finger tables, keyed by member.
    pub fn finger_tables(&self) -> &BTreeMap<NodeId, FingerTable> {
        &self.fingers
    }

    /// All key sets, keyed by member.
    pub fn key_sets(&self) -> &BTreeMap<NodeId, KeySet> {
        &self.keys
    }

    /// The member owning `key`.
    pub fn owner_of(&self, key: NodeId) -> Option<NodeId> {
        self.keys
            .iter()
            .find(|(_, set)| set.contains(key))
            .map(|(node, _)| *node)
    }

    /// Number of members covered.
    pub fn len(&self) -> usize {
        self.fingers.len()
    }

    /// Whether no member is covered.
    pub fn is_empty(&self) -> bool {
        self.fingers.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn replace_finger_table(&mut self, node: NodeId, table: FingerTable) {
        self.fingers.insert(node, table);
    }

    /// Identifiers whose owner differs between `old` and `new`.
    ///
    /// Keys that have no owner on one side (an empty ring) produce no
    /// migration. Results are in ascending key order.
    pub fn diff(old: &Topology, new: &Topology) -> Vec<KeyMigration> {
        let old_owners = owner_map(old);
        let new_owners = owner_map(new);

        new_owners
            .iter()
            .filter_map(|(key, to)| match old_owners.get(key) {
                Some(from) if from != to => Some(KeyMigration {
                    key: *key,
                    from: *from,
                    to: *to,
                }),
                _ => None,
            })
            .collect()
    }
}

fn owner_map(topology: &Topology) -> BTreeMap<NodeId, NodeId> {
    topology
        .keys
        .iter()
        .flat_map(|(node, set)| set.iter().map(move |key| (*key, *node)))
        .collect()
}

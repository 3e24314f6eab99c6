//! Shared types for the Chord simulator.
//!
//! This crate defines the value types passed between the ring core, the
//! simulation session and whatever visualizes it: identifiers ([`NodeId`]),
//! routing state ([`FingerEntry`], [`FingerTable`], [`KeySet`], [`Route`]),
//! change records ([`KeyMigration`], [`RingEvent`]) and the read-only
//! [`RingSnapshot`] handed to the presentation layer.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// A position on the identifier ring, `[0, 2^M)`.
///
/// Used both for node identifiers and for keys; in Chord the two share a
/// single identifier space.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Wrap a raw ring position.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Return the raw ring position.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<NodeId> for u32 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Routing state
// ---------------------------------------------------------------------------

/// One row of a finger table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerEntry {
    /// Identifier this row was searched for: `node + 2^k (mod N)`.
    pub start: NodeId,
    /// Ring member responsible for `start`.
    pub successor: NodeId,
}

/// A node's finger table: one row per power-of-two offset, in increasing
/// order of offset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FingerTable {
    entries: Vec<FingerEntry>,
}

impl FingerTable {
    /// Build a table from rows already ordered by increasing offset.
    pub fn new(entries: Vec<FingerEntry>) -> Self {
        Self { entries }
    }

    /// Number of rows (equal to M for a well-formed table).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Row `k`, if present.
    pub fn get(&self, k: usize) -> Option<&FingerEntry> {
        self.entries.get(k)
    }

    /// All rows in offset order.
    pub fn entries(&self) -> &[FingerEntry] {
        &self.entries
    }

    /// Iterate rows in offset order.
    pub fn iter(&self) -> std::slice::Iter<'_, FingerEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a FingerTable {
    type Item = &'a FingerEntry;
    type IntoIter = std::slice::Iter<'a, FingerEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// The identifiers a node is responsible for.
///
/// Keys are stored in clockwise order starting just after the node's
/// predecessor, so a wrapping arc lists its tail segment before its head.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeySet {
    keys: Vec<NodeId>,
}

impl KeySet {
    /// Build a key set from identifiers in clockwise order.
    pub fn new(keys: Vec<NodeId>) -> Self {
        Self { keys }
    }

    /// Whether `key` is owned.
    pub fn contains(&self, key: NodeId) -> bool {
        self.keys.contains(&key)
    }

    /// Number of owned identifiers.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing is owned.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Owned identifiers in clockwise order.
    pub fn keys(&self) -> &[NodeId] {
        &self.keys
    }

    /// Iterate owned identifiers in clockwise order.
    pub fn iter(&self) -> std::slice::Iter<'_, NodeId> {
        self.keys.iter()
    }
}

impl<'a> IntoIterator for &'a KeySet {
    type Item = &'a NodeId;
    type IntoIter = std::slice::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

/// The hop path a lookup took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Node the query entered the ring at.
    pub start: NodeId,
    /// Identifier being looked up.
    pub target: NodeId,
    /// Visited nodes, beginning with `start`.
    pub hops: Vec<NodeId>,
    /// Whether the last hop owns `target`.
    ///
    /// `false` means the trace is partial: the hop bound was reached or no
    /// finger row covered the target.
    pub resolved: bool,
}

impl Route {
    /// Number of forwarding steps taken (`hops.len() - 1`).
    pub fn hop_count(&self) -> usize {
        self.hops.len().saturating_sub(1)
    }

    /// The node that owns `target`, when the route resolved.
    pub fn owner(&self) -> Option<NodeId> {
        if self.resolved {
            self.hops.last().copied()
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Change records
// ---------------------------------------------------------------------------

/// An identifier whose owner changed between two ring states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMigration {
    /// The identifier that moves.
    pub key: NodeId,
    /// Owner before the change.
    pub from: NodeId,
    /// Owner after the change.
    pub to: NodeId,
}

/// Membership changes applied to a simulation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RingEvent {
    /// A node joined the ring.
    NodeJoined(NodeId),
    /// A node left the ring.
    NodeLeft(NodeId),
    /// M changed; the ring was cleared.
    ParameterChanged {
        /// Previous M.
        from: u8,
        /// New M.
        to: u8,
    },
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Routing state of a single member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeView {
    /// The member.
    pub id: NodeId,
    /// Its finger table.
    pub fingers: FingerTable,
    /// The identifiers it owns.
    pub keys: KeySet,
}

/// Read-only view of one simulation step, consumed by the visualization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingSnapshot {
    /// Ring parameter M.
    pub bits: u8,
    /// `2^M`.
    pub space_size: u32,
    /// Members in ascending identifier order.
    pub members: Vec<NodeId>,
    /// Per-member routing state, in the same order as `members`.
    pub nodes: Vec<NodeView>,
    /// Result of the most recent lookup, if any.
    pub last_route: Option<Route>,
}

impl RingSnapshot {
    /// Routing state for `id`, if it is a member.
    pub fn node(&self, id: NodeId) -> Option<&NodeView> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

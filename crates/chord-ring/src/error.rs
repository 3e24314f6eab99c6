//! Error types for ring operations.

use chord_types::NodeId;

/// Errors produced by ring membership, routing-table and lookup operations.
///
/// Every variant is recoverable: a failed operation leaves the ring exactly
/// as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// M outside the supported range, or an identifier outside `[0, 2^M)`.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Every identifier slot is already occupied.
    #[error("ring is full: all {capacity} identifiers are occupied")]
    RingFull {
        /// Number of slots in the identifier space.
        capacity: u32,
    },

    /// An explicit identifier is already a member.
    #[error("node {0} is already a member of the ring")]
    DuplicateId(NodeId),

    /// The referenced node is not a member.
    #[error("node {0} is not a member of the ring")]
    NotFound(NodeId),

    /// The operation needs at least one member.
    #[error("ring has no members")]
    EmptyRing,
}

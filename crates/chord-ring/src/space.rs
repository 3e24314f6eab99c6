//! Identifier-space arithmetic over `[0, 2^M)`.

use chord_types::NodeId;

use crate::error::RingError;

/// Smallest supported ring parameter M.
pub const MIN_BITS: u8 = 2;

/// Largest supported ring parameter M.
///
/// Finger tables and key sets are built by linear scans over the whole
/// space, so `2^M` has to stay small enough to enumerate.
pub const MAX_BITS: u8 = 16;

/// The modular identifier space of a ring with parameter M.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentifierSpace {
    bits: u8,
}

impl IdentifierSpace {
    /// Create the space `[0, 2^bits)`.
    ///
    /// Fails with [`RingError::InvalidParameter`] unless
    /// `MIN_BITS <= bits <= MAX_BITS`.
    pub fn new(bits: u8) -> Result<Self, RingError> {
        if !(MIN_BITS..=MAX_BITS).contains(&bits) {
            return Err(RingError::InvalidParameter(format!(
                "ring parameter M={bits} outside supported range {MIN_BITS}..={MAX_BITS}"
            )));
        }
        Ok(Self { bits })
    }

    /// The ring parameter M.
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Number of identifiers, `N = 2^M`.
    pub fn size(&self) -> u32 {
        1u32 << self.bits
    }

    /// Reduce any integer into `[0, N)`, including negative inputs.
    pub fn wrap(&self, x: i64) -> NodeId {
        let n = i64::from(self.size());
        NodeId::new((((x % n) + n) % n) as u32)
    }

    /// Whether `id` lies inside the space.
    pub fn contains(&self, id: NodeId) -> bool {
        id.get() < self.size()
    }

    /// Return `id` unchanged if it lies inside the space.
    pub fn check(&self, id: NodeId) -> Result<NodeId, RingError> {
        if self.contains(id) {
            Ok(id)
        } else {
            Err(RingError::InvalidParameter(format!(
                "identifier {id} outside [0, {})",
                self.size()
            )))
        }
    }

    /// Whether `x` lies on the clockwise half-open arc `[left, right)`.
    ///
    /// The arc may wrap past `N - 1` back to `0` (`left > right`). When
    /// `left == right` the arc is empty and nothing matches.
    pub fn within_range(&self, left: NodeId, x: NodeId, right: NodeId) -> bool {
        let (l, x, r) = (left.get(), x.get(), right.get());
        if l < r {
            l <= x && x < r
        } else if l > r {
            x >= l || x < r
        } else {
            false
        }
    }

    /// Clockwise distance from `from` to `to`, in `[0, N)`.
    pub fn distance(&self, from: NodeId, to: NodeId) -> u32 {
        self.wrap(i64::from(to.get()) - i64::from(from.get())).get()
    }

    /// Map an arbitrary key name onto the ring.
    ///
    /// Uses the first 8 bytes of `blake3(key)` as a little-endian u64,
    /// reduced modulo N.
    pub fn hash_key(&self, key: &[u8]) -> NodeId {
        let hash = blake3::hash(key);
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        let pos = u64::from_le_bytes(bytes) % u64::from(self.size());
        NodeId::new(pos as u32)
    }
}

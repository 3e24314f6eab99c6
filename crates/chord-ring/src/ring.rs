//! Ring membership.

use std::collections::BTreeSet;

use chord_types::NodeId;
use rand::Rng;
use tracing::debug;

use crate::error::RingError;
use crate::space::IdentifierSpace;

/// Random draws attempted before falling back to picking among free slots.
const RANDOM_ID_ATTEMPTS: usize = 64;

/// The set of active node identifiers in one identifier space.
///
/// `RingState` is a plain value: mutating it does not touch any finger
/// table or key set. Derived routing state is produced by
/// [`rebuild`](crate::rebuild()) after every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingState {
    space: IdentifierSpace,
    members: BTreeSet<NodeId>,
}

impl RingState {
    /// Create an empty ring over `space`.
    pub fn new(space: IdentifierSpace) -> Self {
        Self {
            space,
            members: BTreeSet::new(),
        }
    }

    /// Create a ring over `space` with the given members.
    pub fn with_members(
        space: IdentifierSpace,
        members: impl IntoIterator<Item = NodeId>,
    ) -> Result<Self, RingError> {
        let mut ring = Self::new(space);
        for id in members {
            ring.insert(id)?;
        }
        Ok(ring)
    }

    /// The identifier space this ring lives in.
    pub fn space(&self) -> IdentifierSpace {
        self.space
    }

    /// Add a node.
    ///
    /// With `Some(id)` the identifier is used as given; it must lie inside
    /// the space and not already be a member. With `None` a free identifier
    /// is chosen uniformly at random.
    pub fn add_node<R: Rng + ?Sized>(
        &mut self,
        id: Option<NodeId>,
        rng: &mut R,
    ) -> Result<NodeId, RingError> {
        let id = match id {
            Some(id) => id,
            None => self.pick_free_id(rng)?,
        };
        self.insert(id)?;
        debug!(%id, members = self.members.len(), "added node to ring");
        Ok(id)
    }

    /// Remove a member.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), RingError> {
        if !self.members.remove(&id) {
            return Err(RingError::NotFound(id));
        }
        debug!(%id, members = self.members.len(), "removed node from ring");
        Ok(())
    }

    /// Whether `id` is a member.
    pub fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    /// Members in ascending order.
    pub fn members(&self) -> Vec<NodeId> {
        self.members.iter().copied().collect()
    }

    /// Iterate members in ascending order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.members.iter().copied()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the ring has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether every identifier slot is occupied.
    pub fn is_full(&self) -> bool {
        self.members.len() as u64 >= u64::from(self.space.size())
    }

    /// First member at or after `id`, walking clockwise.
    pub fn successor_of(&self, id: NodeId) -> Result<NodeId, RingError> {
        let id = self.space.check(id)?;
        self.members
            .range(id..)
            .chain(self.members.iter())
            .next()
            .copied()
            .ok_or(RingError::EmptyRing)
    }

    /// Member immediately before `id` in sorted order, wrapping to the
    /// largest member.
    pub fn predecessor_of(&self, id: NodeId) -> Result<NodeId, RingError> {
        let id = self.space.check(id)?;
        self.members
            .range(..id)
            .next_back()
            .or_else(|| self.members.iter().next_back())
            .copied()
            .ok_or(RingError::EmptyRing)
    }

    fn insert(&mut self, id: NodeId) -> Result<(), RingError> {
        let id = self.space.check(id)?;
        if self.is_full() {
            return Err(RingError::RingFull {
                capacity: self.space.size(),
            });
        }
        if !self.members.insert(id) {
            return Err(RingError::DuplicateId(id));
        }
        Ok(())
    }

    /// Rejection-sample a free identifier.
    ///
    /// After `RANDOM_ID_ATTEMPTS` collisions the ring is dense, so pick
    /// uniformly among the remaining free slots instead. Fails with
    /// [`RingError::RingFull`] only when no slot is free.
    fn pick_free_id<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<NodeId, RingError> {
        let size = self.space.size();
        if self.is_full() {
            return Err(RingError::RingFull { capacity: size });
        }

        for _ in 0..RANDOM_ID_ATTEMPTS {
            let candidate = NodeId::new(rng.random_range(0..size));
            if !self.members.contains(&candidate) {
                return Ok(candidate);
            }
        }

        let free = size - self.members.len() as u32;
        let nth = rng.random_range(0..free) as usize;
        (0..size)
            .map(NodeId::new)
            .filter(|id| !self.members.contains(id))
            .nth(nth)
            .ok_or(RingError::RingFull { capacity: size })
    }
}

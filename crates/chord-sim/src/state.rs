//! The simulation session: one ring and its derived routing state.
//!
//! [`Simulation`] is the single writer of a [`RingState`]. Every mutation
//! builds the next ring on the side, rebuilds its [`Topology`] and only then
//! swaps both in, so finger tables and key sets are never observed out of
//! step with membership. A failed mutation leaves the session untouched.

use std::collections::VecDeque;

use chord_ring::{IdentifierSpace, RingError, RingState, Topology, rebuild};
use chord_types::{
    FingerTable, KeyMigration, KeySet, NodeId, NodeView, RingEvent, RingSnapshot, Route,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::SimConfig;
use crate::error::SimError;

/// Number of membership events retained by [`Simulation::events`].
const EVENT_HISTORY: usize = 256;

/// The most recent lookup parameters, replayed after every mutation.
#[derive(Debug, Clone, Copy)]
struct Query {
    target: NodeId,
    start: NodeId,
}

/// A single-process Chord simulation session.
pub struct Simulation {
    /// Largest M accepted by [`Simulation::set_bits`].
    max_bits: u8,
    /// Current membership.
    ring: RingState,
    /// Finger tables and key sets derived from `ring`.
    topology: Topology,
    /// Source for random identifier and removal choices.
    rng: StdRng,
    /// Parameters of the last lookup.
    query: Option<Query>,
    /// Route for `query` against the current topology.
    last_route: Option<Route>,
    /// Keys that changed owner in the last membership change.
    last_migrations: Vec<KeyMigration>,
    /// Recent membership events, oldest first.
    events: VecDeque<RingEvent>,
}

impl Simulation {
    /// Start a session with an empty ring.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let space = IdentifierSpace::new(config.bits)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        info!(bits = config.bits, max_bits = config.max_bits, "simulation started");

        Ok(Self {
            max_bits: config.max_bits,
            ring: RingState::new(space),
            topology: Topology::default(),
            rng,
            query: None,
            last_route: None,
            last_migrations: Vec::new(),
            events: VecDeque::new(),
        })
    }

    /// The current ring parameter M.
    pub fn bits(&self) -> u8 {
        self.ring.space().bits()
    }

    /// The current identifier space.
    pub fn space(&self) -> IdentifierSpace {
        self.ring.space()
    }

    /// Current membership.
    pub fn ring(&self) -> &RingState {
        &self.ring
    }

    /// Routing state derived from the current membership.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Members in ascending order.
    pub fn members(&self) -> Vec<NodeId> {
        self.ring.members()
    }

    /// Add a node, with the given identifier or a random free one.
    pub fn add_node(&mut self, id: Option<NodeId>) -> Result<NodeId, SimError> {
        let mut next = self.ring.clone();
        let id = next.add_node(id, &mut self.rng)?;
        self.commit(next, RingEvent::NodeJoined(id))?;
        info!(%id, members = self.ring.len(), "node joined");
        Ok(id)
    }

    /// Remove the member `id`.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), SimError> {
        let mut next = self.ring.clone();
        next.remove_node(id)?;
        self.commit(next, RingEvent::NodeLeft(id))?;
        info!(%id, members = self.ring.len(), "node left");
        Ok(())
    }

    /// Remove a member chosen uniformly at random.
    pub fn remove_random_node(&mut self) -> Result<NodeId, SimError> {
        if self.ring.is_empty() {
            return Err(RingError::EmptyRing.into());
        }
        let index = self.rng.random_range(0..self.ring.len());
        let id = self
            .ring
            .iter()
            .nth(index)
            .ok_or(RingError::EmptyRing)?;
        self.remove_node(id)?;
        Ok(id)
    }

    /// Change M. The ring is cleared since identifiers from the old space
    /// are not comparable with the new one.
    pub fn set_bits(&mut self, bits: u8) -> Result<(), SimError> {
        if bits > self.max_bits {
            return Err(RingError::InvalidParameter(format!(
                "ring parameter M={bits} exceeds session maximum {}",
                self.max_bits
            ))
            .into());
        }
        let space = IdentifierSpace::new(bits)?;
        let from = self.bits();

        self.ring = RingState::new(space);
        self.topology = Topology::default();
        self.query = None;
        self.last_route = None;
        self.last_migrations.clear();
        self.record(RingEvent::ParameterChanged { from, to: bits });

        info!(from, to = bits, "ring parameter changed; ring cleared");
        Ok(())
    }

    /// Route a query for `target` entering the ring at `start`.
    ///
    /// The result is kept as the session's last route and recomputed after
    /// every later membership change.
    pub fn lookup(&mut self, target: NodeId, start: NodeId) -> Result<Route, SimError> {
        let route = chord_ring::lookup(&self.ring, &self.topology, target, start)?;
        debug!(%target, %start, hops = route.hop_count(), resolved = route.resolved, "lookup");
        self.query = Some(Query { target, start });
        self.last_route = Some(route.clone());
        Ok(route)
    }

    /// Route a query for a named key, hashed onto the ring.
    pub fn lookup_key(&mut self, key: &[u8], start: NodeId) -> Result<Route, SimError> {
        let target = self.space().hash_key(key);
        self.lookup(target, start)
    }

    /// Finger table of member `id`.
    pub fn finger_table(&self, id: NodeId) -> Result<&FingerTable, SimError> {
        self.check_member(id)?;
        self.topology
            .finger_table(id)
            .ok_or_else(|| RingError::NotFound(id).into())
    }

    /// Key set of member `id`.
    pub fn key_set(&self, id: NodeId) -> Result<&KeySet, SimError> {
        self.check_member(id)?;
        self.topology
            .key_set(id)
            .ok_or_else(|| RingError::NotFound(id).into())
    }

    /// The most recent lookup result, refreshed against the current ring.
    pub fn last_route(&self) -> Option<&Route> {
        self.last_route.as_ref()
    }

    /// Keys that changed owner in the last membership change.
    pub fn last_migrations(&self) -> &[KeyMigration] {
        &self.last_migrations
    }

    /// Recent membership events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &RingEvent> {
        self.events.iter()
    }

    /// Read-only view of the current step for the visualization layer.
    pub fn snapshot(&self) -> RingSnapshot {
        let nodes = self
            .ring
            .iter()
            .map(|id| NodeView {
                id,
                fingers: self.topology.finger_table(id).cloned().unwrap_or_default(),
                keys: self.topology.key_set(id).cloned().unwrap_or_default(),
            })
            .collect();

        RingSnapshot {
            bits: self.bits(),
            space_size: self.space().size(),
            members: self.ring.members(),
            nodes,
            last_route: self.last_route.clone(),
        }
    }

    fn check_member(&self, id: NodeId) -> Result<(), RingError> {
        if self.ring.is_empty() {
            return Err(RingError::EmptyRing);
        }
        self.space().check(id)?;
        if !self.ring.contains(id) {
            return Err(RingError::NotFound(id));
        }
        Ok(())
    }

    /// Rebuild routing state for `next` and swap it in.
    fn commit(&mut self, next: RingState, event: RingEvent) -> Result<(), SimError> {
        let topology = rebuild(&next)?;
        let migrations = Topology::diff(&self.topology, &topology);
        debug!(migrations = migrations.len(), "key ownership updated");

        self.ring = next;
        self.topology = topology;
        self.last_migrations = migrations;
        self.record(event);
        self.refresh_route();
        Ok(())
    }

    /// Replay the last query, dropping it if its start node is gone.
    fn refresh_route(&mut self) {
        let Some(query) = self.query else {
            return;
        };
        match chord_ring::lookup(&self.ring, &self.topology, query.target, query.start) {
            Ok(route) => self.last_route = Some(route),
            Err(e) => {
                debug!(start = %query.start, error = %e, "dropping last lookup");
                self.query = None;
                self.last_route = None;
            }
        }
    }

    fn record(&mut self, event: RingEvent) {
        if self.events.len() == EVENT_HISTORY {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

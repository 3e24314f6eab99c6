//! Shared helpers for Chord simulator integration tests.
//!
//! Provides seeded ring construction and the invariant checks every
//! scenario asserts after each membership change.

use std::collections::BTreeSet;

use chord_ring::{IdentifierSpace, RingState, Topology};
use chord_sim::{SimConfig, Simulation};
use chord_types::NodeId;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Build a ring over `[0, 2^bits)` with `size` random members.
pub fn random_ring(bits: u8, size: usize, seed: u64) -> RingState {
    let space = IdentifierSpace::new(bits).unwrap();
    let mut ring = RingState::new(space);
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..size {
        ring.add_node(None, &mut rng).unwrap();
    }
    ring
}

/// Start a seeded session with M = `bits` and the largest accepted ceiling.
pub fn session(bits: u8, seed: u64) -> Simulation {
    Simulation::new(SimConfig {
        bits,
        max_bits: chord_ring::MAX_BITS,
        seed: Some(seed),
    })
    .unwrap()
}

/// Assert every identifier in the space is owned by exactly one member.
pub fn assert_partition(ring: &RingState, topology: &Topology) {
    let size = ring.space().size() as usize;
    let mut seen = BTreeSet::new();
    let mut total = 0usize;

    for node in ring.iter() {
        let keys = topology
            .key_set(node)
            .unwrap_or_else(|| panic!("member {node} has no key set"));
        for key in keys {
            assert!(ring.space().contains(*key), "key {key} outside space");
            seen.insert(*key);
            total += 1;
        }
    }

    assert_eq!(total, size, "identifiers owned more than once");
    assert_eq!(seen.len(), size, "identifiers left unowned");
}

/// Assert every member has M rows and every successor is a live member.
pub fn assert_fingers_valid(ring: &RingState, topology: &Topology) {
    let bits = usize::from(ring.space().bits());
    for node in ring.iter() {
        let table = topology
            .finger_table(node)
            .unwrap_or_else(|| panic!("member {node} has no finger table"));
        assert_eq!(table.len(), bits, "member {node} has wrong table length");
        for entry in table {
            assert!(
                ring.contains(entry.successor),
                "member {node} points at departed node {}",
                entry.successor
            );
        }
    }
}

/// The owner of `key` by definition: the first member at or after it.
pub fn expected_owner(ring: &RingState, key: NodeId) -> NodeId {
    ring.successor_of(key).unwrap()
}

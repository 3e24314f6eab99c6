//! Integration test: membership churn.
//!
//! Random joins and leaves must keep the session consistent after every
//! single mutation, and key migrations must account for every ownership
//! change.

use std::collections::BTreeMap;

use chord_integration_tests::{assert_fingers_valid, assert_partition, session};
use chord_ring::RingError;
use chord_sim::SimError;
use chord_types::NodeId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn owners(sim: &chord_sim::Simulation) -> BTreeMap<NodeId, NodeId> {
    (0..sim.space().size())
        .map(NodeId::new)
        .filter_map(|k| sim.topology().owner_of(k).map(|o| (k, o)))
        .collect()
}

/// 200 random joins and leaves on M=6; invariants hold after each step.
#[test]
fn test_invariants_hold_through_churn() {
    let mut sim = session(6, 17);
    let mut rng = StdRng::seed_from_u64(17);

    for _ in 0..200 {
        let before = owners(&sim);

        if sim.members().is_empty() || rng.random_bool(0.6) {
            match sim.add_node(None) {
                Ok(_) | Err(SimError::Ring(RingError::RingFull { .. })) => {}
                Err(e) => panic!("unexpected add failure: {e}"),
            }
        } else {
            sim.remove_random_node().unwrap();
        }

        if sim.members().is_empty() {
            assert!(sim.topology().is_empty());
            continue;
        }

        assert_partition(sim.ring(), sim.topology());
        assert_fingers_valid(sim.ring(), sim.topology());

        // Migrations cover exactly the keys whose owner changed.
        let after = owners(&sim);
        let changed: Vec<NodeId> = after
            .iter()
            .filter(|&(k, o)| before.get(k).is_some_and(|b| b != o))
            .map(|(k, _)| *k)
            .collect();
        let migrated: Vec<NodeId> = sim.last_migrations().iter().map(|m| m.key).collect();
        assert_eq!(changed, migrated);
    }
}

/// Shrinking a two-member ring to one member gives it the whole space.
#[test]
fn test_shrink_to_single_member() {
    let mut sim = session(4, 2);
    let a = sim.add_node(Some(NodeId::new(3))).unwrap();
    let b = sim.add_node(Some(NodeId::new(11))).unwrap();

    sim.remove_node(b).unwrap();
    assert_eq!(sim.key_set(a).unwrap().len(), 16);
    assert!(sim.finger_table(a).unwrap().iter().all(|e| e.successor == a));

    // Every key that belonged to b moved to a.
    assert_eq!(sim.last_migrations().len(), 8);
    assert!(sim.last_migrations().iter().all(|m| m.from == b && m.to == a));
}

/// Filling then draining the ring never leaves stale routing state.
#[test]
fn test_fill_and_drain() {
    let mut sim = session(4, 5);
    for _ in 0..16 {
        sim.add_node(None).unwrap();
        assert_partition(sim.ring(), sim.topology());
    }
    assert!(matches!(
        sim.add_node(None),
        Err(SimError::Ring(RingError::RingFull { capacity: 16 }))
    ));

    while !sim.members().is_empty() {
        sim.remove_random_node().unwrap();
        if !sim.members().is_empty() {
            assert_partition(sim.ring(), sim.topology());
            assert_fingers_valid(sim.ring(), sim.topology());
        }
    }
    assert!(sim.topology().is_empty());
    assert!(sim.snapshot().nodes.is_empty());
}

/// A remembered lookup follows the ring as it changes.
#[test]
fn test_last_route_tracks_churn() {
    let mut sim = session(5, 23);
    let start = sim.add_node(Some(NodeId::new(0))).unwrap();
    for _ in 0..5 {
        sim.add_node(None).unwrap();
    }
    sim.lookup(NodeId::new(20), start).unwrap();

    for _ in 0..5 {
        sim.add_node(None).unwrap();
        let route = sim.last_route().expect("start node still present");
        assert_eq!(route.owner(), sim.topology().owner_of(NodeId::new(20)));
    }
}

//! Integration test: lookup routing.
//!
//! On a consistent ring every lookup must terminate at the target's owner,
//! within the hop bound, visiting only live members.

use chord_integration_tests::{expected_owner, random_ring, session};
use chord_ring::{lookup, rebuild};
use chord_types::NodeId;

/// Every (start, target) pair resolves to the owner on assorted rings.
#[test]
fn test_all_pairs_resolve_to_owner() {
    for (bits, members, seed) in [(3, 2, 1), (4, 5, 2), (5, 9, 3), (6, 1, 4), (6, 64, 5)] {
        let ring = random_ring(bits, members, seed);
        let topology = rebuild(&ring).unwrap();
        let size = ring.space().size();

        for start in ring.iter() {
            for t in 0..size {
                let target = NodeId::new(t);
                let route = lookup(&ring, &topology, target, start).unwrap();

                assert!(route.resolved, "M={bits} start={start} target={target} unresolved");
                assert_eq!(route.hops.first(), Some(&start));
                assert_eq!(route.owner(), Some(expected_owner(&ring, target)));
                assert!(route.hop_count() <= size as usize);
                assert!(route.hops.iter().all(|hop| ring.contains(*hop)));
            }
        }
    }
}

/// Greedy finger routing stays logarithmic on a moderately full ring.
#[test]
fn test_hop_count_is_logarithmic() {
    let ring = random_ring(8, 64, 21);
    let topology = rebuild(&ring).unwrap();
    let bits = usize::from(ring.space().bits());

    for start in ring.iter() {
        for t in (0..ring.space().size()).step_by(7) {
            let route = lookup(&ring, &topology, NodeId::new(t), start).unwrap();
            assert!(
                route.hop_count() <= bits,
                "{} hops from {start} to {t}",
                route.hop_count()
            );
        }
    }
}

/// Session lookups match direct lookups against the same state.
#[test]
fn test_session_lookup_matches_core() {
    let mut sim = session(5, 8);
    for _ in 0..7 {
        sim.add_node(None).unwrap();
    }
    let start = sim.members()[0];
    let expected = lookup(sim.ring(), sim.topology(), NodeId::new(13), start).unwrap();
    assert_eq!(sim.lookup(NodeId::new(13), start).unwrap(), expected);
}

/// M=3, ring {0, 4}: from node 4, target 6 is forwarded once to node 0.
#[test]
fn test_one_hop_scenario() {
    let mut sim = session(3, 1);
    sim.add_node(Some(NodeId::new(0))).unwrap();
    sim.add_node(Some(NodeId::new(4))).unwrap();

    let route = sim.lookup(NodeId::new(6), NodeId::new(4)).unwrap();
    assert_eq!(route.hops, vec![NodeId::new(4), NodeId::new(0)]);
    assert_eq!(route.owner(), Some(NodeId::new(0)));
}

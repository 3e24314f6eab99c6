//! Integration test: key ownership and finger-table invariants.
//!
//! Every ring size from one member up to a full ring must partition the
//! identifier space exactly and keep well-formed finger tables.

use chord_integration_tests::{assert_fingers_valid, assert_partition, expected_owner, random_ring};
use chord_ring::{IdentifierSpace, RingState, assign_keys, build_finger_table, rebuild};
use chord_types::NodeId;

/// All ring sizes for M = 2..=5, several seeds each.
#[test]
fn test_partition_for_every_ring_size() {
    for bits in 2..=5u8 {
        let size = 1usize << bits;
        for members in 1..=size {
            for seed in 0..3 {
                let ring = random_ring(bits, members, seed);
                let topology = rebuild(&ring).unwrap();
                assert_partition(&ring, &topology);
                assert_fingers_valid(&ring, &topology);
            }
        }
    }
}

/// Each key is owned by the first member at or after it.
#[test]
fn test_owner_is_clockwise_successor() {
    let ring = random_ring(7, 20, 11);
    let topology = rebuild(&ring).unwrap();
    for k in 0..ring.space().size() {
        let key = NodeId::new(k);
        assert_eq!(topology.owner_of(key), Some(expected_owner(&ring, key)));
    }
}

/// Finger successors match a direct successor query for each row's start.
#[test]
fn test_finger_successor_matches_successor_query() {
    let ring = random_ring(8, 30, 3);
    for node in ring.iter() {
        let table = build_finger_table(&ring, node).unwrap();
        for entry in &table {
            assert_eq!(entry.successor, ring.successor_of(entry.start).unwrap());
        }
    }
}

/// Building twice without mutation yields identical state.
#[test]
fn test_recompute_is_idempotent() {
    let ring = random_ring(6, 12, 9);
    assert_eq!(rebuild(&ring).unwrap(), rebuild(&ring).unwrap());
    for node in ring.iter() {
        assert_eq!(
            build_finger_table(&ring, node).unwrap(),
            build_finger_table(&ring, node).unwrap()
        );
        assert_eq!(
            assign_keys(&ring, node).unwrap(),
            assign_keys(&ring, node).unwrap()
        );
    }
}

/// A lone member owns everything and points every row at itself.
#[test]
fn test_single_member_ring() {
    for bits in 2..=8u8 {
        let space = IdentifierSpace::new(bits).unwrap();
        let node = NodeId::new(space.size() / 3);
        let ring = RingState::with_members(space, [node]).unwrap();

        let keys = assign_keys(&ring, node).unwrap();
        assert_eq!(keys.len(), space.size() as usize);

        let table = build_finger_table(&ring, node).unwrap();
        assert_eq!(table.len(), usize::from(bits));
        assert!(table.iter().all(|e| e.successor == node));
    }
}

/// M=3, ring {1, 4}: node 1's rows are (2,4), (3,4), (5,1).
#[test]
fn test_two_member_scenario() {
    let space = IdentifierSpace::new(3).unwrap();
    let ring = RingState::with_members(space, [NodeId::new(1), NodeId::new(4)]).unwrap();
    let table = build_finger_table(&ring, NodeId::new(1)).unwrap();
    let rows: Vec<(u32, u32)> = table
        .iter()
        .map(|e| (e.start.get(), e.successor.get()))
        .collect();
    assert_eq!(rows, vec![(2, 4), (3, 4), (5, 1)]);
}

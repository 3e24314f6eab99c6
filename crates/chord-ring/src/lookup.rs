//! Greedy finger-table lookup routing.

use chord_types::{NodeId, Route};
use tracing::{trace, warn};

use crate::error::RingError;
use crate::rebuild::Topology;
use crate::ring::RingState;

/// Trace the hops a query for `target` takes when entering the ring at
/// `start`.
///
/// At each node the finger rows partition the ring into consecutive arcs
/// `[row[k].start, row[k+1].start)`, with the last row closing back to the
/// current node. The query jumps to the successor of the first row whose
/// arc contains `target`, until it reaches the node owning `target`.
///
/// The walk is capped at `2^M` hops. Hitting the cap, or a node whose rows
/// cover no arc containing the target, ends the walk early and returns a
/// partial route with `resolved == false`.
pub fn lookup(
    ring: &RingState,
    topology: &Topology,
    target: NodeId,
    start: NodeId,
) -> Result<Route, RingError> {
    if ring.is_empty() {
        return Err(RingError::EmptyRing);
    }
    let space = ring.space();
    let target = space.check(target)?;
    let start = space.check(start)?;
    if !ring.contains(start) {
        return Err(RingError::NotFound(start));
    }

    let max_hops = space.size() as usize;
    let mut hops = vec![start];
    let mut curr = start;

    while !owns(topology, curr, target) && hops.len() <= max_hops {
        let Some(table) = topology.finger_table(curr) else {
            warn!(%curr, %target, "no finger table for node; abandoning lookup");
            break;
        };

        let rows = table.entries();
        let next = rows.iter().enumerate().find_map(|(k, row)| {
            let right = rows.get(k + 1).map_or(curr, |next_row| next_row.start);
            space
                .within_range(row.start, target, right)
                .then_some(row.successor)
        });

        let Some(next) = next else {
            warn!(%curr, %target, "no finger interval contains target; abandoning lookup");
            break;
        };

        trace!(from = %curr, to = %next, %target, "lookup hop");
        curr = next;
        hops.push(curr);
    }

    let resolved = owns(topology, curr, target);
    if !resolved && hops.len() > max_hops {
        warn!(%start, %target, max_hops, "lookup hit hop bound without resolving");
    }

    Ok(Route {
        start,
        target,
        hops,
        resolved,
    })
}

fn owns(topology: &Topology, node: NodeId, target: NodeId) -> bool {
    topology
        .key_set(node)
        .is_some_and(|keys| keys.contains(target))
}

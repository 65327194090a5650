//! Layer-0 reachability repair.
//!
//! Heuristic pruning can leave a representative that no layer-0 path from the
//! entry point reaches, typically a tight cluster whose members pruned every
//! link pointing back out. After insertion a serial pass walks layer 0 from the
//! entry point and hangs each unreached representative under the closest
//! reached node that still has a free slot.
//!
//! Only a full list ever loses a link (its farthest one), and the walk is
//! repeated until nothing is unreached or the round budget runs out.

use crate::hnsw::graph::ProximityGraph;
use crate::hnsw::params::HnswParams;
use crate::hnsw::search::{search_layer, Candidate};
use crate::metric::{Distance, Scalar};
use tracing::{debug, warn};

const MAX_ROUNDS: usize = 8;

/// Mark everything reachable from `start` on layer 0. Returns how many nodes
/// were newly marked.
fn mark_reachable<T: Scalar>(graph: &ProximityGraph<T>, start: u32, reached: &mut [bool]) -> usize {
    let mut stack = vec![start];
    let mut marked = 0;
    while let Some(id) = stack.pop() {
        if std::mem::replace(&mut reached[id as usize], true) {
            continue;
        }
        marked += 1;
        stack.extend(
            graph
                .neighbors(id, 0)
                .iter()
                .copied()
                .filter(|&n| !reached[n as usize]),
        );
    }
    marked
}

fn unreached<T: Scalar>(graph: &ProximityGraph<T>, reached: &[bool]) -> Vec<u32> {
    (0..graph.len() as u32)
        .filter(|&id| graph.is_representative(id) && !reached[id as usize])
        .collect()
}

/// `(reachable, orphans)`: representatives the entry point reaches on layer 0,
/// and those it does not.
pub(crate) fn connectivity<T: Scalar>(graph: &ProximityGraph<T>) -> (usize, usize) {
    let Some(entry) = graph.entry_point() else {
        return (0, 0);
    };
    let mut reached = vec![false; graph.len()];
    let reachable = mark_reachable(graph, entry.id, &mut reached);
    (reachable, unreached(graph, &reached).len())
}

/// Relink every representative the entry point cannot reach on layer 0.
///
/// Returns the number of links added.
pub(crate) fn reconnect<T: Scalar>(graph: &ProximityGraph<T>, params: &HnswParams) -> usize {
    let Some(entry) = graph.entry_point() else {
        return 0;
    };
    let cap = params.cap(0);
    let mut relinked = 0;
    let mut visited = graph.visited.acquire();

    for round in 0..MAX_ROUNDS {
        let mut reached = vec![false; graph.len()];
        mark_reachable(graph, entry.id, &mut reached);
        let orphans = unreached(graph, &reached);
        if orphans.is_empty() {
            if relinked > 0 {
                debug!(relinked, rounds = round, "relinked unreachable layer-0 nodes");
            }
            return relinked;
        }

        for orphan in orphans {
            if reached[orphan as usize] {
                continue;
            }
            let query = graph.vector(orphan);
            let top = Candidate {
                distance: graph.distance_to(query, entry.id),
                id: entry.id,
            };
            // Everything found is reachable from the entry point.
            let found = search_layer(graph, query, &[top], params.ef_construction, 0, &mut visited);
            if attach(graph, orphan, &found, cap) {
                relinked += 1;
                mark_reachable(graph, orphan, &mut reached);
            }
        }
    }

    let (_, orphans) = connectivity(graph);
    if orphans > 0 {
        warn!(orphans, rounds = MAX_ROUNDS, "layer 0 still has unreachable nodes");
    }
    relinked
}

/// Link `orphan` from the closest node in `found` with a free slot. When every
/// list is full, the closest node drops its farthest link instead.
fn attach<T: Scalar>(
    graph: &ProximityGraph<T>,
    orphan: u32,
    found: &[Candidate<T::Distance>],
    cap: usize,
) -> bool {
    let host = found
        .iter()
        .find(|c| graph.links(c.id, 0).read().len() < cap)
        .or_else(|| found.first());
    let Some(host) = host else {
        return false;
    };

    {
        let mut links = graph.links(host.id, 0).write();
        if links.len() < cap {
            links.push(orphan);
        } else {
            let farthest = links
                .iter()
                .enumerate()
                .map(|(slot, &other)| (slot, graph.distance_between(host.id, other)))
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(slot, _)| slot);
            match farthest {
                Some(slot) => links[slot] = orphan,
                None => return false,
            }
        }
    }

    let mut own = graph.links(orphan, 0).write();
    if own.len() < cap && !own.contains(&host.id) {
        own.push(host.id);
    }
    true
}

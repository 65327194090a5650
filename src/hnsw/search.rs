//! HNSW search: greedy descent through the upper layers, beam search on layer 0.

use crate::hnsw::graph::ProximityGraph;
use crate::hnsw::visited::VisitedSet;
use crate::matcher::Neighbor;
use crate::metric::{Distance, Scalar};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Node reached during search.
///
/// Ordered by distance, then id, so every ranking is deterministic.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate<D> {
    pub(crate) distance: D,
    pub(crate) id: u32,
}

impl<D: Distance> PartialEq for Candidate<D> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<D: Distance> Eq for Candidate<D> {}

impl<D: Distance> Ord for Candidate<D> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl<D: Distance> PartialOrd for Candidate<D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<D> From<Candidate<D>> for Neighbor<D> {
    fn from(c: Candidate<D>) -> Self {
        Neighbor {
            id: c.id,
            distance: c.distance,
        }
    }
}

/// Walk `layer` from `start`, always moving to the closest neighbor, until no
/// neighbor improves on the current node.
pub(crate) fn greedy_closest<T: Scalar>(
    graph: &ProximityGraph<T>,
    query: &[T],
    start: Candidate<T::Distance>,
    layer: usize,
) -> Candidate<T::Distance> {
    let mut best = start;
    loop {
        let mut improved = false;
        for &neighbor_id in graph.neighbors(best.id, layer).iter() {
            let candidate = Candidate {
                distance: graph.distance_to(query, neighbor_id),
                id: neighbor_id,
            };
            if candidate < best {
                best = candidate;
                improved = true;
            }
        }
        if !improved {
            return best;
        }
    }
}

/// Best-first beam search of width `ef` on one layer, seeded from `entries`.
///
/// Min-heap of candidates to expand, max-heap of the `ef` best found so far;
/// stops once the closest unexpanded candidate is worse than the worst kept
/// result. Output is ascending by (distance, id) and holds `ef` nodes, or every
/// node reachable from `entries` if there are fewer.
pub(crate) fn search_layer<T: Scalar>(
    graph: &ProximityGraph<T>,
    query: &[T],
    entries: &[Candidate<T::Distance>],
    ef: usize,
    layer: usize,
    visited: &mut VisitedSet,
) -> Vec<Candidate<T::Distance>> {
    visited.clear();

    let mut candidates: BinaryHeap<Reverse<Candidate<T::Distance>>> =
        BinaryHeap::with_capacity(ef * 2);
    let mut results: BinaryHeap<Candidate<T::Distance>> = BinaryHeap::with_capacity(ef + 1);

    for &entry in entries {
        if visited.insert(entry.id) {
            candidates.push(Reverse(entry));
            results.push(entry);
        }
    }
    while results.len() > ef {
        results.pop();
    }

    while let Some(Reverse(current)) = candidates.pop() {
        if let Some(worst) = results.peek() {
            if current > *worst && results.len() >= ef {
                break;
            }
        }

        for &neighbor_id in graph.neighbors(current.id, layer).iter() {
            if !visited.insert(neighbor_id) {
                continue;
            }
            let candidate = Candidate {
                distance: graph.distance_to(query, neighbor_id),
                id: neighbor_id,
            };
            let admit = results.len() < ef || results.peek().map_or(true, |w| candidate < *w);
            if admit {
                candidates.push(Reverse(candidate));
                results.push(candidate);
                if results.len() > ef {
                    results.pop();
                }
            }
        }
    }

    results.into_sorted_vec()
}

/// Approximate `k` nearest neighbors of `query` with layer-0 breadth `max(k, ef)`.
///
/// Layer 0 is seeded from both the descent result and the entry point, since
/// every representative is reachable from the latter. Each representative found
/// is reported together with its aliases at the same distance, so the result
/// holds `min(k, len)` rows whenever `max(k, ef)` covers the graph.
///
/// Returns an empty list for `k == 0` or a graph with no entry point.
pub fn search<T: Scalar>(
    graph: &ProximityGraph<T>,
    query: &[T],
    k: usize,
    ef: usize,
) -> Vec<Neighbor<T::Distance>> {
    if k == 0 {
        return Vec::new();
    }
    let Some(entry) = graph.entry_point() else {
        return Vec::new();
    };

    let top = Candidate {
        distance: graph.distance_to(query, entry.id),
        id: entry.id,
    };
    let mut current = top;
    for layer in (1..=entry.level).rev() {
        current = greedy_closest(graph, query, current, layer);
    }

    let mut visited = graph.visited.acquire();
    let found = search_layer(graph, query, &[current, top], ef.max(k), 0, &mut visited);
    drop(visited);

    let mut hits: Vec<Candidate<T::Distance>> = Vec::with_capacity(found.len());
    for rep in found {
        hits.push(rep);
        hits.extend(graph.aliases(rep.id).iter().map(|&id| Candidate {
            distance: rep.distance,
            id,
        }));
    }
    hits.sort_unstable();
    hits.truncate(k);
    hits.into_iter().map(Neighbor::from).collect()
}

//! HNSW graph construction.
//!
//! Implements the insertion algorithm from Malkov & Yashunin (2018):
//! descend greedily to the new node's level, then on each layer below run an
//! `ef_construction`-wide beam search, keep a diverse subset of the candidates
//! and link both ways.
//!
//! The first insert is serial and seeds the entry point. The rest run on a rayon
//! pool; each (node, layer) neighbor list has its own lock and no list lock is
//! held while another list lock is taken. Rows folded onto an identical earlier
//! row are never inserted. A serial pass over layer 0 then relinks any
//! representative the entry point cannot reach.

use crate::error::ConfigError;
use crate::hnsw::graph::{sample_levels, Neighbors, ProximityGraph};
use crate::hnsw::params::HnswParams;
use crate::hnsw::repair;
use crate::hnsw::search::{greedy_closest, search_layer, Candidate};
use crate::metric::{MetricSpace, Scalar};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, trace};

/// Inserts a dataset into a fresh [`ProximityGraph`].
pub struct IndexBuilder<'a> {
    params: &'a HnswParams,
    /// Held for the whole insertion of a node that may become the new entry
    /// point, so two such nodes cannot both link against a stale top layer.
    promotion: Mutex<()>,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(params: &'a HnswParams) -> Self {
        Self {
            params,
            promotion: Mutex::new(()),
        }
    }

    /// Validate `dataset` against `space` and build the graph over all of it.
    pub fn build<T: Scalar>(
        &self,
        space: MetricSpace<T>,
        dataset: &[T],
    ) -> Result<ProximityGraph<T>, ConfigError> {
        self.params.validate()?;

        let n = space.rows(dataset)?;

        let pool = match self.params.num_threads {
            0 | 1 => None,
            threads => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| ConfigError::InvalidParameter(e.to_string()))?,
            ),
        };

        debug!(
            nodes = n,
            stride = space.stride(),
            metric = ?space.kind(),
            m = self.params.m,
            ef_construction = self.params.ef_construction,
            threads = self.params.num_threads,
            "building proximity graph"
        );
        let start = Instant::now();

        let levels = sample_levels(
            n,
            self.params.level_multiplier,
            self.params.max_level,
            self.params.seed,
        );
        let graph = ProximityGraph::with_levels(space, dataset.to_vec(), &levels);

        // Row 0 is always a representative.
        self.insert(&graph, 0);
        let reps: Vec<u32> = (1..n as u32)
            .filter(|&id| graph.is_representative(id))
            .collect();
        match (&pool, self.params.num_threads) {
            (_, 1) => reps.iter().for_each(|&id| self.insert(&graph, id)),
            (Some(pool), _) => {
                pool.install(|| reps.par_iter().for_each(|&id| self.insert(&graph, id)))
            }
            (None, _) => reps.par_iter().for_each(|&id| self.insert(&graph, id)),
        }

        let relinked = repair::reconnect(&graph, self.params);

        info!(
            nodes = n,
            duplicates = graph.duplicates(),
            relinked,
            top_level = graph.top_level().unwrap_or(0),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "proximity graph built"
        );
        Ok(graph)
    }

    /// Insert node `id`, whose descriptor and level are already in `graph`.
    pub(crate) fn insert<T: Scalar>(&self, graph: &ProximityGraph<T>, id: u32) {
        let level = graph.level(id);
        let query = graph.vector(id);

        let mut entry = graph.entry_point();
        let may_promote = entry.map_or(true, |e| level > e.level);
        let _promotion = if may_promote {
            let guard = self.promotion.lock();
            entry = graph.entry_point();
            Some(guard)
        } else {
            None
        };

        let Some(entry) = entry else {
            graph.promote(id);
            trace!(id, level, "seeded entry point");
            return;
        };

        let mut current = Candidate {
            distance: graph.distance_to(query, entry.id),
            id: entry.id,
        };
        for layer in ((level + 1)..=entry.level).rev() {
            current = greedy_closest(graph, query, current, layer);
        }

        let mut visited = graph.visited.acquire();
        for layer in (0..=level.min(entry.level)).rev() {
            let mut candidates = search_layer(
                graph,
                query,
                &[current],
                self.params.ef_construction,
                layer,
                &mut visited,
            );
            // A concurrent inserter may already have linked `id` on this layer.
            candidates.retain(|c| c.id != id);
            if let Some(&closest) = candidates.first() {
                current = closest;
            }

            let cap = self.params.cap(layer);
            let selected = select_neighbors(graph, &candidates, cap, self.params.keep_pruned);

            for neighbor in &selected {
                self.connect(graph, id, neighbor.id, neighbor.distance, layer, cap);
                self.connect(graph, neighbor.id, id, neighbor.distance, layer, cap);
            }
        }

        if graph.promote(id) {
            trace!(id, level, "promoted entry point");
        }
    }

    /// Add `new_id` to `node`'s list on `layer`, shrinking the list with the
    /// selection heuristic if it overflows `cap`.
    ///
    /// Lists are only ever extended under their lock, never overwritten from a
    /// snapshot, so a link added by a concurrent inserter is not lost.
    fn connect<T: Scalar>(
        &self,
        graph: &ProximityGraph<T>,
        node: u32,
        new_id: u32,
        distance: T::Distance,
        layer: usize,
        cap: usize,
    ) {
        let mut links = graph.links(node, layer).write();
        if node == new_id || links.contains(&new_id) {
            return;
        }
        if links.len() < cap {
            links.push(new_id);
            return;
        }

        let mut candidates: Vec<Candidate<T::Distance>> = links
            .iter()
            .map(|&other| Candidate {
                distance: graph.distance_between(node, other),
                id: other,
            })
            .collect();
        candidates.push(Candidate {
            distance,
            id: new_id,
        });
        candidates.sort_unstable();

        let kept = select_neighbors(graph, &candidates, cap, self.params.keep_pruned);
        *links = kept.iter().map(|c| c.id).collect::<Neighbors>();
    }
}

/// Diversity-preserving neighbor selection.
///
/// `candidates` must be ascending by distance to the base node. A candidate is
/// kept only if it is at least as close to the base node as to every neighbor
/// already kept. With `keep_pruned`, rejected candidates refill the list up to
/// `cap` in distance order.
pub(crate) fn select_neighbors<T: Scalar>(
    graph: &ProximityGraph<T>,
    candidates: &[Candidate<T::Distance>],
    cap: usize,
    keep_pruned: bool,
) -> Vec<Candidate<T::Distance>> {
    if candidates.len() < cap {
        return candidates.to_vec();
    }

    let mut selected: Vec<Candidate<T::Distance>> = Vec::with_capacity(cap);
    let mut pruned = Vec::new();

    for &candidate in candidates {
        if selected.len() >= cap {
            break;
        }
        let diverse = selected.iter().all(|kept| {
            let between = graph.distance_between(candidate.id, kept.id);
            between >= candidate.distance
        });
        if diverse {
            selected.push(candidate);
        } else if keep_pruned {
            pruned.push(candidate);
        }
    }

    if keep_pruned {
        let room = cap - selected.len();
        selected.extend(pruned.into_iter().take(room));
        selected.sort_unstable();
    }

    selected
}

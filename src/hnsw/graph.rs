//! Layered proximity graph storage.
//!
//! Nodes live in an arena indexed by dataset id. Each node owns one neighbor list
//! per layer it belongs to, and every list sits behind its own lock so concurrent
//! inserters only contend when they touch the same node. Descriptors are kept in
//! one flat buffer (`id * stride .. (id + 1) * stride`).
//!
//! Rows that repeat an earlier descriptor exactly are folded onto the lowest id
//! holding it. Only that representative is linked into the graph; its aliases
//! keep an empty level-0 node and are reported next to it at search time.

use crate::hnsw::visited::VisitedPool;
use crate::metric::{MetricSpace, Scalar};
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

/// Inline capacity covers the default layer-0 cap (`2 * 16`).
pub(crate) type Neighbors = SmallVec<[u32; 32]>;

/// The node every search starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoint {
    pub id: u32,
    pub level: usize,
}

struct Node {
    layers: Box<[RwLock<Neighbors>]>,
}

impl Node {
    fn new(level: u8) -> Self {
        Self {
            layers: (0..=level).map(|_| RwLock::new(Neighbors::new())).collect(),
        }
    }

    #[inline]
    fn level(&self) -> usize {
        self.layers.len() - 1
    }
}

/// Multi-layer navigable small-world graph over a fixed descriptor set.
pub struct ProximityGraph<T: Scalar> {
    space: MetricSpace<T>,
    vectors: Vec<T>,
    nodes: Vec<Node>,
    entry: RwLock<Option<EntryPoint>>,
    /// Lowest id with the same descriptor, per id.
    canonical: Vec<u32>,
    /// Ascending alias ids per representative that has any.
    aliases: HashMap<u32, Vec<u32>>,
    pub(crate) visited: VisitedPool,
}

impl<T: Scalar> std::fmt::Debug for ProximityGraph<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProximityGraph")
            .field("space", &self.space)
            .field("len", &self.nodes.len())
            .field("entry", &*self.entry.read())
            .finish_non_exhaustive()
    }
}

impl<T: Scalar> ProximityGraph<T> {
    /// Allocate every node up front with its pre-drawn level; no edges yet.
    ///
    /// Duplicate rows are folded here and their nodes pinned to layer 0.
    pub(crate) fn with_levels(space: MetricSpace<T>, vectors: Vec<T>, levels: &[u8]) -> Self {
        debug_assert_eq!(vectors.len(), levels.len() * space.stride());
        let canonical = fold_duplicates(&vectors, space.stride());
        let mut aliases: HashMap<u32, Vec<u32>> = HashMap::new();
        for (id, &rep) in canonical.iter().enumerate() {
            if rep != id as u32 {
                aliases.entry(rep).or_default().push(id as u32);
            }
        }
        let nodes = levels
            .iter()
            .zip(&canonical)
            .enumerate()
            .map(|(id, (&level, &rep))| Node::new(if rep == id as u32 { level } else { 0 }))
            .collect();
        Self {
            space,
            vectors,
            nodes,
            entry: RwLock::new(None),
            canonical,
            aliases,
            visited: VisitedPool::new(levels.len()),
        }
    }

    pub fn space(&self) -> &MetricSpace<T> {
        &self.space
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Stored descriptor for `id`.
    #[inline]
    pub fn vector(&self, id: u32) -> &[T] {
        let stride = self.space.stride();
        let start = id as usize * stride;
        &self.vectors[start..start + stride]
    }

    #[inline]
    pub fn level(&self, id: u32) -> usize {
        self.nodes[id as usize].level()
    }

    /// Lowest id whose descriptor equals `id`'s.
    #[inline]
    pub fn representative(&self, id: u32) -> u32 {
        self.canonical[id as usize]
    }

    /// Whether `id` is linked into the graph rather than folded onto an earlier row.
    #[inline]
    pub fn is_representative(&self, id: u32) -> bool {
        self.representative(id) == id
    }

    /// Rows folded onto representative `id`, ascending.
    pub fn aliases(&self, id: u32) -> &[u32] {
        self.aliases.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of rows folded onto an earlier identical row.
    pub fn duplicates(&self) -> usize {
        self.aliases.values().map(Vec::len).sum()
    }

    #[inline]
    pub(crate) fn distance_to(&self, query: &[T], id: u32) -> T::Distance {
        self.space.distance(query, self.vector(id))
    }

    #[inline]
    pub(crate) fn distance_between(&self, a: u32, b: u32) -> T::Distance {
        self.space.distance(self.vector(a), self.vector(b))
    }

    /// Snapshot of `id`'s neighbors on `layer`. The lock is released on return.
    #[inline]
    pub fn neighbors(&self, id: u32, layer: usize) -> Neighbors {
        self.nodes[id as usize].layers[layer].read().clone()
    }

    #[inline]
    pub(crate) fn links(&self, id: u32, layer: usize) -> &RwLock<Neighbors> {
        &self.nodes[id as usize].layers[layer]
    }

    pub fn entry_point(&self) -> Option<EntryPoint> {
        *self.entry.read()
    }

    /// Install `id` as entry point if it reaches above the current top layer.
    ///
    /// Returns whether the entry point changed.
    pub(crate) fn promote(&self, id: u32) -> bool {
        let level = self.level(id);
        let mut entry = self.entry.write();
        match *entry {
            Some(current) if current.level >= level => false,
            _ => {
                *entry = Some(EntryPoint { id, level });
                true
            }
        }
    }

    pub fn top_level(&self) -> Option<usize> {
        self.entry_point().map(|e| e.level)
    }

    /// Edge and memory summary. Layer counts cover representatives only.
    pub fn stats(&self) -> GraphStats {
        let top = self.nodes.iter().map(Node::level).max().unwrap_or(0);
        let mut nodes_per_layer = vec![0usize; top + 1];
        let mut edges_per_layer = vec![0usize; top + 1];
        let members = self
            .nodes
            .iter()
            .enumerate()
            .filter(|&(id, _)| self.is_representative(id as u32));
        for (_, node) in members {
            for (layer, links) in node.layers.iter().enumerate() {
                nodes_per_layer[layer] += 1;
                edges_per_layer[layer] += links.read().len();
            }
        }
        let edge_bytes: usize = edges_per_layer.iter().sum::<usize>() * std::mem::size_of::<u32>();
        GraphStats {
            num_nodes: self.nodes.len(),
            duplicates: self.duplicates(),
            entry_point: self.entry_point(),
            nodes_per_layer,
            edges_per_layer,
            size_bytes: self.vectors.len() * std::mem::size_of::<T>() + edge_bytes,
        }
    }
}

/// Summary of a built graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStats {
    pub num_nodes: usize,
    /// Rows folded onto an identical earlier row; not linked into the graph.
    pub duplicates: usize,
    pub entry_point: Option<EntryPoint>,
    /// Nodes present on each layer (index = layer).
    pub nodes_per_layer: Vec<usize>,
    /// Directed edges stored on each layer.
    pub edges_per_layer: Vec<usize>,
    /// Approximate bytes for descriptors plus edges.
    pub size_bytes: usize,
}

impl GraphStats {
    pub fn mean_degree(&self, layer: usize) -> f64 {
        match (self.nodes_per_layer.get(layer), self.edges_per_layer.get(layer)) {
            (Some(&n), Some(&e)) if n > 0 => e as f64 / n as f64,
            _ => 0.0,
        }
    }
}

/// Map every row to the lowest id holding a bit-identical descriptor.
///
/// Rows are bucketed by a hash of their element keys, then compared element by
/// element within the bucket.
pub(crate) fn fold_duplicates<T: Scalar>(vectors: &[T], stride: usize) -> Vec<u32> {
    let rows = vectors.chunks_exact(stride);
    let mut canonical = Vec::with_capacity(rows.len());
    let mut buckets: HashMap<u64, SmallVec<[u32; 1]>> = HashMap::new();

    for (id, row) in rows.enumerate() {
        let mut hasher = DefaultHasher::new();
        for &x in row {
            x.key().hash(&mut hasher);
        }
        let bucket = buckets.entry(hasher.finish()).or_default();
        let same = bucket.iter().copied().find(|&rep| {
            let start = rep as usize * stride;
            vectors[start..start + stride]
                .iter()
                .zip(row)
                .all(|(a, b)| a.key() == b.key())
        });
        match same {
            Some(rep) => canonical.push(rep),
            None => {
                bucket.push(id as u32);
                canonical.push(id as u32);
            }
        }
    }
    canonical
}

/// Draw one level per node, in id order, from a seeded RNG.
///
/// `floor(-ln(U) * level_multiplier)` with `U` uniform on `(0, 1]`, capped at
/// `max_level`. Each layer is roughly `e^(1 / level_multiplier)` times sparser
/// than the one below.
pub(crate) fn sample_levels(n: usize, level_multiplier: f64, max_level: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let u: f64 = 1.0 - rng.random::<f64>();
            let level = (-u.ln() * level_multiplier).floor() as usize;
            level.min(max_level) as u8
        })
        .collect()
}

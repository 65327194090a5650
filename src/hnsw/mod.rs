//! Hierarchical Navigable Small World (HNSW) graph index.
//!
//! # Algorithm
//!
//! HNSW constructs a multi-layer graph where:
//! - **Upper layers**: Sparse, long-range connections for fast navigation
//! - **Lower layers**: Dense, local connections for precise search
//! - **Search**: Start at the top layer, descend greedily, then run a beam
//!   search of width `ef` on layer 0
//!
//! Each node draws its top layer once, from an exponentially decaying
//! distribution, and keeps it forever. Layer 0 holds every node with up to
//! `2 * M` links; higher layers hold up to `M`.
//!
//! Exact duplicate descriptors are folded onto their lowest id before insertion
//! and reported beside it at query time, and every remaining node is reachable
//! from the entry point on layer 0 once the build returns.
//!
//! # Concurrency
//!
//! Nodes live in an arena indexed by dataset id. Every (node, layer) neighbor list
//! has its own lock, so parallel inserts only serialize when they rewire the same
//! node. Once [`IndexBuilder::build`] returns, the graph is read-only and any
//! number of threads may search it.
//!
//! # Usage
//!
//! ```rust
//! use proxima::hnsw::{search, HnswParams, IndexBuilder};
//! use proxima::metric::{MetricKind, MetricSpace};
//!
//! let data = [0.0f32, 0.0, 1.0, 0.0, 0.0, 1.0, 5.0, 5.0];
//! let space = MetricSpace::new(MetricKind::L2, 2)?;
//! let params = HnswParams::default();
//! let graph = IndexBuilder::new(&params).build(space, &data)?;
//!
//! let hits = search(&graph, &[0.1, 0.1], 1, 16);
//! assert_eq!(hits[0].id, 0);
//! # Ok::<(), proxima::ConfigError>(())
//! ```
//!
//! # References
//!
//! - Malkov & Yashunin (2018): "Efficient and robust approximate nearest neighbor
//!   search using Hierarchical Navigable Small World graphs"

pub(crate) mod construction;
pub(crate) mod graph;
pub(crate) mod params;
mod repair;
pub(crate) mod search;
mod visited;

pub use construction::IndexBuilder;
pub use graph::{EntryPoint, GraphStats, ProximityGraph};
pub use params::{
    HnswParams, SearchParams, DEFAULT_EF_CONSTRUCTION, DEFAULT_EF_SEARCH, DEFAULT_M,
    DEFAULT_MAX_LEVEL, DEFAULT_SEED,
};
pub use search::search;

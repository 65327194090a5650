//! proxima: approximate nearest-neighbor matching of feature descriptors.
//!
//! Builds an HNSW proximity graph over a flat array of descriptors and answers
//! k-nearest-neighbor queries against it:
//!
//! - `metric`: metric kinds, element types and their distance kernels
//! - `hnsw`: the layered graph, its construction and its search
//! - `matcher`: the build-once, query-many facade (graph and exhaustive)
//! - `benchmark`: synthetic datasets, ground truth and recall metrics
//!
//! # Descriptor layouts
//!
//! | Element | Metric | Distance | Dimension counts |
//! |---------|--------|----------|------------------|
//! | `f32` | L1, L2 | `f32` | components |
//! | `u8` | L1, L2 | `u32` | components |
//! | `u8` | Hamming | `u32` | bits (multiple of 8) |
//!
//! L2 is reported squared; ranking is unchanged and no square root is taken.
//!
//! # Example
//!
//! ```rust
//! use proxima::{ArrayMatcher, HnswMatcher, MetricKind};
//!
//! let database = [0.0f32, 0.0, 1.0, 0.0, 0.0, 1.0, 5.0, 5.0];
//! let mut matcher = HnswMatcher::new();
//! matcher.build(&database, 2, MetricKind::L2)?;
//!
//! let hits = matcher.search(&[0.9, 0.1], 2)?;
//! assert_eq!(hits[0].id, 1);
//! # Ok::<(), proxima::Error>(())
//! ```
//!
//! # When exact search is enough
//!
//! For a few thousand descriptors a linear scan ([`BruteForceMatcher`]) is
//! competitive and exact. The graph pays off as the database grows.

pub mod benchmark;
pub mod error;
pub mod hnsw;
pub mod matcher;
pub mod metric;
pub mod simd;

pub use error::{ConfigError, Error, Result};
pub use hnsw::{HnswParams, SearchParams};
pub use matcher::{ArrayMatcher, BruteForceMatcher, HnswMatcher, IndMatch, Neighbor};
pub use metric::{MetricKind, MetricSpace, Representation};

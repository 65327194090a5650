//! Matcher contract shared by the graph and exhaustive matchers.
//!
//! A matcher owns one indexed dataset at a time. `build` replaces whatever was
//! indexed before (on success only); searches are read-only and may run from
//! many threads at once.

pub mod brute_force;
pub mod hnsw;

pub use brute_force::BruteForceMatcher;
pub use hnsw::HnswMatcher;

use crate::error::{ConfigError, Error, Result};
use crate::metric::{MetricKind, MetricSpace, Scalar};
use rayon::prelude::*;

/// One ranked hit: database id and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Neighbor<D> {
    /// Row of the matched descriptor in the dataset given to `build`.
    pub id: u32,
    pub distance: D,
}

/// A (query row, database row) correspondence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndMatch {
    pub query: u32,
    pub database: u32,
}

/// Build-once, query-many nearest-neighbor matcher over flat descriptor arrays.
pub trait ArrayMatcher<T: Scalar> {
    /// Index `dataset` (`rows * stride` elements) under `metric`.
    ///
    /// On error the matcher keeps its previous index, if any.
    fn build(
        &mut self,
        dataset: &[T],
        dimension: usize,
        metric: MetricKind,
    ) -> std::result::Result<(), ConfigError>;

    /// Metric of the current index, `None` before the first successful build.
    fn space(&self) -> Option<&MetricSpace<T>>;

    /// Declared dimension of the current index (bits for Hamming).
    fn dimension(&self) -> Option<usize> {
        self.space().map(MetricSpace::dimension)
    }

    /// Number of indexed descriptors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_ready(&self) -> bool {
        self.space().is_some()
    }

    /// Up to `k` neighbors of one descriptor, ascending by distance then id.
    fn search(&self, query: &[T], k: usize) -> Result<Vec<Neighbor<T::Distance>>>;

    /// Closest indexed descriptor. [`Error::NoMatch`] if a ready index comes back empty.
    fn search_one(&self, query: &[T]) -> Result<Neighbor<T::Distance>> {
        self.search(query, 1)?.into_iter().next().ok_or(Error::NoMatch)
    }

    /// One result list per query row, in query order.
    fn search_batch(&self, queries: &[T], k: usize) -> Result<Vec<Vec<Neighbor<T::Distance>>>>
    where
        Self: Sync,
    {
        let stride = self.space().ok_or(Error::NotReady)?.stride();
        check_batch(queries, stride)?;
        queries
            .par_chunks(stride)
            .map(|query| self.search(query, k))
            .collect()
    }

    /// Batch results flattened query-major into (match, distance) pairs.
    fn search_matches(&self, queries: &[T], k: usize) -> Result<Vec<(IndMatch, T::Distance)>>
    where
        Self: Sync,
    {
        let batch = self.search_batch(queries, k)?;
        Ok(flatten_matches(batch))
    }
}

pub(crate) fn flatten_matches<D: Copy>(batch: Vec<Vec<Neighbor<D>>>) -> Vec<(IndMatch, D)> {
    batch
        .into_iter()
        .enumerate()
        .flat_map(|(query, hits)| {
            hits.into_iter().map(move |hit| {
                (
                    IndMatch {
                        query: query as u32,
                        database: hit.id,
                    },
                    hit.distance,
                )
            })
        })
        .collect()
}

pub(crate) fn check_query<T>(query: &[T], stride: usize) -> Result<()> {
    if query.len() != stride {
        return Err(Error::QueryShape {
            len: query.len(),
            stride,
        });
    }
    Ok(())
}

pub(crate) fn check_batch<T>(queries: &[T], stride: usize) -> Result<()> {
    if queries.len() % stride != 0 {
        return Err(Error::QueryShape {
            len: queries.len(),
            stride,
        });
    }
    Ok(())
}

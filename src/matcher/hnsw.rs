//! Approximate matcher backed by an HNSW proximity graph.

use crate::error::{ConfigError, Error, Result};
use crate::hnsw::{self, GraphStats, HnswParams, IndexBuilder, ProximityGraph, SearchParams};
use crate::matcher::{check_batch, check_query, flatten_matches, ArrayMatcher, IndMatch, Neighbor};
use crate::metric::{MetricKind, MetricSpace, Scalar};
use rayon::prelude::*;
use tracing::debug;

/// Approximate nearest-neighbor matcher.
///
/// Owns at most one graph. Build parameters are fixed per matcher; the query
/// breadth floor can be changed between searches.
///
/// ```rust
/// use proxima::matcher::{ArrayMatcher, HnswMatcher};
/// use proxima::metric::MetricKind;
///
/// let points = [0.0f32, 0.0, 1.0, 0.0, 0.0, 1.0, 5.0, 5.0];
/// let mut matcher = HnswMatcher::<f32>::new();
/// matcher.build(&points, 2, MetricKind::L2)?;
///
/// let best = matcher.search_one(&[0.1, 0.1])?;
/// assert_eq!(best.id, 0);
/// # Ok::<(), proxima::Error>(())
/// ```
pub struct HnswMatcher<T: Scalar> {
    params: HnswParams,
    search: SearchParams,
    graph: Option<ProximityGraph<T>>,
}

impl<T: Scalar> HnswMatcher<T> {
    pub fn new() -> Self {
        Self::with_params(HnswParams::default(), SearchParams::default())
    }

    pub fn with_params(params: HnswParams, search: SearchParams) -> Self {
        Self {
            params,
            search,
            graph: None,
        }
    }

    pub fn params(&self) -> &HnswParams {
        &self.params
    }

    pub fn search_params(&self) -> SearchParams {
        self.search
    }

    pub fn set_search_params(&mut self, search: SearchParams) -> std::result::Result<(), ConfigError> {
        search.validate()?;
        self.search = search;
        Ok(())
    }

    /// Build a graph over `dataset`, replacing the current one only on success.
    pub fn build(
        &mut self,
        dataset: &[T],
        dimension: usize,
        metric: MetricKind,
    ) -> std::result::Result<(), ConfigError> {
        self.search.validate()?;
        let space = MetricSpace::new(metric, dimension)?;
        let graph = IndexBuilder::new(&self.params).build(space, dataset)?;
        self.graph = Some(graph);
        Ok(())
    }

    fn graph(&self) -> Result<&ProximityGraph<T>> {
        self.graph.as_ref().ok_or(Error::NotReady)
    }

    pub fn search(&self, query: &[T], k: usize) -> Result<Vec<Neighbor<T::Distance>>> {
        self.search_with_ef(query, k, self.search.ef_search)
    }

    /// Search with an explicit breadth; `max(k, ef)` candidates are kept on layer 0.
    pub fn search_with_ef(
        &self,
        query: &[T],
        k: usize,
        ef: usize,
    ) -> Result<Vec<Neighbor<T::Distance>>> {
        let graph = self.graph()?;
        check_query(query, graph.space().stride())?;
        Ok(hnsw::search(graph, query, k, ef.max(1)))
    }

    pub fn search_one(&self, query: &[T]) -> Result<Neighbor<T::Distance>> {
        let hits = self.search(query, 1)?;
        hits.into_iter().next().ok_or(Error::NoMatch)
    }

    /// Search every row of `queries` in parallel; results keep query order.
    pub fn search_batch(
        &self,
        queries: &[T],
        k: usize,
    ) -> Result<Vec<Vec<Neighbor<T::Distance>>>> {
        let graph = self.graph()?;
        let stride = graph.space().stride();
        check_batch(queries, stride)?;

        let ef = self.search.effective_ef(k);
        debug!(queries = queries.len() / stride, k, ef, "batch search");
        Ok(queries
            .par_chunks(stride)
            .map(|query| hnsw::search(graph, query, k, ef))
            .collect())
    }

    pub fn search_matches(&self, queries: &[T], k: usize) -> Result<Vec<(IndMatch, T::Distance)>> {
        Ok(flatten_matches(self.search_batch(queries, k)?))
    }

    /// Graph summary, `None` before the first successful build.
    pub fn stats(&self) -> Option<GraphStats> {
        self.graph.as_ref().map(ProximityGraph::stats)
    }

    /// Read-only view of the built graph.
    pub fn graph_ref(&self) -> Option<&ProximityGraph<T>> {
        self.graph.as_ref()
    }
}

impl<T: Scalar> Default for HnswMatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> ArrayMatcher<T> for HnswMatcher<T> {
    fn build(
        &mut self,
        dataset: &[T],
        dimension: usize,
        metric: MetricKind,
    ) -> std::result::Result<(), ConfigError> {
        self.build(dataset, dimension, metric)
    }

    fn space(&self) -> Option<&MetricSpace<T>> {
        self.graph.as_ref().map(ProximityGraph::space)
    }

    fn len(&self) -> usize {
        self.graph.as_ref().map_or(0, ProximityGraph::len)
    }

    fn search(&self, query: &[T], k: usize) -> Result<Vec<Neighbor<T::Distance>>> {
        self.search(query, k)
    }

    fn search_one(&self, query: &[T]) -> Result<Neighbor<T::Distance>> {
        self.search_one(query)
    }

    fn search_batch(&self, queries: &[T], k: usize) -> Result<Vec<Vec<Neighbor<T::Distance>>>> {
        self.search_batch(queries, k)
    }

    fn search_matches(&self, queries: &[T], k: usize) -> Result<Vec<(IndMatch, T::Distance)>> {
        self.search_matches(queries, k)
    }
}

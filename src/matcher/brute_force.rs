//! Exhaustive matcher: scans every descriptor per query.
//!
//! Exact, so it doubles as ground truth when measuring graph recall.

use crate::error::{ConfigError, Error, Result};
use crate::hnsw::search::Candidate;
use crate::matcher::{check_query, ArrayMatcher, Neighbor};
use crate::metric::{MetricKind, MetricSpace, Scalar};

/// Linear-scan matcher with the same contract as [`HnswMatcher`](super::HnswMatcher).
pub struct BruteForceMatcher<T: Scalar> {
    space: Option<MetricSpace<T>>,
    data: Vec<T>,
}

impl<T: Scalar> BruteForceMatcher<T> {
    pub fn new() -> Self {
        Self {
            space: None,
            data: Vec::new(),
        }
    }
}

impl<T: Scalar> Default for BruteForceMatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> ArrayMatcher<T> for BruteForceMatcher<T> {
    fn build(
        &mut self,
        dataset: &[T],
        dimension: usize,
        metric: MetricKind,
    ) -> std::result::Result<(), ConfigError> {
        let space = MetricSpace::new(metric, dimension)?;
        space.rows(dataset)?;
        self.data = dataset.to_vec();
        self.space = Some(space);
        Ok(())
    }

    fn space(&self) -> Option<&MetricSpace<T>> {
        self.space.as_ref()
    }

    fn len(&self) -> usize {
        self.space
            .as_ref()
            .map_or(0, |space| self.data.len() / space.stride())
    }

    fn search(&self, query: &[T], k: usize) -> Result<Vec<Neighbor<T::Distance>>> {
        let space = self.space.as_ref().ok_or(Error::NotReady)?;
        check_query(query, space.stride())?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut all: Vec<Candidate<T::Distance>> = self
            .data
            .chunks_exact(space.stride())
            .enumerate()
            .map(|(id, row)| Candidate {
                distance: space.distance(query, row),
                id: id as u32,
            })
            .collect();

        if k < all.len() {
            all.select_nth_unstable(k - 1);
            all.truncate(k);
        }
        all.sort_unstable();
        Ok(all.into_iter().map(Neighbor::from).collect())
    }
}

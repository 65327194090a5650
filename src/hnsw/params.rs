//! Construction and search parameters.

use crate::error::ConfigError;

/// Default max neighbors per node on layers >= 1.
pub const DEFAULT_M: usize = 16;
/// Default candidate breadth while inserting.
pub const DEFAULT_EF_CONSTRUCTION: usize = 100;
/// Default floor on query breadth. Effective breadth is `max(k, ef_search)`.
pub const DEFAULT_EF_SEARCH: usize = 256;
/// Default seed for level assignment.
pub const DEFAULT_SEED: u64 = 100;
/// Highest layer a node may be assigned to.
pub const DEFAULT_MAX_LEVEL: usize = 16;

/// HNSW construction parameters.
///
/// ```rust
/// use proxima::hnsw::HnswParams;
///
/// let params = HnswParams::default().with_m(32).with_ef_construction(200);
/// assert_eq!(params.m_max0, 64);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HnswParams {
    /// Max neighbors per node on layers >= 1.
    pub m: usize,
    /// Max neighbors per node on layer 0 (usually `2 * m`).
    pub m_max0: usize,
    /// Candidate list breadth used while inserting.
    pub ef_construction: usize,
    /// Scale of the level distribution; `1 / ln(m)` by default.
    pub level_multiplier: f64,
    /// Cap on drawn levels.
    pub max_level: usize,
    /// Seed for level assignment.
    pub seed: u64,
    /// Worker threads for the build: 0 uses the global rayon pool, 1 builds serially.
    ///
    /// Only a serial build is reproducible; parallel inserts race for neighbor slots.
    pub num_threads: usize,
    /// Refill neighbor lists with heuristically pruned candidates up to the cap.
    pub keep_pruned: bool,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: DEFAULT_M,
            m_max0: 2 * DEFAULT_M,
            ef_construction: DEFAULT_EF_CONSTRUCTION,
            level_multiplier: 1.0 / (DEFAULT_M as f64).ln(),
            max_level: DEFAULT_MAX_LEVEL,
            seed: DEFAULT_SEED,
            num_threads: 0,
            keep_pruned: false,
        }
    }
}

impl HnswParams {
    /// Set `m`, deriving `m_max0` and `level_multiplier` from it.
    pub fn with_m(mut self, m: usize) -> Self {
        self.m = m;
        self.m_max0 = 2 * m;
        self.level_multiplier = 1.0 / (m.max(2) as f64).ln();
        self
    }

    pub fn with_ef_construction(mut self, ef_construction: usize) -> Self {
        self.ef_construction = ef_construction;
        self
    }

    pub fn with_level_multiplier(mut self, level_multiplier: f64) -> Self {
        self.level_multiplier = level_multiplier;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn with_keep_pruned(mut self, keep_pruned: bool) -> Self {
        self.keep_pruned = keep_pruned;
        self
    }

    /// Cap for a neighbor list on `layer`.
    #[inline]
    pub(crate) fn cap(&self, layer: usize) -> usize {
        if layer == 0 {
            self.m_max0
        } else {
            self.m
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.m < 2 {
            return Err(ConfigError::InvalidParameter(format!(
                "m must be at least 2, got {}",
                self.m
            )));
        }
        if self.m_max0 < self.m {
            return Err(ConfigError::InvalidParameter(format!(
                "m_max0 ({}) must be at least m ({})",
                self.m_max0, self.m
            )));
        }
        if self.ef_construction == 0 {
            return Err(ConfigError::InvalidParameter(
                "ef_construction must be positive".into(),
            ));
        }
        if !self.level_multiplier.is_finite() || self.level_multiplier <= 0.0 {
            return Err(ConfigError::InvalidParameter(format!(
                "level_multiplier must be finite and positive, got {}",
                self.level_multiplier
            )));
        }
        if self.max_level > u8::MAX as usize {
            return Err(ConfigError::InvalidParameter(format!(
                "max_level must fit in a u8, got {}",
                self.max_level
            )));
        }
        Ok(())
    }
}

/// Query-time parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchParams {
    /// Floor on the layer-0 candidate list breadth.
    pub ef_search: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            ef_search: DEFAULT_EF_SEARCH,
        }
    }
}

impl SearchParams {
    /// Breadth used for a `k`-NN query.
    #[inline]
    pub fn effective_ef(&self, k: usize) -> usize {
        k.max(self.ef_search).max(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ef_search == 0 {
            return Err(ConfigError::InvalidParameter(
                "ef_search must be positive".into(),
            ));
        }
        Ok(())
    }
}

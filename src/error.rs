//! Error types for proxima.

use crate::metric::{MetricKind, Representation};
use thiserror::Error;

/// Rejected `build` inputs or parameters.
///
/// Detected before any graph mutation; a matcher that fails to build keeps
/// whatever index it already had.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Descriptor dimension is zero or incompatible with the metric.
    #[error("invalid dimension {dimension}: {reason}")]
    InvalidDimension { dimension: usize, reason: &'static str },

    /// No descriptors were supplied.
    #[error("dataset is empty")]
    EmptyDataset,

    /// Dataset length is not a whole number of descriptors.
    #[error("dataset of {len} elements is not a multiple of the descriptor stride {stride}")]
    DatasetShape { len: usize, stride: usize },

    /// The metric cannot be computed over this element representation.
    #[error("{metric:?} distance is not supported for {representation:?} descriptors")]
    MetricMismatch {
        metric: MetricKind,
        representation: Representation,
    },

    /// Too many descriptors to address with 32-bit ids.
    #[error("dataset of {0} descriptors exceeds the u32 id space")]
    TooManyDescriptors(usize),

    /// Invalid construction or search parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Errors returned by matcher operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// `build` was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A query was issued before any successful `build`.
    #[error("matcher has no index; call build first")]
    NotReady,

    /// A ready index returned no hit for a query that needed one.
    #[error("search returned no match")]
    NoMatch,

    /// Query buffer does not hold whole descriptors of the indexed stride.
    #[error("query of {len} elements does not match descriptor stride {stride}")]
    QueryShape { len: usize, stride: usize },
}

impl Error {
    /// True for errors raised by `build` input validation.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

//! Metric spaces over fixed-dimension descriptors.
//!
//! A [`MetricSpace`] pairs a [`MetricKind`] with an element type and resolves the
//! distance kernel once, at construction. Pairs that make no sense (Hamming over
//! floats) are rejected there, so nothing downstream needs to re-check them.
//!
//! | element | L1 | L2 | Hamming |
//! |---------|----|----|---------|
//! | `f32`   | `f32` | `f32` (squared) | rejected |
//! | `u8`    | `u32` | `u32` (squared) | `u32`, dimension in bits |
//!
//! ## Important nuance
//!
//! L2 is reported **squared**. It ranks identically to Euclidean distance and is what
//! the graph compares internally; take the square root yourself if you need metres.

use crate::error::ConfigError;
use crate::simd;
use std::cmp::Ordering;
use std::fmt;

/// Distance norm selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MetricKind {
    /// Sum of absolute differences.
    L1,
    /// Squared Euclidean distance.
    L2,
    /// Differing bits of packed binary descriptors.
    Hamming,
}

/// How descriptor elements are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Representation {
    /// Floating-point components.
    Float,
    /// 8-bit quantized components, compared in the integer domain.
    Integer,
    /// Bits packed eight per byte.
    Binary,
}

/// Scalar distance value produced by a metric.
pub trait Distance: Copy + PartialOrd + fmt::Debug + Send + Sync + 'static {
    /// Distance of a descriptor to itself.
    const ZERO: Self;

    /// Total order used for ranking (NaN-safe for floats).
    fn total_cmp(&self, other: &Self) -> Ordering;

    /// Lossy conversion for reporting.
    fn as_f64(self) -> f64;
}

impl Distance for f32 {
    const ZERO: Self = 0.0;

    #[inline]
    fn total_cmp(&self, other: &Self) -> Ordering {
        f32::total_cmp(self, other)
    }

    fn as_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Distance for u32 {
    const ZERO: Self = 0;

    #[inline]
    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn as_f64(self) -> f64 {
        f64::from(self)
    }
}

/// Distance kernel over two descriptors of equal stride.
pub type Kernel<T> = fn(&[T], &[T]) -> <T as Scalar>::Distance;

/// Descriptor element type.
pub trait Scalar: Copy + fmt::Debug + Send + Sync + 'static {
    /// Distance type produced by every metric over this element.
    type Distance: Distance;

    /// Representation implied by pairing this element with `metric`.
    fn representation(metric: MetricKind) -> Representation;

    /// Kernel for `metric`, or `None` if the pair is unsupported.
    fn kernel(metric: MetricKind) -> Option<Kernel<Self>>;

    /// Bit pattern compared when folding exact duplicate descriptors.
    fn key(self) -> u32;
}

impl Scalar for f32 {
    type Distance = f32;

    fn representation(_metric: MetricKind) -> Representation {
        Representation::Float
    }

    fn kernel(metric: MetricKind) -> Option<Kernel<Self>> {
        match metric {
            MetricKind::L1 => Some(simd::l1_f32 as Kernel<Self>),
            MetricKind::L2 => Some(simd::l2_squared_f32 as Kernel<Self>),
            MetricKind::Hamming => None,
        }
    }

    #[inline]
    fn key(self) -> u32 {
        // Adding zero maps -0.0 onto 0.0.
        (self + 0.0).to_bits()
    }
}

impl Scalar for u8 {
    type Distance = u32;

    fn representation(metric: MetricKind) -> Representation {
        match metric {
            MetricKind::Hamming => Representation::Binary,
            MetricKind::L1 | MetricKind::L2 => Representation::Integer,
        }
    }

    fn kernel(metric: MetricKind) -> Option<Kernel<Self>> {
        match metric {
            MetricKind::L1 => Some(simd::l1_u8 as Kernel<Self>),
            MetricKind::L2 => Some(simd::l2_squared_u8 as Kernel<Self>),
            MetricKind::Hamming => Some(simd::hamming as Kernel<Self>),
        }
    }

    #[inline]
    fn key(self) -> u32 {
        u32::from(self)
    }
}

/// A validated (metric, element type, dimension) triple.
///
/// Stateless apart from the resolved kernel; `Copy` and safe to share across threads.
pub struct MetricSpace<T: Scalar> {
    kind: MetricKind,
    dimension: usize,
    stride: usize,
    kernel: Kernel<T>,
}

impl<T: Scalar> MetricSpace<T> {
    /// Resolve the kernel for `kind` over `T`.
    ///
    /// `dimension` counts components, except for Hamming where it counts bits and
    /// must be a multiple of 8.
    pub fn new(kind: MetricKind, dimension: usize) -> Result<Self, ConfigError> {
        if dimension == 0 {
            return Err(ConfigError::InvalidDimension {
                dimension,
                reason: "must be positive",
            });
        }

        let kernel = T::kernel(kind).ok_or(ConfigError::MetricMismatch {
            metric: kind,
            representation: T::representation(kind),
        })?;

        let stride = match kind {
            MetricKind::Hamming => {
                if dimension % 8 != 0 {
                    return Err(ConfigError::InvalidDimension {
                        dimension,
                        reason: "Hamming dimension is in bits and must be a multiple of 8",
                    });
                }
                dimension / 8
            }
            MetricKind::L1 | MetricKind::L2 => dimension,
        };

        Ok(Self {
            kind,
            dimension,
            stride,
            kernel,
        })
    }

    /// Distance between two descriptors of this space.
    #[inline]
    pub fn distance(&self, a: &[T], b: &[T]) -> T::Distance {
        debug_assert_eq!(a.len(), self.stride);
        debug_assert_eq!(b.len(), self.stride);
        (self.kernel)(a, b)
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn representation(&self) -> Representation {
        T::representation(self.kind)
    }

    /// Declared dimension (bits for Hamming).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Elements of `T` per stored descriptor.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of descriptors in a flat `dataset`, rejecting empty or ragged input.
    pub fn rows(&self, dataset: &[T]) -> Result<usize, ConfigError> {
        if dataset.is_empty() {
            return Err(ConfigError::EmptyDataset);
        }
        if dataset.len() % self.stride != 0 {
            return Err(ConfigError::DatasetShape {
                len: dataset.len(),
                stride: self.stride,
            });
        }
        let rows = dataset.len() / self.stride;
        if u32::try_from(rows).is_err() {
            return Err(ConfigError::TooManyDescriptors(rows));
        }
        Ok(rows)
    }
}

impl<T: Scalar> Clone for MetricSpace<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Scalar> Copy for MetricSpace<T> {}

impl<T: Scalar> fmt::Debug for MetricSpace<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricSpace")
            .field("kind", &self.kind)
            .field("representation", &self.representation())
            .field("dimension", &self.dimension)
            .field("stride", &self.stride)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hamming_over_floats_is_rejected() {
        let err = MetricSpace::<f32>::new(MetricKind::Hamming, 128).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MetricMismatch {
                metric: MetricKind::Hamming,
                representation: Representation::Float,
            }
        );
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(matches!(
            MetricSpace::<f32>::new(MetricKind::L2, 0),
            Err(ConfigError::InvalidDimension { dimension: 0, .. })
        ));
    }

    #[test]
    fn hamming_dimension_counts_bits() {
        let space = MetricSpace::<u8>::new(MetricKind::Hamming, 256).unwrap();
        assert_eq!(space.stride(), 32);
        assert_eq!(space.representation(), Representation::Binary);
        assert!(MetricSpace::<u8>::new(MetricKind::Hamming, 250).is_err());
    }

    #[test]
    fn integer_l2_stays_in_integer_domain() {
        let space = MetricSpace::<u8>::new(MetricKind::L2, 3).unwrap();
        assert_eq!(space.representation(), Representation::Integer);
        assert_eq!(space.distance(&[0, 10, 255], &[3, 6, 255]), 25);
    }

    #[test]
    fn rows_rejects_empty_and_ragged_datasets() {
        let space = MetricSpace::<u8>::new(MetricKind::Hamming, 16).unwrap();
        assert_eq!(space.rows(&[0u8; 6]), Ok(3));
        assert_eq!(space.rows(&[]), Err(ConfigError::EmptyDataset));
        assert_eq!(
            space.rows(&[0u8; 5]),
            Err(ConfigError::DatasetShape { len: 5, stride: 2 })
        );
    }

    #[test]
    fn float_l1_and_l2() {
        let l1 = MetricSpace::<f32>::new(MetricKind::L1, 2).unwrap();
        let l2 = MetricSpace::<f32>::new(MetricKind::L2, 2).unwrap();
        assert!((l1.distance(&[0.0, 0.0], &[3.0, -4.0]) - 7.0).abs() < 1e-6);
        assert!((l2.distance(&[0.0, 0.0], &[3.0, -4.0]) - 25.0).abs() < 1e-6);
        assert_eq!(l2.distance(&[1.5, 2.5], &[1.5, 2.5]), 0.0);
    }
}

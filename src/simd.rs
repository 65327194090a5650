//! Distance kernels over raw descriptor slices.
//!
//! Float L2 goes through the `innr` crate when the `innr` feature is enabled
//! (default); everything else, and float L2 without the feature, is portable
//! code written so the compiler can vectorize it. Floating kernels accumulate
//! into independent lanes over fixed-width chunks, integer kernels widen to
//! `u32` before squaring so no precision is lost.
//!
//! All kernels assume `a.len() == b.len()`; callers ([`crate::metric::MetricSpace`])
//! guarantee it.
//!
//! ```rust
//! use proxima::simd::{hamming, l2_squared_f32};
//!
//! assert_eq!(l2_squared_f32(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
//! assert_eq!(hamming(&[0b1010_1010], &[0b0101_0101]), 8);
//! ```

const LANES: usize = 8;

/// Sum of absolute differences between two float descriptors.
#[inline]
#[must_use]
pub fn l1_f32(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut acc = [0.0f32; LANES];
    let chunks_a = a.chunks_exact(LANES);
    let chunks_b = b.chunks_exact(LANES);
    let tail: f32 = chunks_a
        .remainder()
        .iter()
        .zip(chunks_b.remainder())
        .map(|(x, y)| (x - y).abs())
        .sum();
    for (ca, cb) in chunks_a.zip(chunks_b) {
        for i in 0..LANES {
            acc[i] += (ca[i] - cb[i]).abs();
        }
    }
    acc.iter().sum::<f32>() + tail
}

/// Squared Euclidean distance between two float descriptors.
///
/// Ranking-equivalent to L2 and avoids the square root. SIMD-dispatched through
/// `innr` when the `innr` feature is enabled (default).
#[cfg(feature = "innr")]
pub use innr::l2_distance_squared as l2_squared_f32;

#[cfg(not(feature = "innr"))]
pub use fallback::l2_squared_f32;

#[cfg(not(feature = "innr"))]
mod fallback {
    //! Portable float kernel used when `innr` is not available.

    use super::LANES;

    /// Squared Euclidean distance (portable implementation).
    #[inline]
    #[must_use]
    pub fn l2_squared_f32(a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        let mut acc = [0.0f32; LANES];
        let chunks_a = a.chunks_exact(LANES);
        let chunks_b = b.chunks_exact(LANES);
        let tail: f32 = chunks_a
            .remainder()
            .iter()
            .zip(chunks_b.remainder())
            .map(|(x, y)| (x - y) * (x - y))
            .sum();
        for (ca, cb) in chunks_a.zip(chunks_b) {
            for i in 0..LANES {
                let d = ca[i] - cb[i];
                acc[i] += d * d;
            }
        }
        acc.iter().sum::<f32>() + tail
    }
}

/// Sum of absolute differences between two byte descriptors, in the integer domain.
#[inline]
#[must_use]
pub fn l1_u8(a: &[u8], b: &[u8]) -> u32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(&x, &y)| u32::from(x.abs_diff(y)))
        .sum()
}

/// Squared Euclidean distance between two byte descriptors, in the integer domain.
#[inline]
#[must_use]
pub fn l2_squared_u8(a: &[u8], b: &[u8]) -> u32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = u32::from(x.abs_diff(y));
            d * d
        })
        .sum()
}

/// Number of differing bits between two bit-packed descriptors.
#[inline]
#[must_use]
pub fn hamming(a: &[u8], b: &[u8]) -> u32 {
    debug_assert_eq!(a.len(), b.len());
    let words_a = a.chunks_exact(8);
    let words_b = b.chunks_exact(8);
    let tail: u32 = words_a
        .remainder()
        .iter()
        .zip(words_b.remainder())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum();
    words_a
        .zip(words_b)
        .map(|(wa, wb)| {
            let mut xa = [0u8; 8];
            let mut xb = [0u8; 8];
            xa.copy_from_slice(wa);
            xb.copy_from_slice(wb);
            (u64::from_ne_bytes(xa) ^ u64::from_ne_bytes(xb)).count_ones()
        })
        .sum::<u32>()
        + tail
}

//! Synthetic descriptor sets for benchmarking.
//!
//! Descriptors are stored flat (`rows * stride` elements), the layout every
//! matcher consumes.

use crate::error::Result;
use crate::matcher::{ArrayMatcher, BruteForceMatcher};
use crate::metric::{MetricKind, Scalar};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A database plus a query set of the same dimension.
#[derive(Debug, Clone)]
pub struct Dataset<T> {
    /// Descriptors to index.
    pub train: Vec<T>,
    /// Query descriptors.
    pub test: Vec<T>,
    /// Elements per descriptor.
    pub stride: usize,
}

impl<T> Dataset<T> {
    pub fn n_train(&self) -> usize {
        self.train.len() / self.stride
    }

    pub fn n_test(&self) -> usize {
        self.test.len() / self.stride
    }

    pub fn query(&self, i: usize) -> &[T] {
        &self.test[i * self.stride..(i + 1) * self.stride]
    }

    /// Raw descriptor footprint in bytes.
    pub fn memory_bytes(&self) -> usize {
        (self.train.len() + self.test.len()) * std::mem::size_of::<T>()
    }
}

/// Uniform float descriptors in [0, 1]^d.
///
/// A baseline; real descriptors are clustered and much easier for the graph.
pub fn create_benchmark_dataset(
    n_train: usize,
    n_test: usize,
    dimension: usize,
    seed: u64,
) -> Dataset<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let train = (0..n_train * dimension).map(|_| rng.random::<f32>()).collect();
    let test = (0..n_test * dimension).map(|_| rng.random::<f32>()).collect();
    Dataset {
        train,
        test,
        stride: dimension,
    }
}

/// Gaussian blobs around `n_clusters` uniform centers, clamped to [0, 1].
pub fn create_clustered_dataset(
    n_train: usize,
    n_test: usize,
    dimension: usize,
    n_clusters: usize,
    cluster_std: f32,
    seed: u64,
) -> Dataset<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let n_clusters = n_clusters.max(1);

    let centers: Vec<f32> = (0..n_clusters * dimension)
        .map(|_| rng.random::<f32>())
        .collect();

    let sample = |rng: &mut StdRng, rows: usize| -> Vec<f32> {
        let mut out = Vec::with_capacity(rows * dimension);
        for _ in 0..rows {
            let c = rng.random_range(0..n_clusters);
            for &center in &centers[c * dimension..(c + 1) * dimension] {
                // Box-Muller
                let u1: f32 = rng.random::<f32>().max(f32::MIN_POSITIVE);
                let u2: f32 = rng.random();
                let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
                out.push((center + z * cluster_std).clamp(0.0, 1.0));
            }
        }
        out
    };

    let train = sample(&mut rng, n_train);
    let test = sample(&mut rng, n_test);
    Dataset {
        train,
        test,
        stride: dimension,
    }
}

/// Random packed binary descriptors of `bits` bits each (`bits / 8` bytes).
///
/// Queries are database rows with a few bits flipped, so each has a known
/// near-duplicate.
pub fn create_binary_dataset(n_train: usize, n_test: usize, bits: usize, seed: u64) -> Dataset<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let stride = bits / 8;
    let train: Vec<u8> = (0..n_train * stride).map(|_| rng.random::<u8>()).collect();

    let mut test = Vec::with_capacity(n_test * stride);
    for _ in 0..n_test {
        let row = rng.random_range(0..n_train.max(1));
        let mut q = train[row * stride..(row + 1) * stride].to_vec();
        for _ in 0..3 {
            let bit = rng.random_range(0..bits.max(1));
            q[bit / 8] ^= 1 << (bit % 8);
        }
        test.extend_from_slice(&q);
    }

    Dataset {
        train,
        test,
        stride,
    }
}

/// Exact `k` nearest database ids for every query, by linear scan.
pub fn compute_ground_truth<T: Scalar>(
    dataset: &Dataset<T>,
    dimension: usize,
    metric: MetricKind,
    k: usize,
) -> Result<Vec<Vec<u32>>> {
    let mut exact = BruteForceMatcher::new();
    exact.build(&dataset.train, dimension, metric)?;
    Ok(exact
        .search_batch(&dataset.test, k)?
        .into_iter()
        .map(|hits| hits.into_iter().map(|h| h.id).collect())
        .collect())
}

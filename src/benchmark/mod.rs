//! Benchmark utilities for matcher evaluation.
//!
//! Synthetic descriptor sets, exact ground truth and recall metrics, used by the
//! integration tests, the criterion benches and the demo.
//!
//! # Typical descriptor workloads
//!
//! | Descriptor | Dim | Element | Metric |
//! |------------|-----|---------|--------|
//! | SIFT | 128 | f32 / u8 | L2 |
//! | SURF | 64 | f32 | L2 |
//! | ORB / AKAZE | 256 bits | u8 | Hamming |
//!
//! Reference: <https://ann-benchmarks.com/>

pub mod datasets;
pub mod metrics;

pub use datasets::{
    compute_ground_truth, create_benchmark_dataset, create_binary_dataset,
    create_clustered_dataset, Dataset,
};
pub use metrics::{mean_recall, recall_at_k, top1_accuracy};

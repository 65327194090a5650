//! Basic Descriptor Matching
//!
//! The minimal example: index float and binary descriptors, match queries, and
//! compare against an exhaustive scan.
//!
//! ```bash
//! RUST_LOG=proxima=debug cargo run --example basic_matching --release
//! ```

use proxima::benchmark::{
    compute_ground_truth, create_binary_dataset, create_clustered_dataset, mean_recall,
};
use proxima::{ArrayMatcher, HnswMatcher, HnswParams, MetricKind, SearchParams};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> proxima::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 1. SIFT-like float descriptors: 20k database rows, 500 queries, dimension 128
    let dim = 128;
    let data = create_clustered_dataset(20_000, 500, dim, 50, 0.05, 42);

    // 2. Build
    //    - M=16: links per node above layer 0 (32 on layer 0)
    //    - ef_construction=100: insertion beam width
    //    - ef_search=128: clustered data needs less breadth than the 256 default
    let params = HnswParams::default().with_m(16).with_ef_construction(100);
    let mut matcher = HnswMatcher::with_params(params, SearchParams { ef_search: 128 });
    let start = Instant::now();
    matcher.build(&data.train, dim, MetricKind::L2)?;
    println!("Built {} descriptors in {:?}", matcher.len(), start.elapsed());

    if let Some(stats) = matcher.stats() {
        println!(
            "Layers: {}, mean layer-0 degree: {:.1}, duplicates folded: {}",
            stats.nodes_per_layer.len(),
            stats.mean_degree(0),
            stats.duplicates
        );
    }

    // 3. Match: two nearest neighbors per query, as for a ratio test
    let start = Instant::now();
    let matches = matcher.search_batch(&data.test, 2)?;
    println!("Matched {} queries in {:?}", matches.len(), start.elapsed());

    let first = &matches[0];
    println!(
        "Query 0: best id={} (d={:.4}), second id={} (d={:.4})",
        first[0].id, first[0].distance, first[1].id, first[1].distance
    );

    // 4. Check against exact search
    let truth = compute_ground_truth(&data, dim, MetricKind::L2, 2)?;
    let found: Vec<Vec<u32>> = matches
        .iter()
        .map(|hits| hits.iter().map(|h| h.id).collect())
        .collect();
    println!("Recall@2: {:.3}", mean_recall(&truth, &found, 2));

    // 5. Binary descriptors (256-bit, ORB-like) under Hamming distance
    let binary = create_binary_dataset(20_000, 500, 256, 7);
    let mut orb = HnswMatcher::new();
    orb.build(&binary.train, 256, MetricKind::Hamming)?;
    let pairs = orb.search_matches(&binary.test, 1)?;
    let close = pairs.iter().filter(|(_, d)| *d <= 3).count();
    println!("Binary: {close}/{} queries found their near-duplicate", pairs.len());

    Ok(())
}

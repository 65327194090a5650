//! Benchmarks for HNSW construction and search.
//!
//! End-to-end on synthetic data from `proxima::benchmark`, compared against an
//! exhaustive scan on the same queries. Build logs follow `RUST_LOG`.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use proxima::benchmark::{create_benchmark_dataset, create_binary_dataset};
use proxima::{ArrayMatcher, BruteForceMatcher, HnswMatcher, HnswParams, MetricKind, SearchParams};

const DIM: usize = 128;

fn init_tracing() {
    // Every bench group calls this; only the first install sticks.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn bench_hnsw_construction(c: &mut Criterion) {
    init_tracing();
    let mut group = c.benchmark_group("hnsw_construction");
    group.sample_size(10);

    for n in [1000, 5000, 10000].iter() {
        group.throughput(Throughput::Elements(*n as u64));
        let data = create_benchmark_dataset(*n, 0, DIM, 42);

        group.bench_with_input(BenchmarkId::new("parallel", n), n, |bench, _| {
            bench.iter(|| {
                let mut m = HnswMatcher::new();
                m.build(black_box(&data.train), DIM, MetricKind::L2).unwrap();
                m
            });
        });
        group.bench_with_input(BenchmarkId::new("serial", n), n, |bench, _| {
            bench.iter(|| {
                let mut m = HnswMatcher::with_params(
                    HnswParams::default().with_num_threads(1),
                    SearchParams::default(),
                );
                m.build(black_box(&data.train), DIM, MetricKind::L2).unwrap();
                m
            });
        });
    }

    group.finish();
}

fn bench_hnsw_search(c: &mut Criterion) {
    init_tracing();
    let mut group = c.benchmark_group("hnsw_search");
    let n_queries = 100;
    let data = create_benchmark_dataset(10_000, n_queries, DIM, 42);

    let mut hnsw = HnswMatcher::new();
    hnsw.build(&data.train, DIM, MetricKind::L2).unwrap();

    for ef in [16, 64, 128, 256].iter() {
        group.throughput(Throughput::Elements(n_queries as u64));
        group.bench_with_input(BenchmarkId::new("ef", ef), ef, |bench, &ef| {
            bench.iter(|| {
                (0..n_queries)
                    .map(|q| hnsw.search_with_ef(black_box(data.query(q)), 10, ef).unwrap())
                    .collect::<Vec<_>>()
            });
        });
    }

    group.throughput(Throughput::Elements(n_queries as u64));
    group.bench_function("batch_k10", |bench| {
        bench.iter(|| hnsw.search_batch(black_box(&data.test), 10).unwrap());
    });

    let mut exact = BruteForceMatcher::new();
    exact.build(&data.train, DIM, MetricKind::L2).unwrap();
    group.bench_function("brute_force_batch_k10", |bench| {
        bench.iter(|| exact.search_batch(black_box(&data.test), 10).unwrap());
    });

    group.finish();
}

fn bench_hnsw_search_k(c: &mut Criterion) {
    init_tracing();
    let mut group = c.benchmark_group("hnsw_search_k");
    let n_queries = 100;
    let data = create_benchmark_dataset(10_000, n_queries, DIM, 42);

    let mut hnsw = HnswMatcher::new();
    hnsw.build(&data.train, DIM, MetricKind::L2).unwrap();

    for k in [1, 10, 50, 100].iter() {
        group.throughput(Throughput::Elements(n_queries as u64));
        group.bench_with_input(BenchmarkId::new("k", k), k, |bench, &k| {
            bench.iter(|| hnsw.search_batch(black_box(&data.test), k).unwrap());
        });
    }

    group.finish();
}

fn bench_binary_search(c: &mut Criterion) {
    init_tracing();
    let mut group = c.benchmark_group("hamming_search");
    let n_queries = 100;
    let data = create_binary_dataset(10_000, n_queries, 256, 42);

    let mut hnsw = HnswMatcher::new();
    hnsw.build(&data.train, 256, MetricKind::Hamming).unwrap();

    group.throughput(Throughput::Elements(n_queries as u64));
    group.bench_function("batch_k2", |bench| {
        bench.iter(|| hnsw.search_batch(black_box(&data.test), 2).unwrap());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_hnsw_construction,
    bench_hnsw_search,
    bench_hnsw_search_k,
    bench_binary_search,
);
criterion_main!(benches);

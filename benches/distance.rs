//! Benchmarks for distance kernels.
//!
//! These kernels dominate both graph construction and search.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use proxima::simd::{hamming, l1_f32, l1_u8, l2_squared_f32, l2_squared_u8};
use rand::prelude::*;

fn random_floats(n: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.random::<f32>() * 2.0 - 1.0).collect()
}

fn random_bytes(n: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.random::<u8>()).collect()
}

fn bench_float_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("float");

    for dim in [64, 128, 256, 512].iter() {
        group.throughput(Throughput::Elements(*dim as u64));
        let a = random_floats(*dim, 1);
        let b = random_floats(*dim, 2);

        group.bench_with_input(BenchmarkId::new("l1", dim), dim, |bench, _| {
            bench.iter(|| l1_f32(black_box(&a), black_box(&b)));
        });
        group.bench_with_input(BenchmarkId::new("l2_squared", dim), dim, |bench, _| {
            bench.iter(|| l2_squared_f32(black_box(&a), black_box(&b)));
        });
    }

    group.finish();
}

fn bench_byte_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("byte");

    for dim in [64, 128].iter() {
        group.throughput(Throughput::Elements(*dim as u64));
        let a = random_bytes(*dim, 3);
        let b = random_bytes(*dim, 4);

        group.bench_with_input(BenchmarkId::new("l1", dim), dim, |bench, _| {
            bench.iter(|| l1_u8(black_box(&a), black_box(&b)));
        });
        group.bench_with_input(BenchmarkId::new("l2_squared", dim), dim, |bench, _| {
            bench.iter(|| l2_squared_u8(black_box(&a), black_box(&b)));
        });
    }

    group.finish();
}

fn bench_hamming(c: &mut Criterion) {
    let mut group = c.benchmark_group("hamming");

    // ORB/BRIEF (256), FREAK (512), AKAZE MLDB (486 padded to 488).
    for bits in [256usize, 488, 512].iter() {
        group.throughput(Throughput::Elements(*bits as u64));
        let a = random_bytes(bits / 8, 5);
        let b = random_bytes(bits / 8, 6);

        group.bench_with_input(BenchmarkId::from_parameter(bits), bits, |bench, _| {
            bench.iter(|| hamming(black_box(&a), black_box(&b)));
        });
    }

    group.finish();
}

fn bench_batch_distances(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_l2");
    let dim = 128;

    for n in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*n as u64));
        let query = random_floats(dim, 7);
        let database = random_floats(n * dim, 8);

        group.bench_with_input(BenchmarkId::from_parameter(n), n, |bench, _| {
            bench.iter(|| {
                database
                    .chunks_exact(dim)
                    .map(|row| l2_squared_f32(black_box(&query), black_box(row)))
                    .collect::<Vec<_>>()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_float_kernels,
    bench_byte_kernels,
    bench_hamming,
    bench_batch_distances,
);
criterion_main!(benches);

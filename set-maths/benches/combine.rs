use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use num_bigint::BigInt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use set_core::{is_probable_prime, mersenne};
use set_maths::{combine, CombineConfig};

fn bench_is_probable_prime(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_probable_prime");

    for p in [61u32, 127, 521, 1279] {
        let n = mersenne(p);
        group.bench_with_input(BenchmarkId::from_parameter(p), &n, |b, n| {
            b.iter(|| is_probable_prime(n));
        });
    }

    group.finish();
}

fn bench_combine(c: &mut Criterion) {
    let mut group = c.benchmark_group("combine");
    group.sample_size(10);
    let mut rng = StdRng::seed_from_u64(42);

    let x: Vec<BigInt> = (0..2_000).map(|_| BigInt::from(rng.gen::<u64>())).collect();
    let y: Vec<BigInt> = (0..2_000).map(|_| BigInt::from(rng.gen_range(1u64..1_000_000))).collect();

    for workers in [1usize, 2, 4, 8] {
        let config = CombineConfig::with_workers(workers);
        group.bench_with_input(BenchmarkId::from_parameter(workers), &config, |b, config| {
            b.iter(|| combine(&x, &y, x.len(), config));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_is_probable_prime, bench_combine);
criterion_main!(benches);

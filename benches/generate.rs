use std::io;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use kindling::generate::{perf, stacks, Generate};
use rand::rngs::SmallRng;
use rand::SeedableRng;

const NSAMPLES: usize = 10_000;

fn stacks(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    group.throughput(Throughput::Elements(NSAMPLES as u64));
    group.bench_function("stacks", |b| {
        let mut generator = stacks::Generator::default();
        b.iter(|| {
            let mut rng = SmallRng::seed_from_u64(97);
            generator
                .generate(&mut rng, NSAMPLES, io::sink())
                .unwrap();
        })
    });
    group.finish();
}

fn perf(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    group.throughput(Throughput::Elements(NSAMPLES as u64));
    group.bench_function("perf", |b| {
        let mut generator = perf::Generator::from(perf::Options {
            epoch: Some(1_722_680_000.0),
            ..perf::Options::default()
        });
        b.iter(|| {
            let mut rng = SmallRng::seed_from_u64(97);
            generator
                .generate(&mut rng, NSAMPLES, io::sink())
                .unwrap();
        })
    });
    group.finish();
}

criterion_group!(benches, stacks, perf);
criterion_main!(benches);

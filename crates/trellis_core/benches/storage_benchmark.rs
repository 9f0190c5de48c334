//! # Sparse vs Packed Storage Benchmark
//!
//! Compares the two data-carrying backends on the same workload:
//! 1. Id-ordered random access through the world
//! 2. Dense slot iteration (packed only)
//! 3. Churn: remove and re-add a quarter of the holders

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trellis_core::{Component, ComponentStorage, EcsConfig, Entity, PackedStorage, SparseStorage};

const ENTITY_COUNT: usize = 100_000;

#[derive(Clone, Copy, Default)]
struct Heat(f32);
impl Component for Heat {}

/// Deterministic "random" ids (xorshift).
fn generate_random_ids(count: usize, max: usize, seed: u64) -> Vec<Entity> {
    let mut ids = Vec::with_capacity(count);
    let mut state = seed;

    for _ in 0..count {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        ids.push(Entity::from_raw((state % max as u64) as u32));
    }

    ids
}

fn filled<S: ComponentStorage<Heat>>(mut storage: S) -> S {
    for i in 0..ENTITY_COUNT {
        storage.add(Entity::from_raw(i as u32), Heat(i as f32));
    }
    storage
}

fn bench_random_access(c: &mut Criterion) {
    let config = EcsConfig::dynamic();
    let sparse = filled(SparseStorage::new(&config));
    let packed = filled(PackedStorage::new(&config));
    let ids = generate_random_ids(ENTITY_COUNT, ENTITY_COUNT, 0x5eed);

    let mut group = c.benchmark_group("random_access");
    group.bench_function("sparse", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for &e in &ids {
                sum += sparse.get(e).map_or(0.0, |h| h.0);
            }
            black_box(sum)
        });
    });
    group.bench_function("packed", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for &e in &ids {
                sum += packed.get(e).map_or(0.0, |h| h.0);
            }
            black_box(sum)
        });
    });
    group.finish();
}

fn bench_dense_iteration(c: &mut Criterion) {
    let mut packed = filled(PackedStorage::new(&EcsConfig::dynamic()));

    c.bench_function("packed_dense_iter_mut", |b| {
        b.iter(|| {
            for heat in packed.values_mut() {
                heat.0 *= 0.99;
            }
            black_box(packed.len())
        });
    });
}

fn bench_churn(c: &mut Criterion) {
    let config = EcsConfig::dynamic();
    let mut sparse = filled(SparseStorage::new(&config));
    let mut packed = filled(PackedStorage::new(&config));
    let victims: Vec<Entity> = (0..ENTITY_COUNT / 4)
        .map(|i| Entity::from_raw((i * 4) as u32))
        .collect();

    let mut group = c.benchmark_group("churn_25K");
    group.bench_function("sparse", |b| {
        b.iter(|| {
            for &e in &victims {
                sparse.remove(e);
                sparse.add(e, Heat(1.0));
            }
        });
    });
    group.bench_function("packed", |b| {
        b.iter(|| {
            for &e in &victims {
                packed.remove(e);
            }
            for &e in &victims {
                packed.add(e, Heat(1.0));
            }
            black_box(packed.len())
        });
    });
    group.finish();
}

criterion_group!(benches, bench_random_access, bench_dense_iteration, bench_churn);
criterion_main!(benches);

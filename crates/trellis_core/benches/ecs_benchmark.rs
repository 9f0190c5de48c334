//! # ECS Performance Benchmark
//!
//! Entity lifecycle and mask queries:
//! - create / destroy / recycle cycles
//! - attaching bundles
//! - scanning the id range with a query mask
//!
//! Run with: `cargo bench --package trellis_core --bench ecs_benchmark`

// Benchmarks don't need docs
#![allow(missing_docs)]
#![allow(dead_code)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trellis_core::{Component, EcsConfig, Entity, StorageKind, World};

/// Entities per benchmark world.
const ENTITY_COUNT: usize = 100_000;

#[derive(Clone, Copy, Default)]
struct Position {
    x: f32,
    y: f32,
}
impl Component for Position {}

#[derive(Clone, Copy, Default)]
struct Velocity {
    dx: f32,
    dy: f32,
}
impl Component for Velocity {
    const STORAGE: StorageKind = StorageKind::Packed;
}

#[derive(Clone, Copy, Default)]
struct Frozen;
impl Component for Frozen {
    const STORAGE: StorageKind = StorageKind::Tagged;
}

fn populated_world(count: usize) -> World {
    let mut world = World::new(EcsConfig::dynamic());
    for i in 0..count {
        let e = world.create_entity();
        let f = i as f32;
        world.add_components(e, (Position { x: f, y: f }, Velocity { dx: 0.1, dy: 0.2 }));
        if i % 4 == 0 {
            world.add_component(e, Frozen);
        }
    }
    world
}

/// Benchmark: Create entities into a growing world.
fn bench_create_entities(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_entities");

    for count in [1_000, 10_000, ENTITY_COUNT] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut world = World::new(EcsConfig::dynamic());
                for _ in 0..count {
                    black_box(world.create_entity());
                }
                world.max_id()
            });
        });
    }

    group.finish();
}

/// Benchmark: Attach a two-component bundle to every entity.
fn bench_attach_bundle(c: &mut Criterion) {
    c.bench_function("attach_bundle_100K", |b| {
        b.iter(|| black_box(populated_world(ENTITY_COUNT)).stats());
    });
}

/// Benchmark: Scan all ids with a query mask and move the matches.
fn bench_query_update(c: &mut Criterion) {
    let mut world = populated_world(ENTITY_COUNT);
    let movers = world
        .mask_builder()
        .require::<Position>()
        .require::<Velocity>()
        .build();
    let mut matches: Vec<Entity> = Vec::with_capacity(ENTITY_COUNT);

    c.bench_function("query_move_100K", |b| {
        b.iter(|| {
            matches.clear();
            matches.extend(world.query(&movers));
            for &e in &matches {
                let v = *world.get_component::<Velocity>(e);
                let p = world.get_component_mut::<Position>(e);
                p.x += v.dx * 0.016;
                p.y += v.dy * 0.016;
            }
            black_box(matches.len())
        });
    });
}

/// Benchmark: Destroy and recreate a slice of the world (id recycling).
fn bench_destroy_recycle_cycle(c: &mut Criterion) {
    let mut world = World::new(EcsConfig::dynamic());
    let mut ids: Vec<Entity> = (0..ENTITY_COUNT).map(|_| world.create_entity()).collect();

    c.bench_function("destroy_recycle_cycle_10K", |b| {
        b.iter(|| {
            for id in ids.iter().take(10_000) {
                world.destroy_entity(*id);
            }
            for id in ids.iter_mut().take(10_000) {
                *id = world.create_entity();
            }
            black_box(world.stats().free)
        });
    });
}

criterion_group!(
    benches,
    bench_create_entities,
    bench_attach_bundle,
    bench_query_update,
    bench_destroy_recycle_cycle,
);

criterion_main!(benches);

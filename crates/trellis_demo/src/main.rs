//! # Movement Walkthrough
//!
//! Spawns a handful of movers, tags some of them frozen, and runs a few
//! ticks of a movement system over a prebuilt query mask.
//!
//! ```text
//! trellis_demo [world.toml]
//! ```

use std::process::ExitCode;

use bytemuck::{Pod, Zeroable};
use trellis_core::{Component, EcsConfig, EcsError, Entity, Mask, StorageKind, World};

/// Grid position.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
struct Position {
    x: i32,
    y: i32,
}
impl Component for Position {}

/// Per-tick step.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
struct Direction {
    dx: i32,
    dy: i32,
}
impl Component for Direction {
    const STORAGE: StorageKind = StorageKind::Packed;
}

/// Marks an entity the movement system skips.
#[derive(Clone, Copy, Debug, Default)]
struct Frozen;
impl Component for Frozen {
    const STORAGE: StorageKind = StorageKind::Tagged;
}

const MOVERS: i32 = 8;
const TICKS: usize = 3;

fn load_config() -> Result<EcsConfig, EcsError> {
    match std::env::args().nth(1) {
        Some(path) => EcsConfig::load(path),
        None => Ok(EcsConfig::dynamic()),
    }
}

/// Moves every entity matching `movers` that is not frozen.
fn movement_system(world: &mut World, movers: &Mask, frozen: &Mask) -> usize {
    let targets: Vec<Entity> = world
        .query(movers)
        .filter(|&e| !world.mask(e).contains(frozen))
        .collect();

    for &e in &targets {
        let step = *world.get_component::<Direction>(e);
        let pos = world.get_component_mut::<Position>(e);
        pos.x += step.dx;
        pos.y += step.dy;
    }
    targets.len()
}

fn run(config: EcsConfig) -> Result<(), EcsError> {
    let mut world = World::try_new(config)?;

    let movers = world
        .mask_builder()
        .require::<Position>()
        .require::<Direction>()
        .build();
    let frozen = world.mask_builder().require::<Frozen>().build();

    for i in 0..MOVERS {
        let e = world.try_create_entity()?;
        world.try_add_components(e, (Position { x: i, y: 0 }, Direction { dx: 1, dy: i % 3 }))?;
        if i % 4 == 3 {
            world.try_add_component(e, Frozen)?;
        }
    }

    // One bystander with a position only.
    let bystander = world.spawn().add(Position { x: -1, y: -1 }).id();

    for tick in 0..TICKS {
        let moved = movement_system(&mut world, &movers, &frozen);
        tracing::debug!(tick, moved, "movement pass");
        println!("tick {tick}: moved {moved} entities");
    }

    for e in world.query(&movers).collect::<Vec<_>>() {
        let pos = world.try_get_component::<Position>(e)?;
        let raw: &[u8] = bytemuck::bytes_of(pos);
        println!(
            "{e}: ({}, {}){} [{} bytes]",
            pos.x,
            pos.y,
            if world.has_component::<Frozen>(e) { " frozen" } else { "" },
            raw.len()
        );
    }

    world.despawn(bystander);
    let stats = world.stats();
    println!(
        "issued {} ids, {} free, {} component types, {} storages",
        stats.issued, stats.free, stats.component_types, stats.storages
    );
    Ok(())
}

fn main() -> ExitCode {
    let result = load_config().and_then(run);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("trellis_demo: {e}");
            ExitCode::FAILURE
        }
    }
}

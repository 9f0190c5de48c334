//! # TRELLIS Core Engine
//!
//! In-process entity/component storage engine:
//! - Entity ids allocated densely and recycled last-in-first-out
//! - Presence masks (one or more machine words) for O(1) queries
//! - Sparse, packed and tagged storage backends, chosen per component type
//! - Fixed-capacity or doubling buffers, chosen per world
//!
//! ## Contract
//!
//! The fast paths trust the caller. Reading a component the mask does not
//! carry, indexing past a fixed capacity, or registering more component
//! types than configured are contract violations: they panic or make bits
//! alias, they are never reported. Every such boundary has a `try_*` twin
//! returning [`EcsError`] instead.
//!
//! The engine is single-threaded. A `World` is an owned value with no
//! interior locking.
//!
//! ## Example
//!
//! ```rust,ignore
//! use trellis_core::{Component, EcsConfig, World};
//!
//! #[derive(Clone, Copy, Default)]
//! struct Position { x: i32, y: i32 }
//! impl Component for Position {}
//!
//! let mut world = World::new(EcsConfig::dynamic());
//! let e = world.create_entity();
//! world.add_component(e, Position { x: 1, y: 2 });
//!
//! let query = world.mask_builder().require::<Position>().build();
//! assert_eq!(world.query(&query).count(), 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod memory;

pub use config::{EcsConfig, GrowthMode, StorageKind};
pub use ecs::{
    Bundle, Component, ComponentBit, ComponentInfo, ComponentRegistry, ComponentStorage, Entity,
    EntityMut, EntityRegistry, Mask, MaskBuilder, MaskLayout, PackedStorage, SparseStorage,
    Storage, TaggedStorage, World, WorldStats,
};
pub use error::{EcsError, EcsResult};
pub use memory::Buffer;

//! # Entity Component System
//!
//! A bitmask ECS with per-type storage strategies.
//!
//! ## Design Philosophy
//!
//! - Entities are dense integer ids, recycled last-in-first-out
//! - Each entity owns a presence mask; queries are subset tests on masks
//! - Each component type picks one backend (sparse, packed or tagged) for
//!   the life of the world
//! - Presence is only ever read from the mask, never inferred from storage

mod builder;
mod component;
mod entity;
mod mask;
mod storage;
mod world;

pub use builder::{Bundle, EntityMut, MaskBuilder};
pub use component::{short_name, Component, ComponentInfo, ComponentRegistry};
pub use entity::{Entity, EntityRegistry};
pub use mask::{ComponentBit, Mask, MaskLayout, WORD_BITS};
pub use storage::{
    ComponentStorage, ErasedStorage, PackedStorage, SparseStorage, Storage, TaggedStorage,
};
pub use world::{World, WorldStats};

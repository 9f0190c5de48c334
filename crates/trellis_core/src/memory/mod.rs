//! # Memory Management
//!
//! Backing buffers for the mask table, free list and storage backends.
//!
//! ## Design Philosophy
//!
//! Capacity is decided up front from [`EcsConfig`](crate::EcsConfig):
//! - `Fixed` buffers never reallocate, a hard ceiling for real-time targets
//! - `Dynamic` buffers double when exceeded and keep every element in place

mod buffer;

pub use buffer::Buffer;

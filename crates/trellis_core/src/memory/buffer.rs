//! # Growable Buffer
//!
//! Backing array shared by the mask table, the free list and every storage
//! backend.
//!
//! Unlike `Vec`, every slot below `capacity` is addressable, not only the
//! slots below `len`. Id-indexed users (sparse storage, sparse maps) write
//! at arbitrary positions after [`Buffer::ensure`] and never touch `len`;
//! stack-like users (`push`/`pop`) use `len` as the logical size.

use std::ops::{Index, IndexMut};

use crate::config::GrowthMode;
use crate::error::{EcsError, EcsResult};

/// A fixed-capacity or doubling backing array.
///
/// Slots are pre-filled with `T::default()` so any position below capacity
/// can be read or written.
///
/// # Example
///
/// ```rust,ignore
/// let mut buffer: Buffer<u32> = Buffer::new(GrowthMode::Dynamic, 2);
/// buffer.push(1);
/// buffer.push(2);
/// buffer.push(3); // capacity doubles to 4
/// assert_eq!(buffer.pop(), Some(3));
/// ```
#[derive(Clone, Debug)]
pub struct Buffer<T> {
    /// All slots, `slots.len()` is the capacity.
    slots: Vec<T>,
    /// Logical size for push/pop.
    len: usize,
    /// Growth policy.
    mode: GrowthMode,
}

impl<T: Default> Buffer<T> {
    /// Creates a buffer with `capacity` default-initialised slots.
    #[must_use]
    pub fn new(mode: GrowthMode, capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, T::default);
        Self {
            slots,
            len: 0,
            mode,
        }
    }

    /// Returns the growth policy.
    #[inline]
    #[must_use]
    pub const fn mode(&self) -> GrowthMode {
        self.mode
    }

    /// Returns the logical size.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing has been pushed.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of addressable slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Appends a value, growing in dynamic mode.
    ///
    /// # Panics
    ///
    /// Panics in fixed mode when the buffer is full.
    #[inline]
    pub fn push(&mut self, value: T) {
        if self.len == self.capacity() {
            self.grow_to(self.len + 1);
        }
        self.slots[self.len] = value;
        self.len += 1;
    }

    /// Appends a value, reporting overflow of a fixed buffer.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExceeded`] in fixed mode when full.
    pub fn try_push(&mut self, value: T) -> EcsResult<()> {
        self.try_ensure(self.len)?;
        self.push(value);
        Ok(())
    }

    /// Removes and returns the last pushed value.
    ///
    /// The vacated slot is reset to `T::default()`.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(std::mem::take(&mut self.slots[self.len]))
    }

    /// Guarantees that a slot exists at `index`.
    ///
    /// Grows to `max(index + 1, capacity * 2)` in dynamic mode. In fixed mode
    /// this does nothing; indexing past capacity afterwards panics.
    #[inline]
    pub fn ensure(&mut self, index: usize) {
        if index >= self.capacity() && self.mode == GrowthMode::Dynamic {
            self.grow_to(index + 1);
        }
    }

    /// Guarantees that a slot exists at `index`, reporting fixed overflow.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExceeded`] if the buffer is fixed and
    /// `index` is past its capacity.
    pub fn try_ensure(&mut self, index: usize) -> EcsResult<()> {
        if index >= self.capacity() && self.mode == GrowthMode::Fixed {
            return Err(EcsError::CapacityExceeded {
                capacity: self.capacity(),
                requested: index,
            });
        }
        self.ensure(index);
        Ok(())
    }

    /// Resets the logical size to zero. Capacity and slot contents are kept.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Gets a slot by position, or `None` past capacity.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    /// Gets a mutable slot by position, or `None` past capacity.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)
    }

    /// Returns the pushed values.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.slots[..self.len]
    }

    /// Returns the pushed values mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.slots[..self.len]
    }

    /// Iterates over the pushed values.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    fn grow_to(&mut self, requested: usize) {
        let old = self.capacity();
        assert!(
            self.mode == GrowthMode::Dynamic,
            "fixed-capacity buffer overflow: capacity {old}, requested {requested}"
        );
        let new = requested.max(old * 2);
        self.slots.resize_with(new, T::default);
        tracing::trace!(old, new, "buffer grew");
    }
}

impl<T> Index<usize> for Buffer<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.slots[index]
    }
}

impl<T> IndexMut<usize> for Buffer<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.slots[index]
    }
}

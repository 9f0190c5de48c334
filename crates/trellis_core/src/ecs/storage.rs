//! # Component Storage
//!
//! Three interchangeable backends, one instance per component type:
//!
//! | Backend | Layout | `remove` | Best for |
//! |---|---|---|---|
//! | [`SparseStorage`] | one slot per entity id | no-op | components on most entities |
//! | [`PackedStorage`] | dense values + id map | swap-remove | frequent add/remove, bulk iteration |
//! | [`TaggedStorage`] | nothing | no-op | payload-free markers |
//!
//! None of the backends knows whether an entity "has" a component. Presence
//! lives in the entity's [`Mask`](super::Mask) and must be checked there
//! first: sparse slots keep stale values after removal, and packed lookups
//! for absent entities read whatever the id map happens to hold.

use std::any::Any;
use std::marker::PhantomData;

use super::entity::Entity;
use crate::config::{EcsConfig, StorageKind};
use crate::memory::Buffer;

/// Operations every backend provides for one component type.
pub trait ComponentStorage<T> {
    /// Stores `value` for `entity`.
    fn add(&mut self, entity: Entity, value: T);

    /// Drops `entity`'s value, if the backend tracks removal at all.
    fn remove(&mut self, entity: Entity);

    /// Reads `entity`'s value. `None` means the backend cannot answer
    /// (tag storage, or a slot past capacity), not that the entity lacks the
    /// component.
    fn get(&self, entity: Entity) -> Option<&T>;

    /// Mutable [`ComponentStorage::get`].
    fn get_mut(&mut self, entity: Entity) -> Option<&mut T>;
}

// =============================================================================
// Sparse
// =============================================================================

/// Id-indexed storage: slot `i` belongs to entity `i`.
///
/// `remove` deliberately leaves the slot alone. The stale value stays until
/// the next `add` for the same id.
#[derive(Debug)]
pub struct SparseStorage<T> {
    slots: Buffer<T>,
}

impl<T: Default> SparseStorage<T> {
    /// Creates storage with `initial_entities` slots.
    #[must_use]
    pub fn new(config: &EcsConfig) -> Self {
        Self {
            slots: Buffer::new(config.growth_mode, config.initial_entities),
        }
    }

    /// Number of addressable slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Checks that a slot exists for `entity`, growing if allowed.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExceeded`](crate::EcsError::CapacityExceeded)
    /// for fixed storage too small for the id.
    pub fn try_reserve(&mut self, entity: Entity) -> crate::EcsResult<()> {
        self.slots.try_ensure(entity.index())
    }
}

impl<T: Default> ComponentStorage<T> for SparseStorage<T> {
    /// # Panics
    ///
    /// Panics if fixed storage has no slot for the id.
    #[inline]
    fn add(&mut self, entity: Entity, value: T) {
        self.slots.ensure(entity.index());
        self.slots[entity.index()] = value;
    }

    #[inline]
    fn remove(&mut self, _entity: Entity) {}

    #[inline]
    fn get(&self, entity: Entity) -> Option<&T> {
        self.slots.get(entity.index())
    }

    #[inline]
    fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.slots.get_mut(entity.index())
    }
}

// =============================================================================
// Packed
// =============================================================================

/// Dense storage with an id-to-slot map.
///
/// Values of all holders sit contiguously in `dense`, `owners[i]` is the
/// entity owning `dense[i]`, and `sparse[id]` maps an entity back to its
/// slot. Removal swaps the last value into the hole, so slot order changes
/// on every removal.
#[derive(Debug)]
pub struct PackedStorage<T> {
    dense: Buffer<T>,
    owners: Buffer<Entity>,
    sparse: Buffer<usize>,
}

impl<T: Default> PackedStorage<T> {
    /// Creates storage with `initial_packed` dense slots and
    /// `initial_entities` map entries.
    #[must_use]
    pub fn new(config: &EcsConfig) -> Self {
        Self {
            dense: Buffer::new(config.growth_mode, config.initial_packed),
            owners: Buffer::new(config.growth_mode, config.initial_packed),
            sparse: Buffer::new(config.growth_mode, config.initial_entities),
        }
    }

    /// Number of holders.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.dense.len()
    }

    /// True if nobody holds this component.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Value in dense slot `slot`.
    #[inline]
    #[must_use]
    pub fn get_at(&self, slot: usize) -> Option<&T> {
        self.dense.as_slice().get(slot)
    }

    /// Owner of dense slot `slot`.
    #[inline]
    #[must_use]
    pub fn entity_at(&self, slot: usize) -> Option<Entity> {
        self.owners.as_slice().get(slot).copied()
    }

    /// Dense slot currently holding `entity`'s value, if it holds one.
    #[must_use]
    pub fn slot_of(&self, entity: Entity) -> Option<usize> {
        let slot = *self.sparse.get(entity.index())?;
        (self.entity_at(slot)? == entity).then_some(slot)
    }

    /// `entity`'s value, only if it really holds a slot here.
    #[inline]
    pub fn held_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let slot = self.slot_of(entity)?;
        self.dense.as_mut_slice().get_mut(slot)
    }

    /// True if `entity` has a value here.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.slot_of(entity).is_some()
    }

    /// All values in slot order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[T] {
        self.dense.as_slice()
    }

    /// All values in slot order, mutably.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [T] {
        self.dense.as_mut_slice()
    }

    /// All owners in slot order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        self.owners.as_slice()
    }

    /// Iterates `(owner, value)` in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.owners.iter().copied().zip(self.dense.iter())
    }

    /// Iterates `(owner, value)` in slot order with mutable values.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.owners
            .as_slice()
            .iter()
            .copied()
            .zip(self.dense.as_mut_slice().iter_mut())
    }

    /// Checks that `entity` can be added without overflowing fixed buffers.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExceeded`](crate::EcsError::CapacityExceeded)
    /// if the id map or dense arrays are fixed and full.
    pub fn try_reserve(&mut self, entity: Entity) -> crate::EcsResult<()> {
        self.sparse.try_ensure(entity.index())?;
        self.dense.try_ensure(self.dense.len())?;
        self.owners.try_ensure(self.owners.len())
    }
}

impl<T: Default> ComponentStorage<T> for PackedStorage<T> {
    /// # Panics
    ///
    /// Panics if a fixed buffer is full.
    #[inline]
    fn add(&mut self, entity: Entity, value: T) {
        self.sparse.ensure(entity.index());
        self.sparse[entity.index()] = self.dense.len();
        self.dense.push(value);
        self.owners.push(entity);
    }

    /// Swap-remove.
    ///
    /// # Panics
    ///
    /// Panics if the storage is empty. Removing an entity that is not
    /// stored here corrupts the id map.
    fn remove(&mut self, entity: Entity) {
        let slot = self.sparse[entity.index()];
        let (Some(last_owner), Some(last_value)) = (self.owners.pop(), self.dense.pop()) else {
            panic!("remove from empty packed storage (entity {entity})");
        };
        if slot != self.dense.len() {
            self.dense[slot] = last_value;
            self.owners[slot] = last_owner;
            self.sparse[last_owner.index()] = slot;
        }
    }

    #[inline]
    fn get(&self, entity: Entity) -> Option<&T> {
        let slot = *self.sparse.get(entity.index())?;
        self.dense.as_slice().get(slot)
    }

    #[inline]
    fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let slot = *self.sparse.get(entity.index())?;
        self.dense.as_mut_slice().get_mut(slot)
    }
}

// =============================================================================
// Tagged
// =============================================================================

/// Presence-only storage. The mask bit is the whole story.
#[derive(Debug)]
pub struct TaggedStorage<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> TaggedStorage<T> {
    /// Creates tag storage.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for TaggedStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ComponentStorage<T> for TaggedStorage<T> {
    #[inline]
    fn add(&mut self, _entity: Entity, _value: T) {}

    #[inline]
    fn remove(&mut self, _entity: Entity) {}

    #[inline]
    fn get(&self, _entity: Entity) -> Option<&T> {
        None
    }

    #[inline]
    fn get_mut(&mut self, _entity: Entity) -> Option<&mut T> {
        None
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// The backend chosen for one component type.
#[derive(Debug)]
pub enum Storage<T> {
    /// Id-indexed.
    Sparse(SparseStorage<T>),
    /// Dense with swap-remove.
    Packed(PackedStorage<T>),
    /// Presence only.
    Tagged(TaggedStorage<T>),
}

impl<T: Default> Storage<T> {
    /// Builds the backend for `kind`.
    #[must_use]
    pub fn new(kind: StorageKind, config: &EcsConfig) -> Self {
        match kind {
            StorageKind::Sparse => Self::Sparse(SparseStorage::new(config)),
            StorageKind::Packed => Self::Packed(PackedStorage::new(config)),
            StorageKind::Tagged => Self::Tagged(TaggedStorage::new()),
        }
    }

    /// Which backend this is.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> StorageKind {
        match self {
            Self::Sparse(_) => StorageKind::Sparse,
            Self::Packed(_) => StorageKind::Packed,
            Self::Tagged(_) => StorageKind::Tagged,
        }
    }

    /// Returns the packed backend, if that is what this is.
    #[inline]
    #[must_use]
    pub const fn as_packed(&self) -> Option<&PackedStorage<T>> {
        match self {
            Self::Packed(packed) => Some(packed),
            _ => None,
        }
    }

    /// Returns the packed backend mutably, if that is what this is.
    #[inline]
    pub fn as_packed_mut(&mut self) -> Option<&mut PackedStorage<T>> {
        match self {
            Self::Packed(packed) => Some(packed),
            _ => None,
        }
    }

    /// Checks that adding `entity` will not overflow a fixed buffer.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExceeded`](crate::EcsError::CapacityExceeded)
    /// when it would.
    pub fn try_reserve(&mut self, entity: Entity) -> crate::EcsResult<()> {
        match self {
            Self::Sparse(sparse) => sparse.try_reserve(entity),
            Self::Packed(packed) => packed.try_reserve(entity),
            Self::Tagged(_) => Ok(()),
        }
    }
}

impl<T: Default> ComponentStorage<T> for Storage<T> {
    #[inline]
    fn add(&mut self, entity: Entity, value: T) {
        match self {
            Self::Sparse(s) => s.add(entity, value),
            Self::Packed(s) => s.add(entity, value),
            Self::Tagged(s) => s.add(entity, value),
        }
    }

    #[inline]
    fn remove(&mut self, entity: Entity) {
        match self {
            Self::Sparse(s) => s.remove(entity),
            Self::Packed(s) => s.remove(entity),
            Self::Tagged(s) => s.remove(entity),
        }
    }

    #[inline]
    fn get(&self, entity: Entity) -> Option<&T> {
        match self {
            Self::Sparse(s) => s.get(entity),
            Self::Packed(s) => s.get(entity),
            Self::Tagged(s) => s.get(entity),
        }
    }

    #[inline]
    fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        match self {
            Self::Sparse(s) => s.get_mut(entity),
            Self::Packed(s) => s.get_mut(entity),
            Self::Tagged(s) => s.get_mut(entity),
        }
    }
}

/// Type-erased view of a [`Storage<T>`], as held by the world.
pub trait ErasedStorage: Any {
    /// Which backend this is.
    fn kind(&self) -> StorageKind;

    /// Removes `entity`'s value without knowing `T`.
    fn remove_entity(&mut self, entity: Entity);

    /// Upcast for downcasting to `Storage<T>`.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to `Storage<T>`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Default + 'static> ErasedStorage for Storage<T> {
    fn kind(&self) -> StorageKind {
        Storage::kind(self)
    }

    fn remove_entity(&mut self, entity: Entity) {
        self.remove(entity);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

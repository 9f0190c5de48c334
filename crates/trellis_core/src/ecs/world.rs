//! # ECS World
//!
//! The context object owning every registry and backend. Worlds share no
//! state, so tests (or several simulations) can run side by side.
//!
//! Most operations come in two flavours:
//! - unchecked (`add_component`, `get_component`, ...): trust the caller,
//!   panic on a contract violation
//! - checked (`try_*`): validate and return an [`EcsError`]

use std::any::TypeId;
use std::collections::HashMap;

use super::builder::{Bundle, EntityMut, MaskBuilder};
use super::component::{short_name, Component, ComponentInfo, ComponentRegistry};
use super::entity::{Entity, EntityRegistry};
use super::mask::Mask;
use super::storage::{ComponentStorage, ErasedStorage, PackedStorage, Storage};
use crate::config::{EcsConfig, StorageKind};
use crate::error::{EcsError, EcsResult};

/// Snapshot of world bookkeeping, for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Ids ever minted.
    pub issued: u32,
    /// Ids waiting on the free list.
    pub free: usize,
    /// Registered component types.
    pub component_types: usize,
    /// Instantiated storage backends.
    pub storages: usize,
}

/// The ECS World - container for entities, masks and component storage.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::new(EcsConfig::dynamic());
///
/// let e = world.create_entity();
/// world.add_components(e, (Position { x: 1.0, y: 2.0 }, Direction { dx: 4, dy: 4 }));
///
/// let movers = world.mask_builder().require::<Position>().require::<Direction>().build();
/// for e in world.query(&movers).collect::<Vec<_>>() {
///     let d = *world.get_component::<Direction>(e);
///     world.get_component_mut::<Position>(e).x += d.dx as f32;
/// }
/// ```
pub struct World {
    config: EcsConfig,
    entities: EntityRegistry,
    components: ComponentRegistry,
    storages: HashMap<TypeId, Box<dyn ErasedStorage>>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(EcsConfig::default())
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl World {
    /// Creates an empty world.
    ///
    /// Buffers are allocated at their configured initial capacity; storage
    /// backends are created on first attach.
    #[must_use]
    pub fn new(config: EcsConfig) -> Self {
        let components = ComponentRegistry::new(&config);
        let entities = EntityRegistry::new(&config, components.layout());
        tracing::debug!(
            growth = ?config.growth_mode,
            initial_entities = config.initial_entities,
            max_components = config.max_components,
            mask_words = components.layout().words(),
            "created world"
        );
        Self {
            config,
            entities,
            components,
            storages: HashMap::new(),
        }
    }

    /// Validates the config, then creates the world.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if validation fails.
    pub fn try_new(config: EcsConfig) -> EcsResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &EcsConfig {
        &self.config
    }

    /// Returns the entity registry.
    #[inline]
    #[must_use]
    pub const fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    /// Returns the component type registry.
    #[inline]
    #[must_use]
    pub const fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Returns a bookkeeping snapshot.
    #[must_use]
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            issued: self.entities.issued(),
            free: self.entities.free_count(),
            component_types: self.components.len(),
            storages: self.storages.len(),
        }
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an entity, recycling the most recently destroyed id first.
    ///
    /// # Panics
    ///
    /// Panics if a fixed-capacity mask table is full.
    #[inline]
    pub fn create_entity(&mut self) -> Entity {
        self.entities.create()
    }

    /// Checked [`World::create_entity`].
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExceeded`] if a fixed mask table is full.
    #[inline]
    pub fn try_create_entity(&mut self) -> EcsResult<Entity> {
        self.entities.try_create()
    }

    /// Creates an entity and returns a facade for attaching components.
    pub fn spawn(&mut self) -> EntityMut<'_> {
        let entity = self.create_entity();
        EntityMut::new(self, entity)
    }

    /// Facade over an existing entity.
    #[inline]
    pub fn entity_mut(&mut self, entity: Entity) -> EntityMut<'_> {
        EntityMut::new(self, entity)
    }

    /// Clears the entity's mask and recycles its id.
    ///
    /// Component data is left in the backends. Use [`World::despawn`] to
    /// drop it as well.
    ///
    /// # Panics
    ///
    /// Panics if the id was never issued or a fixed free list is full.
    #[inline]
    pub fn destroy_entity(&mut self, entity: Entity) {
        self.entities.destroy(entity);
    }

    /// Checked [`World::destroy_entity`].
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidEntity`] or [`EcsError::CapacityExceeded`].
    #[inline]
    pub fn try_destroy_entity(&mut self, entity: Entity) -> EcsResult<()> {
        self.entities.try_destroy(entity)
    }

    /// Removes every present component from its backend, then destroys the
    /// entity.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`World::destroy_entity`].
    pub fn despawn(&mut self, entity: Entity) {
        let mask = self.entities.mask(entity).clone();
        for (type_id, storage) in &mut self.storages {
            let present = self
                .components
                .info_by_type_id(type_id)
                .is_some_and(|info| mask.has(info.bit));
            if present {
                storage.remove_entity(entity);
            }
        }
        self.entities.destroy(entity);
    }

    /// True if the id was issued and not destroyed since.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Returns the entity's presence mask.
    ///
    /// # Panics
    ///
    /// Panics if the id is past the mask table.
    #[inline]
    #[must_use]
    pub fn mask(&self, entity: Entity) -> &Mask {
        self.entities.mask(entity)
    }

    /// Checked [`World::mask`].
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidEntity`] for ids never issued.
    #[inline]
    pub fn try_mask(&self, entity: Entity) -> EcsResult<&Mask> {
        self.entities.try_mask(entity)
    }

    /// Raw mutable access to the entity's mask.
    ///
    /// Clearing a bit here hides the component from queries without
    /// touching its backend.
    ///
    /// # Panics
    ///
    /// Panics if the id is past the mask table.
    #[inline]
    pub fn mask_mut(&mut self, entity: Entity) -> &mut Mask {
        self.entities.mask_mut(entity)
    }

    /// Highest id ever issued.
    #[inline]
    #[must_use]
    pub fn max_id(&self) -> Option<Entity> {
        self.entities.max_id()
    }

    /// Iterates every issued id, destroyed ones included (their masks are
    /// empty).
    #[inline]
    pub fn entity_ids(&self) -> impl Iterator<Item = Entity> {
        self.entities.ids()
    }

    // =========================================================================
    // Component types
    // =========================================================================

    /// Registers `T` (if new) and returns its `(index, bit)` record.
    #[inline]
    pub fn register<T: Component>(&mut self) -> ComponentInfo {
        self.components.register::<T>()
    }

    /// Registers `T` with an explicit storage strategy.
    #[inline]
    pub fn register_with<T: Component>(&mut self, storage: StorageKind) -> ComponentInfo {
        self.components.register_with::<T>(storage)
    }

    /// Checked [`World::register`].
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::TooManyComponentTypes`] past `max_components`.
    #[inline]
    pub fn try_register<T: Component>(&mut self) -> EcsResult<ComponentInfo> {
        self.components.try_register::<T>()
    }

    /// Starts a query mask.
    #[inline]
    pub fn mask_builder(&mut self) -> MaskBuilder<'_> {
        MaskBuilder::new(&mut self.components)
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Sets `T`'s bit on the entity and stores `value` in `T`'s backend.
    ///
    /// Attaching a component the entity already has is only meaningful for
    /// sparse and tag storage; packed storage would get a second entry.
    ///
    /// # Panics
    ///
    /// Panics if the id is past the mask table or a fixed backend is full.
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) {
        let info = self.components.register::<T>();
        self.entities.mask_mut(entity).set(info.bit);
        self.storage_or_init::<T>(info).add(entity, value);
    }

    /// Checked [`World::add_component`].
    ///
    /// Attaching a component the entity already holds overwrites the value
    /// in place; packed storage never gets a second entry for the entity.
    ///
    /// On error the entity's mask and stored values are unchanged. The type
    /// may still have been registered and its backend created.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidEntity`], [`EcsError::TooManyComponentTypes`]
    /// or [`EcsError::CapacityExceeded`].
    pub fn try_add_component<T: Component>(&mut self, entity: Entity, value: T) -> EcsResult<()> {
        self.entities.validate(entity)?;
        let info = self.components.try_register::<T>()?;
        let present = self.entities.mask(entity).has(info.bit);
        let storage = self.storage_or_init::<T>(info);
        if present {
            if let Some(held) = storage.as_packed_mut().and_then(|p| p.held_mut(entity)) {
                *held = value;
                return Ok(());
            }
        }
        storage.try_reserve(entity)?;
        storage.add(entity, value);
        self.entities.mask_mut(entity).set(info.bit);
        Ok(())
    }

    /// Attaches every component of `bundle`, in order.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`World::add_component`]; members
    /// attached before the panic stay attached.
    #[inline]
    pub fn add_components<B: Bundle>(&mut self, entity: Entity, bundle: B) {
        bundle.add_to(self, entity);
    }

    /// Checked [`World::add_components`].
    ///
    /// Stops at the first failing member. Members attached before it stay
    /// attached; there is no rollback.
    ///
    /// # Errors
    ///
    /// The first error returned by [`World::try_add_component`].
    #[inline]
    pub fn try_add_components<B: Bundle>(&mut self, entity: Entity, bundle: B) -> EcsResult<()> {
        bundle.try_add_to(self, entity)
    }

    /// Clears `T`'s bit and forwards the removal to `T`'s backend.
    ///
    /// Sparse and tag backends ignore the removal. Packed backends
    /// swap-remove, so the entity must actually hold `T`.
    ///
    /// # Panics
    ///
    /// Panics if the id is past the mask table, or the packed backend is
    /// empty.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) {
        let info = self.components.register::<T>();
        self.entities.mask_mut(entity).clear_bit(info.bit);
        if let Some(storage) = self.storage_mut::<T>() {
            storage.remove(entity);
        }
    }

    /// Checked [`World::remove_component`].
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidEntity`] or [`EcsError::ComponentAbsent`].
    pub fn try_remove_component<T: Component>(&mut self, entity: Entity) -> EcsResult<()> {
        let info = self.present_info::<T>(entity)?;
        self.entities.mask_mut(entity).clear_bit(info.bit);
        if let Some(storage) = self.storage_mut::<T>() {
            storage.remove(entity);
        }
        Ok(())
    }

    /// Removes every component type of `B`, in order.
    #[inline]
    pub fn remove_components<B: Bundle>(&mut self, entity: Entity) {
        B::remove_from(self, entity);
    }

    /// True if the entity's mask carries `T`.
    ///
    /// # Panics
    ///
    /// Panics if the id is past the mask table.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.components
            .info::<T>()
            .is_some_and(|info| self.entities.mask(entity).has(info.bit))
    }

    /// Reads `T` for the entity without checking its mask.
    ///
    /// Sparse backends return whatever the slot holds, stale or not.
    ///
    /// # Panics
    ///
    /// Panics if `T` has no backend yet, is a tag, or the id is past the
    /// backend's capacity.
    #[must_use]
    pub fn get_component<T: Component>(&self, entity: Entity) -> &T {
        match self.storage::<T>().and_then(|storage| storage.get(entity)) {
            Some(value) => value,
            None => panic!("no readable {} for entity {entity}", short_name::<T>()),
        }
    }

    /// Mutable [`World::get_component`].
    ///
    /// # Panics
    ///
    /// Same as [`World::get_component`].
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> &mut T {
        match self.storage_mut::<T>().and_then(|storage| storage.get_mut(entity)) {
            Some(value) => value,
            None => panic!("no readable {} for entity {entity}", short_name::<T>()),
        }
    }

    /// Reads `T` after checking the id and the mask.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidEntity`], [`EcsError::ComponentAbsent`] or,
    /// for tag components, [`EcsError::NoPayload`].
    pub fn try_get_component<T: Component>(&self, entity: Entity) -> EcsResult<&T> {
        let info = self.present_info::<T>(entity)?;
        if info.storage == StorageKind::Tagged {
            return Err(EcsError::NoPayload {
                component: info.name,
            });
        }
        self.storage::<T>()
            .and_then(|storage| storage.get(entity))
            .ok_or(EcsError::ComponentAbsent {
                id: entity.id(),
                component: info.name,
            })
    }

    /// Returns `T`'s backend, if one has been created.
    #[must_use]
    pub fn storage<T: Component>(&self) -> Option<&Storage<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|erased| erased.as_any().downcast_ref::<Storage<T>>())
    }

    /// Mutable [`World::storage`].
    pub fn storage_mut<T: Component>(&mut self) -> Option<&mut Storage<T>> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|erased| erased.as_any_mut().downcast_mut::<Storage<T>>())
    }

    /// Returns `T`'s backend if it is packed, for dense iteration.
    #[inline]
    #[must_use]
    pub fn packed<T: Component>(&self) -> Option<&PackedStorage<T>> {
        self.storage::<T>().and_then(Storage::as_packed)
    }

    /// Mutable [`World::packed`].
    #[inline]
    pub fn packed_mut<T: Component>(&mut self) -> Option<&mut PackedStorage<T>> {
        self.storage_mut::<T>().and_then(Storage::as_packed_mut)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Iterates, in id order, every issued entity whose mask contains
    /// `required`.
    pub fn query<'a>(&'a self, required: &'a Mask) -> impl Iterator<Item = Entity> + 'a {
        self.entities
            .ids()
            .filter(move |&entity| self.entities.mask(entity).contains(required))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn present_info<T: Component>(&self, entity: Entity) -> EcsResult<ComponentInfo> {
        self.entities.validate(entity)?;
        let absent = EcsError::ComponentAbsent {
            id: entity.id(),
            component: short_name::<T>(),
        };
        let info = self.components.info::<T>().ok_or_else(|| absent.clone())?;
        if self.entities.mask(entity).has(info.bit) {
            Ok(info)
        } else {
            Err(absent)
        }
    }

    fn storage_or_init<T: Component>(&mut self, info: ComponentInfo) -> &mut Storage<T> {
        let config = &self.config;
        let erased = self.storages.entry(TypeId::of::<T>()).or_insert_with(|| {
            tracing::debug!(component = info.name, storage = ?info.storage, "created storage");
            Box::new(Storage::<T>::new(info.storage, config))
        });
        match erased.as_any_mut().downcast_mut::<Storage<T>>() {
            Some(storage) => storage,
            None => unreachable!("storage table is keyed by TypeId"),
        }
    }
}

//! # Entity Management
//!
//! Entities are plain indices. The registry hands them out densely and
//! recycles destroyed ids last-in-first-out before minting new ones.

use super::mask::{Mask, MaskLayout};
use crate::config::EcsConfig;
use crate::error::{EcsError, EcsResult};
use crate::memory::Buffer;

/// Opaque entity identifier.
///
/// Carries no data. It indexes the mask table and every storage backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Entity(u32);

impl Entity {
    /// Placeholder for unused owner slots.
    pub const NULL: Self = Self(u32::MAX);

    /// Wraps a raw id.
    #[inline]
    #[must_use]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Returns the id as a buffer index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Checks if this is the placeholder id.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u32::MAX
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::NULL
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocates, recycles and tracks entity ids and owns their masks.
///
/// Destroying an entity clears its mask and parks the id on the free list.
/// It does not touch any storage backend.
#[derive(Debug)]
pub struct EntityRegistry {
    /// Presence masks indexed by entity id.
    masks: Buffer<Mask>,
    /// Liveness by entity id. An empty mask does not mean a dead entity.
    alive: Buffer<bool>,
    /// Recycled ids, reused LIFO.
    free: Buffer<Entity>,
    /// Number of ids ever minted. The highest issued id is `issued - 1`.
    issued: u32,
    /// Width of freshly minted masks.
    layout: MaskLayout,
}

impl EntityRegistry {
    /// Creates an empty registry sized from the config.
    #[must_use]
    pub fn new(config: &EcsConfig, layout: MaskLayout) -> Self {
        Self {
            masks: Buffer::new(config.growth_mode, config.initial_entities),
            alive: Buffer::new(config.growth_mode, config.initial_entities),
            free: Buffer::new(config.growth_mode, config.free_list_capacity),
            issued: 0,
            layout,
        }
    }

    /// Issues an id: the most recently destroyed one, else a fresh one.
    ///
    /// # Panics
    ///
    /// Panics if a fixed-capacity mask table is full.
    pub fn create(&mut self) -> Entity {
        if let Some(entity) = self.free.pop() {
            tracing::trace!(id = entity.id(), "recycled entity id");
            self.alive[entity.index()] = true;
            return entity;
        }
        self.masks.push(Mask::empty(self.layout));
        self.alive.push(true);
        self.mint()
    }

    /// Issues an id, reporting a full fixed-capacity mask table.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExceeded`] if no id can be recycled and
    /// the mask table cannot take another entry.
    pub fn try_create(&mut self) -> EcsResult<Entity> {
        if let Some(entity) = self.free.pop() {
            self.alive[entity.index()] = true;
            return Ok(entity);
        }
        self.masks.try_push(Mask::empty(self.layout))?;
        self.alive.push(true);
        Ok(self.mint())
    }

    fn mint(&mut self) -> Entity {
        let entity = Entity(self.issued);
        self.issued += 1;
        entity
    }

    /// Clears the entity's mask and pushes its id on the free list.
    ///
    /// Destroying the same id twice queues it twice; callers must not.
    /// [`EntityRegistry::try_destroy`] refuses instead.
    ///
    /// # Panics
    ///
    /// Panics if the id was never issued or a fixed free list is full.
    pub fn destroy(&mut self, entity: Entity) {
        self.masks[entity.index()].clear();
        self.alive[entity.index()] = false;
        self.free.push(entity);
    }

    /// Checked [`EntityRegistry::destroy`].
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidEntity`] for ids outside the issued range
    /// or already on the free list, or [`EcsError::CapacityExceeded`] if a
    /// fixed free list is full. In the latter case the entity is left
    /// untouched.
    pub fn try_destroy(&mut self, entity: Entity) -> EcsResult<()> {
        self.validate(entity)?;
        if !self.is_alive(entity) {
            return Err(EcsError::InvalidEntity {
                id: entity.id(),
                issued: self.issued,
            });
        }
        self.free.try_push(entity)?;
        self.masks[entity.index()].clear();
        self.alive[entity.index()] = false;
        Ok(())
    }

    /// True if the id was issued and has not been destroyed since.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.get(entity.index()).copied().unwrap_or(false)
    }

    /// Fails with [`EcsError::InvalidEntity`] if the id was never issued.
    ///
    /// # Errors
    ///
    /// See above.
    #[inline]
    pub fn validate(&self, entity: Entity) -> EcsResult<()> {
        if entity.id() < self.issued {
            Ok(())
        } else {
            Err(EcsError::InvalidEntity {
                id: entity.id(),
                issued: self.issued,
            })
        }
    }

    /// Returns the entity's mask.
    ///
    /// # Panics
    ///
    /// Panics if the id is past the mask table.
    #[inline]
    #[must_use]
    pub fn mask(&self, entity: Entity) -> &Mask {
        &self.masks[entity.index()]
    }

    /// Returns the entity's mask mutably.
    ///
    /// # Panics
    ///
    /// Panics if the id is past the mask table.
    #[inline]
    pub fn mask_mut(&mut self, entity: Entity) -> &mut Mask {
        &mut self.masks[entity.index()]
    }

    /// Checked [`EntityRegistry::mask`].
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidEntity`] for ids never issued.
    pub fn try_mask(&self, entity: Entity) -> EcsResult<&Mask> {
        self.validate(entity)?;
        Ok(&self.masks[entity.index()])
    }

    /// Returns the highest id ever issued.
    #[inline]
    #[must_use]
    pub fn max_id(&self) -> Option<Entity> {
        self.issued.checked_sub(1).map(Entity)
    }

    /// Returns the number of ids ever minted.
    #[inline]
    #[must_use]
    pub const fn issued(&self) -> u32 {
        self.issued
    }

    /// Returns the number of ids waiting to be recycled.
    #[inline]
    #[must_use]
    pub const fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Iterates the issued id range, destroyed ids included.
    pub fn ids(&self) -> impl Iterator<Item = Entity> {
        (0..self.issued).map(Entity)
    }

    /// Returns the mask layout used for new entities.
    #[inline]
    #[must_use]
    pub const fn layout(&self) -> MaskLayout {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::mask::ComponentBit;

    fn registry(config: &EcsConfig) -> EntityRegistry {
        EntityRegistry::new(config, MaskLayout::for_components(config.max_components))
    }

    #[test]
    fn test_ids_issued_in_order() {
        let mut entities = registry(&EcsConfig::default());
        assert_eq!(entities.max_id(), None);
        assert_eq!(entities.create().id(), 0);
        assert_eq!(entities.create().id(), 1);
        assert_eq!(entities.max_id(), Some(Entity::from_raw(1)));
    }

    #[test]
    fn test_lifo_recycling() {
        let mut entities = registry(&EcsConfig::default());
        let e0 = entities.create();
        let e1 = entities.create();
        let e2 = entities.create();

        entities.destroy(e0);
        entities.destroy(e2);
        assert_eq!(entities.free_count(), 2);

        assert_eq!(entities.create(), e2);
        assert_eq!(entities.create(), e0);
        assert_eq!(entities.create().id(), 3);
        assert_ne!(e1, e0);
    }

    #[test]
    fn test_destroy_clears_mask() {
        let mut entities = registry(&EcsConfig::default());
        let e = entities.create();
        let bit = ComponentBit::from_index(3, entities.layout());
        entities.mask_mut(e).set(bit);
        assert!(entities.mask(e).has(bit));

        entities.destroy(e);
        assert!(entities.mask(e).is_empty());
        let recycled = entities.create();
        assert!(entities.mask(recycled).is_empty());
    }

    #[test]
    fn test_invalid_entity() {
        let mut entities = registry(&EcsConfig::default());
        let _ = entities.create();
        let ghost = Entity::from_raw(7);
        assert_eq!(
            entities.try_mask(ghost).unwrap_err(),
            EcsError::InvalidEntity { id: 7, issued: 1 }
        );
        assert!(entities.try_destroy(ghost).is_err());
    }

    #[test]
    fn test_try_destroy_refuses_free_id() {
        let mut entities = registry(&EcsConfig::default());
        let e = entities.create();
        assert!(entities.is_alive(e));
        assert!(entities.try_destroy(e).is_ok());
        assert!(!entities.is_alive(e));
        assert_eq!(
            entities.try_destroy(e),
            Err(EcsError::InvalidEntity { id: 0, issued: 1 })
        );
        assert_eq!(entities.free_count(), 1);

        let a = entities.create();
        let b = entities.create();
        assert_ne!(a, b);
        assert!(entities.is_alive(a) && entities.is_alive(b));
    }

    #[test]
    fn test_fixed_mask_table_exhaustion() {
        let config = EcsConfig {
            initial_entities: 2,
            ..EcsConfig::default()
        };
        let mut entities = registry(&config);
        assert!(entities.try_create().is_ok());
        assert!(entities.try_create().is_ok());
        assert!(matches!(
            entities.try_create(),
            Err(EcsError::CapacityExceeded { capacity: 2, .. })
        ));
        assert_eq!(entities.issued(), 2);
    }

    #[test]
    fn test_fixed_free_list_exhaustion() {
        let config = EcsConfig {
            free_list_capacity: 1,
            ..EcsConfig::default()
        };
        let mut entities = registry(&config);
        let a = entities.create();
        let b = entities.create();
        assert!(entities.try_destroy(a).is_ok());
        assert!(matches!(
            entities.try_destroy(b),
            Err(EcsError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_dynamic_registry_grows() {
        let mut entities = registry(&EcsConfig::dynamic());
        for i in 0..1000 {
            assert_eq!(entities.create().id(), i);
        }
        let issued: Vec<_> = entities.ids().collect();
        assert_eq!(issued.len(), 1000);
    }
}

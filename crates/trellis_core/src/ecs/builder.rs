//! # Entity Facade and Mask Builder
//!
//! Convenience layer over [`World`]; no new mechanism.
//!
//! - [`Bundle`]: a tuple of components attached one at a time, in order,
//!   with no atomicity and no rollback
//! - [`EntityMut`]: an entity handle bound to its world
//! - [`MaskBuilder`]: declares a system's required component types once,
//!   yielding the query mask it tests every entity against

use super::component::{Component, ComponentRegistry};
use super::entity::Entity;
use super::mask::Mask;
use super::world::World;
use crate::error::EcsResult;

/// An ordered group of components handled together.
///
/// Implemented for tuples of one to eight components.
pub trait Bundle: 'static {
    /// Attaches each member in order.
    fn add_to(self, world: &mut World, entity: Entity);

    /// Attaches each member in order, stopping at the first failure.
    /// Members already attached stay attached.
    ///
    /// # Errors
    ///
    /// The first error from [`World::try_add_component`].
    fn try_add_to(self, world: &mut World, entity: Entity) -> EcsResult<()>;

    /// Detaches each member type in order.
    fn remove_from(world: &mut World, entity: Entity);

    /// Adds each member type to a query mask.
    fn require(builder: &mut MaskBuilder<'_>);
}

macro_rules! impl_bundle {
    ($($name:ident),+) => {
        impl<$($name: Component),+> Bundle for ($($name,)+) {
            #[allow(non_snake_case)]
            fn add_to(self, world: &mut World, entity: Entity) {
                let ($($name,)+) = self;
                $(world.add_component(entity, $name);)+
            }

            #[allow(non_snake_case)]
            fn try_add_to(self, world: &mut World, entity: Entity) -> EcsResult<()> {
                let ($($name,)+) = self;
                $(world.try_add_component(entity, $name)?;)+
                Ok(())
            }

            fn remove_from(world: &mut World, entity: Entity) {
                $(world.remove_component::<$name>(entity);)+
            }

            fn require(builder: &mut MaskBuilder<'_>) {
                $(builder.require::<$name>();)+
            }
        }
    };
}

impl_bundle!(A);
impl_bundle!(A, B);
impl_bundle!(A, B, C);
impl_bundle!(A, B, C, D);
impl_bundle!(A, B, C, D, E);
impl_bundle!(A, B, C, D, E, F);
impl_bundle!(A, B, C, D, E, F, G);
impl_bundle!(A, B, C, D, E, F, G, H);

/// Accumulates required component types into a query mask.
///
/// Build once, at system setup, and reuse the mask every frame.
///
/// ```rust,ignore
/// let movers = world
///     .mask_builder()
///     .require::<Position>()
///     .require::<Direction>()
///     .build();
/// ```
pub struct MaskBuilder<'r> {
    registry: &'r mut ComponentRegistry,
    mask: Mask,
}

impl<'r> MaskBuilder<'r> {
    /// Starts an empty mask sized for the registry's layout.
    #[must_use]
    pub fn new(registry: &'r mut ComponentRegistry) -> Self {
        let mask = Mask::empty(registry.layout());
        Self { registry, mask }
    }

    /// Requires `T`, registering it if this is its first reference.
    pub fn require<T: Component>(&mut self) -> &mut Self {
        let bit = self.registry.register::<T>().bit;
        self.mask.set(bit);
        self
    }

    /// Requires every member type of `B`.
    pub fn require_all<B: Bundle>(&mut self) -> &mut Self {
        B::require(self);
        self
    }

    /// Checked [`MaskBuilder::require`].
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::TooManyComponentTypes`](crate::EcsError::TooManyComponentTypes)
    /// if `T` would be registered past the configured maximum.
    pub fn try_require<T: Component>(&mut self) -> EcsResult<&mut Self> {
        let bit = self.registry.try_register::<T>()?.bit;
        self.mask.set(bit);
        Ok(self)
    }

    /// Snapshot of the accumulated mask.
    #[must_use]
    pub fn build(&self) -> Mask {
        self.mask.clone()
    }
}

/// An entity bound to its world.
///
/// Thin wrapper: every call forwards to the matching [`World`] method.
pub struct EntityMut<'w> {
    world: &'w mut World,
    entity: Entity,
}

impl<'w> EntityMut<'w> {
    pub(crate) fn new(world: &'w mut World, entity: Entity) -> Self {
        Self { world, entity }
    }

    /// The wrapped id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> Entity {
        self.entity
    }

    /// The entity's presence mask.
    #[inline]
    #[must_use]
    pub fn mask(&self) -> &Mask {
        self.world.mask(self.entity)
    }

    /// Attaches one component.
    pub fn add<T: Component>(&mut self, value: T) -> &mut Self {
        self.world.add_component(self.entity, value);
        self
    }

    /// Attaches a bundle, member by member.
    pub fn add_all<B: Bundle>(&mut self, bundle: B) -> &mut Self {
        self.world.add_components(self.entity, bundle);
        self
    }

    /// Detaches one component type.
    pub fn remove<T: Component>(&mut self) -> &mut Self {
        self.world.remove_component::<T>(self.entity);
        self
    }

    /// Detaches every member type of `B`.
    pub fn remove_all<B: Bundle>(&mut self) -> &mut Self {
        self.world.remove_components::<B>(self.entity);
        self
    }

    /// Reads a component without checking the mask.
    ///
    /// # Panics
    ///
    /// See [`World::get_component`].
    #[must_use]
    pub fn get<T: Component>(&self) -> &T {
        self.world.get_component::<T>(self.entity)
    }

    /// Mutable [`EntityMut::get`].
    ///
    /// # Panics
    ///
    /// See [`World::get_component`].
    pub fn get_mut<T: Component>(&mut self) -> &mut T {
        self.world.get_component_mut::<T>(self.entity)
    }

    /// True if the mask carries `T`.
    #[must_use]
    pub fn has<T: Component>(&self) -> bool {
        self.world.has_component::<T>(self.entity)
    }

    /// True if the mask contains every bit of `required`.
    #[must_use]
    pub fn test(&self, required: &Mask) -> bool {
        self.mask().contains(required)
    }

    /// Destroys the entity, leaving backend data in place.
    pub fn destroy(self) {
        self.world.destroy_entity(self.entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EcsConfig, StorageKind};
    use crate::error::EcsError;

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    impl Component for Position {}

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    struct Direction {
        dx: i32,
        dy: i32,
    }
    impl Component for Direction {
        const STORAGE: StorageKind = StorageKind::Packed;
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    struct Visible;
    impl Component for Visible {
        const STORAGE: StorageKind = StorageKind::Tagged;
    }

    #[test]
    fn test_bundle_attaches_in_order() {
        let mut world = World::default();
        let e = world.create_entity();
        world.add_components(e, (Direction { dx: 4, dy: 4 }, Position { x: 1.0, y: 2.0 }));

        assert_eq!(world.components().info::<Direction>().map(|i| i.index), Some(0));
        assert_eq!(world.components().info::<Position>().map(|i| i.index), Some(1));
        assert_eq!(*world.get_component::<Direction>(e), Direction { dx: 4, dy: 4 });
        assert_eq!(*world.get_component::<Position>(e), Position { x: 1.0, y: 2.0 });
    }

    #[test]
    fn test_try_bundle_has_no_rollback() {
        let config = EcsConfig {
            max_components: 2,
            ..EcsConfig::default()
        };
        let mut world = World::new(config);
        let e = world.create_entity();
        let result = world.try_add_components(
            e,
            (Position::default(), Direction::default(), Visible),
        );

        assert!(matches!(result, Err(EcsError::TooManyComponentTypes { index: 2, .. })));
        assert!(world.has_component::<Position>(e));
        assert!(world.has_component::<Direction>(e));
        assert!(!world.has_component::<Visible>(e));
    }

    #[test]
    fn test_remove_bundle() {
        let mut world = World::default();
        let e = world.create_entity();
        world.add_components(e, (Position::default(), Direction::default(), Visible));
        world.remove_components::<(Direction, Visible)>(e);

        assert!(world.has_component::<Position>(e));
        assert!(!world.has_component::<Direction>(e));
        assert!(!world.has_component::<Visible>(e));
        assert_eq!(world.packed::<Direction>().map(|p| p.len()), Some(0));
    }

    #[test]
    fn test_mask_builder_matches_bundle() {
        let mut world = World::default();
        let one_by_one = world
            .mask_builder()
            .require::<Position>()
            .require::<Direction>()
            .build();
        let all_at_once = world.mask_builder().require_all::<(Position, Direction)>().build();
        assert_eq!(one_by_one, all_at_once);
        assert_eq!(one_by_one.count(), 2);
    }

    #[test]
    fn test_try_require_past_max() {
        let config = EcsConfig {
            max_components: 1,
            ..EcsConfig::default()
        };
        let mut world = World::new(config);
        let mut builder = world.mask_builder();
        assert!(builder.try_require::<Position>().is_ok());
        assert!(builder.try_require::<Direction>().is_err());
        assert_eq!(builder.build().count(), 1);
    }

    #[test]
    fn test_entity_facade() {
        let mut world = World::default();
        let query = world.mask_builder().require::<Position>().require::<Visible>().build();

        let mut entity = world.spawn();
        entity
            .add(Position { x: 3.0, y: 4.0 })
            .add_all((Direction { dx: 1, dy: -1 }, Visible));
        assert!(entity.has::<Visible>());
        assert!(entity.test(&query));

        entity.get_mut::<Position>().x += 1.0;
        assert!((entity.get::<Position>().x - 4.0).abs() < f32::EPSILON);

        entity.remove::<Visible>();
        assert!(!entity.test(&query));
        entity.remove_all::<(Direction,)>();
        assert_eq!(entity.mask().count(), 1);

        let id = entity.id();
        entity.destroy();
        assert!(world.mask(id).is_empty());
        assert_eq!(world.create_entity(), id);
    }
}

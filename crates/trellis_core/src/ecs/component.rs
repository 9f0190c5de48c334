//! # Component System
//!
//! Components are plain data records with no behaviour. The engine never
//! looks inside them; it only needs a default value to pre-fill storage
//! slots and a way to copy values in.

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use super::mask::{ComponentBit, MaskLayout};
use crate::config::{EcsConfig, StorageKind};
use crate::error::{EcsError, EcsResult};

/// Marker trait for ECS components.
///
/// Components must be:
/// - `Default`: slots are pre-filled before the first write
/// - `Clone`: values are copied into storage
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Default)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// impl Component for Position {
///     const STORAGE: StorageKind = StorageKind::Packed;
/// }
/// ```
pub trait Component: Default + Clone + 'static {
    /// Storage strategy used when neither the caller nor the config pick
    /// one.
    const STORAGE: StorageKind = StorageKind::Sparse;
}

/// Short type name: `my_game::components::Position` becomes `Position`.
///
/// Only the last path segment is kept, so `a::Position` and `b::Position`
/// share a name, and with it a `[storage]` config override.
#[must_use]
pub fn short_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Registration record for one component type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentInfo {
    /// Dense index, assigned in first-reference order from zero.
    pub index: usize,
    /// Presence bit derived from the index.
    pub bit: ComponentBit,
    /// Storage strategy, fixed for the life of the world.
    pub storage: StorageKind,
    /// Short type name.
    pub name: &'static str,
}

/// Assigns each component type a stable `(index, bit)` pair.
///
/// Indices come from one monotonic counter shared by every type of the
/// world. There is no deregistration.
#[derive(Debug)]
pub struct ComponentRegistry {
    by_type: HashMap<TypeId, ComponentInfo>,
    names: Vec<&'static str>,
    layout: MaskLayout,
    max_components: usize,
    overrides: HashMap<String, StorageKind>,
}

impl ComponentRegistry {
    /// Creates an empty registry for the configured component budget.
    #[must_use]
    pub fn new(config: &EcsConfig) -> Self {
        Self {
            by_type: HashMap::new(),
            names: Vec::new(),
            layout: MaskLayout::for_components(config.max_components),
            max_components: config.max_components,
            overrides: config.storage.clone(),
        }
    }

    /// Returns the registration of `T`, assigning one on first reference.
    ///
    /// Past the configured maximum the new index still gets minted. Its bit
    /// stays distinct until the index passes the mask width (whole 64-bit
    /// words), after which it aliases an earlier type's bit. Use
    /// [`ComponentRegistry::try_register`] to refuse instead.
    pub fn register<T: Component>(&mut self) -> ComponentInfo {
        self.register_inner::<T>(None)
    }

    /// Like [`ComponentRegistry::register`] but picks the storage strategy
    /// explicitly.
    ///
    /// The strategy only takes effect on first registration. A later call
    /// with a different strategy logs a warning and keeps the first.
    pub fn register_with<T: Component>(&mut self, storage: StorageKind) -> ComponentInfo {
        self.register_inner::<T>(Some(storage))
    }

    /// Checked [`ComponentRegistry::register`].
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::TooManyComponentTypes`] if `T` is new and the
    /// registry already holds `max_components` types.
    pub fn try_register<T: Component>(&mut self) -> EcsResult<ComponentInfo> {
        if let Some(info) = self.info::<T>() {
            return Ok(info);
        }
        if self.names.len() >= self.max_components {
            return Err(EcsError::TooManyComponentTypes {
                component: short_name::<T>(),
                index: self.names.len(),
                max: self.max_components,
            });
        }
        Ok(self.register::<T>())
    }

    fn register_inner<T: Component>(&mut self, requested: Option<StorageKind>) -> ComponentInfo {
        if let Some(info) = self.by_type.get(&TypeId::of::<T>()) {
            if let Some(kind) = requested.filter(|&kind| kind != info.storage) {
                tracing::warn!(
                    component = info.name,
                    registered = ?info.storage,
                    requested = ?kind,
                    "storage strategy is fixed at first registration"
                );
            }
            return *info;
        }

        let name = short_name::<T>();
        let index = self.names.len();
        if index >= self.layout.bit_capacity() {
            tracing::warn!(
                component = name,
                index,
                width = self.layout.bit_capacity(),
                "component index past mask width, presence bit aliases an earlier type"
            );
        } else if index >= self.max_components {
            tracing::warn!(
                component = name,
                index,
                max = self.max_components,
                "component index past configured maximum"
            );
        }

        let storage = requested
            .or_else(|| self.overrides.get(name).copied())
            .unwrap_or(T::STORAGE);
        let info = ComponentInfo {
            index,
            bit: ComponentBit::from_index(index, self.layout),
            storage,
            name,
        };
        self.by_type.insert(TypeId::of::<T>(), info);
        self.names.push(name);
        tracing::debug!(component = name, index, storage = ?storage, "registered component type");
        info
    }

    /// Returns the registration of `T` if it has been referenced.
    #[inline]
    #[must_use]
    pub fn info<T: Component>(&self) -> Option<ComponentInfo> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the registration stored under a raw `TypeId`.
    #[inline]
    #[must_use]
    pub fn info_by_type_id(&self, type_id: &TypeId) -> Option<ComponentInfo> {
        self.by_type.get(type_id).copied()
    }

    /// Returns the name registered at `index`.
    #[inline]
    #[must_use]
    pub fn name_of(&self, index: usize) -> Option<&'static str> {
        self.names.get(index).copied()
    }

    /// Number of registered types.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if no type has been referenced yet.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Configured component budget.
    #[inline]
    #[must_use]
    pub const fn max_components(&self) -> usize {
        self.max_components
    }

    /// Mask width derived from the budget.
    #[inline]
    #[must_use]
    pub const fn layout(&self) -> MaskLayout {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    // Marker types below are only ever named, never constructed.
    #![allow(dead_code)]

    use super::*;

    #[derive(Clone, Default)]
    struct Position;
    impl Component for Position {}

    #[derive(Clone, Default)]
    struct Velocity;
    impl Component for Velocity {
        const STORAGE: StorageKind = StorageKind::Packed;
    }

    #[derive(Clone, Default)]
    struct Frozen;
    impl Component for Frozen {}

    #[test]
    fn test_indices_follow_first_reference() {
        let mut registry = ComponentRegistry::new(&EcsConfig::default());
        assert_eq!(registry.register::<Velocity>().index, 0);
        assert_eq!(registry.register::<Position>().index, 1);
        assert_eq!(registry.register::<Velocity>().index, 0);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.name_of(1), Some("Position"));
    }

    #[test]
    fn test_distinct_types_distinct_bits() {
        let mut registry = ComponentRegistry::new(&EcsConfig::default());
        let a = registry.register::<Position>();
        let b = registry.register::<Velocity>();
        let c = registry.register::<Frozen>();
        assert_ne!(a.bit, b.bit);
        assert_ne!(b.bit, c.bit);
        assert_ne!(a.bit, c.bit);
    }

    #[test]
    fn test_storage_resolution_order() {
        let config = EcsConfig::default().with_storage("Position", StorageKind::Tagged);
        let mut registry = ComponentRegistry::new(&config);

        assert_eq!(registry.register::<Position>().storage, StorageKind::Tagged);
        assert_eq!(registry.register::<Velocity>().storage, StorageKind::Packed);
        assert_eq!(
            registry.register_with::<Frozen>(StorageKind::Tagged).storage,
            StorageKind::Tagged
        );
        // Strategy is fixed once chosen.
        assert_eq!(
            registry.register_with::<Frozen>(StorageKind::Packed).storage,
            StorageKind::Tagged
        );
    }

    #[test]
    fn test_try_register_refuses_past_max() {
        let config = EcsConfig {
            max_components: 2,
            ..EcsConfig::default()
        };
        let mut registry = ComponentRegistry::new(&config);
        assert!(registry.try_register::<Position>().is_ok());
        assert!(registry.try_register::<Velocity>().is_ok());
        assert_eq!(
            registry.try_register::<Frozen>(),
            Err(EcsError::TooManyComponentTypes {
                component: "Frozen",
                index: 2,
                max: 2
            })
        );
        // Already-registered types are still fine.
        assert!(registry.try_register::<Position>().is_ok());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_past_max_keeps_distinct_bits_within_word() {
        let config = EcsConfig {
            max_components: 2,
            ..EcsConfig::default()
        };
        let mut registry = ComponentRegistry::new(&config);
        let a = registry.register::<Position>();
        let b = registry.register::<Velocity>();
        let c = registry.register::<Frozen>();
        assert_eq!(c.index, 2);
        assert_ne!(c.bit, a.bit);
        assert_ne!(c.bit, b.bit);
    }

    mod north {
        #[derive(Clone, Default)]
        pub struct Marker;
        impl super::Component for Marker {}
    }

    mod south {
        #[derive(Clone, Default)]
        pub struct Marker;
        impl super::Component for Marker {}
    }

    #[test]
    fn test_same_short_name_shares_override() {
        let config = EcsConfig::default().with_storage("Marker", StorageKind::Tagged);
        let mut registry = ComponentRegistry::new(&config);
        let n = registry.register::<north::Marker>();
        let s = registry.register::<south::Marker>();
        assert_eq!(n.name, s.name);
        assert_ne!(n.index, s.index);
        assert_eq!(n.storage, StorageKind::Tagged);
        assert_eq!(s.storage, StorageKind::Tagged);
    }

    #[test]
    fn test_short_name_strips_paths_and_generics() {
        assert_eq!(short_name::<Position>(), "Position");
        assert_eq!(short_name::<Vec<u8>>(), "Vec");
        assert_eq!(short_name::<std::collections::HashMap<u8, u8>>(), "HashMap");
    }
}

//! # ECS Configuration
//!
//! Capacities, growth policy and per-type storage strategy.
//!
//! Loaded once at startup, either built in code or parsed from TOML:
//!
//! ```toml
//! growth_mode = "dynamic"
//! free_list_capacity = 5
//! initial_entities = 10
//! initial_packed = 5
//! max_components = 10
//!
//! [storage]
//! Position = "packed"
//! Player = "tagged"
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{EcsError, EcsResult};

/// How backing buffers react when they run out of room.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthMode {
    /// Capacity is fixed at construction. Writing past it is a contract
    /// violation. Suited to real-time targets with a hard memory ceiling.
    #[default]
    Fixed,
    /// Capacity doubles (or jumps to the requested size) when exceeded.
    Dynamic,
}

/// Storage strategy for one component type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Indexed directly by entity id. Removal is a no-op.
    #[default]
    Sparse,
    /// Dense values with swap-remove. Cheap bulk iteration.
    Packed,
    /// Presence only, no payload.
    Tagged,
}

/// World configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EcsConfig {
    /// Growth policy shared by every backing buffer of the world.
    pub growth_mode: GrowthMode,
    /// Initial capacity of the recycled-id free list.
    pub free_list_capacity: usize,
    /// Initial capacity of the mask table and of id-indexed buffers.
    pub initial_entities: usize,
    /// Initial capacity of packed dense arrays.
    pub initial_packed: usize,
    /// Maximum number of distinct component types. Decides the mask width.
    pub max_components: usize,
    /// Per-type storage overrides, keyed by the type's short name (last path
    /// segment, generics stripped). Types with the same short name in
    /// different modules share one entry.
    pub storage: HashMap<String, StorageKind>,
}

impl Default for EcsConfig {
    fn default() -> Self {
        Self {
            growth_mode: GrowthMode::Fixed,
            free_list_capacity: 5,
            initial_entities: 10,
            initial_packed: 5,
            max_components: 10,
            storage: HashMap::new(),
        }
    }
}

impl EcsConfig {
    /// Default capacities with doubling buffers.
    #[must_use]
    pub fn dynamic() -> Self {
        Self {
            growth_mode: GrowthMode::Dynamic,
            ..Self::default()
        }
    }

    /// Sets the storage strategy for the type with the given short name.
    #[must_use]
    pub fn with_storage(mut self, type_name: &str, kind: StorageKind) -> Self {
        self.storage.insert(type_name.to_owned(), kind);
        self
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the document does not parse or
    /// fails [`EcsConfig::validate`].
    pub fn from_toml_str(source: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| EcsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> EcsResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| EcsError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Checks values that would make the world unusable.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if `max_components` is zero.
    pub fn validate(&self) -> EcsResult<()> {
        if self.max_components == 0 {
            return Err(EcsError::InvalidConfig(
                "max_components must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// Looks up a storage override by short type name.
    #[inline]
    #[must_use]
    pub fn storage_for(&self, type_name: &str) -> Option<StorageKind> {
        self.storage.get(type_name).copied()
    }
}

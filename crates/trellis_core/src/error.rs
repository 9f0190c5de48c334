//! # ECS Error Types
//!
//! Errors returned by the checked (`try_*`) entry points.
//!
//! The unchecked fast paths never produce these: they trust the caller and
//! panic (or alias bits) on a contract violation. The checked paths exist so
//! that boundary behaviour can be asserted without taking the process down.

use thiserror::Error;

/// Errors that can occur in the checked ECS paths.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Entity id was never issued by this world, or is already destroyed.
    #[error("invalid entity {id}: not live (issued ids are 0..{issued})")]
    InvalidEntity {
        /// The offending id.
        id: u32,
        /// Number of ids issued so far.
        issued: u32,
    },

    /// The entity's mask does not carry the requested component.
    #[error("entity {id} has no {component} component")]
    ComponentAbsent {
        /// The entity id.
        id: u32,
        /// Component type name.
        component: &'static str,
    },

    /// A fixed-capacity buffer was written past its bound.
    #[error("capacity exceeded: fixed capacity {capacity}, requested slot {requested}")]
    CapacityExceeded {
        /// The fixed capacity of the buffer.
        capacity: usize,
        /// The slot index that was requested.
        requested: usize,
    },

    /// Registering this component would alias another type's presence bit.
    #[error("too many component types: {component} would take index {index}, maximum is {max}")]
    TooManyComponentTypes {
        /// Component type name.
        component: &'static str,
        /// The index it would have been assigned.
        index: usize,
        /// Configured maximum number of component types.
        max: usize,
    },

    /// The component is a tag and carries no data to read.
    #[error("{component} is a tag component and stores no data")]
    NoPayload {
        /// Component type name.
        component: &'static str,
    },

    /// Invalid configuration file or values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for checked ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;

//! Error types for the entity-component store.

use thiserror::Error;

use crate::entity::Entity;
use crate::view::ViewHandle;

/// Errors returned by registry operations.
///
/// Every check runs before the store is mutated, so a call that returns an
/// error leaves entities, component arrays and views exactly as they were.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The entity was never created or has already been destroyed.
    #[error("{0} is out of range or no longer alive")]
    EntityOutOfRange(Entity),

    /// The component type has no storage yet.
    #[error("component type `{0}` is not registered")]
    ComponentNotRegistered(&'static str),

    /// The entity does not hold the requested component.
    #[error("{entity} has no `{component}` component")]
    ComponentNotFound {
        /// Entity that was queried.
        entity: Entity,
        /// Name of the missing component type.
        component: &'static str,
    },

    /// The entity already holds a component of this type.
    #[error("{entity} already has a `{component}` component")]
    DuplicateComponent {
        /// Entity that was written to.
        entity: Entity,
        /// Name of the duplicated component type.
        component: &'static str,
    },

    /// A multi-component call named the same type more than once.
    #[error("component tuple names the same type more than once")]
    DuplicateComponentType,

    /// Registering another component type would exceed the signature width.
    #[error("cannot register `{component}`: limit of {limit} component types reached")]
    TooManyComponents {
        /// Name of the rejected component type.
        component: &'static str,
        /// Configured limit.
        limit: usize,
    },

    /// The view handle is stale or was never issued by this registry.
    #[error("{0:?} does not refer to a registered view")]
    ViewNotFound(ViewHandle),

    /// No system of this type is registered.
    #[error("system `{0}` is not registered")]
    SystemNotRegistered(&'static str),

    /// The registry configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EcsError>;

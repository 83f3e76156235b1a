//! Entity-component store for the wil renderer.
//!
//! The [`Registry`] hands out [`Entity`] ids, keeps one dense array per
//! component type, and maintains [`EntityView`]s: cached sets of entities
//! whose component [`Signature`] covers a filter. Render and gameplay
//! [`System`]s iterate those views each frame instead of scanning every
//! entity.

// Lets `#[derive(Component)]` expand to `::wil_ecs::Component` inside this crate too.
extern crate self as wil_ecs;

pub mod bundle;
pub mod components;
pub mod config;
pub mod entity;
pub mod error;
pub mod registry;
pub mod signature;
pub mod storage;
pub mod system;
pub mod view;

// Re-export commonly used types for convenience
pub use bundle::{ComponentBundle, ComponentSet};
pub use components::Component;
pub use config::RegistryConfig;
pub use entity::{Entity, EntityAllocator};
pub use error::{EcsError, Result};
pub use registry::Registry;
pub use signature::{ComponentType, Signature, MAX_COMPONENTS};
pub use storage::{AnyComponentArray, ComponentArray, ComponentManager};
pub use system::{System, SystemExecutionOrder};
pub use view::{EntityView, ViewHandle, ViewRegistry};

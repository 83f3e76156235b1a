use crate::error::{EcsError, Result};
use crate::signature::MAX_COMPONENTS;

/// Construction-time settings for a [`Registry`](crate::Registry).
///
/// # Examples
///
/// ```
/// use wil_ecs::{Registry, RegistryConfig};
///
/// let config = RegistryConfig::default()
///     .with_reserve_entities(4096)
///     .with_max_components(16);
/// let registry = Registry::with_config(config).unwrap();
/// assert_eq!(registry.entity_count(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Number of entity signature slots reserved up front.
    pub reserve_entities: usize,
    /// Maximum number of distinct component types, at most [`MAX_COMPONENTS`].
    pub max_components: usize,
}

impl RegistryConfig {
    pub const DEFAULT_RESERVE_ENTITIES: usize = 1000;

    pub fn with_reserve_entities(mut self, reserve_entities: usize) -> Self {
        self.reserve_entities = reserve_entities;
        self
    }

    pub fn with_max_components(mut self, max_components: usize) -> Self {
        self.max_components = max_components;
        self
    }

    /// Rejects a component limit of zero or wider than a signature.
    pub fn validate(&self) -> Result<()> {
        if self.max_components == 0 {
            return Err(EcsError::InvalidConfig(
                "max_components must be at least 1".to_string(),
            ));
        }
        if self.max_components > MAX_COMPONENTS {
            return Err(EcsError::InvalidConfig(format!(
                "max_components is {} but signatures hold only {} bits",
                self.max_components, MAX_COMPONENTS
            )));
        }
        Ok(())
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            reserve_entities: Self::DEFAULT_RESERVE_ENTITIES,
            max_components: MAX_COMPONENTS,
        }
    }
}

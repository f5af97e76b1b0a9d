//! Store tunables.

use serde::Deserialize;

use crate::error::{EcsError, EcsResult};

/// Rows allocated for a freshly created archetype.
pub const DEFAULT_CAPACITY: usize = 64;

/// Configuration for a [`World`](crate::World).
///
/// Every field has a default, so a partial JSON document such as
/// `{"default_capacity": 16}` is accepted.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Initial row capacity of every archetype. Tables never shrink below
    /// twice this value.
    pub default_capacity: usize,
    /// First entity id handed out by the allocator.
    pub first_entity: u32,
    /// Pre-sized slots in the archetype registry.
    pub archetype_capacity: usize,
    /// Pre-sized slots in the record index.
    pub entity_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_capacity: DEFAULT_CAPACITY,
            first_entity: 1,
            archetype_capacity: 16,
            entity_capacity: 0,
        }
    }
}

impl StoreConfig {
    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> EcsResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration describes a usable store.
    pub fn validate(&self) -> EcsResult<()> {
        if self.default_capacity == 0 {
            return Err(EcsError::ZeroCapacity);
        }
        if self.first_entity == 0 {
            return Err(EcsError::ReservedEntityId);
        }
        Ok(())
    }
}

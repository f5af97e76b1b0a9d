//! Store error types.
//!
//! Only recoverable setup failures live here. Broken invariants (rows out
//! of range, unregistered component ids) panic instead, and expected
//! absence is reported through `bool`/`Option` returns.

use thiserror::Error;

/// Store error type.
#[derive(Debug, Error)]
pub enum EcsError {
    /// Configuration could not be parsed.
    #[error("invalid config json: {0}")]
    ConfigJson(#[from] serde_json::Error),

    /// Archetype capacity must hold at least one row.
    #[error("default archetype capacity must be at least 1")]
    ZeroCapacity,

    /// Entity id 0 is reserved for `Entity::NULL`.
    #[error("first entity id must not be 0")]
    ReservedEntityId,

    /// A dynamic component with this name is already registered.
    #[error("component `{0}` is already registered")]
    DuplicateComponent(String),
}

/// Result type for store operations.
pub type EcsResult<T> = Result<T, EcsError>;

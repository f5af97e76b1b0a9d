//! Entity identifiers and their allocator.
//!
//! Ids come from a single monotonically increasing counter and are never
//! recycled, so a stale id can never alias a newer entity.

use std::fmt;

use bytemuck::{Pod, Zeroable};

/// A unique identifier for an entity in the world.
///
/// The id is also stored as the first column of every archetype, which is
/// why it is `Pod`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
#[repr(transparent)]
pub struct Entity(u32);

impl Entity {
    /// Never issued. A zero-filled entity slot reads as this value.
    pub const NULL: Entity = Entity(0);

    /// Create an entity from a raw id.
    #[must_use]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Check whether this is [`Entity::NULL`].
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocator for entity ids.
#[derive(Debug)]
pub struct EntityAllocator {
    /// Next id to hand out.
    next: u32,
    /// Number of ids issued so far.
    issued: u64,
}

impl EntityAllocator {
    /// Create an allocator whose first id is `first`.
    #[must_use]
    pub const fn new(first: u32) -> Self {
        Self {
            next: first,
            issued: 0,
        }
    }

    /// Allocate a new entity.
    ///
    /// # Panics
    ///
    /// Panics once the 32-bit id space is exhausted.
    pub fn allocate(&mut self) -> Entity {
        let id = self.next;
        self.next = id.checked_add(1).expect("entity id space exhausted");
        self.issued += 1;
        Entity(id)
    }

    /// Peek at the id the next call to [`allocate`](Self::allocate) returns.
    #[must_use]
    pub const fn peek(&self) -> Entity {
        Entity(self.next)
    }

    /// Total number of ids issued, deleted entities included.
    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.issued
    }
}

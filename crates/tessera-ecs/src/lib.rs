// bytemuck derives expand to `unsafe impl`; hand-written code has no unsafe.
#![allow(unsafe_code)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::float_cmp)]

//! Tessera ECS - archetype-based entity/component store.
//!
//! Built for a single simulation thread that mutates entities and runs many
//! "every entity with components {A, B, ...}" queries per tick.
//!
//! # Key Concepts
//!
//! - **Entity**: a `u32` id, issued monotonically and never reused
//! - **Component**: plain-old-data attached to entities, identified by a
//!   [`ComponentId`] from the [`ComponentRegistry`]
//! - **Signature**: the sorted component set of an entity, entity column
//!   included
//! - **Archetype**: the columnar table storing every entity of one signature
//! - **Relation cache**: per archetype, the archetypes whose signature is a
//!   superset of its own; queries walk it instead of every archetype
//!
//! # Access Patterns
//!
//! Raw access works on byte slices keyed by [`ComponentId`]:
//! - `get_component()` / `set_component()`
//! - `add_component()` / `remove_component()`
//!
//! Typed access returns owned values:
//! - `get<T>()` - Returns owned `T`
//! - `set<T>()` - Write back a modified value
//! - `insert<T>()` - Add and write a component
//! - `remove<T>()` - Remove and return a component
//!
//! ```ignore
//! let mut world = World::new();
//! let e = world.spawn(Position { x: 1.0, y: 2.0 });
//! world.insert(e, Velocity { x: 0.5, y: 0.0 });
//!
//! let mut query = world.query_builder().with::<Position>().with::<Velocity>().build();
//! while query.advance(&world) {
//!     let pos: Position = query.get_as(&world).unwrap();
//! }
//! ```

mod archetype;
mod component;
mod config;
mod entity;
mod error;
mod query;
mod record;
mod registry;
mod relation;
mod signature;
mod storage;
mod world;

pub use archetype::{Archetype, ArchetypeId};
pub use component::{Component, ComponentId, ComponentInfo, ComponentRegistry};
pub use config::{DEFAULT_CAPACITY, StoreConfig};
pub use entity::{Entity, EntityAllocator};
pub use error::{EcsError, EcsResult};
pub use query::{Query, QueryBuilder, QueryIter, QueryRow};
pub use record::{Record, RecordIndex};
pub use registry::ArchetypeRegistry;
pub use relation::Containment;
pub use signature::Signature;
pub use storage::{Column, Table};
pub use world::{ShutdownReport, World};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Component, ComponentId, Entity, Query, StoreConfig, World};
}

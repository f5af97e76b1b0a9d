//! Record index - where each live entity's data lives.

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;

use crate::{archetype::ArchetypeId, entity::Entity};

/// Location of an entity within the archetype storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Record {
    /// The archetype containing this entity.
    pub archetype: ArchetypeId,
    /// Row index within the archetype.
    pub row: usize,
}

/// Map from live entity to its [`Record`].
///
/// Ids are never recycled, so a hash map keeps memory proportional to the
/// live entity count rather than to the number of ids ever issued.
#[derive(Debug, Default)]
pub struct RecordIndex {
    records: HashMap<Entity, Record, FxBuildHasher>,
}

impl RecordIndex {
    /// Create an index with room for `capacity` entities.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: HashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
        }
    }

    /// Current location of `entity`.
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<Record> {
        self.records.get(&entity).copied()
    }

    /// Check if `entity` is live.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.records.contains_key(&entity)
    }

    /// Record `entity` at a new location, replacing any previous one.
    pub fn set(&mut self, entity: Entity, archetype: ArchetypeId, row: usize) {
        self.records.insert(entity, Record { archetype, row });
    }

    /// Point an already recorded entity at a different row of the same
    /// archetype, after a swap-remove moved it.
    ///
    /// # Panics
    ///
    /// Panics if `entity` has no record.
    pub fn set_row(&mut self, entity: Entity, row: usize) {
        self.records
            .get_mut(&entity)
            .unwrap_or_else(|| panic!("moved entity {entity:?} has no record"))
            .row = row;
    }

    /// Erase the record of `entity`, returning it.
    pub fn remove(&mut self, entity: Entity) -> Option<Record> {
        self.records.remove(&entity)
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no entity is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record and release the table. Returns how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.records.len();
        self.records = HashMap::default();
        count
    }
}

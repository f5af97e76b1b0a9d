//! Archetypes - tables of entities with identical component signatures.
//!
//! All entities with the same set of components are stored together, one
//! row per entity, so iterating a query touches contiguous memory.

use std::fmt;

use bytemuck::Pod;

use crate::{
    component::{ComponentId, ComponentRegistry},
    entity::Entity,
    signature::Signature,
    storage::Table,
};

/// Index of the entity column inside every table.
const ENTITY_COLUMN: usize = 0;

/// Unique identifier for an archetype.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchetypeId(u32);

impl ArchetypeId {
    /// Create an archetype ID from a raw value.
    #[must_use]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ArchetypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArchetypeId({})", self.0)
    }
}

/// An archetype - a table storing entities with the same component layout.
pub struct Archetype {
    id: ArchetypeId,
    signature: Signature,
    table: Table,
    /// Capacity the table starts with; it never shrinks below twice this.
    default_capacity: usize,
    /// Archetypes whose signature is a superset of ours, this one first.
    related: Vec<ArchetypeId>,
}

impl Archetype {
    /// Create an archetype with one column per signature entry.
    ///
    /// # Panics
    ///
    /// Panics if a signature id is not registered in `registry`.
    #[must_use]
    pub fn new(
        id: ArchetypeId,
        signature: Signature,
        registry: &ComponentRegistry,
        default_capacity: usize,
    ) -> Self {
        debug_assert_eq!(signature.ids().first(), Some(&ComponentId::ENTITY));
        let table = Table::with_capacity(
            signature.ids().iter().map(|&c| (c, registry.size_of(c))),
            default_capacity,
        );

        Self {
            id,
            signature,
            table,
            default_capacity,
            related: vec![id],
        }
    }

    /// Get the archetype ID.
    #[must_use]
    pub const fn id(&self) -> ArchetypeId {
        self.id
    }

    /// Get the signature.
    #[must_use]
    pub const fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Get the component IDs in this archetype (sorted, entity first).
    #[must_use]
    pub fn components(&self) -> &[ComponentId] {
        self.signature.ids()
    }

    /// Check if this archetype contains a component type.
    #[must_use]
    pub fn contains(&self, component_id: ComponentId) -> bool {
        self.signature.contains(component_id)
    }

    /// Get the number of entities in this archetype.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if the archetype is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Allocated row capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Size of the backing block in bytes.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.table.byte_size()
    }

    /// Archetypes able to answer a query for this signature: every
    /// archetype whose signature contains ours, this one included.
    #[must_use]
    pub fn related(&self) -> &[ArchetypeId] {
        &self.related
    }

    pub(crate) fn link(&mut self, other: ArchetypeId) {
        debug_assert!(!self.related.contains(&other));
        self.related.push(other);
    }

    pub(crate) fn unlink(&mut self, other: ArchetypeId) {
        self.related.retain(|&id| id != other);
    }

    /// Entity stored at `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= len()`.
    #[must_use]
    pub fn entity(&self, row: usize) -> Entity {
        bytemuck::pod_read_unaligned(self.table.get(ENTITY_COLUMN, row))
    }

    /// Iterate over the entities in row order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        (0..self.len()).map(|row| self.entity(row))
    }

    /// Append a row for `entity` and return its index.
    ///
    /// The entity column is written, every other column is zero-filled.
    /// Doubles the capacity first when the table is full. The caller is
    /// responsible for recording the new location.
    pub fn append_row(&mut self, entity: Entity) -> usize {
        if self.table.is_full() {
            let capacity = (self.table.capacity() * 2).max(1);
            tracing::trace!(archetype = ?self.id, capacity, "growing archetype");
            self.table.resize(capacity);
        }

        let row = self.table.push_zeroed();
        self.table
            .get_mut(ENTITY_COLUMN, row)
            .copy_from_slice(bytemuck::bytes_of(&entity));
        row
    }

    /// Remove `row` using swap-remove.
    ///
    /// Returns the entity that was moved into `row`, if any; its recorded
    /// location must be updated by the caller. Halves the capacity once the
    /// table drops to a quarter full, but never below twice the default.
    ///
    /// # Panics
    ///
    /// Panics if `row >= len()`.
    pub fn remove_row(&mut self, row: usize) -> Option<Entity> {
        let moved = self.table.swap_remove(row).then(|| self.entity(row));

        let capacity = self.table.capacity();
        if self.table.len() == capacity / 4 && capacity > 2 * self.default_capacity {
            tracing::trace!(archetype = ?self.id, capacity = capacity / 2, "shrinking archetype");
            self.table.resize(capacity / 2);
        }

        moved
    }

    /// Bytes of `component_id` at `row`, or `None` if the archetype does
    /// not store that component.
    ///
    /// # Panics
    ///
    /// Panics if `row >= len()`.
    #[must_use]
    pub fn read(&self, row: usize, component_id: ComponentId) -> Option<&[u8]> {
        let col = self.table.column_index(component_id)?;
        Some(self.table.get(col, row))
    }

    /// Mutable bytes of `component_id` at `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= len()`.
    #[must_use]
    pub fn read_mut(&mut self, row: usize, component_id: ComponentId) -> Option<&mut [u8]> {
        let col = self.table.column_index(component_id)?;
        Some(self.table.get_mut(col, row))
    }

    /// Overwrite `component_id` at `row` with `bytes`.
    ///
    /// Returns `false` if the archetype does not store that component.
    ///
    /// # Panics
    ///
    /// Panics if `row >= len()` or `bytes` does not match the element size.
    pub fn write(&mut self, row: usize, component_id: ComponentId, bytes: &[u8]) -> bool {
        let Some(slot) = self.read_mut(row, component_id) else {
            return false;
        };
        assert_eq!(
            slot.len(),
            bytes.len(),
            "size mismatch writing {component_id:?}"
        );
        slot.copy_from_slice(bytes);
        true
    }

    /// Owned copy of a component value.
    ///
    /// # Panics
    ///
    /// Panics if `row >= len()` or `T` has a different size than the column.
    #[must_use]
    pub fn get<T: Pod>(&self, row: usize, component_id: ComponentId) -> Option<T> {
        self.read(row, component_id).map(bytemuck::pod_read_unaligned)
    }

    /// Copy every component present in both archetypes from `src_row` of
    /// `src` into `dst_row` of `self`. The entity column is skipped.
    pub(crate) fn copy_shared_from(&mut self, dst_row: usize, src: &Archetype, src_row: usize) {
        for col in 1..self.table.columns().len() {
            let id = self.table.columns()[col].id();
            if let Some(bytes) = src.read(src_row, id) {
                self.table.get_mut(col, dst_row).copy_from_slice(bytes);
            }
        }
    }
}

impl fmt::Debug for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archetype")
            .field("id", &self.id)
            .field("signature", &self.signature)
            .field("entity_count", &self.len())
            .field("capacity", &self.capacity())
            .field("related", &self.related)
            .finish()
    }
}

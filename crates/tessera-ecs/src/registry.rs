//! Archetype registry - one archetype per signature.

use std::fmt;

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;

use crate::{
    archetype::{Archetype, ArchetypeId},
    component::ComponentRegistry,
    relation,
    signature::Signature,
};

/// Storage for all archetypes in a world.
///
/// Archetype ids are dense indices into creation order and stay valid until
/// the archetype is destroyed. Only the most recently created archetype can
/// be destroyed, which keeps every other id stable.
pub struct ArchetypeRegistry {
    archetypes: Vec<Archetype>,
    /// Signature lookup. `Signature` hashes with its own id fold.
    index: HashMap<Signature, ArchetypeId, FxBuildHasher>,
    /// Row capacity of newly created archetypes.
    default_capacity: usize,
}

impl ArchetypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(default_capacity: usize, archetype_capacity: usize) -> Self {
        Self {
            archetypes: Vec::with_capacity(archetype_capacity),
            index: HashMap::with_capacity_and_hasher(archetype_capacity, FxBuildHasher),
            default_capacity,
        }
    }

    /// Get or create the archetype for `signature`.
    ///
    /// A newly created archetype is linked into the relation index before
    /// its id is returned.
    pub fn get_or_create(
        &mut self,
        signature: &Signature,
        registry: &ComponentRegistry,
    ) -> ArchetypeId {
        if let Some(&id) = self.index.get(signature) {
            return id;
        }

        let raw = u32::try_from(self.archetypes.len()).expect("archetype id space exhausted");
        let id = ArchetypeId::from_raw(raw);
        self.archetypes.push(Archetype::new(
            id,
            signature.clone(),
            registry,
            self.default_capacity,
        ));
        self.index.insert(signature.clone(), id);

        let links = relation::link_newest(&mut self.archetypes);
        tracing::debug!(archetype = ?id, ?signature, links, "created archetype");

        id
    }

    /// Find the archetype for a signature, if it exists.
    #[must_use]
    pub fn find(&self, signature: &Signature) -> Option<ArchetypeId> {
        self.index.get(signature).copied()
    }

    /// Get an archetype by ID.
    #[must_use]
    pub fn get(&self, id: ArchetypeId) -> Option<&Archetype> {
        self.archetypes.get(id.index())
    }

    /// Get a mutable archetype by ID.
    #[must_use]
    pub fn get_mut(&mut self, id: ArchetypeId) -> Option<&mut Archetype> {
        self.archetypes.get_mut(id.index())
    }

    /// Borrow two distinct archetypes mutably at once.
    ///
    /// # Panics
    ///
    /// Panics if `a == b` or either id is out of range.
    pub fn get2_mut(
        &mut self,
        a: ArchetypeId,
        b: ArchetypeId,
    ) -> (&mut Archetype, &mut Archetype) {
        assert_ne!(a, b, "get2_mut needs two distinct archetypes");
        if a < b {
            let (lo, hi) = self.archetypes.split_at_mut(b.index());
            (&mut lo[a.index()], &mut hi[0])
        } else {
            let (lo, hi) = self.archetypes.split_at_mut(a.index());
            (&mut hi[0], &mut lo[b.index()])
        }
    }

    /// Get the number of archetypes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    /// Check if no archetype exists yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    /// Iterate over all archetypes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Archetype> {
        self.archetypes.iter()
    }

    /// Total bytes held by archetype tables.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.archetypes.iter().map(Archetype::byte_size).sum()
    }

    /// Destroy the most recently created archetype, removing it from the
    /// signature index and from every relation list.
    pub fn destroy_last(&mut self) -> Option<Archetype> {
        let archetype = self.archetypes.pop()?;
        self.index.remove(archetype.signature());
        relation::unlink(&mut self.archetypes, archetype.id());
        tracing::debug!(archetype = ?archetype.id(), rows = archetype.len(), "destroyed archetype");
        Some(archetype)
    }

    /// Destroy every archetype, newest first. Returns how many archetypes
    /// and table bytes were released.
    pub fn clear(&mut self) -> (usize, usize) {
        let mut count = 0;
        let mut bytes = 0;
        while let Some(archetype) = self.destroy_last() {
            count += 1;
            bytes += archetype.byte_size();
        }
        self.archetypes.shrink_to_fit();
        self.index.shrink_to_fit();
        (count, bytes)
    }
}

impl fmt::Debug for ArchetypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchetypeRegistry")
            .field("archetype_count", &self.archetypes.len())
            .finish()
    }
}

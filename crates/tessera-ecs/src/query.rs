//! Query engine - iterate every entity having at least a set of components.
//!
//! A query resolves the archetype for exactly the requested set and takes
//! its relation list (every archetype whose signature is a superset) as the
//! candidate archetypes. Iteration then only visits candidates, skipping
//! empty ones, in candidate order and row order within each archetype.
//!
//! # Cursor API
//!
//! ```ignore
//! let mut query = world.query(&[position, velocity]);
//! while query.advance(&world) {
//!     let pos = query.get(&world, position).unwrap();
//! }
//! ```
//!
//! # Iterator API
//!
//! ```ignore
//! let query = world
//!     .query_builder()
//!     .with::<Position>()
//!     .with::<Velocity>()
//!     .build();
//!
//! for row in query.iter(&world) {
//!     let pos: Position = row.get();
//! }
//! ```

use smallvec::SmallVec;

use crate::{
    World,
    archetype::{Archetype, ArchetypeId},
    component::{Component, ComponentId},
    entity::Entity,
    signature::Signature,
};

// ============================================================================
// QueryBuilder - Runtime Builder Pattern
// ============================================================================

/// Builder for constructing queries from types and raw ids.
///
/// Types passed to [`with`](Self::with) are registered on the fly, so a
/// query can be built before any entity carries the component.
pub struct QueryBuilder<'w> {
    world: &'w mut World,
    components: SmallVec<[ComponentId; 8]>,
}

impl<'w> QueryBuilder<'w> {
    /// Create a new query builder.
    pub fn new(world: &'w mut World) -> Self {
        Self {
            world,
            components: SmallVec::new(),
        }
    }

    /// Require a component type.
    #[must_use]
    pub fn with<T: Component>(mut self) -> Self {
        let id = self.world.register::<T>();
        self.components.push(id);
        self
    }

    /// Require a component by id.
    #[must_use]
    pub fn with_id(mut self, id: ComponentId) -> Self {
        self.components.push(id);
        self
    }

    /// Build the query.
    ///
    /// # Panics
    ///
    /// Panics if no component was required.
    #[must_use]
    pub fn build(self) -> Query {
        self.world.query(&self.components)
    }
}

// ============================================================================
// Query - Cursor Over Candidate Archetypes
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cursor {
    /// `advance` has not been called yet.
    Start,
    /// Positioned on a live row.
    At { index: usize, row: usize },
    /// Candidates exhausted.
    Done,
}

/// An executable query.
///
/// The query owns a snapshot of its candidate archetypes and a cursor; it
/// borrows nothing, so the world is passed to each call.
#[derive(Clone, Debug)]
pub struct Query {
    signature: Signature,
    root: ArchetypeId,
    candidates: Vec<ArchetypeId>,
    cursor: Cursor,
}

impl Query {
    pub(crate) fn new(signature: Signature, root: ArchetypeId, candidates: Vec<ArchetypeId>) -> Self {
        Self {
            signature,
            root,
            candidates,
            cursor: Cursor::Start,
        }
    }

    /// The required components, entity column included.
    #[must_use]
    pub const fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Candidate archetypes in visiting order.
    #[must_use]
    pub fn candidates(&self) -> &[ArchetypeId] {
        &self.candidates
    }

    /// Get the number of candidate archetypes, empty ones included.
    #[must_use]
    pub fn archetype_count(&self) -> usize {
        self.candidates.len()
    }

    /// Move to the next matching row.
    ///
    /// Returns `false` once every candidate is exhausted; further calls keep
    /// returning `false` until [`reset`](Self::reset).
    pub fn advance(&mut self, world: &World) -> bool {
        let archetypes = world.archetypes();
        let mut index = match self.cursor {
            Cursor::Done => return false,
            Cursor::Start => 0,
            Cursor::At { index, row } => {
                let live = archetypes
                    .get(self.candidates[index])
                    .is_some_and(|archetype| row + 1 < archetype.len());
                if live {
                    self.cursor = Cursor::At { index, row: row + 1 };
                    return true;
                }
                index + 1
            }
        };

        while let Some(&id) = self.candidates.get(index) {
            if archetypes.get(id).is_some_and(|archetype| !archetype.is_empty()) {
                self.cursor = Cursor::At { index, row: 0 };
                return true;
            }
            index += 1;
        }

        self.cursor = Cursor::Done;
        false
    }

    /// Rewind to before the first row.
    pub fn reset(&mut self) {
        self.cursor = Cursor::Start;
    }

    /// Re-read the candidate list to pick up archetypes created since the
    /// query was built, and rewind.
    pub fn refresh(&mut self, world: &World) {
        if let Some(root) = world.archetypes().get(self.root) {
            self.candidates.clear();
            self.candidates.extend_from_slice(root.related());
        }
        self.reset();
    }

    fn position<'w>(&self, world: &'w World) -> (&'w Archetype, usize) {
        let Cursor::At { index, row } = self.cursor else {
            panic!("query accessed without a successful advance");
        };
        let archetype = world
            .archetypes()
            .get(self.candidates[index])
            .expect("query used with a different world");
        (archetype, row)
    }

    /// Entity at the current row.
    ///
    /// # Panics
    ///
    /// Panics unless the last call to [`advance`](Self::advance) returned
    /// `true`, or if the world changed since.
    #[must_use]
    pub fn entity(&self, world: &World) -> Entity {
        let (archetype, row) = self.position(world);
        archetype.entity(row)
    }

    /// Bytes of a component at the current row, `None` if the current
    /// archetype does not store it.
    ///
    /// # Panics
    ///
    /// Panics unless the last call to [`advance`](Self::advance) returned
    /// `true`, or if the world changed since.
    #[must_use]
    pub fn get<'w>(&self, world: &'w World, component: ComponentId) -> Option<&'w [u8]> {
        let (archetype, row) = self.position(world);
        archetype.read(row, component)
    }

    /// Owned copy of a typed component at the current row.
    ///
    /// # Panics
    ///
    /// Same conditions as [`get`](Self::get).
    #[must_use]
    pub fn get_as<T: Component>(&self, world: &World) -> Option<T> {
        let id = world.component_id::<T>()?;
        self.get(world, id).map(bytemuck::pod_read_unaligned)
    }

    /// Iterate over all matching rows from the start, independent of the
    /// cursor.
    pub fn iter<'w, 'q>(&'q self, world: &'w World) -> QueryIter<'w, 'q> {
        QueryIter::new(world, self)
    }

    /// Execute a closure for each matching row.
    pub fn each<F>(&self, world: &World, mut f: F)
    where
        F: FnMut(QueryRow<'_>),
    {
        for row in self.iter(world) {
            f(row);
        }
    }
}

// ============================================================================
// QueryIter - Iterator Over Query Results
// ============================================================================

/// Iterator over query results.
pub struct QueryIter<'w, 'q> {
    world: &'w World,
    query: &'q Query,
    archetype_idx: usize,
    row: usize,
}

impl<'w, 'q> QueryIter<'w, 'q> {
    fn new(world: &'w World, query: &'q Query) -> Self {
        Self {
            world,
            query,
            archetype_idx: 0,
            row: 0,
        }
    }
}

impl<'w> Iterator for QueryIter<'w, '_> {
    type Item = QueryRow<'w>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let &arch_id = self.query.candidates.get(self.archetype_idx)?;
            let archetype = self.world.archetypes().get(arch_id)?;

            if self.row >= archetype.len() {
                self.archetype_idx += 1;
                self.row = 0;
                continue;
            }

            let row = self.row;
            self.row += 1;

            return Some(QueryRow {
                world: self.world,
                archetype,
                row,
            });
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining: usize = self.query.candidates[self.archetype_idx.min(self.query.candidates.len())..]
            .iter()
            .filter_map(|&id| self.world.archetypes().get(id))
            .map(Archetype::len)
            .sum::<usize>()
            .saturating_sub(self.row);

        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for QueryIter<'_, '_> {}

// ============================================================================
// QueryRow - Single Row Access
// ============================================================================

/// A single row from a query result.
pub struct QueryRow<'w> {
    world: &'w World,
    archetype: &'w Archetype,
    row: usize,
}

impl<'w> QueryRow<'w> {
    /// Get the entity for this row.
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.archetype.entity(self.row)
    }

    /// Archetype holding this row.
    #[must_use]
    pub fn archetype(&self) -> &'w Archetype {
        self.archetype
    }

    /// Get a required component value.
    ///
    /// # Panics
    ///
    /// Panics if the component is not present. Use `get_optional` for
    /// components outside the query.
    #[must_use]
    pub fn get<T: Component>(&self) -> T {
        self.get_optional::<T>()
            .expect("Component not present - use get_optional() for optional components")
    }

    /// Get a component value if this row's archetype stores it.
    #[must_use]
    pub fn get_optional<T: Component>(&self) -> Option<T> {
        let id = self.world.component_id::<T>()?;
        self.archetype.get(self.row, id)
    }

    /// Bytes of a component by id.
    #[must_use]
    pub fn get_raw(&self, component: ComponentId) -> Option<&'w [u8]> {
        self.archetype.read(self.row, component)
    }

    /// Check if the entity has a component.
    #[must_use]
    pub fn has<T: Component>(&self) -> bool {
        self.world
            .component_id::<T>()
            .is_some_and(|id| self.archetype.contains(id))
    }
}

impl core::fmt::Debug for QueryRow<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QueryRow")
            .field("entity", &self.entity())
            .field("archetype", &self.archetype.id())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

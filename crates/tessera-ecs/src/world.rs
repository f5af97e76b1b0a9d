//! World - the store holding all entities, components, and archetypes.
//!
//! Every operation goes through an explicit `World` value; there is no
//! global state, so independent worlds can coexist (one per test, one per
//! simulation).
//!
//! Mutations always run archetype registry -> archetype -> record index:
//! a migrating entity gets its destination row (and record) before its
//! source row is swap-removed. Queries only read the registry and the
//! archetypes.

use std::fmt;

use crate::{
    archetype::{Archetype, ArchetypeId},
    component::{Component, ComponentId, ComponentRegistry},
    config::StoreConfig,
    entity::{Entity, EntityAllocator},
    error::EcsResult,
    query::{Query, QueryBuilder},
    record::{Record, RecordIndex},
    registry::ArchetypeRegistry,
    signature::Signature,
};

/// What [`World::shutdown`] released.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Live entities whose records were dropped.
    pub entities: usize,
    /// Archetypes destroyed.
    pub archetypes: usize,
    /// Archetype table bytes released.
    pub bytes: usize,
}

/// The ECS world - container for all entities and components.
pub struct World {
    config: StoreConfig,
    /// Entity ID allocator.
    entities: EntityAllocator,
    /// Entity -> (archetype, row).
    records: RecordIndex,
    /// Component type registry.
    components: ComponentRegistry,
    /// Archetype storage and relation index.
    archetypes: ArchetypeRegistry,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a world with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::build(StoreConfig::default())
    }

    /// Create a world from a configuration, validating it first.
    pub fn with_config(config: StoreConfig) -> EcsResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: StoreConfig) -> Self {
        Self {
            entities: EntityAllocator::new(config.first_entity),
            records: RecordIndex::with_capacity(config.entity_capacity),
            components: ComponentRegistry::new(),
            archetypes: ArchetypeRegistry::new(config.default_capacity, config.archetype_capacity),
            config,
        }
    }

    /// The configuration this world was built with.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Tear the world down, releasing every archetype table and index.
    pub fn shutdown(mut self) -> ShutdownReport {
        let entities = self.records.clear();
        let (archetypes, bytes) = self.archetypes.clear();
        let report = ShutdownReport {
            entities,
            archetypes,
            bytes,
        };
        tracing::info!(?report, "world shut down");
        report
    }

    // ==================== Entity Operations ====================

    /// Create an entity holding `components`, all zero-filled.
    ///
    /// An empty slice creates an entity with no components.
    ///
    /// # Panics
    ///
    /// Panics if a component id is not registered in this world.
    pub fn create_entity(&mut self, components: &[ComponentId]) -> Entity {
        self.assert_registered(components);
        let signature = Signature::new(components.iter().copied());
        let archetype_id = self.archetypes.get_or_create(&signature, &self.components);

        let entity = self.entities.allocate();
        let row = self.archetype_mut(archetype_id).append_row(entity);
        self.records.set(entity, archetype_id, row);

        entity
    }

    /// Create an entity with no components.
    pub fn spawn_empty(&mut self) -> Entity {
        self.create_entity(&[])
    }

    /// Create an entity with a single component value.
    pub fn spawn<T: Component>(&mut self, component: T) -> Entity {
        let id = self.components.register::<T>();
        let entity = self.create_entity(&[id]);
        self.set_component(entity, id, bytemuck::bytes_of(&component));
        entity
    }

    /// Delete an entity and all its components.
    ///
    /// Returns `false` (and changes nothing) if the entity does not exist.
    pub fn delete_entity(&mut self, entity: Entity) -> bool {
        let Some(record) = self.records.remove(entity) else {
            return false;
        };

        let archetype = self
            .archetypes
            .get_mut(record.archetype)
            .expect("record points at a live archetype");
        if let Some(moved) = archetype.remove_row(record.row) {
            self.records.set_row(moved, record.row);
        }

        true
    }

    /// Check if an entity exists.
    #[must_use]
    pub fn exists_entity(&self, entity: Entity) -> bool {
        self.records.contains(entity)
    }

    /// Get the number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.records.len()
    }

    /// Get the location of an entity.
    #[must_use]
    pub fn entity_location(&self, entity: Entity) -> Option<Record> {
        self.records.get(entity)
    }

    /// Iterate over all live entities, grouped by archetype.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.archetypes.iter().flat_map(Archetype::entities)
    }

    // ==================== Component Registration ====================

    /// Register a component type.
    pub fn register<T: Component>(&mut self) -> ComponentId {
        self.components.register::<T>()
    }

    /// Register a component known only by name and byte size.
    pub fn register_dynamic(&mut self, name: &str, size: usize) -> EcsResult<ComponentId> {
        self.components.register_dynamic(name, size)
    }

    /// Get the component ID for a type.
    #[must_use]
    pub fn component_id<T: Component>(&self) -> Option<ComponentId> {
        self.components.get_id::<T>()
    }

    /// Get the component registry.
    #[must_use]
    pub const fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Get the archetype registry.
    #[must_use]
    pub const fn archetypes(&self) -> &ArchetypeRegistry {
        &self.archetypes
    }

    // ==================== Component Operations ====================

    /// Check if an entity has a component.
    #[must_use]
    pub fn has_component(&self, entity: Entity, component: ComponentId) -> bool {
        self.records
            .get(entity)
            .is_some_and(|record| self.archetype(record.archetype).contains(component))
    }

    /// Add one component, zero-filled. See [`add_components`](Self::add_components).
    pub fn add_component(&mut self, entity: Entity, component: ComponentId) -> bool {
        self.add_components(entity, &[component])
    }

    /// Add components to an entity, moving it to the matching archetype.
    ///
    /// Values of components the entity already had are preserved; new
    /// components start zero-filled. Returns `false` if the entity does not
    /// exist or already has every listed component, in which case nothing
    /// changes.
    ///
    /// # Panics
    ///
    /// Panics if `components` is empty or holds an unregistered id.
    pub fn add_components(&mut self, entity: Entity, components: &[ComponentId]) -> bool {
        assert!(!components.is_empty(), "add_components needs at least one component");
        self.assert_registered(components);
        let Some(record) = self.records.get(entity) else {
            return false;
        };

        let current = self.archetype(record.archetype).signature();
        let merged = current.with(components);
        if merged.len() == current.len() {
            return false;
        }

        self.migrate(entity, record, &merged);
        true
    }

    /// Remove a component from an entity, moving it to the matching
    /// archetype. Other component values are preserved.
    ///
    /// Returns `false` if the entity does not exist or lacks the component.
    ///
    /// # Panics
    ///
    /// Panics if `component` is [`ComponentId::ENTITY`].
    pub fn remove_component(&mut self, entity: Entity, component: ComponentId) -> bool {
        let Some(record) = self.records.get(entity) else {
            return false;
        };

        let current = self.archetype(record.archetype).signature();
        if !current.contains(component) {
            return false;
        }
        let reduced = current.without(component);

        self.migrate(entity, record, &reduced);
        true
    }

    /// Bytes of an entity's component.
    ///
    /// The slice borrows the world, so it cannot outlive the next mutation.
    #[must_use]
    pub fn get_component(&self, entity: Entity, component: ComponentId) -> Option<&[u8]> {
        let record = self.records.get(entity)?;
        self.archetype(record.archetype).read(record.row, component)
    }

    /// Overwrite an entity's component with raw bytes.
    ///
    /// Returns `false` if the entity does not exist or lacks the component.
    ///
    /// # Panics
    ///
    /// Panics if `component` is [`ComponentId::ENTITY`] or `bytes` does not
    /// match the component size.
    pub fn set_component(&mut self, entity: Entity, component: ComponentId, bytes: &[u8]) -> bool {
        assert_ne!(component, ComponentId::ENTITY, "the entity column is read-only");
        let Some(record) = self.records.get(entity) else {
            return false;
        };
        self.archetype_mut(record.archetype)
            .write(record.row, component, bytes)
    }

    /// Check if an entity has a component of type `T`.
    #[must_use]
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.component_id::<T>()
            .is_some_and(|id| self.has_component(entity, id))
    }

    /// Get an owned copy of an entity's component.
    #[must_use]
    pub fn get<T: Component>(&self, entity: Entity) -> Option<T> {
        let id = self.component_id::<T>()?;
        self.get_component(entity, id)
            .map(bytemuck::pod_read_unaligned)
    }

    /// Overwrite a component the entity already has.
    ///
    /// Returns `false` if the entity does not exist or lacks the component.
    pub fn set<T: Component>(&mut self, entity: Entity, component: T) -> bool {
        let Some(id) = self.component_id::<T>() else {
            return false;
        };
        self.set_component(entity, id, bytemuck::bytes_of(&component))
    }

    /// Add a component if missing, then write its value.
    ///
    /// Returns `false` if the entity does not exist.
    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) -> bool {
        if !self.exists_entity(entity) {
            return false;
        }
        let id = self.components.register::<T>();
        self.add_component(entity, id);
        self.set_component(entity, id, bytemuck::bytes_of(&component))
    }

    /// Remove a component and return its last value.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        let value = self.get::<T>(entity)?;
        let id = self.component_id::<T>()?;
        self.remove_component(entity, id);
        Some(value)
    }

    // ==================== Query ====================

    /// Build a query over every entity having at least `components`.
    ///
    /// Resolves (creating if needed) the archetype for exactly
    /// `components` and snapshots its relation list as the candidates.
    ///
    /// # Panics
    ///
    /// Panics if `components` is empty or holds an unregistered id.
    pub fn query(&mut self, components: &[ComponentId]) -> Query {
        assert!(!components.is_empty(), "query needs at least one component");
        self.assert_registered(components);

        let signature = Signature::new(components.iter().copied());
        let root = self.archetypes.get_or_create(&signature, &self.components);
        let candidates = self.archetype(root).related().to_vec();

        Query::new(signature, root, candidates)
    }

    /// Start a typed query builder.
    pub fn query_builder(&mut self) -> QueryBuilder<'_> {
        QueryBuilder::new(self)
    }

    // ==================== Internals ====================

    fn archetype(&self, id: ArchetypeId) -> &Archetype {
        self.archetypes
            .get(id)
            .expect("record points at a live archetype")
    }

    fn archetype_mut(&mut self, id: ArchetypeId) -> &mut Archetype {
        self.archetypes
            .get_mut(id)
            .expect("record points at a live archetype")
    }

    fn assert_registered(&self, components: &[ComponentId]) {
        for &id in components {
            assert!(self.components.contains(id), "{id:?} is not registered");
        }
    }

    /// Move `entity` from `from` into the archetype for `signature`.
    ///
    /// The destination row is appended and recorded first; only then is the
    /// source row swap-removed, which may relocate another entity.
    fn migrate(&mut self, entity: Entity, from: Record, signature: &Signature) {
        let to = self.archetypes.get_or_create(signature, &self.components);
        let (source, target) = self.archetypes.get2_mut(from.archetype, to);

        let row = target.append_row(entity);
        target.copy_shared_from(row, source, from.row);
        self.records.set(entity, to, row);

        if let Some(moved) = source.remove_row(from.row) {
            self.records.set_row(moved, from.row);
        }

        tracing::trace!(?entity, from = ?from.archetype, ?to, "migrated entity");
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("entity_count", &self.records.len())
            .field("component_types", &self.components.len())
            .field("archetype_count", &self.archetypes.len())
            .finish()
    }
}

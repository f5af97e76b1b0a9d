//! Component type registration and metadata.
//!
//! The registry is the type descriptor provider of the store: it hands out
//! a stable `ComponentId` per component type together with its byte size.
//! Archetype signatures only ever see these ids.

use std::{any::TypeId, borrow::Cow, fmt};

use bytemuck::Pod;
use rustc_hash::FxHashMap;

use crate::{
    entity::Entity,
    error::{EcsError, EcsResult},
};

/// Marker trait for types that can be stored as components.
///
/// Column storage is plain bytes: new rows are zero-filled and migration
/// copies bytes between tables. `Pod` guarantees both are sound for the
/// stored type.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
/// #[repr(C)]
/// struct Position { x: f32, y: f32, z: f32 }
/// ```
pub trait Component: Pod + Send + Sync + 'static {}

impl<T: Pod + Send + Sync + 'static> Component for T {}

/// Unique identifier for a component type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u32);

impl ComponentId {
    /// The entity id column, present in every archetype.
    pub const ENTITY: Self = Self(0);

    /// Create a component ID from a raw value.
    #[must_use]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

/// Runtime information about a component type.
#[derive(Clone)]
pub struct ComponentInfo {
    id: ComponentId,
    name: Cow<'static, str>,
    size: usize,
    /// `None` for components registered at runtime by name.
    type_id: Option<TypeId>,
}

impl ComponentInfo {
    /// Create component info for a concrete type.
    #[must_use]
    pub fn of<T: Component>(id: ComponentId) -> Self {
        Self {
            id,
            name: Cow::Borrowed(std::any::type_name::<T>()),
            size: std::mem::size_of::<T>(),
            type_id: Some(TypeId::of::<T>()),
        }
    }

    /// Create component info for a component only known by name and size.
    #[must_use]
    pub fn dynamic(id: ComponentId, name: impl Into<String>, size: usize) -> Self {
        Self {
            id,
            name: Cow::Owned(name.into()),
            size,
            type_id: None,
        }
    }

    /// Get the component ID.
    #[must_use]
    pub const fn id(&self) -> ComponentId {
        self.id
    }

    /// Get the component type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the size in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Check if this info is for the given type.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == Some(TypeId::of::<T>())
    }
}

impl fmt::Debug for ComponentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInfo")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("size", &self.size)
            .finish()
    }
}

/// Registry for component types.
///
/// Ids are dense and assigned in registration order, starting with
/// [`ComponentId::ENTITY`] which every registry reserves for [`Entity`].
pub struct ComponentRegistry {
    /// Map from TypeId to ComponentId.
    type_to_id: FxHashMap<TypeId, ComponentId>,
    /// Map from dynamic component name to ComponentId.
    name_to_id: FxHashMap<String, ComponentId>,
    /// Component info indexed by ComponentId.
    infos: Vec<ComponentInfo>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry {
    /// Create a registry holding only the entity id column.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            type_to_id: FxHashMap::default(),
            name_to_id: FxHashMap::default(),
            infos: Vec::new(),
        };
        let entity = registry.register::<Entity>();
        debug_assert_eq!(entity, ComponentId::ENTITY);
        registry
    }

    /// Register a component type and return its ID.
    ///
    /// If the type is already registered, returns the existing ID.
    pub fn register<T: Component>(&mut self) -> ComponentId {
        let type_id = TypeId::of::<T>();

        if let Some(&id) = self.type_to_id.get(&type_id) {
            return id;
        }

        let id = self.next_id();
        self.type_to_id.insert(type_id, id);
        self.infos.push(ComponentInfo::of::<T>(id));
        id
    }

    /// Register a component known only by name and byte size.
    ///
    /// Useful for components defined by scripts or data files. Names must
    /// be unique among dynamic components.
    pub fn register_dynamic(&mut self, name: &str, size: usize) -> EcsResult<ComponentId> {
        if self.name_to_id.contains_key(name) {
            return Err(EcsError::DuplicateComponent(name.to_owned()));
        }

        let id = self.next_id();
        self.name_to_id.insert(name.to_owned(), id);
        self.infos.push(ComponentInfo::dynamic(id, name, size));
        Ok(id)
    }

    fn next_id(&self) -> ComponentId {
        let raw = u32::try_from(self.infos.len()).expect("component id space exhausted");
        ComponentId(raw)
    }

    /// Get the component ID for a type, if registered.
    #[must_use]
    pub fn get_id<T: Component>(&self) -> Option<ComponentId> {
        self.type_to_id.get(&TypeId::of::<T>()).copied()
    }

    /// Get the component ID for a dynamic component name, if registered.
    #[must_use]
    pub fn get_id_by_name(&self, name: &str) -> Option<ComponentId> {
        self.name_to_id.get(name).copied()
    }

    /// Get component info by ID.
    #[must_use]
    pub fn get_info(&self, id: ComponentId) -> Option<&ComponentInfo> {
        self.infos.get(id.as_raw() as usize)
    }

    /// Byte size of a registered component.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this registry.
    #[must_use]
    pub fn size_of(&self, id: ComponentId) -> usize {
        self.get_info(id)
            .unwrap_or_else(|| panic!("{id:?} is not registered"))
            .size()
    }

    /// Check whether `id` was issued by this registry.
    #[must_use]
    pub fn contains(&self, id: ComponentId) -> bool {
        (id.as_raw() as usize) < self.infos.len()
    }

    /// Get the number of registered components, the entity column included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Always false: the entity column is registered on construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Iterate over all registered component infos.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentInfo> {
        self.infos.iter()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("count", &self.len())
            .field("components", &self.infos)
            .finish()
    }
}

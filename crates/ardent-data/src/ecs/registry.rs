// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::any::TypeId;

use ahash::AHashMap;
use ardent_core::ecs::EntityId;
use serde::{de::DeserializeOwned, Serialize};

use crate::ecs::{Archetype, Component, ComponentTypeIndex, PrefabError, World};

/// Adds a default-constructed component to an entity, if missing.
pub type AddDefaultFn = fn(&mut World, EntityId);
/// Encodes the component of an entity, if it has one.
pub type SerializeFn = fn(&World, EntityId) -> Option<Result<String, PrefabError>>;
/// Decodes a component and adds it to an entity.
pub type DeserializeFn = fn(&mut World, EntityId, &str) -> Result<(), PrefabError>;

/// Run-time description of one component type.
///
/// The function pointers let the world create, default-construct and
/// (de)serialize components of a type it only knows by index or by name.
#[derive(Clone)]
pub struct ComponentInfo {
    type_index: ComponentTypeIndex,
    name: String,
    add_default: Option<AddDefaultFn>,
    serialize: Option<SerializeFn>,
    deserialize: Option<DeserializeFn>,
}

impl ComponentInfo {
    fn of<T: Component>() -> Self {
        let type_index = ComponentTypeIndex::of::<T>();
        Self {
            type_index,
            name: type_index.short_name().to_string(),
            add_default: None,
            serialize: None,
            deserialize: None,
        }
    }

    /// The type this entry describes.
    pub fn type_index(&self) -> ComponentTypeIndex {
        self.type_index
    }

    /// The name used in prefabs and editor listings.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default-construction entry point, if the type is `Default`.
    pub fn add_default(&self) -> Option<AddDefaultFn> {
        self.add_default
    }

    /// Returns `true` if the type takes part in prefabs.
    pub fn is_serializable(&self) -> bool {
        self.serialize.is_some() && self.deserialize.is_some()
    }

    pub(crate) fn serialize(&self) -> Option<SerializeFn> {
        self.serialize
    }

    pub(crate) fn deserialize(&self) -> Option<DeserializeFn> {
        self.deserialize
    }
}

impl std::fmt::Debug for ComponentInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentInfo")
            .field("name", &self.name)
            .field("default", &self.add_default.is_some())
            .field("serializable", &self.is_serializable())
            .finish()
    }
}

fn add_default<T: Component + Default>(world: &mut World, id: EntityId) {
    if !world.has::<T>(id) {
        world.add_component(id, T::default());
    }
}

fn serialize<T: Component + Serialize>(
    world: &World,
    id: EntityId,
) -> Option<Result<String, PrefabError>> {
    let component = world.component::<T>(id)?;
    Some(
        ron::to_string(component).map_err(|e| PrefabError::Serialize {
            type_name: ComponentTypeIndex::of::<T>().short_name().to_string(),
            message: e.to_string(),
        }),
    )
}

fn deserialize<T: Component + DeserializeOwned>(
    world: &mut World,
    id: EntityId,
    data: &str,
) -> Result<(), PrefabError> {
    let value: T = ron::from_str(data).map_err(|e| PrefabError::Deserialize {
        type_name: ComponentTypeIndex::of::<T>().short_name().to_string(),
        message: e.to_string(),
    })?;
    world.add_component(id, value);
    Ok(())
}

/// The set of component types known at run time.
///
/// Populated explicitly at start-up, usually once per application, then
/// handed to each [`World`] (see [`World::with_registry`]). Typed world
/// operations work on unregistered types too; registration is only needed
/// for by-name and by-index access.
#[derive(Debug, Default, Clone)]
pub struct ComponentRegistry {
    infos: AHashMap<TypeId, ComponentInfo>,
    by_name: AHashMap<String, TypeId>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` under its short type name. Registering twice is harmless.
    ///
    /// # Panics
    ///
    /// Panics if another type already uses the same short name.
    pub fn register<T: Component>(&mut self) -> &mut ComponentInfo {
        let by_name = &mut self.by_name;
        self.infos.entry(TypeId::of::<T>()).or_insert_with(|| {
            let info = ComponentInfo::of::<T>();
            assert!(
                !by_name.contains_key(&info.name),
                "Component name '{}' is already registered for another type",
                info.name
            );
            log::trace!("Registering component type '{}'", info.name);
            by_name.insert(info.name.clone(), TypeId::of::<T>());
            info
        })
    }

    /// Registers `T` and enables default construction by index.
    pub fn register_default<T: Component + Default>(&mut self) -> &mut ComponentInfo {
        let info = self.register::<T>();
        info.add_default = Some(add_default::<T>);
        info
    }

    /// Registers `T` for default construction and prefab (de)serialization.
    pub fn register_serializable<T>(&mut self) -> &mut ComponentInfo
    where
        T: Component + Default + Serialize + DeserializeOwned,
    {
        let info = self.register_default::<T>();
        info.serialize = Some(serialize::<T>);
        info.deserialize = Some(deserialize::<T>);
        info
    }

    /// Information about the type behind `type_index`.
    pub fn get(&self, type_index: ComponentTypeIndex) -> Option<&ComponentInfo> {
        self.infos.get(&type_index.type_id())
    }

    /// Information about the type registered as `name`.
    pub fn get_by_name(&self, name: &str) -> Option<&ComponentInfo> {
        self.by_name.get(name).and_then(|id| self.infos.get(id))
    }

    /// Every registered type, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentInfo> {
        self.infos.values()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Builds an archetype from registered type names.
    ///
    /// Returns `None` if a name is unknown or not default-constructible.
    pub fn archetype<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Option<Archetype> {
        let mut archetype = Archetype::new();
        for name in names {
            let info = self.get_by_name(name)?;
            archetype.push(info.type_index, info.add_default?);
        }
        Some(archetype)
    }
}

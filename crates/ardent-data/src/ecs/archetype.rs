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

use ardent_core::ecs::EntityId;

use crate::ecs::{registry::AddDefaultFn, Component, ComponentTypeIndex, World};

/// A template listing the component types a new entity starts with.
///
/// Every listed type is default-constructed exactly once on the created
/// entity, even if it was listed twice or is also a required component.
///
/// ```rust
/// use ardent_data::ecs::{Archetype, Component, World};
///
/// #[derive(Component, Default)]
/// struct Position(f32, f32);
///
/// let archetype = Archetype::new().with::<Position>();
/// let mut world = World::new();
/// let id = world.create_entity_from(&archetype);
/// assert!(world.has::<Position>(id));
/// ```
#[derive(Clone, Default)]
pub struct Archetype {
    entries: Vec<(ComponentTypeIndex, AddDefaultFn)>,
}

impl Archetype {
    /// Creates an empty archetype.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `T` to the archetype (builder style).
    pub fn with<T: Component + Default>(mut self) -> Self {
        self.add::<T>();
        self
    }

    /// Adds `T` to the archetype.
    pub fn add<T: Component + Default>(&mut self) {
        self.push(ComponentTypeIndex::of::<T>(), |world, id| {
            if !world.has::<T>(id) {
                world.add_component(id, T::default());
            }
        });
    }

    pub(crate) fn push(&mut self, type_index: ComponentTypeIndex, add_default: AddDefaultFn) {
        if !self.contains(type_index) {
            self.entries.push((type_index, add_default));
        }
    }

    /// Returns `true` if the archetype lists `type_index`.
    pub fn contains(&self, type_index: ComponentTypeIndex) -> bool {
        self.entries.iter().any(|(t, _)| *t == type_index)
    }

    /// The listed types, in insertion order.
    pub fn types(&self) -> impl Iterator<Item = ComponentTypeIndex> + '_ {
        self.entries.iter().map(|(t, _)| *t)
    }

    /// Number of listed types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no type is listed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn add_to(&self, world: &mut World, id: EntityId) {
        for (_, add_default) in &self.entries {
            add_default(world, id);
        }
    }
}

impl std::fmt::Debug for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.types()).finish()
    }
}

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

//! Ardent's sparse-set **Entity-Component-System**.
//!
//! Every component type gets its own [`SparseComponentSet`]: a packed array
//! of values plus an index array keyed by entity, giving $O(1)$ insertion,
//! removal and lookup. Queries intersect these sets, starting from the
//! smallest one (see [`SetMatch`] for the matching rules).
//!
//! The primary entry point for interacting with the ECS is the [`World`] struct.

mod archetype;
mod bundle;
mod component;
mod container;
mod entity_pool;
mod prefab;
mod query;
mod registry;
mod sparse_set;
mod system;
pub mod tags;
mod world;
mod world_components;

pub use archetype::Archetype;
pub use ardent_core::ecs::EntityId;
pub use ardent_macros::Component;
pub use bundle::{ComponentBundle, StaticArchetype};
pub use component::{type_index, Component, ComponentTypeIndex};
pub use container::{AnyComponentSet, ComponentContainer};
pub use entity_pool::EntityIdPool;
pub use prefab::{ComponentPrefab, EntityPrefab, PrefabError};
pub use query::*;
pub use registry::{AddDefaultFn, ComponentInfo, ComponentRegistry, DeserializeFn, SerializeFn};
pub use sparse_set::{SparseComponentSet, SparseIdSet};
pub use system::{System, SystemAny, SystemRegistry};
pub use tags::TagSet;
pub use world::World;
pub use world_components::WorldComponents;

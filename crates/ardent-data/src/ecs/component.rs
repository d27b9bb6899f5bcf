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
use std::fmt;

/// A marker trait for types that can be used as components in the ECS.
///
/// This trait must be implemented for any struct you wish to attach to an entity,
/// usually through `#[derive(Component)]`. The `'static` lifetime ensures that the
/// component type does not contain any non-static references, and `Send + Sync`
/// let worlds be handed between threads.
pub trait Component: 'static + Send + Sync {}

/// A stable per-type key used to find the container of a component type.
///
/// Only the `TypeId` takes part in equality and hashing. The name is carried
/// along for logs and editor display.
#[derive(Clone, Copy)]
pub struct ComponentTypeIndex {
    type_id: TypeId,
    name: &'static str,
}

impl ComponentTypeIndex {
    /// Returns the index of component type `T`.
    pub fn of<T: Component>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The full Rust type name of the component.
    pub fn type_name(&self) -> &'static str {
        self.name
    }

    /// The type name without its module path.
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }
}

impl PartialEq for ComponentTypeIndex {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentTypeIndex {}

impl std::hash::Hash for ComponentTypeIndex {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ComponentTypeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentTypeIndex({})", self.short_name())
    }
}

/// Shorthand for [`ComponentTypeIndex::of`].
pub fn type_index<T: Component>() -> ComponentTypeIndex {
    ComponentTypeIndex::of::<T>()
}

/// Strips the module path (and keeps generic arguments intact).
pub(crate) fn short_type_name(name: &'static str) -> &'static str {
    let end = name.find('<').unwrap_or(name.len());
    match name[..end].rfind("::") {
        Some(pos) => &name[pos + 2..],
        None => name,
    }
}

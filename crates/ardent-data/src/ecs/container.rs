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

use std::any::Any;

use ardent_core::ecs::EntityId;

use crate::ecs::{Component, ComponentTypeIndex, SparseComponentSet, SparseIdSet};

/// Operations the `World` performs on a component set without knowing `T`.
pub trait AnyComponentSet: Send + Sync {
    /// Returns `true` if `id` holds a component in this set.
    fn contains(&self, id: EntityId) -> bool;
    /// Drops the component of `id`, if any.
    fn remove(&mut self, id: EntityId) -> bool;
    /// Every entity holding a component.
    fn id_set(&self) -> &SparseIdSet;
    /// Entities whose component was inserted since the last clear.
    fn recently_added(&self) -> &SparseIdSet;
    /// Forgets the recently added entities.
    fn clear_recently_added(&mut self);
    /// Returns `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
    /// Returns `self` as `&mut dyn Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyComponentSet for SparseComponentSet<T> {
    fn contains(&self, id: EntityId) -> bool {
        SparseComponentSet::contains(self, id)
    }

    fn remove(&mut self, id: EntityId) -> bool {
        SparseComponentSet::remove(self, id).is_some()
    }

    fn id_set(&self) -> &SparseIdSet {
        SparseComponentSet::id_set(self)
    }

    fn recently_added(&self) -> &SparseIdSet {
        SparseComponentSet::recently_added(self)
    }

    fn clear_recently_added(&mut self) {
        SparseComponentSet::clear_recently_added(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Owns the [`SparseComponentSet`] of one component type behind a type-erased box.
pub struct ComponentContainer {
    type_index: ComponentTypeIndex,
    set: Box<dyn AnyComponentSet>,
}

impl ComponentContainer {
    /// Creates an empty container for `T`.
    pub fn new<T: Component>() -> Self {
        Self {
            type_index: ComponentTypeIndex::of::<T>(),
            set: Box::new(SparseComponentSet::<T>::new()),
        }
    }

    /// The component type stored here.
    pub fn type_index(&self) -> ComponentTypeIndex {
        self.type_index
    }

    /// See [`AnyComponentSet::contains`].
    pub fn contains(&self, id: EntityId) -> bool {
        self.set.contains(id)
    }

    /// See [`AnyComponentSet::remove`].
    pub fn remove(&mut self, id: EntityId) -> bool {
        self.set.remove(id)
    }

    /// See [`AnyComponentSet::id_set`].
    pub fn id_set(&self) -> &SparseIdSet {
        self.set.id_set()
    }

    /// See [`AnyComponentSet::recently_added`].
    pub fn recently_added(&self) -> &SparseIdSet {
        self.set.recently_added()
    }

    /// See [`AnyComponentSet::clear_recently_added`].
    pub fn clear_recently_added(&mut self) {
        self.set.clear_recently_added()
    }

    /// Number of components stored.
    pub fn len(&self) -> usize {
        self.set.id_set().len()
    }

    /// Returns `true` if no component is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Downcasts to the typed set. Returns `None` if `T` is not the stored type.
    pub fn typed<T: Component>(&self) -> Option<&SparseComponentSet<T>> {
        self.set.as_any().downcast_ref()
    }

    /// Mutable counterpart of [`Self::typed`].
    pub fn typed_mut<T: Component>(&mut self) -> Option<&mut SparseComponentSet<T>> {
        self.set.as_any_mut().downcast_mut()
    }
}

impl std::fmt::Debug for ComponentContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentContainer")
            .field("type", &self.type_index)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Speed(f32);
    impl Component for Speed {}

    #[test]
    fn test_container_type_erasure() {
        let mut container = ComponentContainer::new::<Speed>();
        let id = EntityId::new(2, 0);
        container.typed_mut::<Speed>().unwrap().insert(id, Speed(3.0));

        assert!(container.contains(id));
        assert_eq!(container.len(), 1);
        assert_eq!(container.typed::<Speed>().unwrap().get(id), Some(&Speed(3.0)));
        assert!(container.typed::<Other>().is_none());

        assert!(container.remove(id));
        assert!(container.is_empty());
    }

    struct Other;
    impl Component for Other {}
}

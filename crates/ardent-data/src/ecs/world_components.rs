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

//! Singletons attached to the world rather than to an entity.

use std::any::{Any, TypeId};

use ahash::AHashMap;

/// A type-map of world-level values keyed by [`TypeId`].
///
/// Systems use it for state that has exactly one instance per world, such as
/// a scene camera selection or editor bookkeeping.
///
/// # Example
///
/// ```rust
/// use ardent_data::ecs::WorldComponents;
///
/// struct Gravity(f32);
///
/// let mut components = WorldComponents::new();
/// components.get_or_insert_with(|| Gravity(9.81));
/// assert_eq!(components.get::<Gravity>().unwrap().0, 9.81);
/// ```
#[derive(Default)]
pub struct WorldComponents {
    values: AHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl WorldComponents {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value`, replacing any previous value of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) {
        self.values.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Returns the value of type `T`, inserting `init()` first if absent.
    pub fn get_or_insert_with<T: Send + Sync + 'static>(
        &mut self,
        init: impl FnOnce() -> T,
    ) -> &mut T {
        self.values
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(init()))
            .downcast_mut::<T>()
            .unwrap_or_else(|| unreachable!("world component stored under a foreign TypeId"))
    }

    /// The value of type `T`, if present.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }

    /// The value of type `T`, mutably.
    #[must_use]
    pub fn get_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.values
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_mut::<T>())
    }

    /// Removes and returns the value of type `T`.
    pub fn remove<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.values
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    /// Returns `true` if a value of type `T` is present.
    #[must_use]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Clock {
        frame: u64,
    }

    #[test]
    fn test_get_or_insert_only_initializes_once() {
        let mut components = WorldComponents::new();
        components.get_or_insert_with(|| Clock { frame: 1 }).frame += 1;
        components.get_or_insert_with(|| Clock { frame: 100 }).frame += 1;

        assert_eq!(components.get::<Clock>().unwrap().frame, 3);
        assert_eq!(components.len(), 1);
    }

    #[test]
    fn test_remove_returns_value() {
        let mut components = WorldComponents::new();
        components.insert(Clock { frame: 7 });

        assert_eq!(components.remove::<Clock>().map(|c| c.frame), Some(7));
        assert!(!components.contains::<Clock>());
        assert!(components.get_mut::<Clock>().is_none());
    }
}

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

//! Systems: per-frame logic run by the [`World`] in registration order.

use std::any::{Any, TypeId};

use ahash::AHashMap;

use crate::ecs::{component::short_type_name, World};

/// Downcasting support for systems, implemented for every eligible type.
pub trait SystemAny: Any {
    /// Allows downcasting to concrete system types.
    fn as_any(&self) -> &dyn Any;

    /// Allows mutable downcasting to concrete system types.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> SystemAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Logic that runs against the world every frame.
///
/// Systems run sequentially, in the order they were added, so a system
/// observes every mutation made by the systems before it within the same
/// tick.
pub trait System: SystemAny + Send + Sync {
    /// Called once, right after the system is added to a world.
    fn setup(&mut self, _world: &mut World) {}

    /// Called by [`World::tick`].
    fn tick(&mut self, world: &mut World);

    /// Called by [`World::update`] with the elapsed time in seconds.
    fn update(&mut self, _world: &mut World, _dt: f32) {}
}

struct SystemEntry {
    type_id: TypeId,
    name: &'static str,
    system: Box<dyn System>,
}

/// The systems of a world, with lookup by concrete type.
#[derive(Default)]
pub struct SystemRegistry {
    entries: Vec<SystemEntry>,
    index: AHashMap<TypeId, usize>,
}

impl SystemRegistry {
    /// Returns `true` if a system of type `S` is registered.
    pub fn contains<S: System>(&self) -> bool {
        self.index.contains_key(&TypeId::of::<S>())
    }

    /// Number of registered systems.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no system is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// System names, in run order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    pub(crate) fn push<S: System>(&mut self, system: Box<S>) -> &mut S {
        let type_id = TypeId::of::<S>();
        assert!(
            !self.index.contains_key(&type_id),
            "System `{}` is already registered",
            std::any::type_name::<S>()
        );
        self.index.insert(type_id, self.entries.len());
        self.entries.push(SystemEntry {
            type_id,
            name: short_type_name(std::any::type_name::<S>()),
            system,
        });
        let last = self.entries.len() - 1;
        // Dereference the box so the call dispatches to the boxed system.
        (*self.entries[last].system)
            .as_any_mut()
            .downcast_mut()
            .unwrap_or_else(|| unreachable!())
    }

    pub(crate) fn get<S: System>(&self) -> Option<&S> {
        let slot = *self.index.get(&TypeId::of::<S>())?;
        (*self.entries[slot].system).as_any().downcast_ref()
    }

    pub(crate) fn get_mut<S: System>(&mut self) -> Option<&mut S> {
        let slot = *self.index.get(&TypeId::of::<S>())?;
        (*self.entries[slot].system).as_any_mut().downcast_mut()
    }

    /// Moves the systems out so they can borrow the world mutably.
    pub(crate) fn take(&mut self) -> SystemRegistry {
        std::mem::take(self)
    }

    /// Puts taken systems back in front of any system added meanwhile.
    pub(crate) fn restore(&mut self, mut taken: SystemRegistry) {
        let added = std::mem::take(&mut self.entries);
        for entry in added {
            assert!(
                !taken.index.contains_key(&entry.type_id),
                "System `{}` is already registered",
                entry.name
            );
            taken.index.insert(entry.type_id, taken.entries.len());
            taken.entries.push(entry);
        }
        *self = taken;
    }

    pub(crate) fn for_each(&mut self, mut f: impl FnMut(&mut dyn System)) {
        for entry in &mut self.entries {
            f(entry.system.as_mut());
        }
    }
}

impl std::fmt::Debug for SystemRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

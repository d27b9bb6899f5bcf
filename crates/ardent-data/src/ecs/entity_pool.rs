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

//! Entity id allocation and recycling.

use crate::ecs::SparseIdSet;
use ardent_core::ecs::EntityId;

/// Allocator for unique entity ids.
///
/// Indices of removed entities are recycled through a free list. Removing an
/// entity bumps the generation stored for its index, so any handle still
/// holding the old generation no longer matches a live entity.
#[derive(Debug, Clone, Default)]
pub struct EntityIdPool {
    /// The generation the next (or current) id of each index carries.
    generations: Vec<u32>,
    /// Indices available for reuse, enabling $O(1)$ allocation.
    free: Vec<u32>,
    /// All currently alive ids.
    alive: SparseIdSet,
}

impl EntityIdPool {
    /// Creates a new, empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new or recycled `EntityId`.
    pub fn create(&mut self) -> EntityId {
        let id = match self.free.pop() {
            Some(index) => EntityId::new(index, self.generations[index as usize]),
            None => {
                let index = self.generations.len() as u32;
                assert!(index != u32::MAX, "Entity index space exhausted");
                self.generations.push(0);
                EntityId::new(index, 0)
            }
        };
        self.alive.insert(id);
        id
    }

    /// Releases an id. Returns `false` if it was not alive.
    pub fn remove(&mut self, id: EntityId) -> bool {
        if !self.alive.remove(id) {
            return false;
        }
        let generation = &mut self.generations[id.index as usize];
        *generation = generation.wrapping_add(1);
        self.free.push(id.index);
        true
    }

    /// Returns `true` if `id` was created and not removed since.
    pub fn contains(&self, id: EntityId) -> bool {
        self.alive.contains(id)
    }

    /// Returns the live id currently using `index`, if any.
    pub fn id_from_index(&self, index: u32) -> Option<EntityId> {
        let generation = *self.generations.get(index as usize)?;
        let id = EntityId::new(index, generation);
        self.alive.contains(id).then_some(id)
    }

    /// Number of live ids.
    pub fn len(&self) -> usize {
        self.alive.len()
    }

    /// Returns `true` if no id is alive.
    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }

    /// Live ids, in allocation order up to swap-removals.
    pub fn ids(&self) -> &[EntityId] {
        self.alive.ids()
    }

    /// The set of live ids.
    pub fn id_set(&self) -> &SparseIdSet {
        &self.alive
    }
}

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

//! Sparse-set storage: a packed dense array paired with an index array.

use ardent_core::ecs::EntityId;

/// Sparse slot value meaning "no dense entry for this entity index".
const ABSENT: u32 = u32::MAX;

/// A set of entity ids with $O(1)$ insertion, removal and membership tests.
///
/// Ids are kept in a packed `dense` array that is cheap to iterate. The
/// `sparse` array is indexed by [`EntityId::index`] and stores the slot of the
/// id in `dense`, or [`ABSENT`].
#[derive(Debug, Clone, Default)]
pub struct SparseIdSet {
    dense: Vec<EntityId>,
    sparse: Vec<u32>,
}

impl SparseIdSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dense slot of `id`, if the exact id (generation included) is present.
    #[inline]
    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        let slot = *self.sparse.get(id.index as usize)?;
        if slot == ABSENT {
            return None;
        }
        let slot = slot as usize;
        (self.dense[slot] == id).then_some(slot)
    }

    /// Returns `true` if `id` is in the set. Stale generations do not match.
    #[inline]
    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    /// Inserts `id`. Returns `false` if it was already present.
    ///
    /// An entry with the same index but another generation is overwritten in
    /// place.
    pub fn insert(&mut self, id: EntityId) -> bool {
        let index = id.index as usize;
        if index >= self.sparse.len() {
            self.sparse.resize(index + 1, ABSENT);
        }
        let slot = self.sparse[index];
        if slot != ABSENT {
            let existing = &mut self.dense[slot as usize];
            if *existing == id {
                return false;
            }
            *existing = id;
            return true;
        }
        self.sparse[index] = self.dense.len() as u32;
        self.dense.push(id);
        true
    }

    /// Removes `id`, moving the last dense entry into its slot.
    ///
    /// Returns the dense slot that was vacated, so parallel arrays can mirror
    /// the swap.
    pub(crate) fn swap_remove(&mut self, id: EntityId) -> Option<usize> {
        let slot = self.index_of(id)?;
        self.dense.swap_remove(slot);
        self.sparse[id.index as usize] = ABSENT;
        if let Some(moved) = self.dense.get(slot) {
            self.sparse[moved.index as usize] = slot as u32;
        }
        Some(slot)
    }

    /// Removes `id`. Returns `false` if it was not present.
    pub fn remove(&mut self, id: EntityId) -> bool {
        self.swap_remove(id).is_some()
    }

    /// Removes every id.
    pub fn clear(&mut self) {
        self.dense.clear();
        self.sparse.clear();
    }

    /// The packed ids. Order is insertion order, disturbed by removals.
    #[inline]
    pub fn ids(&self) -> &[EntityId] {
        &self.dense
    }

    /// Iterates over the ids.
    pub fn iter(&self) -> std::slice::Iter<'_, EntityId> {
        self.dense.iter()
    }

    /// Number of ids in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns `true` if the set holds no id.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }
}

impl<'a> IntoIterator for &'a SparseIdSet {
    type Item = &'a EntityId;
    type IntoIter = std::slice::Iter<'a, EntityId>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<EntityId> for SparseIdSet {
    fn from_iter<I: IntoIterator<Item = EntityId>>(iter: I) -> Self {
        let mut set = SparseIdSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// Dense storage for every component of type `T`, keyed by entity.
///
/// `values[i]` belongs to `ids().ids()[i]`. Both arrays stay gap-free: a removal
/// swaps the last element into the hole, so iteration order is not stable.
#[derive(Debug, Clone)]
pub struct SparseComponentSet<T> {
    pub(crate) ids: SparseIdSet,
    pub(crate) values: Vec<T>,
    recently_added: SparseIdSet,
}

impl<T> Default for SparseComponentSet<T> {
    fn default() -> Self {
        Self {
            ids: SparseIdSet::new(),
            values: Vec::new(),
            recently_added: SparseIdSet::new(),
        }
    }
}

impl<T> SparseComponentSet<T> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the component of `id` and returns it.
    ///
    /// Either way `id` is recorded as recently added.
    pub fn insert(&mut self, id: EntityId, value: T) -> &mut T {
        self.recently_added.insert(id);
        let slot = match self.ids.index_of(id) {
            Some(slot) => {
                self.values[slot] = value;
                slot
            }
            None => {
                // A stale entry with the same index is dropped first.
                if let Some(stale) = self.stale_at(id.index) {
                    self.remove(stale);
                }
                self.ids.insert(id);
                self.values.push(value);
                self.values.len() - 1
            }
        };
        &mut self.values[slot]
    }

    fn stale_at(&self, index: u32) -> Option<EntityId> {
        let slot = *self.ids.sparse.get(index as usize)?;
        (slot != ABSENT).then(|| self.ids.dense[slot as usize])
    }

    /// Removes and returns the component of `id`.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let slot = self.ids.swap_remove(id)?;
        self.recently_added.remove(id);
        Some(self.values.swap_remove(slot))
    }

    /// Returns `true` if `id` has a component in this set.
    #[inline]
    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(id)
    }

    /// The component of `id`, if any.
    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.ids.index_of(id).map(|slot| &self.values[slot])
    }

    /// The component of `id`, mutably.
    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.ids.index_of(id).map(|slot| &mut self.values[slot])
    }

    /// The id set of every entity holding this component.
    pub fn id_set(&self) -> &SparseIdSet {
        &self.ids
    }

    /// The packed entity ids, parallel to [`Self::values`].
    pub fn ids(&self) -> &[EntityId] {
        self.ids.ids()
    }

    /// The packed component values.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// The packed component values, mutably.
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Iterates over `(id, component)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.ids.iter().copied().zip(self.values.iter())
    }

    /// Iterates over `(id, component)` pairs with mutable access.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> + '_ {
        self.ids.iter().copied().zip(self.values.iter_mut())
    }

    /// Ids whose component was inserted since the last [`Self::clear_recently_added`].
    pub fn recently_added(&self) -> &SparseIdSet {
        &self.recently_added
    }

    /// Forgets the recently added ids.
    pub fn clear_recently_added(&mut self) {
        self.recently_added.clear();
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the set holds no component.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: u32, generation: u32) -> EntityId {
        EntityId::new(index, generation)
    }

    #[test]
    fn test_id_set_insert_contains_remove() {
        let mut set = SparseIdSet::new();
        assert!(set.insert(id(3, 0)));
        assert!(!set.insert(id(3, 0)));
        assert!(set.insert(id(7, 1)));

        assert!(set.contains(id(3, 0)));
        assert!(!set.contains(id(3, 1)), "Generation must be compared");
        assert!(!set.contains(id(100, 0)));

        assert!(set.remove(id(3, 0)));
        assert!(!set.remove(id(3, 0)));
        assert_eq!(set.ids(), &[id(7, 1)]);
    }

    #[test]
    fn test_swap_remove_keeps_dense_packed() {
        let mut set: SparseIdSet = (0..4).map(|i| id(i, 0)).collect();
        set.remove(id(1, 0));

        // The last id took the vacated slot.
        assert_eq!(set.ids(), &[id(0, 0), id(3, 0), id(2, 0)]);
        for &entity in set.ids() {
            assert!(set.contains(entity));
        }
    }

    #[test]
    fn test_component_set_values_follow_ids() {
        let mut set = SparseComponentSet::new();
        set.insert(id(0, 0), "a");
        set.insert(id(1, 0), "b");
        set.insert(id(2, 0), "c");

        assert_eq!(set.remove(id(0, 0)), Some("a"));
        assert_eq!(set.get(id(2, 0)), Some(&"c"));
        assert_eq!(set.get(id(1, 0)), Some(&"b"));
        for (entity, value) in set.iter() {
            assert_eq!(set.get(entity), Some(value));
        }
    }

    #[test]
    fn test_component_set_replace_and_recently_added() {
        let mut set = SparseComponentSet::new();
        set.insert(id(0, 0), 1);
        set.clear_recently_added();

        *set.insert(id(0, 0), 2) += 10;
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(id(0, 0)), Some(&12));
        assert!(set.recently_added().contains(id(0, 0)));
    }

    #[test]
    fn test_component_set_stale_entry_is_replaced() {
        let mut set = SparseComponentSet::new();
        set.insert(id(0, 0), 1);
        set.insert(id(0, 1), 2);

        assert_eq!(set.len(), 1);
        assert_eq!(set.get(id(0, 0)), None);
        assert_eq!(set.get(id(0, 1)), Some(&2));
    }
}

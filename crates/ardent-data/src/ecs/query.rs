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

//! The query engine: set matching, selectivity sort and typed iteration.
//!
//! A query is described by a selector type (see [`QueryParam`]) and a list of
//! tag filters. Each selector and tag contributes one [`SetMatch`]. The
//! matches are sorted so that the smallest inclusive set drives the search,
//! then every candidate id is tested against the remaining sets.

use std::marker::PhantomData;

use ardent_core::ecs::EntityId;

use crate::ecs::{tags, Component, ComponentTypeIndex, SparseComponentSet, SparseIdSet, World};

// ----------------------- //
// ---- Matching Part ---- //
// ----------------------- //

/// One constraint of a query: an id set and whether ids must be in it or not.
///
/// A missing set (a component type or tag nobody used yet) behaves as the
/// empty set.
#[derive(Debug, Clone, Copy)]
pub struct SetMatch<'a> {
    set: Option<&'a SparseIdSet>,
    include: bool,
}

impl<'a> SetMatch<'a> {
    /// Creates a match over `set`.
    pub fn new(set: Option<&'a SparseIdSet>, include: bool) -> Self {
        Self { set, include }
    }

    /// Returns `true` if ids must be in the set, `false` if they must not.
    pub fn is_inclusive(&self) -> bool {
        self.include
    }

    /// Size of the underlying set.
    pub fn len(&self) -> usize {
        self.set.map_or(0, SparseIdSet::len)
    }

    /// Returns `true` if the underlying set is missing or empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `id` satisfies this constraint.
    #[inline]
    pub fn accepts(&self, id: EntityId) -> bool {
        self.set.is_some_and(|set| set.contains(id)) == self.include
    }

    /// Sort key: inclusive sets by size, exclusive sets after every inclusive one.
    fn selectivity(&self) -> usize {
        if self.include {
            self.len()
        } else {
            !self.len()
        }
    }

    fn ids(&self) -> &'a [EntityId] {
        self.set.map_or(&[], SparseIdSet::ids)
    }
}

/// Resolves a list of matches into the ids satisfying all of them.
///
/// Without a `range`, the smallest inclusive match seeds the candidates and
/// the result keeps the seed's order. Panics if no match is inclusive. With
/// a `range`, its ids are tested against every match in order, duplicates
/// dropped.
pub fn resolve_matches(mut matches: Vec<SetMatch<'_>>, range: Option<&[EntityId]>) -> Vec<EntityId> {
    if range.is_none() && matches.is_empty() {
        return Vec::new();
    }

    if matches.iter().any(|m| m.include && m.is_empty()) {
        return Vec::new();
    }

    matches.sort_by_key(SetMatch::selectivity);

    match range {
        Some(range) => {
            let mut seen = SparseIdSet::new();
            range
                .iter()
                .copied()
                .filter(|&id| matches.iter().all(|m| m.accepts(id)))
                .filter(|&id| seen.insert(id))
                .collect()
        }
        None => {
            let (seed, rest) = matches.split_first().unwrap_or_else(|| unreachable!());
            assert!(
                seed.include,
                "Query needs at least one inclusive matching rule"
            );
            seed.ids()
                .iter()
                .copied()
                .filter(|&id| rest.iter().all(|m| m.accepts(id)))
                .collect()
        }
    }
}

// ------------------------ //
// ---- Selectors Part ---- //
// ------------------------ //

/// Requires component `T` and grants mutable access to it.
pub struct Mutate<T: Component>(PhantomData<T>);

/// Requires the absence of component `T`. Fetches nothing.
pub struct Not<T: Component>(PhantomData<T>);

/// How a selector uses a component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Shared access (`&T`).
    Read,
    /// Exclusive access (`Mutate<T>`).
    Write,
    /// No access, only an exclusion filter (`Not<T>`).
    Exclude,
}

/// A type that can select components in a [`World`] query.
///
/// Implemented for `&T`, [`Mutate<T>`], [`Not<T>`], `()` and tuples of up to
/// eight selectors.
///
/// # Safety
///
/// `access` must report every component the selector reads or writes, so that
/// the engine can refuse aliasing selectors. `fetch` must only hand out
/// references allowed by that report.
pub unsafe trait QueryParam {
    /// Pointers to the sets this selector needs, captured when the query is built.
    type State: Copy;

    /// What is yielded per matching entity.
    type Item<'w>;

    /// Appends the component accesses of this selector.
    fn access(out: &mut Vec<(ComponentTypeIndex, Access)>);

    /// Captures the state from a world that may be mutated through it.
    fn init(world: &mut World) -> Self::State;

    /// Appends one [`SetMatch`] per filtering component.
    ///
    /// # Safety
    /// `state` must come from a world that outlives `'s` and is not mutated
    /// meanwhile.
    unsafe fn push_matches<'s>(state: &Self::State, out: &mut Vec<SetMatch<'s>>);

    /// Fetches the item of `id`.
    ///
    /// # Safety
    /// `id` must satisfy every match of this selector, the world behind
    /// `state` must outlive `'w`, and no other live item may alias what this
    /// fetch returns.
    unsafe fn fetch<'w>(state: Self::State, id: EntityId) -> Self::Item<'w>;
}

/// A selector that never grants mutable access. Usable on a shared `&World`.
///
/// # Safety
/// Implementors must not report [`Access::Write`].
pub unsafe trait ReadOnlyQueryParam: QueryParam {
    /// Captures the state from a shared world.
    fn init_readonly(world: &World) -> Self::State;
}

fn set_ptr<T: Component>(world: &World) -> *const SparseComponentSet<T> {
    world
        .component_set::<T>()
        .map_or(std::ptr::null(), |set| set as *const _)
}

unsafe impl<T: Component> QueryParam for &T {
    type State = *const SparseComponentSet<T>;
    type Item<'w> = &'w T;

    fn access(out: &mut Vec<(ComponentTypeIndex, Access)>) {
        out.push((ComponentTypeIndex::of::<T>(), Access::Read));
    }

    fn init(world: &mut World) -> Self::State {
        set_ptr(world)
    }

    unsafe fn push_matches<'s>(state: &Self::State, out: &mut Vec<SetMatch<'s>>) {
        out.push(SetMatch::new(state.as_ref().map(|set| set.id_set()), true));
    }

    unsafe fn fetch<'w>(state: Self::State, id: EntityId) -> Self::Item<'w> {
        let set = &*state;
        match set.get(id) {
            Some(value) => value,
            None => unreachable!("entity {id} matched a query without its component"),
        }
    }
}

unsafe impl<T: Component> ReadOnlyQueryParam for &T {
    fn init_readonly(world: &World) -> Self::State {
        set_ptr(world)
    }
}

unsafe impl<T: Component> QueryParam for Mutate<T> {
    type State = *mut SparseComponentSet<T>;
    type Item<'w> = &'w mut T;

    fn access(out: &mut Vec<(ComponentTypeIndex, Access)>) {
        out.push((ComponentTypeIndex::of::<T>(), Access::Write));
    }

    fn init(world: &mut World) -> Self::State {
        world
            .component_set_mut::<T>()
            .map_or(std::ptr::null_mut(), |set| set as *mut _)
    }

    unsafe fn push_matches<'s>(state: &Self::State, out: &mut Vec<SetMatch<'s>>) {
        out.push(SetMatch::new(state.as_ref().map(|set| set.id_set()), true));
    }

    unsafe fn fetch<'w>(state: Self::State, id: EntityId) -> Self::Item<'w> {
        // Only the dense slot is borrowed; items of other entities stay valid.
        let set = &mut *state;
        match set.ids.index_of(id) {
            Some(slot) => &mut *set.values.as_mut_ptr().add(slot),
            None => unreachable!("entity {id} matched a query without its component"),
        }
    }
}

unsafe impl<T: Component> QueryParam for Not<T> {
    type State = *const SparseComponentSet<T>;
    type Item<'w> = ();

    fn access(out: &mut Vec<(ComponentTypeIndex, Access)>) {
        out.push((ComponentTypeIndex::of::<T>(), Access::Exclude));
    }

    fn init(world: &mut World) -> Self::State {
        set_ptr(world)
    }

    unsafe fn push_matches<'s>(state: &Self::State, out: &mut Vec<SetMatch<'s>>) {
        out.push(SetMatch::new(state.as_ref().map(|set| set.id_set()), false));
    }

    unsafe fn fetch<'w>(_state: Self::State, _id: EntityId) -> Self::Item<'w> {}
}

unsafe impl<T: Component> ReadOnlyQueryParam for Not<T> {
    fn init_readonly(world: &World) -> Self::State {
        set_ptr(world)
    }
}

unsafe impl QueryParam for () {
    type State = ();
    type Item<'w> = ();

    fn access(_out: &mut Vec<(ComponentTypeIndex, Access)>) {}

    fn init(_world: &mut World) -> Self::State {}

    unsafe fn push_matches<'s>(_state: &Self::State, _out: &mut Vec<SetMatch<'s>>) {}

    unsafe fn fetch<'w>(_state: Self::State, _id: EntityId) -> Self::Item<'w> {}
}

unsafe impl ReadOnlyQueryParam for () {
    fn init_readonly(_world: &World) -> Self::State {}
}

// Tuples forward every operation to their elements, in order.
macro_rules! impl_query_tuple {
    ($(($Q:ident, $i:tt)),*) => {
        unsafe impl<$($Q: QueryParam),*> QueryParam for ($($Q,)*) {
            type State = ($($Q::State,)*);
            type Item<'w> = ($($Q::Item<'w>,)*);

            fn access(out: &mut Vec<(ComponentTypeIndex, Access)>) {
                $($Q::access(out);)*
            }

            fn init(world: &mut World) -> Self::State {
                ($($Q::init(world),)*)
            }

            unsafe fn push_matches<'s>(state: &Self::State, out: &mut Vec<SetMatch<'s>>) {
                $($Q::push_matches(&state.$i, out);)*
            }

            unsafe fn fetch<'w>(state: Self::State, id: EntityId) -> Self::Item<'w> {
                ($($Q::fetch(state.$i, id),)*)
            }
        }

        unsafe impl<$($Q: ReadOnlyQueryParam),*> ReadOnlyQueryParam for ($($Q,)*) {
            fn init_readonly(world: &World) -> Self::State {
                ($($Q::init_readonly(world),)*)
            }
        }
    };
}

impl_query_tuple!((Q1, 0));
impl_query_tuple!((Q1, 0), (Q2, 1));
impl_query_tuple!((Q1, 0), (Q2, 1), (Q3, 2));
impl_query_tuple!((Q1, 0), (Q2, 1), (Q3, 2), (Q4, 3));
impl_query_tuple!((Q1, 0), (Q2, 1), (Q3, 2), (Q4, 3), (Q5, 4));
impl_query_tuple!((Q1, 0), (Q2, 1), (Q3, 2), (Q4, 3), (Q5, 4), (Q6, 5));
impl_query_tuple!((Q1, 0), (Q2, 1), (Q3, 2), (Q4, 3), (Q5, 4), (Q6, 5), (Q7, 6));
impl_query_tuple!((Q1, 0), (Q2, 1), (Q3, 2), (Q4, 3), (Q5, 4), (Q6, 5), (Q7, 6), (Q8, 7));

/// Panics if two selectors of `Q` alias a component with at least one write.
fn check_access<Q: QueryParam>() {
    let mut accesses = Vec::new();
    Q::access(&mut accesses);
    for (i, &(type_index, access)) in accesses.iter().enumerate() {
        for &(other_index, other_access) in &accesses[i + 1..] {
            let conflicting = type_index == other_index
                && (access == Access::Write || other_access == Access::Write)
                && access != Access::Exclude
                && other_access != Access::Exclude;
            assert!(
                !conflicting,
                "Query accesses component `{}` mutably more than once",
                type_index.short_name()
            );
        }
    }
}

/// Computes the matching ids for a captured selector state.
///
/// # Safety
/// `state` must have been captured from `world`.
pub(crate) unsafe fn matching_ids<Q: QueryParam>(
    world: &World,
    state: &Q::State,
    tag_filters: &[&str],
    range: Option<&[EntityId]>,
) -> Vec<EntityId> {
    check_access::<Q>();

    let mut matches = Vec::new();
    Q::push_matches(state, &mut matches);
    for filter in tag_filters {
        let (name, include) = tags::parse_filter(filter);
        matches.push(SetMatch::new(world.tag_set(name), include));
    }
    if range.is_some() {
        // Ranges may hold stale ids; only live entities are reported.
        matches.push(SetMatch::new(Some(world.entity_id_set()), true));
    }
    resolve_matches(matches, range)
}

// -------------------- //
// ---- Query Part ---- //
// -------------------- //

/// The result of a world query: the matching ids plus typed access to their
/// components.
///
/// Created by [`World::query`], [`World::query_ref`], [`World::query_in`] and
/// [`World::query_ref_in`]. The query borrows the world for `'w`, so the world
/// can not change while results are alive.
///
/// ```rust
/// use ardent_data::ecs::{Component, Mutate, World};
///
/// #[derive(Component, Default)]
/// struct Position(f32);
/// #[derive(Component, Default)]
/// struct Velocity(f32);
///
/// let mut world = World::new();
/// let id = world.create_entity_with((Position(0.0), Velocity(2.0)));
///
/// for (_, (position, velocity)) in world.query::<(Mutate<Position>, &Velocity)>(&[]) {
///     position.0 += velocity.0;
/// }
/// assert_eq!(world.component::<Position>(id).unwrap().0, 2.0);
/// ```
pub struct Query<'w, Q: QueryParam> {
    state: Q::State,
    ids: Vec<EntityId>,
    _marker: PhantomData<(&'w (), Q)>,
}

impl<'w, Q: QueryParam> Query<'w, Q> {
    pub(crate) fn new(state: Q::State, ids: Vec<EntityId>) -> Self {
        Self {
            state,
            ids,
            _marker: PhantomData,
        }
    }

    /// Number of matching entities.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if no entity matched.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The matching ids.
    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    /// Consumes the query, keeping only the matching ids.
    pub fn into_ids(self) -> Vec<EntityId> {
        self.ids
    }

    /// Iterates with whatever access the selectors grant.
    pub fn iter_mut(&mut self) -> QueryIter<'_, Q> {
        QueryIter {
            state: self.state,
            ids: self.ids.iter(),
            _marker: PhantomData,
        }
    }

    /// Returns the item of `id` if it is part of the result.
    pub fn get_mut(&mut self, id: EntityId) -> Option<Q::Item<'_>> {
        // SAFETY: `id` matched, and the `&mut self` borrow keeps the item unique.
        self.ids
            .contains(&id)
            .then(|| unsafe { Q::fetch(self.state, id) })
    }
}

impl<'w, Q: ReadOnlyQueryParam> Query<'w, Q> {
    /// Iterates with shared access.
    pub fn iter(&self) -> QueryIter<'_, Q> {
        QueryIter {
            state: self.state,
            ids: self.ids.iter(),
            _marker: PhantomData,
        }
    }

    /// Returns the item of `id` if it is part of the result.
    pub fn get(&self, id: EntityId) -> Option<Q::Item<'_>> {
        // SAFETY: read-only selectors can not alias mutably.
        self.ids
            .contains(&id)
            .then(|| unsafe { Q::fetch(self.state, id) })
    }
}

/// Borrowing iterator over a [`Query`], yielding `(EntityId, item)`.
pub struct QueryIter<'q, Q: QueryParam> {
    state: Q::State,
    ids: std::slice::Iter<'q, EntityId>,
    _marker: PhantomData<Q>,
}

impl<'q, Q: QueryParam> Iterator for QueryIter<'q, Q> {
    type Item = (EntityId, Q::Item<'q>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = *self.ids.next()?;
        // SAFETY: query results hold each id once, so items never alias.
        Some((id, unsafe { Q::fetch(self.state, id) }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl<Q: QueryParam> ExactSizeIterator for QueryIter<'_, Q> {}

/// Owning iterator over a [`Query`], yielding `(EntityId, item)`.
pub struct QueryIntoIter<'w, Q: QueryParam> {
    state: Q::State,
    ids: std::vec::IntoIter<EntityId>,
    _marker: PhantomData<(&'w (), Q)>,
}

impl<'w, Q: QueryParam> Iterator for QueryIntoIter<'w, Q> {
    type Item = (EntityId, Q::Item<'w>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.ids.next()?;
        // SAFETY: query results hold each id once, so items never alias.
        Some((id, unsafe { Q::fetch(self.state, id) }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl<Q: QueryParam> ExactSizeIterator for QueryIntoIter<'_, Q> {}

impl<'w, Q: QueryParam> IntoIterator for Query<'w, Q> {
    type Item = (EntityId, Q::Item<'w>);
    type IntoIter = QueryIntoIter<'w, Q>;

    fn into_iter(self) -> Self::IntoIter {
        QueryIntoIter {
            state: self.state,
            ids: self.ids.into_iter(),
            _marker: PhantomData,
        }
    }
}

impl<'q, 'w, Q: QueryParam> IntoIterator for &'q mut Query<'w, Q> {
    type Item = (EntityId, Q::Item<'q>);
    type IntoIter = QueryIter<'q, Q>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[u32]) -> SparseIdSet {
        ids.iter().map(|&i| EntityId::new(i, 0)).collect()
    }

    fn indices(ids: Vec<EntityId>) -> Vec<u32> {
        ids.into_iter().map(|id| id.index).collect()
    }

    #[test]
    fn test_smallest_inclusive_set_drives_the_order() {
        let big = set(&[5, 4, 3, 2, 1]);
        let small = set(&[3, 1, 9]);
        let excluded = set(&[1]);

        let result = resolve_matches(
            vec![
                SetMatch::new(Some(&big), true),
                SetMatch::new(Some(&excluded), false),
                SetMatch::new(Some(&small), true),
            ],
            None,
        );
        assert_eq!(indices(result), vec![3]);
    }

    #[test]
    fn test_empty_inclusive_set_short_circuits() {
        let a = set(&[1, 2]);
        let result = resolve_matches(
            vec![SetMatch::new(Some(&a), true), SetMatch::new(None, true)],
            None,
        );
        assert!(result.is_empty());
    }

    #[test]
    fn test_missing_exclusive_set_excludes_nothing() {
        let a = set(&[1, 2]);
        let result = resolve_matches(
            vec![SetMatch::new(Some(&a), true), SetMatch::new(None, false)],
            None,
        );
        assert_eq!(indices(result), vec![1, 2]);
    }

    #[test]
    #[should_panic(expected = "Query needs at least one inclusive matching rule")]
    fn test_exclusion_only_panics() {
        let a = set(&[1, 2]);
        resolve_matches(vec![SetMatch::new(Some(&a), false)], None);
    }

    #[test]
    fn test_range_is_filtered_and_deduplicated() {
        let a = set(&[1, 2, 3]);
        let excluded = set(&[2]);
        let range = [3, 1, 2, 3, 7].map(|i| EntityId::new(i, 0));

        let result = resolve_matches(
            vec![
                SetMatch::new(Some(&excluded), false),
                SetMatch::new(Some(&a), true),
            ],
            Some(&range),
        );
        assert_eq!(indices(result), vec![3, 1]);
    }

    #[test]
    fn test_range_without_inclusive_match_is_allowed() {
        let excluded = set(&[2]);
        let range = [1, 2].map(|i| EntityId::new(i, 0));
        let result = resolve_matches(vec![SetMatch::new(Some(&excluded), false)], Some(&range));
        assert_eq!(indices(result), vec![1]);
    }

    #[test]
    fn test_no_match_no_range_is_empty() {
        assert!(resolve_matches(Vec::new(), None).is_empty());
    }
}

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

use crate::ecs::{
    query, tags, Archetype, Component, ComponentBundle, ComponentContainer, ComponentPrefab,
    ComponentRegistry, ComponentTypeIndex, EntityIdPool, EntityPrefab, PrefabError, Query,
    QueryParam, ReadOnlyQueryParam, SparseComponentSet, SparseIdSet, StaticArchetype, System,
    SystemRegistry, TagSet, WorldComponents,
};

/// The central container of the ECS: entities, their components, tags,
/// world-level singletons and systems.
///
/// The world is not internally synchronized. It is owned and driven by one
/// thread, which runs the systems sequentially in [`World::tick`].
#[derive(Default)]
pub struct World {
    /// Allocator for entity ids, and the set of live ones.
    entities: EntityIdPool,

    /// One container per component type that was ever added.
    containers: AHashMap<TypeId, ComponentContainer>,

    tags: TagSet,

    /// Components every entity must carry.
    required: Archetype,

    registry: ComponentRegistry,
    world_components: WorldComponents,
    systems: SystemRegistry,
}

impl World {
    /// Creates an empty world with an empty component registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty world sharing an already populated registry.
    pub fn with_registry(registry: ComponentRegistry) -> Self {
        Self {
            registry,
            ..Self::default()
        }
    }

    /// The component types known by name.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// The component registry, for registering types.
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    // ------------------------------- //
    // ---- Entity lifecycle Part ---- //
    // ------------------------------- //

    /// Creates an entity carrying only the required components.
    pub fn create_entity(&mut self) -> EntityId {
        let id = self.entities.create();
        self.add_required_components(id);
        id
    }

    /// Creates an entity with one default component per archetype type.
    pub fn create_entity_from(&mut self, archetype: &Archetype) -> EntityId {
        let id = self.create_entity();
        archetype.add_to(self, id);
        id
    }

    /// Creates an entity from component values. This is the usual spawn path.
    pub fn create_entity_with<B: ComponentBundle>(&mut self, bundle: B) -> EntityId {
        let id = self.entities.create();
        bundle.insert_into(self, id);
        self.add_required_components(id);
        id
    }

    /// Creates an entity with default components for every type of `A`.
    pub fn create_entity_static<A: StaticArchetype>(&mut self) -> EntityId {
        let id = self.create_entity();
        A::add_defaults(self, id);
        id
    }

    /// Creates an entity and decodes the prefab's components onto it.
    ///
    /// Components whose type is not registered as serializable, or whose data
    /// does not decode, are skipped with a warning.
    pub fn create_entity_from_prefab(&mut self, prefab: &EntityPrefab) -> EntityId {
        let id = self.entities.create();
        for component in prefab.components() {
            let Some(deserialize) = self
                .registry
                .get_by_name(&component.type_name)
                .and_then(|info| info.deserialize())
            else {
                log::warn!(
                    "Component type '{}' is not registered, skipping it",
                    component.type_name
                );
                continue;
            };
            if let Err(e) = deserialize(self, id, &component.data) {
                log::warn!("Prefab component skipped: {}", e);
            }
        }
        self.add_required_components(id);
        id
    }

    /// Captures the serializable components of `id` into a prefab.
    ///
    /// Components are ordered by registered name.
    pub fn create_prefab(&self, id: EntityId) -> Result<EntityPrefab, PrefabError> {
        let mut infos: Vec<_> = self
            .registry
            .iter()
            .filter_map(|info| Some((info.name(), info.serialize()?)))
            .collect();
        infos.sort_by_key(|(name, _)| *name);

        let mut prefab = EntityPrefab::new();
        for (name, serialize) in infos {
            if let Some(data) = serialize(self, id) {
                prefab.push(ComponentPrefab {
                    type_name: name.to_string(),
                    data: data?,
                });
            }
        }
        Ok(prefab)
    }

    /// Removes an entity with all its components and tags.
    ///
    /// Returns `false` for a stale or unknown id. That case is a programming
    /// error and asserts in debug builds.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        let exists = self.exists(id);
        debug_assert!(exists, "Entity {id} does not exist");
        if !exists {
            return false;
        }
        for container in self.containers.values_mut() {
            container.remove(id);
        }
        self.tags.remove_entity(id);
        self.entities.remove(id)
    }

    /// Returns `true` if `id` was created and not removed since.
    pub fn exists(&self, id: EntityId) -> bool {
        self.entities.contains(id)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Ids of every live entity.
    pub fn ids(&self) -> &[EntityId] {
        self.entities.ids()
    }

    /// The live id currently using `index`, if any.
    pub fn id_from_index(&self, index: u32) -> Option<EntityId> {
        self.entities.id_from_index(index)
    }

    pub(crate) fn entity_id_set(&self) -> &SparseIdSet {
        self.entities.id_set()
    }

    // ------------------------- //
    // ---- Components Part ---- //
    // ------------------------- //

    fn set_or_insert<T: Component>(&mut self) -> &mut SparseComponentSet<T> {
        self.containers
            .entry(TypeId::of::<T>())
            .or_insert_with(ComponentContainer::new::<T>)
            .typed_mut::<T>()
            .unwrap_or_else(|| unreachable!("container stored under a foreign TypeId"))
    }

    /// Adds `value` to `id` and returns it. An existing `T` is replaced.
    ///
    /// # Panics
    /// If `id` does not exist.
    pub fn add_component<T: Component>(&mut self, id: EntityId, value: T) -> &mut T {
        assert!(self.exists(id), "Entity {id} does not exist");
        self.set_or_insert::<T>().insert(id, value)
    }

    /// Adds a default `T` to `id` if it has none, and returns its `T`.
    ///
    /// # Panics
    /// If `id` does not exist.
    pub fn add_default_component<T: Component + Default>(&mut self, id: EntityId) -> &mut T {
        assert!(self.exists(id), "Entity {id} does not exist");
        let set = self.set_or_insert::<T>();
        if !set.contains(id) {
            set.insert(id, T::default());
        }
        set.get_mut(id)
            .unwrap_or_else(|| unreachable!("component inserted above"))
    }

    /// Adds a default component for every type of `A` that `id` lacks.
    pub fn add_components<A: StaticArchetype>(&mut self, id: EntityId) {
        assert!(self.exists(id), "Entity {id} does not exist");
        A::add_defaults(self, id);
    }

    /// Adds every value of `bundle` to `id`, replacing existing components.
    pub fn add_bundle<B: ComponentBundle>(&mut self, id: EntityId, bundle: B) {
        assert!(self.exists(id), "Entity {id} does not exist");
        bundle.insert_into(self, id);
    }

    /// Removes and returns the `T` of `id`.
    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> Option<T> {
        self.component_set_mut::<T>()?.remove(id)
    }

    /// Returns `true` if `id` has a `T`.
    pub fn has<T: Component>(&self, id: EntityId) -> bool {
        self.component_set::<T>().is_some_and(|set| set.contains(id))
    }

    /// Returns `true` if `id` has a component of type `type_index`.
    pub fn has_type(&self, id: EntityId, type_index: ComponentTypeIndex) -> bool {
        self.containers
            .get(&type_index.type_id())
            .is_some_and(|container| container.contains(id))
    }

    /// The `T` of `id`.
    pub fn component<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.component_set::<T>()?.get(id)
    }

    /// The `T` of `id`, mutably.
    pub fn component_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.component_set_mut::<T>()?.get_mut(id)
    }

    /// The storage of `T`, if any `T` was ever added.
    pub fn component_set<T: Component>(&self) -> Option<&SparseComponentSet<T>> {
        self.containers.get(&TypeId::of::<T>())?.typed()
    }

    /// The storage of `T`, mutably.
    pub fn component_set_mut<T: Component>(&mut self) -> Option<&mut SparseComponentSet<T>> {
        self.containers.get_mut(&TypeId::of::<T>())?.typed_mut()
    }

    /// Every `(id, &T)` pair.
    pub fn components<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.component_set::<T>().into_iter().flat_map(|set| set.iter())
    }

    /// Every `(id, &mut T)` pair.
    pub fn components_mut<T: Component>(
        &mut self,
    ) -> impl Iterator<Item = (EntityId, &mut T)> + '_ {
        self.component_set_mut::<T>()
            .into_iter()
            .flat_map(|set| set.iter_mut())
    }

    /// Ids of the entities holding a component of type `type_index`.
    pub fn component_ids(&self, type_index: ComponentTypeIndex) -> &[EntityId] {
        self.containers
            .get(&type_index.type_id())
            .map_or(&[], |container| container.id_set().ids())
    }

    /// Ids of the entities holding a `T`.
    pub fn component_ids_of<T: Component>(&self) -> &[EntityId] {
        self.component_ids(ComponentTypeIndex::of::<T>())
    }

    /// Ids whose `type_index` component was added since the last tick.
    pub fn recently_added(&self, type_index: ComponentTypeIndex) -> &[EntityId] {
        self.containers
            .get(&type_index.type_id())
            .map_or(&[], |container| container.recently_added().ids())
    }

    /// Ids whose `T` was added since the last tick.
    pub fn recently_added_of<T: Component>(&self) -> &[EntityId] {
        self.recently_added(ComponentTypeIndex::of::<T>())
    }

    /// Forgets every recently added component. Done at the end of each tick.
    pub fn clear_recently_added(&mut self) {
        for container in self.containers.values_mut() {
            container.clear_recently_added();
        }
    }

    /// Component types with storage in this world, in no particular order.
    pub fn component_types(&self) -> impl Iterator<Item = ComponentTypeIndex> + '_ {
        self.containers.values().map(ComponentContainer::type_index)
    }

    /// Display name of a component type: its registered name, or its short
    /// Rust name.
    pub fn component_type_name(&self, type_index: ComponentTypeIndex) -> &str {
        self.registry
            .get(type_index)
            .map_or(type_index.short_name(), |info| info.name())
    }

    /// Makes `T` mandatory: existing and future entities get a default `T`.
    pub fn add_required_component<T: Component + Default>(&mut self) {
        let type_index = ComponentTypeIndex::of::<T>();
        if self.required.contains(type_index) {
            return;
        }
        log::debug!("Component '{}' is now required", type_index.short_name());
        self.required.add::<T>();
        for id in self.entities.ids().to_vec() {
            if !self.has::<T>(id) {
                self.add_component(id, T::default());
            }
        }
    }

    /// Types every entity carries.
    pub fn required_components(&self) -> impl Iterator<Item = ComponentTypeIndex> + '_ {
        self.required.types()
    }

    fn add_required_components(&mut self, id: EntityId) {
        if self.required.is_empty() {
            return;
        }
        let required = std::mem::take(&mut self.required);
        required.add_to(self, id);
        self.required = required;
    }

    // ------------------- //
    // ---- Tags Part ---- //
    // ------------------- //

    /// Returns `true` for engine-managed tag names (prefixed with `@`).
    pub fn is_tag_implicit(name: &str) -> bool {
        tags::is_tag_implicit(name)
    }

    /// Tags `id`. Engine-managed tags are refused with a warning.
    pub fn add_tag(&mut self, id: EntityId, tag: &str) -> bool {
        if Self::is_tag_implicit(tag) {
            log::warn!("Tag '{}' is engine-managed and can not be added by hand", tag);
            return false;
        }
        assert!(self.exists(id), "Entity {id} does not exist");
        self.tags.add(id, tag)
    }

    /// Untags `id`. Engine-managed tags are refused with a warning.
    pub fn remove_tag(&mut self, id: EntityId, tag: &str) -> bool {
        if Self::is_tag_implicit(tag) {
            log::warn!("Tag '{}' is engine-managed and can not be removed by hand", tag);
            return false;
        }
        self.tags.remove(id, tag)
    }

    /// Removes `tag` from every entity. Engine-managed tags are refused.
    pub fn clear_tag(&mut self, tag: &str) {
        if Self::is_tag_implicit(tag) {
            log::warn!("Tag '{}' is engine-managed and can not be cleared by hand", tag);
            return;
        }
        self.tags.clear(tag);
    }

    /// Sets an engine-managed tag.
    ///
    /// # Panics
    /// If `tag` is not engine-managed.
    pub fn set_implicit_tag(&mut self, id: EntityId, tag: &str) -> bool {
        assert!(Self::is_tag_implicit(tag), "Tag '{tag}' is not implicit");
        assert!(self.exists(id), "Entity {id} does not exist");
        self.tags.add(id, tag)
    }

    /// Clears an engine-managed tag from `id`.
    ///
    /// # Panics
    /// If `tag` is not engine-managed.
    pub fn unset_implicit_tag(&mut self, id: EntityId, tag: &str) -> bool {
        assert!(Self::is_tag_implicit(tag), "Tag '{tag}' is not implicit");
        self.tags.remove(id, tag)
    }

    /// Returns `true` if `id` carries `tag`.
    pub fn has_tag(&self, id: EntityId, tag: &str) -> bool {
        self.tags.has(id, tag)
    }

    /// Ids carrying `tag`.
    pub fn with_tag(&self, tag: &str) -> &[EntityId] {
        self.tags.get(tag).map_or(&[], SparseIdSet::ids)
    }

    /// The id set of `tag`, or `None` if the tag was never used.
    pub fn tag_set(&self, tag: &str) -> Option<&SparseIdSet> {
        self.tags.get(tag)
    }

    /// Every tag name ever used.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.names()
    }

    /// Tags carried by `id`.
    pub fn tags_of(&self, id: EntityId) -> impl Iterator<Item = &str> {
        self.tags.tags_of(id)
    }

    // ------------------------------- //
    // ---- World components Part ---- //
    // ------------------------------- //

    /// The world-level `T`, created with `init` on first access.
    pub fn get_or_add_world_component<T: Send + Sync + 'static>(
        &mut self,
        init: impl FnOnce() -> T,
    ) -> &mut T {
        self.world_components.get_or_insert_with(init)
    }

    /// The world-level `T`, if present.
    pub fn world_component<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.world_components.get()
    }

    /// The world-level `T`, mutably.
    pub fn world_component_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.world_components.get_mut()
    }

    // ---------------------- //
    // ---- Systems Part ---- //
    // ---------------------- //

    /// Calls `setup` on `system`, then registers it after every existing system.
    ///
    /// # Panics
    /// If a system of the same type is already registered.
    pub fn add_system<S: System>(&mut self, system: S) -> &mut S {
        assert!(
            !self.systems.contains::<S>(),
            "System `{}` is already registered",
            std::any::type_name::<S>()
        );
        log::debug!("Adding system `{}`", std::any::type_name::<S>());
        let mut system = Box::new(system);
        system.setup(self);
        self.systems.push(system)
    }

    /// The registered system of type `S`.
    ///
    /// Systems are not reachable while they are running.
    pub fn find_system<S: System>(&self) -> Option<&S> {
        self.systems.get()
    }

    /// The registered system of type `S`, mutably.
    pub fn find_system_mut<S: System>(&mut self) -> Option<&mut S> {
        self.systems.get_mut()
    }

    /// The registered systems.
    pub fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    /// Runs every system's `tick` in registration order, then clears the
    /// recently added components.
    pub fn tick(&mut self) {
        let mut systems = self.systems.take();
        systems.for_each(|system| system.tick(self));
        self.systems.restore(systems);
        self.clear_recently_added();
    }

    /// Runs every system's `update` in registration order.
    pub fn update(&mut self, dt: f32) {
        let mut systems = self.systems.take();
        systems.for_each(|system| system.update(self, dt));
        self.systems.restore(systems);
    }

    // -------------------- //
    // ---- Query Part ---- //
    // -------------------- //

    /// Queries every entity matching `Q` and the tag filters.
    ///
    /// Tag filters prefixed with `!` exclude the tag.
    ///
    /// # Panics
    /// If the query has no inclusive selector or tag, or if two selectors
    /// alias a component mutably.
    pub fn query<Q: QueryParam>(&mut self, tags: &[&str]) -> Query<'_, Q> {
        let state = Q::init(self);
        // SAFETY: `state` was captured from `self` just above.
        let ids = unsafe { query::matching_ids::<Q>(self, &state, tags, None) };
        Query::new(state, ids)
    }

    /// Read-only version of [`World::query`].
    pub fn query_ref<Q: ReadOnlyQueryParam>(&self, tags: &[&str]) -> Query<'_, Q> {
        let state = Q::init_readonly(self);
        // SAFETY: `state` was captured from `self` just above.
        let ids = unsafe { query::matching_ids::<Q>(self, &state, tags, None) };
        Query::new(state, ids)
    }

    /// Queries the live entities of `ids` matching `Q` and the tag filters.
    ///
    /// No inclusive selector is needed since `ids` bounds the result.
    /// Duplicates in `ids` are reported once.
    pub fn query_in<Q: QueryParam>(&mut self, ids: &[EntityId], tags: &[&str]) -> Query<'_, Q> {
        let state = Q::init(self);
        // SAFETY: `state` was captured from `self` just above.
        let ids = unsafe { query::matching_ids::<Q>(self, &state, tags, Some(ids)) };
        Query::new(state, ids)
    }

    /// Read-only version of [`World::query_in`].
    pub fn query_ref_in<Q: ReadOnlyQueryParam>(
        &self,
        ids: &[EntityId],
        tags: &[&str],
    ) -> Query<'_, Q> {
        let state = Q::init_readonly(self);
        // SAFETY: `state` was captured from `self` just above.
        let ids = unsafe { query::matching_ids::<Q>(self, &state, tags, Some(ids)) };
        Query::new(state, ids)
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("component_types", &self.containers.len())
            .field("systems", &self.systems)
            .finish()
    }
}

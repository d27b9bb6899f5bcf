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

use ardent_data::ecs::{EntityId, Mutate, System, World};
use ardent_io::AssetLoader;

use super::LoadableComponent;

type StartLoadingFn = fn(&mut World, &AssetLoader, bool, &mut Vec<EntityId>);
type UpdateStatusFn = fn(&mut World, &mut Vec<EntityId>, &mut Vec<EntityId>);

struct LoadableType {
    type_id: TypeId,
    name: &'static str,
    start_loading: StartLoadingFn,
    update_status: UpdateStatusFn,
    /// Entities whose components are waiting for their assets.
    loading: Vec<EntityId>,
}

/// Drives asset loading for every registered [`LoadableComponent`] type.
///
/// Component types are registered explicitly, before the system is added to
/// the world so that [`setup`](System::setup) sees them:
///
/// ```rust,ignore
/// let system = AssetLoaderSystem::new(loader).with_component_type::<MeshRenderer>();
/// world.add_system(system);
/// ```
pub struct AssetLoaderSystem {
    loader: AssetLoader,
    types: Vec<LoadableType>,
    recently_loaded: Vec<EntityId>,
}

impl AssetLoaderSystem {
    /// Creates a system that loads through `loader`.
    pub fn new(loader: AssetLoader) -> Self {
        Self {
            loader,
            types: Vec::new(),
            recently_loaded: Vec::new(),
        }
    }

    /// Registers `T` and returns the system, for chaining.
    pub fn with_component_type<T: LoadableComponent>(mut self) -> Self {
        self.register_component_type::<T>();
        self
    }

    /// Registers `T`. Registering a type twice has no effect.
    pub fn register_component_type<T: LoadableComponent>(&mut self) {
        let type_id = TypeId::of::<T>();
        if self.types.iter().any(|info| info.type_id == type_id) {
            return;
        }
        let name = std::any::type_name::<T>();
        log::debug!("Registered loadable component type '{}'", name);
        self.types.push(LoadableType {
            type_id,
            name,
            start_loading: start_loading::<T>,
            update_status: update_status::<T>,
            loading: Vec::new(),
        });
    }

    /// The loader used for every component.
    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }

    /// Entities whose components finished loading during the last tick.
    pub fn recently_loaded(&self) -> &[EntityId] {
        &self.recently_loaded
    }

    /// Number of components still waiting for their assets.
    pub fn loading_count(&self) -> usize {
        self.types.iter().map(|info| info.loading.len()).sum()
    }

    fn run(&mut self, world: &mut World, only_recent: bool) {
        for info in &mut self.types {
            let before = info.loading.len();
            (info.start_loading)(world, &self.loader, only_recent, &mut info.loading);
            if info.loading.len() > before {
                log::trace!(
                    "Started loading {} '{}' component(s)",
                    info.loading.len() - before,
                    info.name
                );
            }
            (info.update_status)(world, &mut info.loading, &mut self.recently_loaded);
        }
    }
}

impl System for AssetLoaderSystem {
    fn setup(&mut self, world: &mut World) {
        self.run(world, false);
    }

    fn tick(&mut self, world: &mut World) {
        self.recently_loaded.clear();
        self.loader.process_pending();
        self.run(world, true);
    }
}

impl std::fmt::Debug for AssetLoaderSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoaderSystem")
            .field("loader", &self.loader)
            .field("types", &self.types.iter().map(|info| info.name).collect::<Vec<_>>())
            .field("loading", &self.loading_count())
            .finish()
    }
}

fn start_loading<T: LoadableComponent>(
    world: &mut World,
    loader: &AssetLoader,
    only_recent: bool,
    loading: &mut Vec<EntityId>,
) {
    let ids = if only_recent {
        world.recently_added_of::<T>().to_vec()
    } else {
        world.component_ids_of::<T>().to_vec()
    };
    if ids.is_empty() {
        return;
    }

    for (id, component) in world.query_in::<Mutate<T>>(&ids, &[]) {
        component.load_assets(loader);
        if !loading.contains(&id) {
            loading.push(id);
        }
    }
}

fn update_status<T: LoadableComponent>(
    world: &mut World,
    loading: &mut Vec<EntityId>,
    done: &mut Vec<EntityId>,
) {
    loading.retain(|&id| {
        // A component removed while loading counts as done.
        let finished = match world.component_mut::<T>(id) {
            Some(component) => component.update_asset_loading_status(),
            None => true,
        };
        if finished {
            done.push(id);
        }
        !finished
    });
}

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

// Ardent Sandbox
// Spawns a few entities whose meshes load in the background, then runs the
// world until every mesh has settled.

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use ardent_agents::asset_agent::{AssetLoaderSystem, LoadableComponent};
use ardent_core::device::DevicePtr;
use ardent_core::telemetry::metrics::MetricId;
use ardent_core::{EngineConfig, HeadlessDevice};
use ardent_data::ecs::{tags, Component, Mutate, System, World};
use ardent_io::{
    decode_bincode, encode_bincode, Asset, AssetDecodeError, AssetId, AssetLoader,
    AssetLoadingContext, AssetPtr, Loadable, MemoryAssetStore,
};
use ardent_telemetry::{init_logging, MetricsRegistry};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct MeshFile {
    vertices: Vec<[f32; 3]>,
}

struct Mesh {
    vertex_count: usize,
}

impl Asset for Mesh {}

impl Loadable for Mesh {
    type Intermediate = MeshFile;

    fn read(
        reader: &mut dyn Read,
        _ctx: &mut AssetLoadingContext<'_>,
    ) -> Result<MeshFile, AssetDecodeError> {
        decode_bincode(reader)
    }

    fn finalize(device: &DevicePtr, file: MeshFile) -> Result<Self, AssetDecodeError> {
        log::trace!("Uploading {} vertices to '{}'", file.vertices.len(), device.label());
        Ok(Mesh {
            vertex_count: file.vertices.len(),
        })
    }
}

#[derive(Component, Default, Clone, Copy)]
struct Transform {
    angle: f32,
}

#[derive(Component)]
struct MeshRenderer {
    mesh_id: AssetId,
    mesh: AssetPtr<Mesh>,
}

impl LoadableComponent for MeshRenderer {
    fn load_assets(&mut self, loader: &AssetLoader) {
        self.mesh = loader.load_async(self.mesh_id);
    }

    fn update_asset_loading_status(&mut self) -> bool {
        !self.mesh.is_loading()
    }
}

/// Turns every transform at a constant rate.
struct SpinSystem {
    speed: f32,
}

impl System for SpinSystem {
    fn tick(&mut self, _world: &mut World) {}

    fn update(&mut self, world: &mut World, dt: f32) {
        for (_, transform) in world.query::<Mutate<Transform>>(&[]) {
            transform.angle += self.speed * dt;
        }
    }
}

fn build_store() -> Result<(Arc<MemoryAssetStore>, Vec<AssetId>)> {
    let store = Arc::new(MemoryAssetStore::new());
    let mut ids = Vec::new();
    for (name, vertex_count) in [("meshes/cube", 8), ("meshes/quad", 4), ("meshes/tree", 512)] {
        let file = MeshFile {
            vertices: vec![[0.0; 3]; vertex_count],
        };
        let bytes = encode_bincode(&file).with_context(|| format!("Failed to encode {name}"))?;
        ids.push(store.insert(name, bytes));
    }
    // Not a mesh: shows how failures are reported.
    ids.push(store.insert("meshes/broken", vec![0xFF, 0xFF]));
    Ok((store, ids))
}

fn main() -> Result<()> {
    let config = EngineConfig::load("ardent.toml")?;
    init_logging(&config.logging);

    let (store, mesh_ids) = build_store()?;
    let metrics = MetricsRegistry::new();
    let loader = AssetLoader::new(store, HeadlessDevice::shared(), &config.assets, &metrics)
        .context("Failed to create the asset loader")?;

    let mut world = World::new();
    world.add_required_component::<Transform>();
    world.add_system(AssetLoaderSystem::new(loader).with_component_type::<MeshRenderer>());
    world.add_system(SpinSystem { speed: 1.5 });

    for (i, &mesh_id) in mesh_ids.iter().enumerate() {
        let entity = world.create_entity_with((MeshRenderer {
            mesh_id,
            mesh: AssetPtr::new(),
        },));
        if i % 2 == 1 {
            world.add_tag(entity, tags::HIDDEN);
        }
    }

    let mut frames = 0;
    loop {
        world.tick();
        world.update(1.0 / 60.0);
        frames += 1;

        let Some(system) = world.find_system::<AssetLoaderSystem>() else {
            break;
        };
        for id in system.recently_loaded() {
            log::info!("Entity {} finished loading", id);
        }
        if system.loading_count() == 0 {
            break;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    log::info!("All meshes settled after {} frame(s)", frames);

    let hidden = format!("!{}", tags::HIDDEN);
    let visible = world.query_ref::<(&Transform, &MeshRenderer)>(&[hidden.as_str()]);
    for (id, (transform, renderer)) in visible {
        match renderer.mesh.get() {
            Some(mesh) => log::info!(
                "Visible entity {}: {} vertices, angle {:.3}",
                id,
                mesh.vertex_count,
                transform.angle
            ),
            None => log::warn!(
                "Visible entity {}: mesh {} unavailable ({:?})",
                id,
                renderer.mesh.name().unwrap_or_default(),
                renderer.mesh.error()
            ),
        }
    }

    for name in ["loaded_total", "failed_total"] {
        let metric = metrics.get_metric(&MetricId::new("assets", name))?;
        log::info!("{} = {}", metric.id, metric.value.as_counter().unwrap_or_default());
    }
    Ok(())
}

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

mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use anyhow::Result;
use ardent_core::device::HeadlessDevice;
use ardent_core::telemetry::metrics::MetricId;
use ardent_io::{
    decode_bincode, encode_bincode, AssetId, AssetLoader, AssetLoadingError, AssetPtr,
    LoadStatus, MemoryAssetStore,
};
use ardent_telemetry::MetricsRegistry;
use common::*;

#[test]
fn test_load_round_trip() -> Result<()> {
    // --- 1. SETUP ---
    let store = Arc::new(MemoryAssetStore::new());
    let id = store.insert("meshes/cube", mesh_bytes("cube", 8));
    let loader = create_loader(store, 1)?;

    // --- 2. ACTION ---
    let mesh = loader.load::<Mesh>(id);

    // --- 3. ASSERTIONS ---
    assert_eq!(mesh.status(), LoadStatus::Ready);
    assert_eq!(mesh.id(), id);
    assert_eq!(mesh.name().as_deref(), Some("meshes/cube"));
    let mesh = mesh.get().expect("mesh should be loaded");
    assert_eq!(mesh.name, "cube");
    assert_eq!(mesh.vertex_count, 8);
    Ok(())
}

#[test]
fn test_requests_share_one_state() -> Result<()> {
    let store = Arc::new(MemoryAssetStore::new());
    let id = store.insert("meshes/cube", mesh_bytes("cube", 3));
    let loader = create_loader(store, 2)?;

    let first = loader.load_async::<Mesh>(id);
    let second = loader.load_async::<Mesh>(id);
    assert!(first.ptr_eq(&second));

    loader.wait_until_loaded(&second);
    assert!(first.is_loaded());
    assert!(loader.load::<Mesh>(id).ptr_eq(&first));
    Ok(())
}

#[test]
fn test_concurrent_requests_read_once() -> Result<()> {
    // --- 1. SETUP ---
    const THREADS: usize = 8;
    let store = Arc::new(MemoryAssetStore::new());
    let id = store.insert("meshes/cube", mesh_bytes("cube", 3));
    let metrics = MetricsRegistry::new();
    let loader = AssetLoader::new(store, HeadlessDevice::shared(), &test_config(2), &metrics)?;
    let barrier = Barrier::new(THREADS);

    // --- 2. ACTION ---
    let handles: Vec<AssetPtr<Mesh>> = thread::scope(|s| {
        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    loader.load_async::<Mesh>(id)
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().expect("requesting thread"))
            .collect()
    });
    loader.wait_until_loaded(&handles[0]);

    // --- 3. ASSERTIONS ---
    assert!(handles.iter().all(|handle| handle.ptr_eq(&handles[0])));
    assert!(handles.iter().all(|handle| handle.is_loaded()));
    let read_time = metrics.get_metric(&MetricId::new("assets", "read_time"))?;
    assert_eq!(read_time.value.sample_count(), Some(1));
    Ok(())
}

#[test]
fn test_released_assets_are_loaded_again() -> Result<()> {
    let store = Arc::new(MemoryAssetStore::new());
    let id = store.insert("meshes/cube", mesh_bytes("cube", 3));
    let loader = create_loader(store.clone(), 0)?;

    let first = loader.load::<Mesh>(id);
    drop(first);

    store.insert("meshes/cube", mesh_bytes("cube", 5));
    let second = loader.load::<Mesh>(id);
    assert_eq!(second.get().map(|m| m.vertex_count), Some(5));
    Ok(())
}

#[test]
fn test_invalid_id_yields_empty_handle() -> Result<()> {
    let loader = create_loader(Arc::new(MemoryAssetStore::new()), 0)?;

    let ptr = loader.load::<Mesh>(AssetId::invalid_id());

    assert!(ptr.is_empty());
    assert_eq!(ptr.status(), LoadStatus::Unloaded);
    assert_eq!(
        loader.load_res::<Mesh>(AssetId::invalid_id()).err(),
        Some(AssetLoadingError::InvalidId)
    );
    Ok(())
}

#[test]
fn test_missing_asset_fails_with_invalid_id() -> Result<()> {
    let loader = create_loader(Arc::new(MemoryAssetStore::new()), 1)?;

    let ptr = loader.load::<Mesh>(AssetId::new());

    assert!(ptr.is_failed());
    assert_eq!(ptr.error(), Some(AssetLoadingError::InvalidId));
    assert!(ptr.get().is_none());
    Ok(())
}

#[test]
fn test_unknown_name_is_reported() -> Result<()> {
    let loader = create_loader(Arc::new(MemoryAssetStore::new()), 0)?;

    let result = loader.load_by_name::<Mesh>("meshes/missing");

    assert_eq!(result.err(), Some(AssetLoadingError::UnknownId));
    Ok(())
}

#[test]
fn test_undecodable_bytes_fail_with_invalid_data() -> Result<()> {
    let store = Arc::new(MemoryAssetStore::new());
    let garbage = store.insert("meshes/garbage", vec![0xFF; 4]);
    let empty = store.insert("meshes/empty", mesh_bytes("empty", 0));
    let loader = create_loader(store, 1)?;

    // Rejected while reading.
    let ptr = loader.load::<Mesh>(garbage);
    assert_eq!(ptr.error(), Some(AssetLoadingError::InvalidData));

    // Rejected while finalizing.
    let ptr = loader.load::<Mesh>(empty);
    assert_eq!(ptr.error(), Some(AssetLoadingError::InvalidData));
    assert_eq!(
        loader.load_res::<Mesh>(empty).err(),
        Some(AssetLoadingError::InvalidData)
    );
    Ok(())
}

#[test]
fn test_dependencies_load_before_their_dependent() -> Result<()> {
    // --- 1. SETUP ---
    let store = Arc::new(MemoryAssetStore::new());
    store.insert("textures/brick", vec![1, 2, 3, 4]);
    let id = store.insert("materials/wall", material_bytes("textures/brick"));
    let loader = create_loader(store, 2)?;

    // --- 2. ACTION ---
    let material = loader.load::<Material>(id);

    // --- 3. ASSERTIONS ---
    let material = material.get().expect("material should be loaded");
    assert!(material.texture.is_loaded());
    assert_eq!(material.texture.name().as_deref(), Some("textures/brick"));
    assert_eq!(material.texture.get().map(|t| t.0.len()), Some(4));
    Ok(())
}

#[test]
fn test_failed_dependency_fails_the_dependent() -> Result<()> {
    let store = Arc::new(MemoryAssetStore::new());
    let texture = store.insert("textures/blank", Vec::new());
    let id = store.insert("materials/blank", material_bytes("textures/blank"));
    let loader = create_loader(store, 1)?;

    let material = loader.load::<Material>(id);

    assert_eq!(material.error(), Some(AssetLoadingError::FailedDependency));
    let texture = loader.load::<Texture>(texture);
    assert_eq!(texture.error(), Some(AssetLoadingError::InvalidData));
    Ok(())
}

#[test]
fn test_reload_keeps_previous_version_until_flushed() -> Result<()> {
    // --- 1. SETUP ---
    let store = Arc::new(MemoryAssetStore::new());
    let id = store.insert("meshes/cube", mesh_bytes("cube", 3));
    let loader = create_loader(store.clone(), 0)?;
    let mut mesh = loader.load::<Mesh>(id);

    // --- 2. ACTION ---
    store.insert("meshes/cube", mesh_bytes("cube", 6));
    let pending = loader.reload_async(&mesh);

    // --- 3. ASSERTIONS ---
    // Nothing changes while the new version is loading.
    assert!(pending.is_loading());
    assert_eq!(mesh.get().map(|m| m.vertex_count), Some(3));
    assert!(loader.load_async::<Mesh>(id).ptr_eq(&mesh));

    loader.wait_until_loaded(&pending);
    assert!(pending.is_loaded());

    // New requests see the new version, existing handles keep the old one.
    let fresh = loader.load::<Mesh>(id);
    assert!(fresh.ptr_eq(&pending));
    assert_eq!(fresh.get().map(|m| m.vertex_count), Some(6));
    assert_eq!(mesh.get().map(|m| m.vertex_count), Some(3));

    assert!(mesh.flush_reload());
    assert_eq!(mesh.get().map(|m| m.vertex_count), Some(6));
    assert!(!mesh.flush_reload());
    Ok(())
}

#[test]
fn test_failed_reload_keeps_previous_version() -> Result<()> {
    let store = Arc::new(MemoryAssetStore::new());
    let id = store.insert("meshes/cube", mesh_bytes("cube", 3));
    let loader = create_loader(store.clone(), 1)?;
    let mut mesh = loader.load::<Mesh>(id);

    store.insert("meshes/cube", vec![0xFF; 2]);
    let result = loader.reload(&mesh);

    assert_eq!(result, Err(AssetLoadingError::InvalidData));
    assert!(!mesh.flush_reload());
    assert_eq!(mesh.get().map(|m| m.vertex_count), Some(3));
    assert!(loader.load::<Mesh>(id).ptr_eq(&mesh));
    Ok(())
}

#[test]
fn test_handle_reload_shortcut() -> Result<()> {
    let store = Arc::new(MemoryAssetStore::new());
    let id = store.insert("meshes/cube", mesh_bytes("cube", 3));
    let loader = create_loader(store.clone(), 1)?;
    let mut mesh = loader.load::<Mesh>(id);

    store.insert("meshes/cube", mesh_bytes("cube", 4));
    mesh.reload()?;

    assert!(mesh.flush_reload());
    assert_eq!(mesh.get().map(|m| m.vertex_count), Some(4));
    Ok(())
}

#[test]
fn test_process_pending_finalizes_background_reads() -> Result<()> {
    let store = Arc::new(MemoryAssetStore::new());
    let ids: Vec<_> = (0..8)
        .map(|i| store.insert(&format!("meshes/{i}"), mesh_bytes("m", i + 1)))
        .collect();
    let loader = create_loader(store, 2)?;

    let meshes: Vec<AssetPtr<Mesh>> = ids.iter().map(|&id| loader.load_async(id)).collect();
    while meshes.iter().any(|m| m.is_loading()) {
        loader.process_pending();
        thread::yield_now();
    }

    for (i, mesh) in meshes.iter().enumerate() {
        assert_eq!(mesh.get().map(|m| m.vertex_count), Some(i + 1));
    }
    assert_eq!(loader.pending_jobs(), 0);
    Ok(())
}

#[test]
fn test_waiting_from_another_thread() -> Result<()> {
    let store = Arc::new(MemoryAssetStore::new());
    let id = store.insert("meshes/cube", mesh_bytes("cube", 7));
    let loader = create_loader(store, 1)?;

    let count = thread::scope(|s| {
        let handle = s.spawn(|| {
            let mesh = loader.load_async::<Mesh>(id);
            mesh.wait_until_loaded();
            mesh.get().map(|m| m.vertex_count)
        });
        // Finalization only happens on the thread that created the loader.
        while !handle.is_finished() {
            loader.process_pending();
            thread::yield_now();
        }
        handle.join()
    });

    assert_eq!(count.ok().flatten(), Some(7));
    Ok(())
}

#[test]
fn test_panicking_reader_fails_the_asset() -> Result<()> {
    // --- 1. SETUP ---
    let store = Arc::new(MemoryAssetStore::new());
    let corrupt = store.insert("corrupt", vec![1, 2, 3]);
    let cube = store.insert("meshes/cube", mesh_bytes("cube", 4));
    let loader = create_loader(store, 1)?;

    // --- 2. ACTION ---
    let failed = loader.load::<Corrupt>(corrupt);

    // --- 3. ASSERTIONS ---
    assert_eq!(failed.status(), LoadStatus::Failed(AssetLoadingError::InvalidData));
    assert_eq!(failed.error(), Some(AssetLoadingError::InvalidData));

    // The worker thread survives and keeps serving requests.
    let mesh = loader.load::<Mesh>(cube);
    assert_eq!(mesh.get().map(|m| m.vertex_count), Some(4));
    Ok(())
}

#[test]
fn test_handles_serialize_as_ids() -> Result<()> {
    let store = Arc::new(MemoryAssetStore::new());
    let id = store.insert("meshes/cube", mesh_bytes("cube", 2));
    let loader = create_loader(store, 1)?;
    let mesh = loader.load::<Mesh>(id);

    let bytes = encode_bincode(&mesh)?;
    let mut restored: AssetPtr<Mesh> = decode_bincode(&mut bytes.as_slice())?;
    assert!(restored.is_empty());
    assert_eq!(restored.id(), id);

    restored.post_deserialize(&loader);
    restored.wait_until_loaded();
    assert!(restored.ptr_eq(&mesh));
    Ok(())
}

#[test]
fn test_loader_metrics() -> Result<()> {
    let store = Arc::new(MemoryAssetStore::new());
    let good = store.insert("meshes/good", mesh_bytes("good", 1));
    let bad = store.insert("meshes/bad", vec![0xFF]);
    let metrics = MetricsRegistry::new();
    let loader = AssetLoader::new(store, HeadlessDevice::shared(), &test_config(1), &metrics)?;

    let _good = loader.load::<Mesh>(good);
    let _bad = loader.load::<Mesh>(bad);

    let loaded = metrics.get_metric(&MetricId::new("assets", "loaded_total"))?;
    let failed = metrics.get_metric(&MetricId::new("assets", "failed_total"))?;
    assert_eq!(loaded.value.as_counter(), Some(1));
    assert_eq!(failed.value.as_counter(), Some(1));
    let read_time = metrics.get_metric(&MetricId::new("assets", "read_time"))?;
    assert_eq!(read_time.value.sample_count(), Some(2));
    Ok(())
}

#[test]
#[should_panic(expected = "Asset is still loading")]
fn test_dropping_loader_while_loading_panics() {
    let store = Arc::new(MemoryAssetStore::new());
    let id = store.insert("meshes/cube", mesh_bytes("cube", 1));
    let loader = create_loader(store, 0).expect("loader");

    let _mesh = loader.load_async::<Mesh>(id);
    drop(loader);
}

#[test]
#[should_panic(expected = "Asset is still loading")]
fn test_dropping_loader_during_reload_panics() {
    let store = Arc::new(MemoryAssetStore::new());
    let id = store.insert("meshes/cube", mesh_bytes("cube", 1));
    let loader = create_loader(store, 0).expect("loader");
    let mesh = loader.load::<Mesh>(id);

    // With no workers the reload stays queued.
    let _pending = loader.reload_async(&mesh);
    drop(loader);
}

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

use std::fs;
use std::sync::Arc;

use anyhow::Result;
use ardent_io::{AssetId, AssetStore, FolderAssetStore};
use common::*;
use tempfile::tempdir;

#[test]
fn test_folder_store_indexes_nested_files() -> Result<()> {
    // --- 1. Setup ---
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("meshes/props"))?;
    fs::write(dir.path().join("meshes/cube.bin"), mesh_bytes("cube", 8))?;
    fs::write(dir.path().join("meshes/props/crate.bin"), mesh_bytes("crate", 24))?;

    // --- 2. Index ---
    let store = FolderAssetStore::open(dir.path())?;

    // --- 3. Assertions ---
    assert_eq!(store.len(), 2);
    let id = store.id("meshes/props/crate.bin").expect("asset should be indexed");
    assert_eq!(id, AssetId::new_v5("meshes/props/crate.bin"));
    assert_eq!(store.name(id).as_deref(), Some("meshes/props/crate.bin"));
    assert!(store.data(id).is_some());
    assert!(store.id("meshes/missing.bin").is_none());
    Ok(())
}

#[test]
fn test_folder_store_rescan() -> Result<()> {
    let dir = tempdir()?;
    let store = FolderAssetStore::open(dir.path())?;
    assert!(store.is_empty());

    fs::write(dir.path().join("late.bin"), mesh_bytes("late", 1))?;
    assert_eq!(store.rescan(), 1);
    assert!(store.id("late.bin").is_some());
    Ok(())
}

#[test]
fn test_folder_store_rejects_files() -> Result<()> {
    let dir = tempdir()?;
    let file = dir.path().join("not_a_folder.bin");
    fs::write(&file, b"data")?;

    assert!(FolderAssetStore::open(&file).is_err());
    Ok(())
}

#[test]
fn test_load_from_folder() -> Result<()> {
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("textures"))?;
    fs::write(dir.path().join("textures/brick.raw"), [7u8; 16])?;
    fs::write(dir.path().join("wall.mat"), material_bytes("textures/brick.raw"))?;

    let store = Arc::new(FolderAssetStore::open(dir.path())?);
    let loader = create_loader(store, 1)?;

    let material = loader.load_by_name::<Material>("wall.mat")?;
    let material = material.get().expect("material should be loaded");
    assert_eq!(material.texture.get().map(|t| t.0.len()), Some(16));
    Ok(())
}

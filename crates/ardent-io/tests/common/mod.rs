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

//! Asset types shared by the integration tests.

#![allow(dead_code)]

use std::io::Read;
use std::sync::Arc;

use anyhow::Result;
use ardent_core::config::AssetLoaderConfig;
use ardent_core::device::{DevicePtr, HeadlessDevice};
use ardent_io::{
    decode_bincode, encode_bincode, read_bytes, Asset, AssetDecodeError, AssetLoader,
    AssetLoadingContext, AssetPtr, AssetStore, Loadable,
};
use ardent_telemetry::MetricsRegistry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct MeshFile {
    pub name: String,
    pub vertices: Vec<[f32; 3]>,
}

#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_count: usize,
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

    fn finalize(_device: &DevicePtr, file: MeshFile) -> Result<Self, AssetDecodeError> {
        if file.vertices.is_empty() {
            return Err(AssetDecodeError::Malformed(format!(
                "mesh '{}' has no vertices",
                file.name
            )));
        }
        Ok(Mesh {
            name: file.name,
            vertex_count: file.vertices.len(),
        })
    }
}

/// Raw bytes. Empty textures are rejected at finalization.
#[derive(Debug)]
pub struct Texture(pub Vec<u8>);

impl Asset for Texture {}

impl Loadable for Texture {
    type Intermediate = Vec<u8>;

    fn read(
        reader: &mut dyn Read,
        _ctx: &mut AssetLoadingContext<'_>,
    ) -> Result<Vec<u8>, AssetDecodeError> {
        read_bytes(reader)
    }

    fn finalize(_device: &DevicePtr, bytes: Vec<u8>) -> Result<Self, AssetDecodeError> {
        if bytes.is_empty() {
            return Err(AssetDecodeError::Malformed("empty texture".to_string()));
        }
        Ok(Texture(bytes))
    }
}

/// A reader that panics on every input.
#[derive(Debug)]
pub struct Corrupt;

impl Asset for Corrupt {}

impl Loadable for Corrupt {
    type Intermediate = ();

    fn read(
        _reader: &mut dyn Read,
        _ctx: &mut AssetLoadingContext<'_>,
    ) -> Result<(), AssetDecodeError> {
        panic!("corrupt reader");
    }

    fn finalize(_device: &DevicePtr, _intermediate: ()) -> Result<Self, AssetDecodeError> {
        Ok(Corrupt)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MaterialFile {
    pub texture: String,
}

/// Depends on the texture it names.
#[derive(Debug)]
pub struct Material {
    pub texture: AssetPtr<Texture>,
}

impl Asset for Material {}

impl Loadable for Material {
    type Intermediate = AssetPtr<Texture>;

    fn read(
        reader: &mut dyn Read,
        ctx: &mut AssetLoadingContext<'_>,
    ) -> Result<AssetPtr<Texture>, AssetDecodeError> {
        let file: MaterialFile = decode_bincode(reader)?;
        ctx.load_by_name_async(&file.texture)
            .map_err(|e| AssetDecodeError::Malformed(e.to_string()))
    }

    fn finalize(
        _device: &DevicePtr,
        texture: AssetPtr<Texture>,
    ) -> Result<Self, AssetDecodeError> {
        Ok(Material { texture })
    }
}

pub fn mesh_bytes(name: &str, vertex_count: usize) -> Vec<u8> {
    let file = MeshFile {
        name: name.to_string(),
        vertices: vec![[0.0, 1.0, 2.0]; vertex_count],
    };
    encode_bincode(&file).expect("mesh encodes")
}

pub fn material_bytes(texture: &str) -> Vec<u8> {
    let file = MaterialFile {
        texture: texture.to_string(),
    };
    encode_bincode(&file).expect("material encodes")
}

pub fn test_config(worker_threads: usize) -> AssetLoaderConfig {
    AssetLoaderConfig {
        worker_threads,
        thread_name: "test-asset-loader".to_string(),
    }
}

pub fn create_loader(store: Arc<dyn AssetStore>, worker_threads: usize) -> Result<AssetLoader> {
    AssetLoader::new(
        store,
        HeadlessDevice::shared(),
        &test_config(worker_threads),
        &MetricsRegistry::new(),
    )
}

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

//! # Ardent IO
//!
//! Asynchronous asset loading.
//!
//! An [`AssetLoader`] hands out [`AssetPtr`] handles. The first request for an
//! id creates a shared loading state and queues a job on the
//! [`AssetLoadingThreadPool`](thread_pool::AssetLoadingThreadPool): worker
//! threads run [`Loadable::read`], then the thread that owns the graphics
//! device runs [`Loadable::finalize`] from
//! [`AssetLoader::process_pending`]. Further requests for the same id share
//! the in-flight state.

#![warn(missing_docs)]

mod asset_ptr;
mod dependencies;
mod error;
mod folder_store;
mod job;
mod loadable;
mod loader;
mod state;
pub mod thread_pool;

pub use asset_ptr::AssetPtr;
pub use dependencies::{AssetDependencies, AssetLoadingContext};
pub use error::AssetDecodeError;
pub use folder_store::FolderAssetStore;
pub use loadable::{decode_bincode, encode_bincode, read_bytes, Loadable};
pub use loader::AssetLoader;
pub use state::LoadStatus;

pub use ardent_core::asset::{Asset, AssetId, AssetLoadingError, AssetStore, MemoryAssetStore};

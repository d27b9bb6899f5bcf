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

//! Provides the foundational traits and primitive types for Ardent's asset system.
//!
//! This module defines the "common language" for all asset-related operations in the
//! engine. It contains the contracts that the loading pipeline (`ardent-io`) builds
//! upon, but it has no knowledge of how assets are scheduled or decoded.
//!
//! The key components are:
//! - The [`Asset`] trait: A marker for all types that can be treated as assets.
//! - [`AssetId`]: the stable identifier used to reference assets.
//! - [`AssetStore`]: the byte-stream provider assets are read from.
//! - [`AssetLoadingError`]: the terminal failure kinds of a load.

mod error;
mod id;
mod store;

pub use error::*;
pub use id::*;
pub use store::*;

/// A marker trait for types that can be managed by the asset system.
///
/// The supertraits enforce critical safety guarantees:
/// - `Send` + `Sync`: The asset type can be safely shared and sent between threads.
///   This is essential for background loading.
/// - `'static`: The asset type does not contain any non-static references, ensuring
///   it can be stored for the lifetime of the application.
///
/// # Examples
///
/// ```
/// use ardent_core::asset::Asset;
///
/// // A simple struct representing a texture.
/// struct Texture {
///     // ... fields
/// }
///
/// // By implementing Asset, `Texture` can now be used by the asset system.
/// impl Asset for Texture {}
/// ```
pub trait Asset: Send + Sync + 'static {}

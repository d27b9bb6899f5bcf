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

//! Loads the assets referenced by components.
//!
//! The [`AssetLoaderSystem`] owns the engine's [`AssetLoader`](ardent_io::AssetLoader).
//! Every tick it finalizes the assets whose background reads completed,
//! starts loading the assets of components added since the previous tick,
//! and publishes the entities whose components finished loading through
//! [`AssetLoaderSystem::recently_loaded`].

mod component;
mod system;

pub use component::LoadableComponent;
pub use system::AssetLoaderSystem;

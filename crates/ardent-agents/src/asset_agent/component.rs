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

use ardent_data::ecs::Component;
use ardent_io::AssetLoader;

/// A component that refers to assets the [`AssetLoaderSystem`](super::AssetLoaderSystem)
/// should load.
///
/// ```rust
/// use ardent_agents::asset_agent::LoadableComponent;
/// use ardent_data::ecs::Component;
/// use ardent_io::{AssetId, AssetLoader, AssetPtr, Loadable};
///
/// #[derive(Component)]
/// struct Skin<T: Loadable> {
///     id: AssetId,
///     texture: AssetPtr<T>,
/// }
///
/// impl<T: Loadable> LoadableComponent for Skin<T> {
///     fn load_assets(&mut self, loader: &AssetLoader) {
///         self.texture = loader.load_async(self.id);
///     }
///
///     fn update_asset_loading_status(&mut self) -> bool {
///         !self.texture.is_loading()
///     }
/// }
/// ```
pub trait LoadableComponent: Component {
    /// Requests the component's assets. Must not block.
    fn load_assets(&mut self, loader: &AssetLoader);

    /// Returns `true` once none of the component's assets is still loading.
    fn update_asset_loading_status(&mut self) -> bool;
}

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

use std::fmt;
use std::sync::Arc;

use ardent_core::asset::{Asset, AssetId, AssetLoadingError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::state::AssetState;
use crate::{AssetLoader, LoadStatus, Loadable};

/// A shared handle to an asset that may still be loading.
///
/// Handles obtained for the same id from the same loader share one state,
/// so cloning is cheap and every clone observes the same transition from
/// `Loading` to `Ready` or `Failed`. A handle with no state is *empty*.
///
/// A handle serializes as its [`AssetId`]. A deserialized handle is empty
/// until [`post_deserialize`](AssetPtr::post_deserialize) requests it again.
pub struct AssetPtr<T> {
    id: AssetId,
    state: Option<Arc<AssetState<T>>>,
}

impl<T: Asset> AssetPtr<T> {
    /// Creates an empty handle.
    pub fn new() -> Self {
        Self {
            id: AssetId::invalid_id(),
            state: None,
        }
    }

    pub(crate) fn from_state(state: Arc<AssetState<T>>) -> Self {
        Self {
            id: state.id(),
            state: Some(state),
        }
    }

    pub(crate) fn state(&self) -> Option<&Arc<AssetState<T>>> {
        self.state.as_ref()
    }

    /// The id this handle refers to. Invalid for a default-constructed handle.
    pub fn id(&self) -> AssetId {
        self.id
    }

    /// Whether the handle points at no loading state.
    pub fn is_empty(&self) -> bool {
        self.state.is_none()
    }

    /// The current status.
    pub fn status(&self) -> LoadStatus {
        self.state
            .as_ref()
            .map_or(LoadStatus::Unloaded, |state| state.status())
    }

    /// Whether the asset is still being loaded.
    pub fn is_loading(&self) -> bool {
        self.state.as_ref().is_some_and(|state| state.is_loading())
    }

    /// Whether the asset is available.
    pub fn is_loaded(&self) -> bool {
        self.status() == LoadStatus::Ready
    }

    /// Whether loading failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.status(), LoadStatus::Failed(_))
    }

    /// The failure reason, if loading failed.
    pub fn error(&self) -> Option<AssetLoadingError> {
        match self.status() {
            LoadStatus::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// The asset, once it is loaded.
    pub fn get(&self) -> Option<&T> {
        self.state.as_ref().and_then(|state| state.get())
    }

    /// Blocks until the asset reaches a terminal state.
    ///
    /// On the thread that created the loader this also finalizes pending
    /// assets; on any other thread it waits for that thread to do so.
    pub fn wait_until_loaded(&self) -> &Self {
        if let Some(state) = &self.state {
            if let Some(loader) = state.loader() {
                loader.wait_for(state.as_ref());
            }
        }
        self
    }

    /// Name of the asset in the loader's store.
    pub fn name(&self) -> Option<String> {
        let loader = self.state.as_ref()?.loader()?;
        loader.store().name(self.id)
    }

    /// Switches this handle to the latest successful reload, if any.
    ///
    /// Returns whether the handle changed. Until this is called the handle
    /// keeps observing the value it was created with.
    pub fn flush_reload(&mut self) -> bool {
        let Some(reloaded) = self.state.as_ref().and_then(|state| state.take_reloaded()) else {
            return false;
        };
        self.state = Some(reloaded);
        true
    }

    /// Whether both handles share the same loading state.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.state, &other.state) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T: Loadable> AssetPtr<T> {
    /// Requests the asset again after deserialization.
    pub fn post_deserialize(&mut self, loader: &AssetLoader) {
        if self.state.is_none() && self.id.is_valid() {
            *self = loader.load_async(self.id);
        }
    }

    /// Issues a blocking reload through the loader this handle came from.
    ///
    /// See [`AssetLoader::reload`].
    pub fn reload(&self) -> Result<(), AssetLoadingError> {
        let loader = self
            .state
            .as_ref()
            .and_then(|state| state.loader())
            .ok_or(AssetLoadingError::InvalidId)?;
        loader.reload(self)
    }
}

impl<T: Asset> Default for AssetPtr<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for AssetPtr<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            state: self.state.clone(),
        }
    }
}

impl<T> fmt::Debug for AssetPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetPtr")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish()
    }
}

impl<T> Serialize for AssetPtr<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.id.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for AssetPtr<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = AssetId::deserialize(deserializer)?;
        Ok(Self { id, state: None })
    }
}

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

use ardent_core::asset::{AssetId, AssetLoadingError};

use crate::loader::LoaderInner;
use crate::state::DependencyState;
use crate::{AssetPtr, LoadStatus, Loadable};

/// The assets an asset requested while it was being read.
///
/// An asset is only finalized once every dependency is terminal, and fails
/// with [`AssetLoadingError::FailedDependency`] if any of them failed.
#[derive(Default)]
pub struct AssetDependencies {
    states: Vec<Arc<dyn DependencyState>>,
}

impl AssetDependencies {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a dependency. Empty handles are ignored.
    pub fn add<T: Loadable>(&mut self, ptr: &AssetPtr<T>) {
        if let Some(state) = ptr.state() {
            self.states.push(state.clone());
        }
    }

    /// Number of recorded dependencies.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether nothing was requested.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Ids of the recorded dependencies, in request order.
    pub fn ids(&self) -> impl Iterator<Item = AssetId> + '_ {
        self.states.iter().map(|state| state.asset_id())
    }

    /// Whether every dependency has finished loading, successfully or not.
    pub fn is_ready(&self) -> bool {
        self.states.iter().all(|state| state.status().is_terminal())
    }

    /// Whether at least one dependency failed.
    pub fn has_failed(&self) -> bool {
        self.states
            .iter()
            .any(|state| matches!(state.status(), LoadStatus::Failed(_)))
    }

    /// Whether the dependent asset can be settled one way or the other.
    pub(crate) fn is_settled(&self) -> bool {
        self.has_failed() || self.is_ready()
    }
}

impl fmt::Debug for AssetDependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

/// Handed to [`Loadable::read`] so an asset can request the assets it
/// depends on.
pub struct AssetLoadingContext<'a> {
    loader: &'a Arc<LoaderInner>,
    asset: AssetId,
    dependencies: &'a mut AssetDependencies,
}

impl<'a> AssetLoadingContext<'a> {
    pub(crate) fn new(
        loader: &'a Arc<LoaderInner>,
        asset: AssetId,
        dependencies: &'a mut AssetDependencies,
    ) -> Self {
        Self {
            loader,
            asset,
            dependencies,
        }
    }

    /// Id of the asset being read.
    pub fn asset_id(&self) -> AssetId {
        self.asset
    }

    /// Name of the asset being read, if the store knows it.
    pub fn name(&self) -> Option<String> {
        self.loader.store().name(self.asset)
    }

    /// Requests another asset and records it as a dependency.
    pub fn load_async<T: Loadable>(&mut self, id: AssetId) -> AssetPtr<T> {
        let ptr = self.loader.load_async(id);
        self.dependencies.add(&ptr);
        ptr
    }

    /// Requests another asset by name and records it as a dependency.
    pub fn load_by_name_async<T: Loadable>(
        &mut self,
        name: &str,
    ) -> Result<AssetPtr<T>, AssetLoadingError> {
        let id = self
            .loader
            .store()
            .id(name)
            .ok_or(AssetLoadingError::UnknownId)?;
        Ok(self.load_async(id))
    }

    /// Dependencies recorded so far.
    pub fn dependencies(&self) -> &AssetDependencies {
        self.dependencies
    }
}

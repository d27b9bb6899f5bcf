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
use std::sync::{Arc, Mutex, OnceLock, Weak};

use ardent_core::asset::{Asset, AssetId, AssetLoadingError};

use crate::loader::LoaderInner;

/// Where a handle is in its life cycle.
///
/// `Loading` moves to exactly one of `Ready` or `Failed` and never changes
/// again. A reload produces a new state instead of mutating this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The handle points at nothing.
    Unloaded,
    /// The asset is queued, being read, or waiting to be finalized.
    Loading,
    /// The asset is available.
    Ready,
    /// Loading failed for good.
    Failed(AssetLoadingError),
}

impl LoadStatus {
    /// Whether the status can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed(_))
    }
}

/// Shared loading state behind every [`AssetPtr`](crate::AssetPtr) to the
/// same asset.
pub(crate) struct AssetState<T> {
    id: AssetId,
    loader: Weak<LoaderInner>,
    value: OnceLock<Result<T, AssetLoadingError>>,
    reloaded: Mutex<Option<Arc<AssetState<T>>>>,
}

impl<T: Asset> AssetState<T> {
    pub(crate) fn new(id: AssetId, loader: Weak<LoaderInner>) -> Self {
        Self {
            id,
            loader,
            value: OnceLock::new(),
            reloaded: Mutex::new(None),
        }
    }

    pub(crate) fn id(&self) -> AssetId {
        self.id
    }

    pub(crate) fn loader(&self) -> Option<Arc<LoaderInner>> {
        self.loader.upgrade()
    }

    pub(crate) fn status(&self) -> LoadStatus {
        match self.value.get() {
            None => LoadStatus::Loading,
            Some(Ok(_)) => LoadStatus::Ready,
            Some(Err(e)) => LoadStatus::Failed(*e),
        }
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.value.get().is_none()
    }

    pub(crate) fn get(&self) -> Option<&T> {
        self.value.get().and_then(|r| r.as_ref().ok())
    }

    /// Moves the state out of `Loading`. Only the first call has an effect.
    pub(crate) fn complete(&self, result: Result<T, AssetLoadingError>) {
        let first = self.value.set(result).is_ok();
        debug_assert!(first, "Asset {} completed twice", self.id);
    }

    pub(crate) fn set_reloaded(&self, state: Arc<AssetState<T>>) {
        if let Ok(mut slot) = self.reloaded.lock() {
            *slot = Some(state);
        }
    }

    /// Takes the most recent successful reload, following chains of reloads.
    pub(crate) fn take_reloaded(&self) -> Option<Arc<AssetState<T>>> {
        let mut latest = self.reloaded.lock().ok()?.take()?;
        loop {
            let next = latest.reloaded.lock().ok().and_then(|mut slot| slot.take());
            match next {
                Some(next) => latest = next,
                None => return Some(latest),
            }
        }
    }
}

impl<T> fmt::Debug for AssetState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.value.get() {
            None => "loading",
            Some(Ok(_)) => "ready",
            Some(Err(_)) => "failed",
        };
        f.debug_struct("AssetState")
            .field("id", &self.id)
            .field("status", &status)
            .finish()
    }
}

/// Type-erased view of a state, used to track dependencies across asset types.
pub(crate) trait DependencyState: Send + Sync {
    fn status(&self) -> LoadStatus;
    fn asset_id(&self) -> AssetId;
}

impl<T: Asset> DependencyState for AssetState<T> {
    fn status(&self) -> LoadStatus {
        AssetState::status(self)
    }

    fn asset_id(&self) -> AssetId {
        self.id
    }
}

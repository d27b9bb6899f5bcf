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

use std::sync::{Arc, Weak};

use ardent_core::asset::{AssetId, AssetLoadingError};
use ardent_core::device::DevicePtr;
use ardent_telemetry::ScopedMetricTimer;

use crate::loader::LoaderInner;
use crate::state::AssetState;
use crate::{AssetDependencies, AssetLoadingContext, Loadable};

/// A unit of work on the loading thread pool.
///
/// `read` runs once on any thread. The job is then parked until its
/// dependencies settle, after which exactly one of `finalize` or
/// `set_dependencies_failed` runs on the device thread.
pub(crate) trait LoadingJob: Send {
    /// Store name of the asset, or its id when unnamed.
    fn name(&self) -> String;

    fn read(&mut self) -> Result<(), AssetLoadingError>;

    fn dependencies(&self) -> &AssetDependencies;

    fn finalize(self: Box<Self>, device: &DevicePtr);

    fn set_dependencies_failed(self: Box<Self>);

    fn set_failed(self: Box<Self>, error: AssetLoadingError);
}

pub(crate) struct AssetJob<T: Loadable> {
    state: Arc<AssetState<T>>,
    /// The state a reload supersedes once it succeeds.
    replaces: Option<Arc<AssetState<T>>>,
    loader: Weak<LoaderInner>,
    intermediate: Option<T::Intermediate>,
    dependencies: AssetDependencies,
}

impl<T: Loadable> AssetJob<T> {
    pub(crate) fn new(
        state: Arc<AssetState<T>>,
        replaces: Option<Arc<AssetState<T>>>,
        loader: Weak<LoaderInner>,
    ) -> Self {
        Self {
            state,
            replaces,
            loader,
            intermediate: None,
            dependencies: AssetDependencies::new(),
        }
    }

    fn id(&self) -> AssetId {
        self.state.id()
    }

    fn display_name(&self) -> String {
        self.loader
            .upgrade()
            .and_then(|loader| loader.store().name(self.id()))
            .unwrap_or_else(|| self.id().to_string())
    }

    fn complete(self, result: Result<T, AssetLoadingError>) {
        let loader = self.loader.upgrade();
        let succeeded = result.is_ok();
        self.state.complete(result);

        if let Some(loader) = &loader {
            loader.record_completion(succeeded);
        }

        let Some(previous) = self.replaces else {
            return;
        };
        if succeeded {
            if let Some(loader) = &loader {
                loader.loader::<T>().install(&self.state);
            }
            previous.set_reloaded(self.state);
        } else {
            let name = loader
                .and_then(|loader| loader.store().name(previous.id()))
                .unwrap_or_else(|| previous.id().to_string());
            log::error!("Reload of {} failed, keeping the previous version", name);
        }
    }
}

impl<T: Loadable> LoadingJob for AssetJob<T> {
    fn name(&self) -> String {
        self.display_name()
    }

    fn read(&mut self) -> Result<(), AssetLoadingError> {
        let Some(loader) = self.loader.upgrade() else {
            return Err(AssetLoadingError::InvalidId);
        };
        let _timer = ScopedMetricTimer::new(loader.read_time());

        let Some(mut reader) = loader.store().data(self.id()) else {
            log::error!("Unable to load asset: invalid ID ({})", self.id());
            return Err(AssetLoadingError::InvalidId);
        };

        let mut ctx = AssetLoadingContext::new(&loader, self.id(), &mut self.dependencies);
        match T::read(&mut reader, &mut ctx) {
            Ok(intermediate) => {
                self.intermediate = Some(intermediate);
                Ok(())
            }
            Err(e) => {
                log::error!("Unable to load {}: invalid data ({})", self.display_name(), e);
                Err(AssetLoadingError::InvalidData)
            }
        }
    }

    fn dependencies(&self) -> &AssetDependencies {
        &self.dependencies
    }

    fn finalize(mut self: Box<Self>, device: &DevicePtr) {
        let Some(intermediate) = self.intermediate.take() else {
            unreachable!("Asset {} finalized before it was read", self.id());
        };
        let result = T::finalize(device, intermediate).map_err(|e| {
            log::error!("Unable to load {}: invalid data ({})", self.display_name(), e);
            AssetLoadingError::InvalidData
        });
        self.complete(result);
    }

    fn set_dependencies_failed(self: Box<Self>) {
        log::error!("Unable to load {}: failed to load dependency", self.display_name());
        self.complete(Err(AssetLoadingError::FailedDependency));
    }

    fn set_failed(self: Box<Self>, error: AssetLoadingError) {
        self.complete(Err(error));
    }
}

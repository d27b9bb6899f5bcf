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

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, ThreadId};

use ahash::AHashMap;
use anyhow::Result;
use ardent_core::asset::{AssetId, AssetLoadingError, AssetStore};
use ardent_core::config::AssetLoaderConfig;
use ardent_core::device::{DevicePtr, HeadlessDevice};
use ardent_telemetry::{CounterHandle, HistogramHandle, MetricsRegistry};

use crate::job::AssetJob;
use crate::state::{AssetState, DependencyState};
use crate::thread_pool::AssetLoadingThreadPool;
use crate::{AssetPtr, Loadable};

/// Deduplicates in-flight and loaded assets of one type.
///
/// Entries are weak: an asset is unloaded when its last handle goes away.
pub(crate) struct Loader<T> {
    loaded: Mutex<Entries<T>>,
    reloading: Mutex<Vec<Weak<AssetState<T>>>>,
}

struct Entries<T> {
    states: HashMap<AssetId, Weak<AssetState<T>>>,
    // Dead entries are swept once the map grows past this size.
    prune_at: usize,
}

const MIN_PRUNE_AT: usize = 64;

impl<T> Entries<T> {
    fn insert(&mut self, id: AssetId, state: Weak<AssetState<T>>) {
        if self.states.len() >= self.prune_at {
            self.states.retain(|_, state| state.strong_count() > 0);
            self.prune_at = (self.states.len() * 2).max(MIN_PRUNE_AT);
        }
        self.states.insert(id, state);
    }
}

impl<T: Loadable> Loader<T> {
    fn new() -> Self {
        Self {
            loaded: Mutex::new(Entries {
                states: HashMap::new(),
                prune_at: MIN_PRUNE_AT,
            }),
            reloading: Mutex::new(Vec::new()),
        }
    }

    /// Returns the live state for `id`, creating it if needed.
    ///
    /// The flag tells whether the state was created by this call.
    fn find_ptr(&self, id: AssetId, loader: &Weak<LoaderInner>) -> (Arc<AssetState<T>>, bool) {
        let mut loaded = self.loaded.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(state) = loaded.states.get(&id).and_then(Weak::upgrade) {
            return (state, false);
        }

        let state = Arc::new(AssetState::new(id, loader.clone()));
        loaded.insert(id, Arc::downgrade(&state));
        (state, true)
    }

    /// Makes `state` the one future requests for its id resolve to.
    pub(crate) fn install(&self, state: &Arc<AssetState<T>>) {
        let mut loaded = self.loaded.lock().unwrap_or_else(|e| e.into_inner());
        loaded.insert(state.id(), Arc::downgrade(state));
    }

    /// Keeps a reload visible to `loading_count` until it completes.
    fn track_reload(&self, state: &Arc<AssetState<T>>) {
        let mut reloading = self.reloading.lock().unwrap_or_else(|e| e.into_inner());
        reloading.retain(|entry| entry.upgrade().is_some_and(|state| state.is_loading()));
        reloading.push(Arc::downgrade(state));
    }

    #[cfg(test)]
    fn entry_count(&self) -> usize {
        self.loaded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .states
            .len()
    }
}

trait AnyLoader: Send + Sync {
    fn loading_count(&self) -> usize;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Loadable> AnyLoader for Loader<T> {
    fn loading_count(&self) -> usize {
        let loading = {
            let loaded = self.loaded.lock().unwrap_or_else(|e| e.into_inner());
            loaded
                .states
                .values()
                .filter_map(Weak::upgrade)
                .filter(|state| state.is_loading())
                .count()
        };
        let reloading = self.reloading.lock().unwrap_or_else(|e| e.into_inner());
        loading
            + reloading
                .iter()
                .filter_map(Weak::upgrade)
                .filter(|state| state.is_loading())
                .count()
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

struct LoaderMetrics {
    loaded: CounterHandle,
    failed: CounterHandle,
    read_time: HistogramHandle,
}

impl LoaderMetrics {
    fn register(registry: &MetricsRegistry) -> Result<Self> {
        Ok(Self {
            loaded: registry.register_counter(
                "assets",
                "loaded_total",
                "Assets that finished loading",
            )?,
            failed: registry.register_counter(
                "assets",
                "failed_total",
                "Assets that failed to load",
            )?,
            read_time: registry.register_histogram(
                "assets",
                "read_time",
                "Time spent reading an asset on a worker thread",
                "ms",
                vec![1.0, 5.0, 10.0, 50.0, 100.0, 500.0],
            )?,
        })
    }
}

/// State shared between the loader, its handles, its jobs and its workers.
pub(crate) struct LoaderInner {
    store: Arc<dyn AssetStore>,
    device: DevicePtr,
    loaders: Mutex<AHashMap<TypeId, Arc<dyn AnyLoader>>>,
    pool: AssetLoadingThreadPool,
    metrics: LoaderMetrics,
    owner: ThreadId,
}

impl LoaderInner {
    pub(crate) fn store(&self) -> &Arc<dyn AssetStore> {
        &self.store
    }

    pub(crate) fn read_time(&self) -> &HistogramHandle {
        &self.metrics.read_time
    }

    pub(crate) fn record_completion(&self, succeeded: bool) {
        let counter = if succeeded {
            &self.metrics.loaded
        } else {
            &self.metrics.failed
        };
        if let Err(e) = counter.increment() {
            log::warn!("Failed to update {}: {}", counter.id(), e);
        }
    }

    /// The loader for `T`, created on first use.
    pub(crate) fn loader<T: Loadable>(&self) -> Arc<Loader<T>> {
        let mut loaders = self.loaders.lock().unwrap_or_else(|e| e.into_inner());
        let entry = loaders
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Arc::new(Loader::<T>::new()) as Arc<dyn AnyLoader>)
            .clone();
        drop(loaders);

        // The map is keyed by `TypeId::of::<T>()`, so the entry is a `Loader<T>`.
        match entry.into_any().downcast::<Loader<T>>() {
            Ok(loader) => loader,
            Err(_) => unreachable!("loader registered under the wrong type"),
        }
    }

    fn loading_count(&self) -> usize {
        let loaders = self.loaders.lock().unwrap_or_else(|e| e.into_inner());
        loaders.values().map(|loader| loader.loading_count()).sum()
    }

    pub(crate) fn load_async<T: Loadable>(self: &Arc<Self>, id: AssetId) -> AssetPtr<T> {
        if !id.is_valid() {
            return AssetPtr::new();
        }
        let weak = Arc::downgrade(self);
        let (state, created) = self.loader::<T>().find_ptr(id, &weak);
        if created {
            log::trace!("Queued asset {} ({})", id, std::any::type_name::<T>());
            self.pool
                .enqueue(Box::new(AssetJob::new(state.clone(), None, weak)));
        }
        AssetPtr::from_state(state)
    }

    pub(crate) fn reload_async<T: Loadable>(self: &Arc<Self>, ptr: &AssetPtr<T>) -> AssetPtr<T> {
        let Some(previous) = ptr.state() else {
            return AssetPtr::new();
        };
        let weak = Arc::downgrade(self);
        let state = Arc::new(AssetState::new(ptr.id(), weak.clone()));
        self.loader::<T>().track_reload(&state);
        log::debug!("Reloading asset {}", ptr.id());
        self.pool.enqueue(Box::new(AssetJob::new(
            state.clone(),
            Some(previous.clone()),
            weak,
        )));
        AssetPtr::from_state(state)
    }

    pub(crate) fn reload<T: Loadable>(
        self: &Arc<Self>,
        ptr: &AssetPtr<T>,
    ) -> Result<(), AssetLoadingError> {
        let reloaded = self.reload_async(ptr);
        match reloaded.state() {
            Some(state) => self.wait_for(state.as_ref()),
            None => return Err(AssetLoadingError::InvalidId),
        }
        reloaded.error().map_or(Ok(()), Err)
    }

    pub(crate) fn wait_for(&self, state: &dyn DependencyState) {
        let can_finalize = thread::current().id() == self.owner;
        self.pool.wait_until(
            || state.status().is_terminal(),
            &self.device,
            can_finalize,
        );
    }
}

/// Loads assets from an [`AssetStore`] and finalizes them against a
/// graphics device.
///
/// The thread that creates the loader owns the device: blocking calls made
/// on it finalize pending assets themselves. Other threads may request and
/// wait for assets, but something on the owning thread has to call
/// [`process_pending`](AssetLoader::process_pending) for them to complete.
///
/// # Panics
///
/// Dropping the loader while an asset is still loading panics.
pub struct AssetLoader {
    inner: Arc<LoaderInner>,
}

impl AssetLoader {
    /// Creates a loader and starts its worker threads.
    pub fn new(
        store: Arc<dyn AssetStore>,
        device: DevicePtr,
        config: &AssetLoaderConfig,
        metrics: &MetricsRegistry,
    ) -> Result<Self> {
        let inner = LoaderInner {
            store,
            device,
            loaders: Mutex::new(AHashMap::new()),
            pool: AssetLoadingThreadPool::new(config)?,
            metrics: LoaderMetrics::register(metrics)?,
            owner: thread::current().id(),
        };
        log::info!(
            "Asset loader created on device '{}' with {} worker(s)",
            inner.device.label(),
            inner.pool.worker_count()
        );
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Creates a loader on a headless device with the default configuration.
    pub fn with_defaults(store: Arc<dyn AssetStore>) -> Result<Self> {
        Self::new(
            store,
            HeadlessDevice::shared(),
            &AssetLoaderConfig::default(),
            &MetricsRegistry::new(),
        )
    }

    /// The store assets are read from.
    pub fn store(&self) -> &Arc<dyn AssetStore> {
        &self.inner.store
    }

    /// The device assets are finalized against.
    pub fn device(&self) -> &DevicePtr {
        &self.inner.device
    }

    /// Requests an asset without waiting for it.
    ///
    /// While a handle to `id` is alive every request returns a handle to the
    /// same state. An invalid id yields an empty handle.
    pub fn load_async<T: Loadable>(&self, id: AssetId) -> AssetPtr<T> {
        self.inner.load_async(id)
    }

    /// Requests an asset and waits until it is loaded or failed.
    pub fn load<T: Loadable>(&self, id: AssetId) -> AssetPtr<T> {
        let ptr = self.load_async(id);
        self.wait_until_loaded(&ptr);
        ptr
    }

    /// Like [`load`](Self::load), but turns a failure into an error.
    pub fn load_res<T: Loadable>(&self, id: AssetId) -> Result<AssetPtr<T>, AssetLoadingError> {
        let ptr = self.load(id);
        if ptr.is_empty() {
            return Err(AssetLoadingError::InvalidId);
        }
        match ptr.error() {
            Some(e) => Err(e),
            None => Ok(ptr),
        }
    }

    /// Requests an asset by its store name without waiting for it.
    pub fn load_by_name_async<T: Loadable>(
        &self,
        name: &str,
    ) -> Result<AssetPtr<T>, AssetLoadingError> {
        let id = self.inner.store.id(name).ok_or_else(|| {
            log::error!("Unable to load {}: unknown asset name", name);
            AssetLoadingError::UnknownId
        })?;
        Ok(self.load_async(id))
    }

    /// Requests an asset by its store name and waits for it.
    pub fn load_by_name<T: Loadable>(&self, name: &str) -> Result<AssetPtr<T>, AssetLoadingError> {
        let ptr = self.load_by_name_async(name)?;
        self.wait_until_loaded(&ptr);
        Ok(ptr)
    }

    /// Loads `ptr`'s asset again from the store and waits for the result.
    ///
    /// On success the new version is what later requests for the id return,
    /// and existing handles pick it up through
    /// [`AssetPtr::flush_reload`]. On failure the previous version stays in
    /// place and the error is returned.
    pub fn reload<T: Loadable>(&self, ptr: &AssetPtr<T>) -> Result<(), AssetLoadingError> {
        self.inner.reload(ptr)
    }

    /// Starts a reload without waiting for it.
    ///
    /// The returned handle tracks the new version; it is only installed once
    /// it loads successfully.
    pub fn reload_async<T: Loadable>(&self, ptr: &AssetPtr<T>) -> AssetPtr<T> {
        self.inner.reload_async(ptr)
    }

    /// Blocks until `ptr` is loaded or failed. Returns at once for empty handles.
    pub fn wait_until_loaded<T: Loadable>(&self, ptr: &AssetPtr<T>) {
        if let Some(state) = ptr.state() {
            self.inner.wait_for(state.as_ref());
        }
    }

    /// Finalizes every asset whose read and dependencies are done.
    ///
    /// Call this regularly from the thread that owns the device. Returns the
    /// number of assets that settled.
    pub fn process_pending(&self) -> usize {
        self.inner.pool.process_pending(&self.inner.device)
    }

    /// Number of assets still queued for reading or finalization.
    pub fn pending_jobs(&self) -> usize {
        self.inner.pool.pending_jobs()
    }
}

impl std::fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoader")
            .field("device", &self.inner.device.label())
            .field("workers", &self.inner.pool.worker_count())
            .field("pending_jobs", &self.pending_jobs())
            .finish()
    }
}

impl Drop for AssetLoader {
    fn drop(&mut self) {
        self.inner.pool.shutdown();

        let loading = self.inner.loading_count();
        if loading > 0 && !thread::panicking() {
            panic!("Asset is still loading: {loading} asset(s) outlived their loader");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use ardent_core::asset::Asset;

    use super::*;
    use crate::{AssetDecodeError, AssetLoadingContext};

    struct Blob;
    impl Asset for Blob {}

    impl Loadable for Blob {
        type Intermediate = ();

        fn read(
            _reader: &mut dyn Read,
            _ctx: &mut AssetLoadingContext<'_>,
        ) -> Result<(), AssetDecodeError> {
            Ok(())
        }

        fn finalize(_device: &DevicePtr, _intermediate: ()) -> Result<Self, AssetDecodeError> {
            Ok(Blob)
        }
    }

    #[test]
    fn test_released_entries_are_swept_in_batches() {
        // --- 1. SETUP ---
        let loader = Loader::<Blob>::new();
        let owner = Weak::new();

        // --- 2. ACTION ---
        // Every state is dropped right away, leaving a dead entry behind.
        for i in 0..1000 {
            let (state, created) = loader.find_ptr(AssetId::new_v5(&format!("blob_{i}")), &owner);
            assert!(created);
            drop(state);
        }

        // --- 3. ASSERTIONS ---
        assert!(loader.entry_count() <= MIN_PRUNE_AT);
    }

    #[test]
    fn test_live_entries_survive_a_sweep() {
        // --- 1. SETUP ---
        let loader = Loader::<Blob>::new();
        let owner = Weak::new();
        let kept_id = AssetId::new_v5("kept");
        let (kept, _) = loader.find_ptr(kept_id, &owner);

        // --- 2. ACTION ---
        for i in 0..(MIN_PRUNE_AT * 3) {
            drop(loader.find_ptr(AssetId::new_v5(&format!("blob_{i}")), &owner));
        }
        let (again, created) = loader.find_ptr(kept_id, &owner);

        // --- 3. ASSERTIONS ---
        assert!(!created);
        assert!(Arc::ptr_eq(&kept, &again));
    }
}

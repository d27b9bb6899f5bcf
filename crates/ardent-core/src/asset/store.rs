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

//! The byte-stream provider the asset pipeline reads from.

use super::AssetId;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::{Arc, RwLock};

/// A boxed reader over one asset's stored bytes.
pub type ByteReader = Box<dyn Read + Send>;

/// An opaque provider of named, persisted asset bytes.
///
/// The loader never interprets the storage layout; it only asks for a
/// reader over the bytes of an id. Implementations must be usable from the
/// loader's worker threads.
pub trait AssetStore: Send + Sync {
    /// Resolves a name to the id it is stored under.
    fn id(&self, name: &str) -> Option<AssetId>;

    /// Resolves an id back to its display name.
    fn name(&self, id: AssetId) -> Option<String>;

    /// Opens a reader over the bytes stored for `id`.
    fn data(&self, id: AssetId) -> Option<ByteReader>;
}

#[derive(Debug, Default)]
struct MemoryEntries {
    names: HashMap<String, AssetId>,
    entries: HashMap<AssetId, (String, Arc<[u8]>)>,
}

/// An [`AssetStore`] holding every asset in memory.
///
/// Used by tests and tools. Ids are derived from names with
/// [`AssetId::new_v5`], and entries can be replaced at runtime, which is what
/// reloading relies on.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    inner: RwLock<MemoryEntries>,
}

impl MemoryAssetStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the bytes stored under `name` and returns its id.
    pub fn insert(&self, name: &str, bytes: impl Into<Vec<u8>>) -> AssetId {
        let id = AssetId::new_v5(name);
        let bytes: Arc<[u8]> = bytes.into().into();
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.names.insert(name.to_string(), id);
        inner.entries.insert(id, (name.to_string(), bytes));
        id
    }

    /// Removes an entry. Returns `true` if it existed.
    pub fn remove(&self, id: AssetId) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        match inner.entries.remove(&id) {
            Some((name, _)) => {
                inner.names.remove(&name);
                true
            }
            None => false,
        }
    }

    /// Returns the number of stored assets.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len()
    }

    /// Returns `true` if the store holds no asset.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssetStore for MemoryAssetStore {
    fn id(&self, name: &str) -> Option<AssetId> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.names.get(name).copied()
    }

    fn name(&self, id: AssetId) -> Option<String> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.entries.get(&id).map(|(name, _)| name.clone())
    }

    fn data(&self, id: AssetId) -> Option<ByteReader> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let (_, bytes) = inner.entries.get(&id)?;
        Some(Box::new(Cursor::new(bytes.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_read_back() {
        let store = MemoryAssetStore::new();
        let id = store.insert("textures/grass", vec![1, 2, 3]);

        assert_eq!(store.id("textures/grass"), Some(id));
        assert_eq!(store.name(id).as_deref(), Some("textures/grass"));

        let mut bytes = Vec::new();
        store.data(id).unwrap().read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_entries() {
        let store = MemoryAssetStore::new();
        assert!(store.id("nope").is_none());
        assert!(store.data(AssetId::new()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_replace_keeps_id() {
        let store = MemoryAssetStore::new();
        let a = store.insert("a", vec![0]);
        let b = store.insert("a", vec![1]);
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert!(store.remove(a));
        assert!(store.id("a").is_none());
    }
}

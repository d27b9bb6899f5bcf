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

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{bail, Result};
use ardent_core::asset::{AssetId, AssetStore, ByteReader};
use walkdir::WalkDir;

#[derive(Default)]
struct FolderIndex {
    ids: HashMap<String, AssetId>,
    entries: HashMap<AssetId, (String, PathBuf)>,
}

/// An [`AssetStore`] over the files of a directory tree.
///
/// Every regular file is an asset named by its path relative to the root,
/// with `/` separators. Ids are derived from names, so they are stable
/// across runs and machines.
pub struct FolderAssetStore {
    root: PathBuf,
    index: RwLock<FolderIndex>,
}

impl FolderAssetStore {
    /// Indexes the files under `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            bail!("Asset folder '{}' is not a directory", root.display());
        }
        let store = Self {
            root,
            index: RwLock::new(FolderIndex::default()),
        };
        store.rescan();
        Ok(store)
    }

    /// The indexed directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Re-indexes the directory, picking up added and removed files.
    /// Returns the number of assets found.
    pub fn rescan(&self) -> usize {
        let mut index = FolderIndex::default();
        for entry in WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let id = AssetId::new_v5(&name);
            index.ids.insert(name.clone(), id);
            index.entries.insert(id, (name, entry.into_path()));
        }

        let count = index.entries.len();
        log::debug!("Indexed {} asset(s) under '{}'", count, self.root.display());
        *self.index.write().unwrap_or_else(|e| e.into_inner()) = index;
        count
    }

    /// Number of indexed assets.
    pub fn len(&self) -> usize {
        self.index.read().map_or(0, |index| index.entries.len())
    }

    /// Whether the folder holds no assets.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssetStore for FolderAssetStore {
    fn id(&self, name: &str) -> Option<AssetId> {
        self.index.read().ok()?.ids.get(name).copied()
    }

    fn name(&self, id: AssetId) -> Option<String> {
        let index = self.index.read().ok()?;
        index.entries.get(&id).map(|(name, _)| name.clone())
    }

    fn data(&self, id: AssetId) -> Option<ByteReader> {
        let path = {
            let index = self.index.read().ok()?;
            index.entries.get(&id)?.1.clone()
        };
        match File::open(&path) {
            Ok(file) => Some(Box::new(BufReader::new(file))),
            Err(e) => {
                log::warn!("Failed to open '{}': {}", path.display(), e);
                None
            }
        }
    }
}

impl std::fmt::Debug for FolderAssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderAssetStore")
            .field("root", &self.root)
            .field("assets", &self.len())
            .finish()
    }
}

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

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A globally unique, persistent identifier for a logical asset.
///
/// The id represents the "idea" of an asset, decoupled from where its bytes
/// live. Stores map names to ids and ids to byte streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(Uuid);

impl AssetId {
    /// Creates a new, random (version 4) `AssetId`.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a stable (version 5) id derived from an asset name.
    ///
    /// The same name always yields the same id, which lets stores assign ids
    /// without keeping a persistent table.
    pub fn new_v5(name: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }

    /// The sentinel id that never refers to a stored asset.
    pub const fn invalid_id() -> Self {
        Self(Uuid::nil())
    }

    /// Returns `true` unless this is [`AssetId::invalid_id`].
    pub fn is_valid(&self) -> bool {
        !self.0.is_nil()
    }

    /// Returns the underlying uuid.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AssetId {
    /// Defaults to [`AssetId::invalid_id`], so an unset handle never loads anything.
    fn default() -> Self {
        Self::invalid_id()
    }
}

impl From<Uuid> for AssetId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v5_ids_are_stable() {
        assert_eq!(AssetId::new_v5("meshes/cube"), AssetId::new_v5("meshes/cube"));
        assert_ne!(AssetId::new_v5("meshes/cube"), AssetId::new_v5("meshes/sphere"));
    }

    #[test]
    fn test_default_is_invalid() {
        assert!(!AssetId::default().is_valid());
        assert!(AssetId::new().is_valid());
    }
}

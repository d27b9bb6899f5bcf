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

//! Serializable snapshots of an entity's components.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while capturing or instantiating a prefab.
#[derive(Debug, Error)]
pub enum PrefabError {
    /// A component value could not be encoded.
    #[error("failed to serialize component `{type_name}`: {message}")]
    Serialize {
        /// Short name of the component type.
        type_name: String,
        /// Encoder message.
        message: String,
    },
    /// A component value could not be decoded.
    #[error("failed to deserialize component `{type_name}`: {message}")]
    Deserialize {
        /// Short name of the component type.
        type_name: String,
        /// Decoder message.
        message: String,
    },
    /// The prefab document itself is malformed.
    #[error("invalid prefab document: {0}")]
    InvalidFormat(String),
}

/// One component of a prefab: the registered type name and its RON encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentPrefab {
    /// Name the component type was registered under.
    pub type_name: String,
    /// RON text of the component value.
    pub data: String,
}

/// A stored component set that can be stamped onto new entities.
///
/// Built by [`World::create_prefab`](crate::ecs::World::create_prefab) and
/// consumed by
/// [`World::create_entity_from_prefab`](crate::ecs::World::create_entity_from_prefab).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPrefab {
    components: Vec<ComponentPrefab>,
}

impl EntityPrefab {
    /// Creates an empty prefab.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an encoded component.
    pub fn push(&mut self, component: ComponentPrefab) {
        self.components.push(component);
    }

    /// The encoded components.
    pub fn components(&self) -> &[ComponentPrefab] {
        &self.components
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if the prefab carries no component.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Encodes the whole prefab as pretty RON.
    pub fn to_ron(&self) -> Result<String, PrefabError> {
        let pretty_config = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        ron::ser::to_string_pretty(self, pretty_config)
            .map_err(|e| PrefabError::InvalidFormat(e.to_string()))
    }

    /// Decodes a prefab written by [`Self::to_ron`].
    pub fn from_ron(text: &str) -> Result<Self, PrefabError> {
        ron::de::from_str(text).map_err(|e| PrefabError::InvalidFormat(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefab_document_round_trip() {
        let mut prefab = EntityPrefab::new();
        prefab.push(ComponentPrefab {
            type_name: "Position".to_string(),
            data: "(x: 1.0, y: 2.0)".to_string(),
        });

        let text = prefab.to_ron().unwrap();
        assert_eq!(EntityPrefab::from_ron(&text).unwrap(), prefab);
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        let err = EntityPrefab::from_ron("not a prefab").unwrap_err();
        assert!(matches!(err, PrefabError::InvalidFormat(_)));
    }
}

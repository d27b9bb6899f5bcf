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

//! Engine configuration.
//!
//! Every section is deserialized with `#[serde(default)]` so a partial file
//! (or none at all) still yields a complete configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Root of the `ardent.toml` configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Asset loader settings.
    pub assets: AssetLoaderConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse engine configuration")
    }

    /// Loads a configuration file, falling back to the defaults when the
    /// file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!(
                "No configuration at '{}', using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("In '{}'", path.display()))
    }
}

/// Settings of the asset loading thread pool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssetLoaderConfig {
    /// Number of background reader threads. `0` means reads run on the
    /// thread that waits for or polls the loader.
    pub worker_threads: usize,
    /// Name given to the worker threads (suffixed with their index).
    pub thread_name: String,
}

impl Default for AssetLoaderConfig {
    fn default() -> Self {
        Self {
            worker_threads: 1,
            thread_name: "asset-loader".to_string(),
        }
    }
}

/// Settings of the logger installed by `ardent-telemetry`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level filter, overridable with `RUST_LOG`.
    pub level: String,
    /// Per-module level overrides, e.g. `ardent_io = "debug"`.
    pub filters: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            filters: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.assets.worker_threads, 1);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_sections() {
        let config = EngineConfig::from_toml_str(
            r#"
            [assets]
            worker_threads = 4

            [logging.filters]
            ardent_io = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.assets.worker_threads, 4);
        assert_eq!(config.assets.thread_name, "asset-loader");
        assert_eq!(
            config.logging.filters.get("ardent_io").map(String::as_str),
            Some("debug")
        );
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(EngineConfig::from_toml_str("[assets\nworker_threads = ").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = EngineConfig::load("/definitely/not/here/ardent.toml").unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}

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

//! Installs the global `env_logger` logger.

use ardent_core::config::LoggingConfig;
use env_logger::{Builder, Env, DEFAULT_FILTER_ENV};
use log::LevelFilter;

/// Installs `env_logger` as the global logger.
///
/// When `RUST_LOG` is set it decides all filtering and the configuration is
/// ignored. Otherwise `config.level` is the default and the per-module
/// filters from the configuration apply on top; unparsable levels are
/// reported and ignored. Returns `false` if a logger was already installed,
/// which makes the call safe to repeat (tests, embedded use).
pub fn init_logging(config: &LoggingConfig) -> bool {
    let env_set = std::env::var_os(DEFAULT_FILTER_ENV).is_some();
    let mut builder = Builder::from_env(Env::default().default_filter_or(config.level.as_str()));

    let filters = ModuleFilters::from_config(config, env_set);
    for &(module, level) in &filters.accepted {
        builder.filter_module(module, level);
    }

    let installed = builder.try_init().is_ok();
    for (module, level) in filters.rejected {
        log::warn!("Ignoring log filter '{}' for module '{}'", level, module);
    }
    installed
}

/// The configured per-module filters, split by whether their level parses.
#[derive(Debug, Default, PartialEq)]
struct ModuleFilters<'a> {
    accepted: Vec<(&'a str, LevelFilter)>,
    rejected: Vec<(&'a str, &'a str)>,
}

impl<'a> ModuleFilters<'a> {
    /// Empty when the environment filter is set.
    fn from_config(config: &'a LoggingConfig, env_set: bool) -> Self {
        let mut filters = Self::default();
        if env_set {
            return filters;
        }
        for (module, level) in &config.filters {
            match level.parse::<LevelFilter>() {
                Ok(parsed) => filters.accepted.push((module.as_str(), parsed)),
                Err(_) => filters.rejected.push((module.as_str(), level.as_str())),
            }
        }
        filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_a_no_op() {
        let mut config = LoggingConfig::default();
        config
            .filters
            .insert("ardent_io".to_string(), "not-a-level".to_string());

        init_logging(&config);
        assert!(!init_logging(&config), "A logger is already installed");
    }

    fn config_with_filters() -> LoggingConfig {
        let mut config = LoggingConfig::default();
        config
            .filters
            .insert("ardent_io".to_string(), "debug".to_string());
        config
            .filters
            .insert("ardent_data".to_string(), "loud".to_string());
        config
    }

    #[test]
    fn test_configured_filters_apply_without_env() {
        let config = config_with_filters();

        let filters = ModuleFilters::from_config(&config, false);

        assert_eq!(filters.accepted, vec![("ardent_io", LevelFilter::Debug)]);
        assert_eq!(filters.rejected, vec![("ardent_data", "loud")]);
    }

    #[test]
    fn test_env_filter_overrides_configured_filters() {
        let config = config_with_filters();

        let filters = ModuleFilters::from_config(&config, true);

        assert_eq!(filters, ModuleFilters::default());
    }
}

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

//! Logger initialisation on top of `env_logger`.

use env_logger::{Builder, Env};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// How the global logger is set up.
///
/// `RUST_LOG` still wins over `default_filter` when it is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset (e.g. `"info"` or `"prism_lanes=debug"`).
    pub default_filter: String,
    /// Per-module levels applied on top of the default filter.
    pub module_filters: BTreeMap<String, String>,
    /// Whether records carry a millisecond timestamp.
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_owned(),
            module_filters: BTreeMap::new(),
            timestamps: true,
        }
    }
}

impl LoggingConfig {
    /// Adds a per-module level.
    pub fn with_module_filter(mut self, module: impl Into<String>, level: LevelFilter) -> Self {
        self.module_filters.insert(module.into(), level.to_string());
        self
    }

    /// Splits the module filters into parsed levels and the entries whose
    /// level is not a valid `log` level.
    fn parsed_module_filters(&self) -> (Vec<(&str, LevelFilter)>, Vec<&str>) {
        let mut parsed = Vec::new();
        let mut rejected = Vec::new();
        for (module, level) in &self.module_filters {
            match LevelFilter::from_str(level) {
                Ok(level) => parsed.push((module.as_str(), level)),
                Err(_) => rejected.push(module.as_str()),
            }
        }
        (parsed, rejected)
    }
}

/// Installs the global logger described by `config`.
///
/// Returns `false` when a logger was already installed, in which case the
/// call has no effect.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let mut builder = Builder::from_env(Env::default().default_filter_or(config.default_filter.as_str()));

    let (filters, rejected) = config.parsed_module_filters();
    for (module, level) in filters {
        builder.filter_module(module, level);
    }

    if config.timestamps {
        builder.format_timestamp_millis();
    } else {
        builder.format_timestamp(None);
    }

    let installed = builder.try_init().is_ok();
    if installed {
        log::debug!("Logging initialized (default filter '{}')", config.default_filter);
    }
    for module in rejected {
        log::warn!(
            "Ignoring log filter for '{}': '{}' is not a log level",
            module,
            config.module_filters[module]
        );
    }
    installed
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ConfigError;
use crate::schedulers::TaskSchedulerType;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Configuration for a wiring model and the task schedulers it builds.
///
/// Scheduler entries are keyed by scheduler name and override whatever the code's
/// builder asked for, so an operator can retune a pipeline without a rebuild.
///
/// # Example
/// ```yaml
/// worker_threads: 4
/// schedulers:
///   event_hasher:
///     type: concurrent
///     capacity: 500
///     unhandled_task_metric: true
///   state_signer:
///     type: sequential
///     capacity: 10
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WiringConfig {
    /// Worker threads for the default pool built by the demo binary.
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default)]
    pub schedulers: HashMap<String, SchedulerConfig>,
}

impl WiringConfig {
    /// Override entry for the named scheduler, if any.
    pub fn scheduler(&self, name: &str) -> Option<&SchedulerConfig> {
        self.schedulers.get(name)
    }
}

/// Per-scheduler overrides. Every field is optional; absent fields keep the value the
/// builder was given in code.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SchedulerConfig {
    #[serde(rename = "type", default)]
    pub scheduler_type: Option<TaskSchedulerType>,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub unhandled_task_metric: Option<bool>,
}

/// Load a config from a YAML (`.yaml`, `.yml`) or TOML (`.toml`) file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<WiringConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let cfg = match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content)?,
        "toml" => toml::from_str(&content)?,
        other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
    };
    Ok(cfg)
}

/// Load a config and check it against the wiring rules.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<WiringConfig, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_config(&cfg).map_err(ConfigError::Validation)?;
    Ok(cfg)
}

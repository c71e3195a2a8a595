// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for loading and validating wiring configuration files.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a [`WiringConfig`](crate::config::WiringConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML for the wiring configuration schema.
    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The file is not valid TOML for the wiring configuration schema.
    #[error("Invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// The file extension does not map to a supported format.
    #[error("Unsupported configuration format '{0}', expected .yaml, .yml or .toml")]
    UnsupportedFormat(String),

    /// The configuration parsed but violates a wiring rule.
    #[error("Configuration validation failed:\n{}", .0.join("\n"))]
    Validation(Vec<String>),
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod wiring;

pub use config::ConfigError;
pub use wiring::WiringError;

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Configuration file loaded by the demo binary when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "configs/wiring.yaml";

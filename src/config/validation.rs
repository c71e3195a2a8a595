// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Validation of wiring configuration files.
//!
//! The checks accumulate, so an operator sees every problem in a file at once:
//!
//! 1. The worker thread count, when given, is non-zero
//! 2. Every scheduler entry has a legal name (`[A-Za-z0-9_]+`)
//! 3. Every configured capacity is positive
//! 4. Direct schedulers are not given a capacity (they never queue)

use crate::config::WiringConfig;
use crate::schedulers::TaskSchedulerType;

/// True if `name` is non-empty and contains only ASCII alphanumerics and underscores.
pub fn is_legal_scheduler_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate a configuration, returning every violation found.
pub fn validate_config(config: &WiringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.worker_threads == Some(0) {
        errors.push("worker_threads must be greater than zero".to_string());
    }

    let mut names: Vec<&String> = config.schedulers.keys().collect();
    names.sort();

    for name in names {
        let scheduler = &config.schedulers[name];
        if !is_legal_scheduler_name(name) {
            errors.push(format!(
                "Scheduler name '{}' is illegal: only alphanumeric characters and underscores are allowed",
                name
            ));
        }
        if let Some(capacity) = scheduler.capacity {
            if capacity <= 0 {
                errors.push(format!(
                    "Scheduler '{}' has capacity {}, capacity must be greater than zero",
                    name, capacity
                ));
            }
            if scheduler.scheduler_type.is_some_and(TaskSchedulerType::is_direct) {
                errors.push(format!(
                    "Scheduler '{}' is a direct scheduler and cannot have a capacity",
                    name
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

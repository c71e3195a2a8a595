// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by the wiring model, its schedulers and its wires.
//!
//! Configuration mistakes (bad names, bad capacities, double binding, changes to a
//! started model) are reported when the offending call is made. Static-analysis
//! findings are *not* errors; see [`WiringModel`](crate::model::WiringModel).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WiringError {
    /// Scheduler names must be non-empty and contain only `[A-Za-z0-9_]`.
    #[error("Illegal task scheduler name '{0}': only alphanumeric characters and underscores are allowed")]
    InvalidSchedulerName(String),

    #[error("A task scheduler named '{0}' already exists in this wiring model")]
    DuplicateScheduler(String),

    #[error("Capacity of '{name}' must be greater than zero, got {capacity}")]
    InvalidCapacity { name: String, capacity: i64 },

    #[error("Object counter name must not be empty")]
    InvalidCounterName,

    #[error("Task scheduler '{scheduler}' already has an input wire labelled '{label}'")]
    DuplicateInputWire { scheduler: String, label: String },

    /// An input wire can be bound to exactly one handler.
    #[error("Input wire '{scheduler}.{label}' is already bound to a handler")]
    AlreadyBound { scheduler: String, label: String },

    /// Data was pushed into an input wire that has no handler.
    #[error("Input wire '{scheduler}.{label}' is not bound to a handler")]
    UnboundInputWire { scheduler: String, label: String },

    /// The topology is frozen once the model has been started.
    #[error("The wiring model has already been started")]
    ModelAlreadyStarted,

    #[error("Task scheduler '{0}' has been stopped and no longer accepts work")]
    SchedulerStopped(String),

    #[error("Invalid configuration for task scheduler '{scheduler}': {reason}")]
    InvalidConfiguration { scheduler: String, reason: String },

    /// A bound handler returned an error.
    #[error("Handler for input wire '{scheduler}.{input}' failed: {error:#}")]
    HandlerFailed {
        scheduler: String,
        input: String,
        error: anyhow::Error,
    },
}

impl WiringError {
    /// True for errors raised by user handlers rather than by the wiring itself.
    pub fn is_handler_failure(&self) -> bool {
        matches!(self, WiringError::HandlerFailed { .. })
    }
}

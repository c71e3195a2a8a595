// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for task scheduler lifecycle and task execution.
//!
//! This module contains message types for logging events related to:
//! * Worker start and stop
//! * Task execution, handler failures and panics on queued schedulers

use crate::errors::WiringError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A queued task's handler returned an error; the task was dropped.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use wiring_core::errors::WiringError;
/// use wiring_core::observability::messages::scheduler::TaskFailed;
///
/// let error = WiringError::HandlerFailed {
///     scheduler: "event_hasher".to_string(),
///     input: "events".to_string(),
///     error: anyhow::anyhow!("boom"),
/// };
/// let msg = TaskFailed {
///     scheduler: "event_hasher",
///     input: "events",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct TaskFailed<'a> {
    pub scheduler: &'a str,
    pub input: &'a str,
    pub error: &'a WiringError,
}

impl Display for TaskFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task on '{}' from input '{}' failed and was dropped: {}",
            self.scheduler, self.input, self.error
        )
    }
}

impl StructuredLog for TaskFailed<'_> {
    fn log(&self) {
        tracing::error!(
            scheduler = self.scheduler,
            input = self.input,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "task_failed",
            span_name = name,
            scheduler = self.scheduler,
            input = self.input,
        )
    }
}

/// A queued task's handler panicked; the worker survived and the task was dropped.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct TaskPanicked<'a> {
    pub scheduler: &'a str,
    pub input: &'a str,
    pub message: &'a str,
}

impl Display for TaskPanicked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task on '{}' from input '{}' panicked and was dropped: {}",
            self.scheduler, self.input, self.message
        )
    }
}

impl StructuredLog for TaskPanicked<'_> {
    fn log(&self) {
        tracing::error!(
            scheduler = self.scheduler,
            input = self.input,
            panic = self.message,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "task_panicked",
            span_name = name,
            scheduler = self.scheduler,
            input = self.input,
        )
    }
}

/// A scheduler's worker loop started.
///
/// # Log Level
/// `debug!` - Detailed lifecycle information
pub struct SchedulerStarted<'a> {
    pub scheduler: &'a str,
    pub scheduler_type: &'a str,
    pub capacity: Option<i64>,
}

impl Display for SchedulerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.capacity {
            Some(capacity) => write!(
                f,
                "Task scheduler '{}' started ({}, capacity {})",
                self.scheduler, self.scheduler_type, capacity
            ),
            None => write!(
                f,
                "Task scheduler '{}' started ({}, unbounded)",
                self.scheduler, self.scheduler_type
            ),
        }
    }
}

impl StructuredLog for SchedulerStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            scheduler = self.scheduler,
            scheduler_type = self.scheduler_type,
            capacity = ?self.capacity,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "scheduler_started",
            span_name = name,
            scheduler = self.scheduler,
            scheduler_type = self.scheduler_type,
        )
    }
}

/// A scheduler's worker loop exited after draining.
///
/// # Log Level
/// `debug!` - Detailed lifecycle information
pub struct SchedulerStopped<'a> {
    pub scheduler: &'a str,
}

impl Display for SchedulerStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Task scheduler '{}' stopped", self.scheduler)
    }
}

impl StructuredLog for SchedulerStopped<'_> {
    fn log(&self) {
        tracing::debug!(scheduler = self.scheduler, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("scheduler_stopped", span_name = name, scheduler = self.scheduler)
    }
}

/// A queued task is about to run. Its span wraps the handler call, so events the
/// handler emits carry the scheduler and input.
///
/// # Log Level
/// `trace!` - Per-task detail
pub struct TaskStarted<'a> {
    pub scheduler: &'a str,
    pub input: &'a str,
}

impl Display for TaskStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Task on '{}' from input '{}' started", self.scheduler, self.input)
    }
}

impl StructuredLog for TaskStarted<'_> {
    fn log(&self) {
        tracing::trace!(scheduler = self.scheduler, input = self.input, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "task",
            span_name = name,
            scheduler = self.scheduler,
            input = self.input,
        )
    }
}

/// Awaiting a scheduler's worker loop during stop returned a join error, meaning
/// the loop panicked or its pool was shut down underneath it.
///
/// # Log Level
/// `warn!` - Unexpected but recoverable
pub struct WorkerExitedUncleanly<'a> {
    pub scheduler: &'a str,
    pub error: &'a tokio::task::JoinError,
}

impl Display for WorkerExitedUncleanly<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task scheduler '{}' worker did not exit cleanly: {}",
            self.scheduler, self.error
        )
    }
}

impl StructuredLog for WorkerExitedUncleanly<'_> {
    fn log(&self) {
        tracing::warn!(scheduler = self.scheduler, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("worker_exited_uncleanly", span_name = name, scheduler = self.scheduler)
    }
}

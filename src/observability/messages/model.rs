// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for wiring model lifecycle and static analysis.
//!
//! This module contains message types for logging events related to:
//! * Cyclical backpressure detection
//! * Illegal direct scheduler usage
//! * Unbound input wires
//! * Model start and stop

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A cycle was found in the backpressure subgraph.
///
/// # Log Level
/// `error!` - Deadlock hazard; fails standard tests
///
/// # Example
/// ```
/// use wiring_core::observability::messages::model::CyclicalBackpressureDetected;
///
/// let cycle = vec!["a".to_string(), "b".to_string(), "a".to_string()];
/// let msg = CyclicalBackpressureDetected { cycle: &cycle };
///
/// assert_eq!(msg.to_string(), "Cyclical backpressure detected: a -> b -> a");
/// ```
pub struct CyclicalBackpressureDetected<'a> {
    pub cycle: &'a [String],
}

impl Display for CyclicalBackpressureDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cyclical backpressure detected: {}", self.cycle.join(" -> "))
    }
}

impl StructuredLog for CyclicalBackpressureDetected<'_> {
    fn log(&self) {
        tracing::error!(
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "cyclical_backpressure",
            span_name = name,
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
        )
    }
}

/// A direct scheduler is reachable from more than one calling context.
///
/// # Log Level
/// `error!` - Data race hazard; fails standard tests
pub struct IllegalDirectSchedulerUsage<'a> {
    pub scheduler: &'a str,
    pub calling_contexts: &'a [String],
}

impl Display for IllegalDirectSchedulerUsage<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Illegal direct scheduler usage: '{}' is called from {} independently scheduled contexts [{}]",
            self.scheduler,
            self.calling_contexts.len(),
            self.calling_contexts.join(", ")
        )
    }
}

impl StructuredLog for IllegalDirectSchedulerUsage<'_> {
    fn log(&self) {
        tracing::error!(
            scheduler = self.scheduler,
            calling_contexts = self.calling_contexts.join(", "),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "illegal_direct_usage",
            span_name = name,
            scheduler = self.scheduler,
        )
    }
}

/// An input wire has no handler bound to it.
///
/// # Log Level
/// `error!` - Data sent to the wire would be rejected; fails standard tests
pub struct UnboundInputWireDetected<'a> {
    pub scheduler: &'a str,
    pub label: &'a str,
}

impl Display for UnboundInputWireDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unbound input wire detected: '{}.{}' has no handler",
            self.scheduler, self.label
        )
    }
}

impl StructuredLog for UnboundInputWireDetected<'_> {
    fn log(&self) {
        tracing::error!(scheduler = self.scheduler, label = self.label, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "unbound_input_wire",
            span_name = name,
            scheduler = self.scheduler,
            label = self.label,
        )
    }
}

/// The model passed static analysis and its schedulers are starting.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ModelStarted {
    pub scheduler_count: usize,
    pub edge_count: usize,
    pub findings: usize,
}

impl Display for ModelStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Wiring model started: {} schedulers, {} edges, {} static analysis findings",
            self.scheduler_count, self.edge_count, self.findings
        )
    }
}

impl StructuredLog for ModelStarted {
    fn log(&self) {
        tracing::info!(
            scheduler_count = self.scheduler_count,
            edge_count = self.edge_count,
            findings = self.findings,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "model_started",
            span_name = name,
            scheduler_count = self.scheduler_count,
            edge_count = self.edge_count,
        )
    }
}

/// All schedulers drained and their workers were released.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ModelStopped {
    pub scheduler_count: usize,
    pub duration: std::time::Duration,
}

impl Display for ModelStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Wiring model stopped: {} schedulers drained in {:?}",
            self.scheduler_count, self.duration
        )
    }
}

impl StructuredLog for ModelStopped {
    fn log(&self) {
        tracing::info!(
            scheduler_count = self.scheduler_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "model_stopped",
            span_name = name,
            scheduler_count = self.scheduler_count,
            duration = ?self.duration,
        )
    }
}

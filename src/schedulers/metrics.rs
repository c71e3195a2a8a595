// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The metrics capability injected into a wiring model.
//!
//! The wiring core only reports gauges; aggregation and export belong to whatever
//! implements [`MetricsSink`].

use std::fmt::Debug;

/// Receives gauge samples from the wiring model.
pub trait MetricsSink: Send + Sync + Debug {
    fn record_gauge(&self, name: &str, value: i64);
}

/// Discards every sample.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpMetrics;

impl MetricsSink for NoOpMetrics {
    fn record_gauge(&self, _name: &str, _value: i64) {}
}

/// Gauge name for a scheduler's unhandled task count.
pub fn unhandled_task_count_metric(scheduler: &str) -> String {
    format!("{}_unhandled_task_count", scheduler)
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The wiring model: the registry of every scheduler, wire and edge in a
//! pipeline, the static analyses run over it, and the pipeline lifecycle.
//!
//! # Usage
//! ```no_run
//! use wiring_core::config::WiringConfig;
//! use wiring_core::model::WiringModel;
//! use wiring_core::schedulers::TaskSchedulerType;
//!
//! # async fn run() -> Result<(), wiring_core::errors::WiringError> {
//! let model = WiringModel::new(WiringConfig::default(), tokio::runtime::Handle::current());
//!
//! let doubler = model.create_scheduler::<u64>("doubler", TaskSchedulerType::Sequential, Some(2))?;
//! let printer = model.create_scheduler::<()>("printer", TaskSchedulerType::Concurrent, Some(10))?;
//!
//! let numbers = doubler.build_input_wire::<u64>("numbers")?;
//! numbers.bind(|n| async move { Ok(n * 2) })?;
//!
//! let doubled = printer.build_input_wire::<u64>("doubled")?;
//! doubled.bind_consumer(|n| async move {
//!     println!("{n}");
//!     Ok(())
//! })?;
//! doubler.output_wire().solder_to(&doubled)?;
//!
//! model.start()?;
//! numbers.put(21).await?;
//! model.stop().await;
//! # Ok(())
//! # }
//! ```

mod analysis;
mod diagram;
mod registry;

#[cfg(test)]
mod integration_tests;

pub use analysis::{find_backpressure_cycles, find_illegal_direct_usage, find_unbound_input_wires};
pub use diagram::{ModelEdgeSubstitution, ModelGroup, ModelManualLink};
pub use registry::{ModelEdge, ModelVertex};

pub(crate) use registry::{BindingStatus, ModelRegistry};

use crate::config::WiringConfig;
use crate::errors::WiringError;
use crate::observability::messages::model::{
    CyclicalBackpressureDetected, IllegalDirectSchedulerUsage, ModelStarted, ModelStopped,
    UnboundInputWireDetected,
};
use crate::observability::messages::StructuredLog;
use crate::schedulers::metrics::{unhandled_task_count_metric, MetricsSink, NoOpMetrics};
use crate::schedulers::{TaskScheduler, TaskSchedulerBuilder, TaskSchedulerType};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;

/// Owns the topology of one pipeline. Create one per process, build the graph,
/// call [`start`](WiringModel::start) once and [`stop`](WiringModel::stop) once.
#[derive(Debug)]
pub struct WiringModel {
    config: Arc<WiringConfig>,
    pool: Handle,
    registry: Arc<ModelRegistry>,
    metrics: Arc<dyn MetricsSink>,
}

impl WiringModel {
    /// `pool` is the default pool for queued schedulers.
    pub fn new(config: WiringConfig, pool: Handle) -> Self {
        Self {
            config: Arc::new(config),
            pool,
            registry: Arc::new(ModelRegistry::new()),
            metrics: Arc::new(NoOpMetrics),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &WiringConfig {
        &self.config
    }

    pub fn scheduler_builder<O: Clone + Send + 'static>(&self, name: &str) -> TaskSchedulerBuilder<O> {
        TaskSchedulerBuilder::new(name, self.registry.clone(), self.config.clone(), self.pool.clone())
    }

    /// Shorthand for the builder. `capacity` is ignored for direct schedulers.
    pub fn create_scheduler<O: Clone + Send + 'static>(
        &self,
        name: &str,
        scheduler_type: TaskSchedulerType,
        capacity: Option<i64>,
    ) -> Result<TaskScheduler<O>, WiringError> {
        let mut builder = self.scheduler_builder::<O>(name).with_type(scheduler_type);
        if let Some(capacity) = capacity.filter(|_| !scheduler_type.is_direct()) {
            builder = builder.with_unhandled_task_capacity(capacity);
        }
        builder.build()
    }

    /// Every soldered edge, in solder order.
    pub fn edges(&self) -> Vec<ModelEdge> {
        self.registry.edges()
    }

    /// Logs each cycle in the backpressure subgraph. True if there is one.
    pub fn check_for_cyclical_backpressure(&self) -> bool {
        self.log_backpressure_cycles() > 0
    }

    /// Logs each direct scheduler that can be entered from more than one calling
    /// context. True if there is one.
    pub fn check_for_illegal_direct_scheduler_usage(&self) -> bool {
        self.log_illegal_direct_usage() > 0
    }

    /// Logs each input wire that has no handler. True if there is one.
    pub fn check_for_unbound_input_wires(&self) -> bool {
        self.log_unbound_input_wires() > 0
    }

    /// Input wires without a handler, as `scheduler.label`.
    pub fn unbound_input_wires(&self) -> Vec<String> {
        find_unbound_input_wires(&self.registry.snapshot().unbound_input_wires)
    }

    /// Render the topology as a mermaid flowchart.
    pub fn generate_wiring_diagram(
        &self,
        groups: &[ModelGroup],
        substitutions: &[ModelEdgeSubstitution],
        manual_links: &[ModelManualLink],
    ) -> String {
        let snapshot = self.registry.snapshot();
        diagram::render(&snapshot.vertices, &snapshot.edges, groups, substitutions, manual_links)
    }

    /// Run the static analyses, freeze the topology and start every scheduler.
    ///
    /// Findings are logged, not returned; use the `check_for_*` methods to act on them.
    ///
    /// # Errors
    /// [`WiringError::ModelAlreadyStarted`] on a second call.
    pub fn start(&self) -> Result<(), WiringError> {
        if self.registry.is_frozen() {
            return Err(WiringError::ModelAlreadyStarted);
        }
        let findings = self.log_backpressure_cycles()
            + self.log_illegal_direct_usage()
            + self.log_unbound_input_wires();

        self.registry.freeze()?;
        let schedulers = self.registry.schedulers();
        for scheduler in &schedulers {
            scheduler.start();
        }

        ModelStarted {
            scheduler_count: schedulers.len(),
            edge_count: self.registry.edges().len(),
            findings,
        }
        .log();
        Ok(())
    }

    /// Drain every scheduler, then release its worker.
    ///
    /// Draining repeats until all schedulers are empty at once, so work forwarded
    /// into an already drained scheduler is drained too. Producers outside the model
    /// must have stopped submitting. A model that was never started discards its
    /// queued work.
    pub async fn stop(&self) {
        let begin = Instant::now();
        let schedulers = self.registry.schedulers();

        if self.registry.is_frozen() {
            loop {
                for scheduler in &schedulers {
                    scheduler.wait_until_empty().await;
                }
                if schedulers.iter().all(|scheduler| scheduler.unprocessed_task_count() == 0) {
                    break;
                }
            }
        }
        for scheduler in &schedulers {
            scheduler.stop().await;
        }

        ModelStopped {
            scheduler_count: schedulers.len(),
            duration: begin.elapsed(),
        }
        .log();
    }

    /// Record the unhandled task count of every scheduler that reports it.
    pub fn report_metrics(&self) {
        for scheduler in self.registry.schedulers() {
            if scheduler.reports_unhandled_task_metric() {
                self.metrics.record_gauge(
                    &unhandled_task_count_metric(scheduler.name()),
                    scheduler.unprocessed_task_count(),
                );
            }
        }
    }

    fn log_backpressure_cycles(&self) -> usize {
        let snapshot = self.registry.snapshot();
        let cycles = find_backpressure_cycles(&snapshot.vertices, &snapshot.edges);
        for cycle in &cycles {
            CyclicalBackpressureDetected { cycle }.log();
        }
        cycles.len()
    }

    fn log_illegal_direct_usage(&self) -> usize {
        let snapshot = self.registry.snapshot();
        let findings = find_illegal_direct_usage(&snapshot.vertices, &snapshot.edges);
        for (scheduler, calling_contexts) in &findings {
            IllegalDirectSchedulerUsage {
                scheduler,
                calling_contexts,
            }
            .log();
        }
        findings.len()
    }

    fn log_unbound_input_wires(&self) -> usize {
        let mut unbound = self.registry.snapshot().unbound_input_wires;
        unbound.sort();
        for (scheduler, label) in &unbound {
            UnboundInputWireDetected { scheduler, label }.log();
        }
        unbound.len()
    }
}

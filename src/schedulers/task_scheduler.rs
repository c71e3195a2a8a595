// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::WiringError;
use crate::model::ModelRegistry;
use crate::schedulers::{SchedulerCore, TaskSchedulerType};
use crate::wires::{BindableInputWire, InputWire, OutputWire};
use std::sync::Arc;

/// A named processing stage with one output wire of type `O` and any number of
/// input wires.
///
/// Handles are cheap to clone and all refer to the same scheduler.
pub struct TaskScheduler<O> {
    core: Arc<SchedulerCore>,
    output: OutputWire<O>,
    registry: Arc<ModelRegistry>,
}

impl<O> Clone for TaskScheduler<O> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            output: self.output.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl<O> std::fmt::Debug for TaskScheduler<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScheduler").field("core", &self.core).finish()
    }
}

impl<O: Clone + Send + 'static> TaskScheduler<O> {
    pub(crate) fn new(core: Arc<SchedulerCore>, registry: Arc<ModelRegistry>) -> Self {
        let output = OutputWire::new(Arc::from(core.name()), registry.clone());
        Self {
            core,
            output,
            registry,
        }
    }

    pub fn name(&self) -> &str {
        self.core.name()
    }

    pub fn scheduler_type(&self) -> TaskSchedulerType {
        self.core.scheduler_type()
    }

    /// The unhandled task capacity, `None` when unbounded or direct.
    pub fn capacity(&self) -> Option<i64> {
        self.core.capacity()
    }

    /// Tasks admitted but not yet finished. Always 0 for direct schedulers.
    pub fn unprocessed_task_count(&self) -> i64 {
        self.core.unprocessed_task_count()
    }

    /// Wait until every admitted task has finished.
    pub async fn wait_until_empty(&self) {
        self.core.wait_until_empty().await;
    }

    pub fn output_wire(&self) -> &OutputWire<O> {
        &self.output
    }

    /// Create a new input wire whose handler results go to this scheduler's output.
    ///
    /// # Errors
    /// * [`WiringError::DuplicateInputWire`] if `label` is already used on this scheduler
    /// * [`WiringError::ModelAlreadyStarted`]
    pub fn build_input_wire<I: Send + 'static>(
        &self,
        label: &str,
    ) -> Result<BindableInputWire<I, O>, WiringError> {
        let wire = InputWire::new(label, self.core.clone());
        self.registry.register_input_wire(wire.binding_status())?;
        Ok(BindableInputWire::new(wire, self.output.clone()))
    }
}

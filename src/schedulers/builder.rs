// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{is_legal_scheduler_name, WiringConfig};
use crate::counters::{
    BackpressureObjectCounter, NoOpObjectCounter, ObjectCounter, StandardObjectCounter,
};
use crate::errors::WiringError;
use crate::model::ModelRegistry;
use crate::schedulers::{SchedulerCore, TaskScheduler, TaskSchedulerType};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Builds a [`TaskScheduler`] and registers it with its wiring model.
///
/// Obtained from [`WiringModel::scheduler_builder`](crate::model::WiringModel::scheduler_builder).
/// An entry for the scheduler's name in the model's configuration overrides what
/// the builder was asked for.
///
/// ```no_run
/// # use wiring_core::config::WiringConfig;
/// # use wiring_core::model::WiringModel;
/// # use wiring_core::schedulers::TaskSchedulerType;
/// # async fn build() -> Result<(), wiring_core::errors::WiringError> {
/// let model = WiringModel::new(WiringConfig::default(), tokio::runtime::Handle::current());
/// let hasher = model
///     .scheduler_builder::<u64>("event_hasher")
///     .with_type(TaskSchedulerType::Concurrent)
///     .with_unhandled_task_capacity(500)
///     .with_unhandled_task_metric(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct TaskSchedulerBuilder<O> {
    name: String,
    registry: Arc<ModelRegistry>,
    config: Arc<WiringConfig>,
    pool: Handle,
    scheduler_type: TaskSchedulerType,
    capacity: Option<i64>,
    unhandled_task_metric: bool,
    _output: PhantomData<fn() -> O>,
}

impl<O: Clone + Send + 'static> TaskSchedulerBuilder<O> {
    pub(crate) fn new(
        name: &str,
        registry: Arc<ModelRegistry>,
        config: Arc<WiringConfig>,
        pool: Handle,
    ) -> Self {
        Self {
            name: name.to_string(),
            registry,
            config,
            pool,
            scheduler_type: TaskSchedulerType::default(),
            capacity: None,
            unhandled_task_metric: false,
            _output: PhantomData,
        }
    }

    pub fn with_type(mut self, scheduler_type: TaskSchedulerType) -> Self {
        self.scheduler_type = scheduler_type;
        self
    }

    /// Bound the number of unhandled tasks. Without a capacity a queued scheduler
    /// never applies backpressure.
    pub fn with_unhandled_task_capacity(mut self, capacity: i64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Run this scheduler's tasks on a dedicated pool instead of the model's.
    pub fn with_pool(mut self, pool: Handle) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_unhandled_task_metric(mut self, enabled: bool) -> Self {
        self.unhandled_task_metric = enabled;
        self
    }

    /// # Errors
    /// * [`WiringError::InvalidSchedulerName`] / [`WiringError::DuplicateScheduler`]
    /// * [`WiringError::InvalidCapacity`] for a capacity that is not positive
    /// * [`WiringError::InvalidConfiguration`] for a direct scheduler with a capacity
    /// * [`WiringError::ModelAlreadyStarted`]
    pub fn build(mut self) -> Result<TaskScheduler<O>, WiringError> {
        if !is_legal_scheduler_name(&self.name) {
            return Err(WiringError::InvalidSchedulerName(self.name));
        }
        self.apply_config_overrides();

        if self.scheduler_type.is_direct() && self.capacity.is_some() {
            return Err(WiringError::InvalidConfiguration {
                scheduler: self.name,
                reason: format!(
                    "{} schedulers have no queue and cannot have an unhandled task capacity",
                    self.scheduler_type
                ),
            });
        }

        let counter: Arc<dyn ObjectCounter> = match (self.scheduler_type.is_direct(), self.capacity) {
            (true, _) => Arc::new(NoOpObjectCounter),
            (false, Some(capacity)) => {
                Arc::new(BackpressureObjectCounter::new(self.name.as_str(), capacity)?)
            }
            (false, None) => Arc::new(StandardObjectCounter::new(self.name.as_str())),
        };

        let core = Arc::new(SchedulerCore::new(
            Arc::from(self.name.as_str()),
            self.scheduler_type,
            counter,
            self.pool,
            self.unhandled_task_metric,
        ));
        self.registry.register_scheduler(core.clone())?;

        Ok(TaskScheduler::new(core, self.registry))
    }

    fn apply_config_overrides(&mut self) {
        let Some(overrides) = self.config.scheduler(&self.name) else {
            return;
        };

        if let Some(scheduler_type) = overrides.scheduler_type {
            if scheduler_type.is_direct() && overrides.capacity.is_none() {
                self.capacity = None;
            }
            self.scheduler_type = scheduler_type;
        }
        if let Some(capacity) = overrides.capacity {
            self.capacity = Some(capacity);
        }
        if let Some(enabled) = overrides.unhandled_task_metric {
            self.unhandled_task_metric = enabled;
        }
    }
}

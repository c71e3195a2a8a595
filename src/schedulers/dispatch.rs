// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The untyped heart of a task scheduler: its counter, its queue and its worker.
//!
//! Input wires hand the core a boxed unit of work (the handler call plus the
//! forwarding of its result). What happens next depends on the scheduler type:
//!
//! * **Direct / DirectStateless** - the work is awaited right away on the caller's
//!   task and its error, if any, goes back to the caller.
//! * **Sequential** - a slot is reserved on the counter, the work is queued, and a
//!   single worker runs queued work one item at a time in admission order.
//! * **Concurrent** - as sequential, but the worker spawns every item onto the pool.
//!
//! Queued work carries an [`OffRamp`] so its slot is released however the work ends.
//! Errors and panics from queued work are logged and the item is dropped; the
//! worker keeps going.

use crate::counters::{ObjectCounter, OffRamp};
use crate::errors::WiringError;
use crate::observability::messages::scheduler::{
    SchedulerStarted, SchedulerStopped, TaskFailed, TaskPanicked, TaskStarted,
    WorkerExitedUncleanly,
};
use crate::observability::messages::StructuredLog;
use crate::schedulers::TaskSchedulerType;
use crate::utils::lock;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// A handler invocation together with the forwarding of its result.
pub(crate) type Work = BoxFuture<'static, Result<(), WiringError>>;

/// How a value asks to be admitted into a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// Wait for capacity.
    Put,
    /// Give up if there is no capacity.
    Offer,
    /// Ignore capacity.
    Inject,
}

struct Task {
    input: Arc<str>,
    work: Work,
    _slot: OffRamp,
}

impl Task {
    async fn run(self, scheduler: &str) {
        let Task { input, work, _slot } = self;
        let started = TaskStarted {
            scheduler,
            input: &input,
        };
        let span = started.span("task_execution");
        started.log();

        match AssertUnwindSafe(work).catch_unwind().instrument(span).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => TaskFailed {
                scheduler,
                input: &input,
                error: &error,
            }
            .log(),
            Err(panic) => TaskPanicked {
                scheduler,
                input: &input,
                message: panic_message(panic.as_ref()),
            }
            .log(),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

struct TaskQueue {
    sender: mpsc::UnboundedSender<Task>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<Task>>>,
    shutdown: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

pub(crate) struct SchedulerCore {
    name: Arc<str>,
    scheduler_type: TaskSchedulerType,
    counter: Arc<dyn ObjectCounter>,
    queue: Option<TaskQueue>,
    pool: Handle,
    unhandled_task_metric: bool,
}

impl SchedulerCore {
    pub(crate) fn new(
        name: Arc<str>,
        scheduler_type: TaskSchedulerType,
        counter: Arc<dyn ObjectCounter>,
        pool: Handle,
        unhandled_task_metric: bool,
    ) -> Self {
        let queue = (!scheduler_type.is_direct()).then(|| {
            let (sender, receiver) = mpsc::unbounded_channel();
            TaskQueue {
                sender,
                receiver: Mutex::new(Some(receiver)),
                shutdown: CancellationToken::new(),
                worker: Mutex::new(None),
            }
        });

        Self {
            name,
            scheduler_type,
            counter,
            queue,
            pool,
            unhandled_task_metric,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn scheduler_type(&self) -> TaskSchedulerType {
        self.scheduler_type
    }

    pub(crate) fn capacity(&self) -> Option<i64> {
        self.counter.capacity()
    }

    pub(crate) fn unprocessed_task_count(&self) -> i64 {
        self.counter.count()
    }

    pub(crate) fn reports_unhandled_task_metric(&self) -> bool {
        self.unhandled_task_metric
    }

    pub(crate) async fn wait_until_empty(&self) {
        self.counter.wait_until_empty().await;
    }

    /// Admit one unit of work. `work` is only called once the work has been admitted.
    ///
    /// Returns `Ok(false)` when an [`Admission::Offer`] finds no capacity.
    pub(crate) async fn submit<F>(
        &self,
        input: &Arc<str>,
        admission: Admission,
        work: F,
    ) -> Result<bool, WiringError>
    where
        F: FnOnce() -> Work,
    {
        let Some(queue) = &self.queue else {
            work().await?;
            return Ok(true);
        };

        if queue.shutdown.is_cancelled() {
            return Err(WiringError::SchedulerStopped(self.name.to_string()));
        }

        match admission {
            Admission::Put => self.counter.on_ramp().await,
            Admission::Offer => {
                if !self.counter.attempt_on_ramp() {
                    return Ok(false);
                }
            }
            Admission::Inject => self.counter.force_on_ramp(),
        }

        let task = Task {
            input: input.clone(),
            work: work(),
            _slot: OffRamp::new(self.counter.clone()),
        };
        // A rejected task is dropped here, which releases its slot.
        queue
            .sender
            .send(task)
            .map_err(|_| WiringError::SchedulerStopped(self.name.to_string()))?;
        Ok(true)
    }

    /// Spawn the worker loop. Direct schedulers have nothing to start.
    pub(crate) fn start(&self) {
        let Some(queue) = &self.queue else {
            return;
        };
        let Some(receiver) = lock(&queue.receiver).take() else {
            return;
        };

        let spawn_onto = match self.scheduler_type {
            TaskSchedulerType::Concurrent => Some(self.pool.clone()),
            _ => None,
        };
        let worker = self.pool.spawn(run_worker(
            self.name.clone(),
            receiver,
            queue.shutdown.clone(),
            spawn_onto,
        ));
        *lock(&queue.worker) = Some(worker);

        SchedulerStarted {
            scheduler: &self.name,
            scheduler_type: self.scheduler_type.as_str(),
            capacity: self.capacity(),
        }
        .log();
    }

    /// Stop accepting work and wait for the worker loop to exit.
    ///
    /// Work still queued when this is called is discarded, so callers drain first.
    pub(crate) async fn stop(&self) {
        let Some(queue) = &self.queue else {
            return;
        };
        queue.shutdown.cancel();
        // Never started: dropping the receiver discards anything queued.
        drop(lock(&queue.receiver).take());

        let worker = lock(&queue.worker).take();
        if let Some(worker) = worker {
            if let Err(error) = worker.await {
                WorkerExitedUncleanly {
                    scheduler: &self.name,
                    error: &error,
                }
                .log();
            }
        }
        SchedulerStopped { scheduler: &self.name }.log();
    }
}

impl std::fmt::Debug for SchedulerCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerCore")
            .field("name", &self.name)
            .field("scheduler_type", &self.scheduler_type)
            .field("counter", &self.counter)
            .finish()
    }
}

/// Pull tasks off the queue until shutdown. With `spawn_onto` set every task is
/// spawned onto that pool, otherwise tasks run one after another on this worker.
async fn run_worker(
    name: Arc<str>,
    mut receiver: mpsc::UnboundedReceiver<Task>,
    shutdown: CancellationToken,
    spawn_onto: Option<Handle>,
) {
    loop {
        let task = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            task = receiver.recv() => match task {
                Some(task) => task,
                None => break,
            },
        };

        match &spawn_onto {
            Some(pool) => {
                let name = name.clone();
                pool.spawn(async move { task.run(&name).await });
            }
            None => task.run(&name).await,
        }
    }
}

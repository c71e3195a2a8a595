// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Input wires: the typed entry points of a task scheduler.
//!
//! An [`InputWire`] is created by its scheduler and is bound to exactly one handler
//! through the [`BindableInputWire`] returned at creation. Values reach the handler
//! through [`put`](InputWire::put), [`offer`](InputWire::offer) and
//! [`inject`](InputWire::inject), or by being forwarded from a soldered output wire.

use crate::errors::WiringError;
use crate::model::{BindingStatus, ModelVertex};
use crate::schedulers::{Admission, SchedulerCore, Work};
use crate::wires::OutputWire;
use futures::FutureExt;
use std::future::Future;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

/// The bound handler, composed with forwarding of its result.
type WireTask<I> = Arc<dyn Fn(I) -> Work + Send + Sync>;

struct InputWireInner<I> {
    label: Arc<str>,
    core: Arc<SchedulerCore>,
    task: OnceLock<WireTask<I>>,
}

impl<I> BindingStatus for InputWireInner<I> {
    fn scheduler_name(&self) -> &str {
        self.core.name()
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn is_bound(&self) -> bool {
        self.task.get().is_some()
    }
}

/// A typed, named entry point into a task scheduler. Cheap to clone.
pub struct InputWire<I> {
    inner: Arc<InputWireInner<I>>,
}

impl<I> Clone for InputWire<I> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<I> std::fmt::Debug for InputWire<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputWire")
            .field("scheduler", &self.inner.core.name())
            .field("label", &self.inner.label)
            .field("bound", &self.inner.task.get().is_some())
            .finish()
    }
}

impl<I: Send + 'static> InputWire<I> {
    pub(crate) fn new(label: &str, core: Arc<SchedulerCore>) -> Self {
        Self {
            inner: Arc::new(InputWireInner {
                label: Arc::from(label),
                core,
                task: OnceLock::new(),
            }),
        }
    }

    pub(crate) fn binding_status(&self) -> Arc<dyn BindingStatus> {
        self.inner.clone()
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn scheduler_name(&self) -> &str {
        self.inner.core.name()
    }

    pub fn is_bound(&self) -> bool {
        self.inner.task.get().is_some()
    }

    pub(crate) fn vertex(&self) -> ModelVertex {
        ModelVertex {
            name: self.inner.core.name().to_string(),
            scheduler_type: self.inner.core.scheduler_type(),
            capacity: self.inner.core.capacity(),
        }
    }

    /// Submit a value, waiting for capacity if the scheduler is full.
    ///
    /// On a direct scheduler this runs the handler to completion before returning
    /// and surfaces its error.
    pub async fn put(&self, value: I) -> Result<(), WiringError> {
        self.deliver(value, Admission::Put).await.map(|_| ())
    }

    /// Submit a value only if there is capacity right now. Returns `Ok(false)` and
    /// drops the value otherwise.
    pub async fn offer(&self, value: I) -> Result<bool, WiringError> {
        self.deliver(value, Admission::Offer).await
    }

    /// Submit a value regardless of capacity.
    pub async fn inject(&self, value: I) -> Result<(), WiringError> {
        self.deliver(value, Admission::Inject).await.map(|_| ())
    }

    pub(crate) async fn deliver(&self, value: I, admission: Admission) -> Result<bool, WiringError> {
        let task = self
            .inner
            .task
            .get()
            .cloned()
            .ok_or_else(|| WiringError::UnboundInputWire {
                scheduler: self.scheduler_name().to_string(),
                label: self.label().to_string(),
            })?;

        self.inner
            .core
            .submit(&self.inner.label, admission, move || task(value))
            .await
    }

    fn set_task(&self, task: WireTask<I>) -> Result<(), WiringError> {
        self.inner.task.set(task).map_err(|_| WiringError::AlreadyBound {
            scheduler: self.scheduler_name().to_string(),
            label: self.label().to_string(),
        })
    }
}

/// An input wire that has not necessarily been bound yet, tied to the output wire
/// its handler's results are forwarded to.
///
/// Dereferences to the [`InputWire`], so values can be submitted through it directly.
pub struct BindableInputWire<I, O> {
    wire: InputWire<I>,
    output: OutputWire<O>,
}

impl<I, O> Deref for BindableInputWire<I, O> {
    type Target = InputWire<I>;

    fn deref(&self) -> &Self::Target {
        &self.wire
    }
}

impl<I, O> BindableInputWire<I, O>
where
    I: Send + 'static,
    O: Clone + Send + 'static,
{
    pub(crate) fn new(wire: InputWire<I>, output: OutputWire<O>) -> Self {
        Self { wire, output }
    }

    /// A handle to the underlying input wire, for soldering or submitting.
    pub fn input_wire(&self) -> InputWire<I> {
        self.wire.clone()
    }

    /// Bind a handler whose result is forwarded to the scheduler's output wire.
    ///
    /// # Errors
    /// [`WiringError::AlreadyBound`] if a handler is already bound.
    pub fn bind<F, Fut>(&self, handler: F) -> Result<(), WiringError>
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let output = self.output.clone();
        let scheduler: Arc<str> = Arc::from(self.wire.scheduler_name());
        let input = self.wire.inner.label.clone();

        self.wire.set_task(Arc::new(move |value: I| {
            let handler = handler.clone();
            let output = output.clone();
            let scheduler = scheduler.clone();
            let input = input.clone();
            async move {
                let result = handler(value)
                    .await
                    .map_err(|error| handler_failed(&scheduler, &input, error))?;
                output.forward(result).await
            }
            .boxed()
        }))
    }

    /// Bind a handler that produces nothing to forward.
    ///
    /// # Errors
    /// [`WiringError::AlreadyBound`] if a handler is already bound.
    pub fn bind_consumer<F, Fut>(&self, handler: F) -> Result<(), WiringError>
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let scheduler: Arc<str> = Arc::from(self.wire.scheduler_name());
        let input = self.wire.inner.label.clone();

        self.wire.set_task(Arc::new(move |value: I| {
            let handler = handler.clone();
            let scheduler = scheduler.clone();
            let input = input.clone();
            async move {
                handler(value)
                    .await
                    .map_err(|error| handler_failed(&scheduler, &input, error))
            }
            .boxed()
        }))
    }
}

fn handler_failed(scheduler: &str, input: &str, error: anyhow::Error) -> WiringError {
    WiringError::HandlerFailed {
        scheduler: scheduler.to_string(),
        input: input.to_string(),
        error,
    }
}

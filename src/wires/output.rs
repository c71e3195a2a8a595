// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::WiringError;
use crate::model::{ModelEdge, ModelRegistry};
use crate::schedulers::Admission;
use crate::utils::{read, write};
use crate::wires::{InputWire, SolderType};
use std::sync::{Arc, RwLock};

struct Destination<O> {
    wire: InputWire<O>,
    admission: Admission,
}

impl<O> Clone for Destination<O> {
    fn clone(&self) -> Self {
        Self {
            wire: self.wire.clone(),
            admission: self.admission,
        }
    }
}

struct OutputWireInner<O> {
    source: Arc<str>,
    registry: Arc<ModelRegistry>,
    // Replaced wholesale on solder so forwarding never holds the lock across an await.
    destinations: RwLock<Arc<Vec<Destination<O>>>>,
}

/// The primary output of a task scheduler. Every value a handler returns is
/// forwarded to each soldered input wire, in solder order.
pub struct OutputWire<O> {
    inner: Arc<OutputWireInner<O>>,
}

impl<O> Clone for OutputWire<O> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<O> std::fmt::Debug for OutputWire<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputWire")
            .field("source", &self.inner.source)
            .field("destinations", &read(&self.inner.destinations).len())
            .finish()
    }
}

impl<O: Clone + Send + 'static> OutputWire<O> {
    pub(crate) fn new(source: Arc<str>, registry: Arc<ModelRegistry>) -> Self {
        Self {
            inner: Arc::new(OutputWireInner {
                source,
                registry,
                destinations: RwLock::new(Arc::new(Vec::new())),
            }),
        }
    }

    /// Name of the scheduler that owns this wire.
    pub fn source(&self) -> &str {
        &self.inner.source
    }

    /// Solder this output to `input`, waiting for capacity on every delivery.
    pub fn solder_to(&self, input: &InputWire<O>) -> Result<(), WiringError> {
        self.solder_to_with(input, SolderType::Put)
    }

    /// Solder this output to `input` with an explicit delivery mode.
    ///
    /// # Errors
    /// [`WiringError::ModelAlreadyStarted`] once the model has been started.
    pub fn solder_to_with(&self, input: &InputWire<O>, solder_type: SolderType) -> Result<(), WiringError> {
        let edge = ModelEdge::new(&self.inner.source, &input.vertex(), input.label(), solder_type);
        self.inner.registry.register_edge(edge)?;

        let mut destinations = write(&self.inner.destinations);
        let mut updated = Vec::clone(&destinations);
        updated.push(Destination {
            wire: input.clone(),
            admission: solder_type.admission(),
        });
        *destinations = Arc::new(updated);
        Ok(())
    }

    pub fn destination_count(&self) -> usize {
        read(&self.inner.destinations).len()
    }

    /// Deliver `value` to every destination. Delivery continues past a failing
    /// destination; the first error is returned.
    pub(crate) async fn forward(&self, value: O) -> Result<(), WiringError> {
        let destinations = read(&self.inner.destinations).clone();
        let Some((last, rest)) = destinations.split_last() else {
            return Ok(());
        };

        let mut first_error = None;
        for destination in rest {
            if let Err(error) = destination.wire.deliver(value.clone(), destination.admission).await {
                first_error.get_or_insert(error);
            }
        }
        if let Err(error) = last.wire.deliver(value, last.admission).await {
            first_error.get_or_insert(error);
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Topology bookkeeping shared by a wiring model and everything it builds.
//!
//! Schedulers, input wires and edges register here as they are created. The first
//! `start()` freezes the registry; later registrations fail with
//! [`WiringError::ModelAlreadyStarted`].

use crate::errors::WiringError;
use crate::schedulers::TaskSchedulerType;
use crate::schedulers::SchedulerCore;
use crate::utils::lock;
use crate::wires::SolderType;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Lets the registry ask an input wire whether a handler has been bound, without
/// knowing the wire's value types.
pub(crate) trait BindingStatus: Send + Sync {
    fn scheduler_name(&self) -> &str;
    fn label(&self) -> &str;
    fn is_bound(&self) -> bool;
}

/// A scheduler as the static analyses see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelVertex {
    pub name: String,
    pub scheduler_type: TaskSchedulerType,
    pub capacity: Option<i64>,
}

/// One soldered connection from a scheduler's output wire to another scheduler's
/// input wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEdge {
    pub source: String,
    pub destination: String,
    /// Label of the destination input wire.
    pub label: String,
    pub solder_type: SolderType,
    /// Whether delivering along this edge can block the source.
    pub applies_backpressure: bool,
}

impl ModelEdge {
    pub(crate) fn new(source: &str, destination: &ModelVertex, label: &str, solder_type: SolderType) -> Self {
        let applies_backpressure = solder_type == SolderType::Put
            && (destination.capacity.is_some() || destination.scheduler_type.is_direct());
        Self {
            source: source.to_string(),
            destination: destination.name.clone(),
            label: label.to_string(),
            solder_type,
            applies_backpressure,
        }
    }
}

/// Point-in-time copy of the registered topology.
#[derive(Debug, Clone, Default)]
pub(crate) struct TopologySnapshot {
    pub vertices: Vec<ModelVertex>,
    pub edges: Vec<ModelEdge>,
    /// `(scheduler, label)` of every input wire without a handler.
    pub unbound_input_wires: Vec<(String, String)>,
}

#[derive(Default)]
struct RegistryState {
    started: bool,
    names: HashSet<String>,
    schedulers: Vec<Arc<SchedulerCore>>,
    edges: Vec<ModelEdge>,
    input_wires: Vec<Arc<dyn BindingStatus>>,
}

#[derive(Default)]
pub(crate) struct ModelRegistry {
    state: Mutex<RegistryState>,
}

impl ModelRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register_scheduler(&self, core: Arc<SchedulerCore>) -> Result<(), WiringError> {
        let mut state = lock(&self.state);
        if state.started {
            return Err(WiringError::ModelAlreadyStarted);
        }
        if !state.names.insert(core.name().to_string()) {
            return Err(WiringError::DuplicateScheduler(core.name().to_string()));
        }
        state.schedulers.push(core);
        Ok(())
    }

    pub(crate) fn register_input_wire(&self, wire: Arc<dyn BindingStatus>) -> Result<(), WiringError> {
        let mut state = lock(&self.state);
        if state.started {
            return Err(WiringError::ModelAlreadyStarted);
        }
        let duplicate = state
            .input_wires
            .iter()
            .any(|existing| existing.scheduler_name() == wire.scheduler_name() && existing.label() == wire.label());
        if duplicate {
            return Err(WiringError::DuplicateInputWire {
                scheduler: wire.scheduler_name().to_string(),
                label: wire.label().to_string(),
            });
        }
        state.input_wires.push(wire);
        Ok(())
    }

    pub(crate) fn register_edge(&self, edge: ModelEdge) -> Result<(), WiringError> {
        let mut state = lock(&self.state);
        if state.started {
            return Err(WiringError::ModelAlreadyStarted);
        }
        state.edges.push(edge);
        Ok(())
    }

    /// Fails if the topology was already frozen.
    pub(crate) fn freeze(&self) -> Result<(), WiringError> {
        let mut state = lock(&self.state);
        if state.started {
            return Err(WiringError::ModelAlreadyStarted);
        }
        state.started = true;
        Ok(())
    }

    pub(crate) fn is_frozen(&self) -> bool {
        lock(&self.state).started
    }

    pub(crate) fn schedulers(&self) -> Vec<Arc<SchedulerCore>> {
        lock(&self.state).schedulers.clone()
    }

    pub(crate) fn edges(&self) -> Vec<ModelEdge> {
        lock(&self.state).edges.clone()
    }

    pub(crate) fn snapshot(&self) -> TopologySnapshot {
        let state = lock(&self.state);
        TopologySnapshot {
            vertices: state
                .schedulers
                .iter()
                .map(|core| ModelVertex {
                    name: core.name().to_string(),
                    scheduler_type: core.scheduler_type(),
                    capacity: core.capacity(),
                })
                .collect(),
            edges: state.edges.clone(),
            unbound_input_wires: state
                .input_wires
                .iter()
                .filter(|wire| !wire.is_bound())
                .map(|wire| (wire.scheduler_name().to_string(), wire.label().to_string()))
                .collect(),
        }
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("ModelRegistry")
            .field("started", &state.started)
            .field("schedulers", &state.schedulers.len())
            .field("edges", &state.edges.len())
            .field("input_wires", &state.input_wires.len())
            .finish()
    }
}

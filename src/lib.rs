// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;       // wiring configuration files
pub mod counters;     // object counters and backpressure
pub mod errors;       // error handling
pub mod model;        // wiring model, static analyses, diagrams
pub mod observability;
pub mod schedulers;   // task schedulers
pub mod wires;        // input and output wires

pub(crate) mod utils;

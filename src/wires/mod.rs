// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed connectors between task schedulers.
//!
//! A scheduler has one [`OutputWire`] and any number of [`InputWire`]s. Soldering an
//! output wire to an input wire records an edge in the wiring model and adds the
//! input wire to the output's fan-out set.

mod input;
mod output;
mod solder;

pub use input::{BindableInputWire, InputWire};
pub use output::OutputWire;
pub use solder::SolderType;

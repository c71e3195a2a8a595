// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit the event with its fields attached at the level the
//! message documents.
//!
//! * `model` - wiring model lifecycle and static-analysis findings
//! * `scheduler` - task scheduler lifecycle and handler failures
//! * `counter` - object counter misuse

pub mod counter;
pub mod model;
pub mod scheduler;

use tracing::Span;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message as a `tracing` event.
    fn log(&self);

    /// Build a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}

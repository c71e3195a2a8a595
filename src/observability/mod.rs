// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic and operational logging in the wiring core goes through message
//! structs that implement `Display` and [`messages::StructuredLog`], so log text lives
//! in one place instead of being scattered through the schedulers and the model.
//!
//! Messages are organized by subsystem:
//! * `messages::model` - wiring model lifecycle and static-analysis findings
//! * `messages::scheduler` - task scheduler lifecycle and handler failures
//! * `messages::counter` - object counter misuse
//!
//! # Usage
//!
//! ```rust
//! use wiring_core::observability::messages::StructuredLog;
//! use wiring_core::observability::messages::model::UnboundInputWireDetected;
//!
//! let msg = UnboundInputWireDetected {
//!     scheduler: "event_hasher",
//!     label: "events to hash",
//! };
//!
//! msg.log();
//! ```

pub mod messages;

#[cfg(test)]
pub(crate) mod test_support;

use tracing_subscriber::EnvFilter;

/// Install the process-wide `tracing` subscriber.
///
/// Honours `RUST_LOG`, defaulting to `info`. Calling this more than once is harmless;
/// only the first call installs a subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

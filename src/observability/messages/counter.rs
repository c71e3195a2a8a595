// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for object counter events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// An off-ramp released a slot that was never reserved.
///
/// # Log Level
/// `error!` - Programming error; every off-ramp must match an earlier on-ramp
pub struct UnmatchedOffRamp<'a> {
    pub counter: &'a str,
    pub count: i64,
}

impl Display for UnmatchedOffRamp<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Object counter '{}' was off-ramped without a matching on-ramp (count is now {})",
            self.counter, self.count
        )
    }
}

impl StructuredLog for UnmatchedOffRamp<'_> {
    fn log(&self) {
        tracing::error!(counter = self.counter, count = self.count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "unmatched_off_ramp",
            span_name = name,
            counter = self.counter,
            count = self.count,
        )
    }
}

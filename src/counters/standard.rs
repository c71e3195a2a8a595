// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::park::park_until;
use super::ObjectCounter;
use crate::observability::messages::counter::UnmatchedOffRamp;
use crate::observability::messages::StructuredLog;
use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::Notify;

/// Counts objects without a capacity. On-ramps never block, but the count can still
/// be waited on, which is what unbounded schedulers need for a graceful stop.
#[derive(Debug)]
pub struct StandardObjectCounter {
    name: String,
    count: AtomicI64,
    releases: Notify,
}

impl StandardObjectCounter {
    /// `name` is used in diagnostics only.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: AtomicI64::new(0),
            releases: Notify::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl ObjectCounter for StandardObjectCounter {
    async fn on_ramp(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }

    fn attempt_on_ramp(&self) -> bool {
        self.count.fetch_add(1, Ordering::AcqRel);
        true
    }

    fn force_on_ramp(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }

    fn off_ramp(&self) {
        let previous = self.count.fetch_sub(1, Ordering::AcqRel);
        if previous <= 0 {
            UnmatchedOffRamp {
                counter: &self.name,
                count: previous - 1,
            }
            .log();
        }
        self.releases.notify_waiters();
    }

    fn count(&self) -> i64 {
        self.count.load(Ordering::Acquire)
    }

    async fn wait_until_empty(&self) {
        park_until(|| self.count() == 0, &self.releases).await;
    }
}

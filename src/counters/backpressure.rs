// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bounded object counter that applies backpressure.
//!
//! The count is the only shared state and is touched exclusively through atomic
//! compare-and-swap, increment and decrement; no lock is held on the hot path.
//!
//! # On-ramp algorithm
//!
//! 1. Read the current count.
//! 2. If it is below capacity, compare-and-swap it to `count + 1`; success means the
//!    slot is ours.
//! 3. Otherwise park until the next off-ramp and start over.
//!
//! The capacity check and the reservation are a single CAS, so two racing callers
//! can never both take the last slot.

use super::park::park_until;
use super::ObjectCounter;
use crate::errors::WiringError;
use crate::observability::messages::counter::UnmatchedOffRamp;
use crate::observability::messages::StructuredLog;
use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::Notify;

/// Counts objects in part of the pipeline and blocks on-ramps while the count is at
/// capacity.
///
/// # Examples
///
/// ```rust
/// use wiring_core::counters::{BackpressureObjectCounter, ObjectCounter};
///
/// let counter = BackpressureObjectCounter::new("hasher", 2).unwrap();
///
/// assert!(counter.attempt_on_ramp());
/// assert!(counter.attempt_on_ramp());
/// assert!(!counter.attempt_on_ramp());
///
/// // Forced admission ignores capacity.
/// counter.force_on_ramp();
/// assert_eq!(counter.count(), 3);
/// ```
#[derive(Debug)]
pub struct BackpressureObjectCounter {
    name: String,
    count: AtomicI64,
    capacity: i64,
    releases: Notify,
}

impl BackpressureObjectCounter {
    /// Create a counter.
    ///
    /// * `name` - used in diagnostics only, must not be empty
    /// * `capacity` - number of objects allowed in flight before on-ramps block, must be > 0
    pub fn new(name: impl Into<String>, capacity: i64) -> Result<Self, WiringError> {
        let name = name.into();
        if name.is_empty() {
            return Err(WiringError::InvalidCounterName);
        }
        if capacity <= 0 {
            return Err(WiringError::InvalidCapacity { name, capacity });
        }

        Ok(Self {
            name,
            count: AtomicI64::new(0),
            capacity,
            releases: Notify::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl ObjectCounter for BackpressureObjectCounter {
    async fn on_ramp(&self) {
        if self.attempt_on_ramp() {
            return;
        }

        // Slow path: no capacity right now, park until a slot can be reserved.
        park_until(|| self.attempt_on_ramp(), &self.releases).await;
    }

    fn attempt_on_ramp(&self) -> bool {
        let mut current = self.count.load(Ordering::Acquire);
        loop {
            if current >= self.capacity {
                return false;
            }
            match self.count.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
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
        if self.count() == 0 {
            return;
        }
        park_until(|| self.count() == 0, &self.releases).await;
    }

    fn capacity(&self) -> Option<i64> {
        Some(self.capacity)
    }
}

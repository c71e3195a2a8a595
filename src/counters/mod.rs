// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Object counters track how many objects are in flight through a point in the
//! pipeline, and the bounded variant applies backpressure when that number reaches
//! a capacity.
//!
//! Every queued task scheduler owns one counter. A task is on-ramped before it is
//! queued and off-ramped after its handler has finished, so the count is the number
//! of unhandled tasks.
//!
//! | counter | `on_ramp` blocks | `wait_until_empty` |
//! |---|---|---|
//! | [`BackpressureObjectCounter`] | while count >= capacity | parks until 0 |
//! | [`StandardObjectCounter`] | never | parks until 0 |
//! | [`NoOpObjectCounter`] | never | returns immediately |

mod backpressure;
mod no_op;
mod park;
mod standard;

pub use backpressure::BackpressureObjectCounter;
pub use no_op::NoOpObjectCounter;
pub use standard::StandardObjectCounter;

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// A counting strategy for objects moving through part of the pipeline.
///
/// The counter does not pair on-ramps with off-ramps itself; every successful
/// on-ramp (blocking, attempted or forced) must be matched by exactly one later
/// [`off_ramp`](ObjectCounter::off_ramp) by the caller.
#[async_trait]
pub trait ObjectCounter: Send + Sync + Debug {
    /// Wait until a slot is available, then reserve it.
    ///
    /// Waiting yields the calling task's worker. Dropping the returned future before
    /// it completes reserves nothing.
    async fn on_ramp(&self);

    /// Reserve a slot if one is available right now.
    fn attempt_on_ramp(&self) -> bool;

    /// Reserve a slot regardless of capacity.
    fn force_on_ramp(&self);

    /// Release a previously reserved slot.
    fn off_ramp(&self);

    /// Snapshot of the in-flight count. Advisory only.
    fn count(&self) -> i64;

    /// Wait until the count is observed to be zero.
    ///
    /// Nothing stops new on-ramps after this returns; callers that treat "empty" as
    /// final must make sure producers have stopped first.
    async fn wait_until_empty(&self);

    /// The capacity, or `None` if the counter never applies backpressure.
    fn capacity(&self) -> Option<i64> {
        None
    }
}

/// Releases one slot of a counter when dropped.
///
/// Held by every queued task so the slot is returned whether the task completes,
/// fails, panics or is discarded without running.
pub(crate) struct OffRamp(Arc<dyn ObjectCounter>);

impl OffRamp {
    /// Wrap a slot that has already been reserved on `counter`.
    pub(crate) fn new(counter: Arc<dyn ObjectCounter>) -> Self {
        Self(counter)
    }
}

impl Drop for OffRamp {
    fn drop(&mut self) {
        self.0.off_ramp();
    }
}

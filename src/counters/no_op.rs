// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::ObjectCounter;
use async_trait::async_trait;

/// A counter that counts nothing. Used where no work is ever queued, e.g. by direct
/// schedulers whose handlers run on the caller's task.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpObjectCounter;

#[async_trait]
impl ObjectCounter for NoOpObjectCounter {
    async fn on_ramp(&self) {}

    fn attempt_on_ramp(&self) -> bool {
        true
    }

    fn force_on_ramp(&self) {}

    fn off_ramp(&self) {}

    fn count(&self) -> i64 {
        0
    }

    async fn wait_until_empty(&self) {}
}

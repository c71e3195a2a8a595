// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::fmt;

/// The scheduling discipline of a task scheduler.
///
/// | type | queue | counter | ordering | callers |
/// |---|---|---|---|---|
/// | `Sequential` | one worker | yes | FIFO | any |
/// | `Concurrent` | pool | yes | none | any |
/// | `Direct` | none | no | caller's | one calling context |
/// | `DirectStateless` | none | no | caller's | any |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskSchedulerType {
    /// One task at a time, in the order tasks were admitted.
    #[default]
    Sequential,
    /// Tasks run in parallel on the scheduler's pool.
    Concurrent,
    /// Tasks run inline on the caller's task. The handler may hold state, so the
    /// scheduler must only be fed from one calling context.
    Direct,
    /// Like `Direct`, but the handler holds no mutable state and can be called
    /// from anywhere.
    DirectStateless,
}

impl TaskSchedulerType {
    /// True for the types that run handlers on the caller's task.
    pub fn is_direct(self) -> bool {
        matches!(self, TaskSchedulerType::Direct | TaskSchedulerType::DirectStateless)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskSchedulerType::Sequential => "sequential",
            TaskSchedulerType::Concurrent => "concurrent",
            TaskSchedulerType::Direct => "direct",
            TaskSchedulerType::DirectStateless => "direct_stateless",
        }
    }
}

impl fmt::Display for TaskSchedulerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

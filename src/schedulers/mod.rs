// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Task schedulers: named stages that run bound handlers under a scheduling
//! discipline and bound their unhandled work with an object counter.

mod builder;
mod dispatch;
pub mod metrics;
mod scheduler_type;
mod task_scheduler;

pub use builder::TaskSchedulerBuilder;
pub use scheduler_type::TaskSchedulerType;
pub use task_scheduler::TaskScheduler;

pub(crate) use dispatch::{Admission, SchedulerCore, Work};

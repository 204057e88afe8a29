//! Scheduled tasks.
//!
//! # Architecture
//! ```text
//! CronServer (lifecycle Server)
//!     → one loop per scheduled task, sleeping until Schedule::next_after
//!     → CronManager::execute (before_run → run → after_run, under the task timeout)
//! ```
//!
//! The `cron` binary can also run a single task once through [`CronManager::run_task`].

pub mod demo;
pub mod manager;
pub mod schedule;
pub mod server;
pub mod task;

use std::time::Duration;

use thiserror::Error;

pub use demo::DemoTask;
pub use manager::CronManager;
pub use schedule::Schedule;
pub use server::CronServer;
pub use task::{Task, TaskInfo, TaskResult};

/// Errors produced while registering or running tasks.
#[derive(Debug, Error)]
pub enum CronError {
    #[error("invalid schedule '{spec}': {reason}")]
    InvalidSchedule { spec: String, reason: String },

    #[error("task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("task '{0}' not found")]
    TaskNotFound(String),

    #[error("task '{task}' timed out after {timeout:?}")]
    Timeout { task: String, timeout: Duration },

    #[error("task '{task}' failed in {stage}: {message}")]
    TaskFailed {
        task: String,
        stage: &'static str,
        message: String,
    },
}

//! The task contract.

use std::error::Error;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Outcome of a task hook.
pub type TaskResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Static description of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    /// Unique name, used by `cron -t <name>` and `cron.disabled_tasks`.
    pub name: String,
    pub description: String,
    /// Disabled tasks stay runnable by name but are never scheduled.
    pub enabled: bool,
    /// Six-field cron expression.
    pub spec: String,
    /// Upper bound for one run, hooks included. Zero means unbounded.
    pub timeout: Duration,
}

/// A unit of scheduled work.
///
/// A run calls `before_run`, `run` and `after_run` in order and stops at the first
/// error. The token is cancelled when the run times out or the scheduler stops.
#[async_trait]
pub trait Task: Send + Sync {
    fn info(&self) -> &TaskInfo;

    async fn before_run(&self, _ctx: &CancellationToken) -> TaskResult {
        Ok(())
    }

    async fn run(&self, ctx: &CancellationToken) -> TaskResult;

    async fn after_run(&self, _ctx: &CancellationToken) -> TaskResult {
        Ok(())
    }
}

//! Stop coordination for a single server.

use std::sync::{Mutex, PoisonError};

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::lifecycle::server::ServerError;

/// Coordinator for one server's graceful shutdown.
///
/// Background tasks spawned on start subscribe to [`Shutdown::token`] and are
/// registered with [`Shutdown::track`]; `stop` triggers the token and joins them.
pub struct Shutdown {
    token: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Token cancelled when shutdown is triggered.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Register a background task to be joined on shutdown.
    pub fn track(&self, task: JoinHandle<()>) {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(task);
    }

    /// Number of tracked tasks that have not finished yet.
    pub fn running_tasks(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }

    /// Whether shutdown has been triggered.
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    /// Trigger shutdown and wait for every tracked task until `deadline`.
    ///
    /// All tasks are waited on even if one of them failed; the first failure is
    /// returned.
    pub async fn trigger_and_wait(&self, deadline: Instant) -> Result<(), ServerError> {
        self.trigger();
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));

        let mut result = Ok(());
        for task in tasks {
            let outcome = match time::timeout_at(deadline, task).await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(ServerError::Task(e.to_string())),
                Err(_) => Err(ServerError::DeadlineExceeded),
            };
            if result.is_ok() {
                result = outcome;
            }
        }
        result
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

//! The `Server` capability managed by an [`Application`](crate::lifecycle::Application).

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Errors reported by a server while starting or stopping.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be bound.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `start` was called on a server that is already running.
    #[error("{0} is already running")]
    AlreadyStarted(String),

    /// Background work did not finish before the stop deadline.
    #[error("shutdown deadline exceeded")]
    DeadlineExceeded,

    /// A background task panicked or was aborted.
    #[error("background task failed: {0}")]
    Task(String),

    #[error("file watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("{0}")]
    Other(String),
}

/// A long-running unit owned by an application.
///
/// `start` must return promptly, spawning whatever background work the server needs.
/// An error from `start` is a fatal startup failure for the whole application.
///
/// `stop` blocks until the server has shut down or `deadline` has passed. The
/// application abandons a `stop` call once the deadline is reached.
#[async_trait]
pub trait Server: Send + Sync {
    /// Name used in lifecycle logs.
    fn name(&self) -> &str;

    /// Launch the server. `ctx` is cancelled when the application shuts down.
    async fn start(&self, ctx: CancellationToken) -> Result<(), ServerError>;

    /// Shut the server down gracefully.
    async fn stop(&self, deadline: Instant) -> Result<(), ServerError>;
}

#[async_trait]
impl<S> Server for Arc<S>
where
    S: Server + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn start(&self, ctx: CancellationToken) -> Result<(), ServerError> {
        (**self).start(ctx).await
    }

    async fn stop(&self, deadline: Instant) -> Result<(), ServerError> {
        (**self).stop(deadline).await
    }
}

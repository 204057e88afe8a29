//! Application lifecycle manager.
//!
//! An [`Application`] owns a set of [`Server`]s. [`Application::run`] starts them all
//! concurrently, blocks until a termination signal, a cancelled parent token or the
//! first start failure, then stops them all concurrently under one grace period.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::build_info::BuildInfo;
use crate::lifecycle::server::{Server, ServerError};
use crate::lifecycle::signals;
use crate::observability::alarm::{AlarmEvent, AlarmSink};
use crate::observability::metrics;

/// Time allotted to the whole stop phase.
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(30);

const TAG_START: &str = "APP_START";
const TAG_START_ERROR: &str = "APP_START_ERROR";
const TAG_SHUTDOWN: &str = "APP_SHUTDOWN";
const TAG_STOP_ERROR: &str = "SERVER_STOP_ERROR";

/// Errors returned by [`Application::run`].
#[derive(Debug, Error)]
pub enum AppError {
    /// A server failed to start; every server was stopped afterwards.
    #[error("server '{server}' failed to start: {source}")]
    Startup {
        server: String,
        #[source]
        source: ServerError,
    },

    /// `run` was called on an application that already ran.
    #[error("application '{0}' has already been run")]
    AlreadyRun(String),
}

/// Lifecycle state of an [`Application`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Running,
    ShuttingDown,
    Stopped,
}

/// Logs lifecycle events and forwards them to the alarm sink.
#[derive(Clone)]
struct Reporter {
    app: Arc<str>,
    alarm: Option<Arc<dyn AlarmSink>>,
}

impl Reporter {
    fn alarm(&self, tag: &str, message: String) {
        if let Some(alarm) = &self.alarm {
            alarm.send(AlarmEvent::new(self.app.as_ref(), tag, message));
        }
    }

    fn info(&self, tag: &'static str, message: String) {
        tracing::info!(tag, app = %self.app, "{message}");
        self.alarm(tag, message);
    }

    fn start_error(&self, server: &str, error: &ServerError) {
        tracing::error!(tag = TAG_START_ERROR, app = %self.app, server, error = %error, "Server failed to start");
        metrics::record_server_event("start_error");
        self.alarm(
            TAG_START_ERROR,
            format!("Application '{}' failed to start server '{server}': {error}", self.app),
        );
    }

    fn stop_error(&self, server: &str, error: &str) {
        tracing::error!(tag = TAG_STOP_ERROR, app = %self.app, server, error, "Server failed to stop gracefully");
        metrics::record_server_event("stop_error");
        self.alarm(
            TAG_STOP_ERROR,
            format!("Failed to stop server '{server}' gracefully: {error}"),
        );
    }
}

/// A named set of servers sharing one lifecycle.
pub struct Application {
    name: String,
    build: BuildInfo,
    servers: Mutex<Vec<Arc<dyn Server>>>,
    state: Mutex<LifecycleState>,
    alarm: Option<Arc<dyn AlarmSink>>,
}

impl Application {
    /// Create an application with no servers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            build: BuildInfo::current(),
            servers: Mutex::new(Vec::new()),
            state: Mutex::new(LifecycleState::Created),
            alarm: None,
        }
    }

    /// Forward lifecycle events to `alarm` in addition to the log.
    pub fn with_alarm(mut self, alarm: Arc<dyn AlarmSink>) -> Self {
        self.alarm = Some(alarm);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn build_info(&self) -> BuildInfo {
        self.build
    }

    /// Register a server.
    pub fn add_server<S>(&self, server: S)
    where
        S: Server + 'static,
    {
        self.lock_servers().push(Arc::new(server));
    }

    /// Register several servers at once.
    pub fn add_servers<I>(&self, servers: I)
    where
        I: IntoIterator<Item = Arc<dyn Server>>,
    {
        self.lock_servers().extend(servers);
    }

    /// Number of registered servers.
    pub fn server_count(&self) -> usize {
        self.lock_servers().len()
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run until SIGINT, SIGTERM or SIGQUIT, `parent` cancellation, or a start failure.
    pub async fn run(&self, parent: CancellationToken) -> Result<(), AppError> {
        let reporter = self.reporter();
        self.run_until(parent, async move {
            match signals::wait_for_shutdown_signal().await {
                Ok(signal) => reporter.info(
                    TAG_SHUTDOWN,
                    format!("Application '{}' received {signal}, shutting down", reporter.app),
                ),
                Err(e) => {
                    tracing::error!(app = %reporter.app, error = %e, "Failed to install signal handlers");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
    }

    /// Run until `shutdown` completes, `parent` is cancelled, or a server fails to start.
    ///
    /// Returns the first start failure, if one triggered the shutdown. Stop failures are
    /// reported through the log and alarm sink only.
    pub async fn run_until<F>(&self, parent: CancellationToken, shutdown: F) -> Result<(), AppError>
    where
        F: Future<Output = ()>,
    {
        self.transition_to_running()?;

        let servers: Vec<Arc<dyn Server>> = self.lock_servers().clone();
        let reporter = self.reporter();
        let ctx = parent.child_token();
        let first_error: Arc<Mutex<Option<(String, ServerError)>>> = Arc::new(Mutex::new(None));

        for server in &servers {
            let server = Arc::clone(server);
            let ctx = ctx.clone();
            let reporter = reporter.clone();
            let first_error = Arc::clone(&first_error);
            tokio::spawn(async move {
                if let Err(e) = server.start(ctx.clone()).await {
                    let name = server.name().to_string();
                    reporter.start_error(&name, &e);
                    first_error
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .get_or_insert((name, e));
                    ctx.cancel();
                }
            });
        }

        metrics::record_server_event("start");
        reporter.info(
            TAG_START,
            format!(
                "Application '{}' started with {} server(s). Build version: {}, commit: {}, build time: {}",
                self.name,
                servers.len(),
                self.build.version,
                self.build.commit,
                self.build.build_time
            ),
        );

        tokio::select! {
            _ = shutdown => {}
            _ = ctx.cancelled() => reporter.info(
                TAG_SHUTDOWN,
                format!("Application '{}' context cancelled, shutting down", self.name),
            ),
        }
        self.set_state(LifecycleState::ShuttingDown);

        self.stop_servers(&servers, &reporter).await;
        ctx.cancel();

        self.set_state(LifecycleState::Stopped);
        reporter.info(
            TAG_SHUTDOWN,
            format!("Application '{}' gracefully shut down", self.name),
        );

        let failure = first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match failure {
            Some((server, source)) => Err(AppError::Startup { server, source }),
            None => Ok(()),
        }
    }

    /// Stop every server concurrently; all stops share one deadline.
    async fn stop_servers(&self, servers: &[Arc<dyn Server>], reporter: &Reporter) {
        let deadline = Instant::now() + SHUTDOWN_GRACE_PERIOD;
        let mut stops = JoinSet::new();
        let mut names = HashMap::new();

        for server in servers {
            let server = Arc::clone(server);
            let name = server.name().to_string();
            let reporter = reporter.clone();
            let task_name = name.clone();
            let handle = stops.spawn(async move {
                match time::timeout_at(deadline, server.stop(deadline)).await {
                    Ok(Ok(())) => tracing::debug!(server = %task_name, "Server stopped"),
                    Ok(Err(e)) => reporter.stop_error(&task_name, &e.to_string()),
                    Err(_) => reporter.stop_error(&task_name, &ServerError::DeadlineExceeded.to_string()),
                }
            });
            names.insert(handle.id(), name);
        }

        while let Some(joined) = stops.join_next_with_id().await {
            if let Err(e) = joined {
                let name = names.get(&e.id()).map(String::as_str).unwrap_or("unknown");
                reporter.stop_error(name, &format!("stop task failed: {e}"));
            }
        }
    }

    fn reporter(&self) -> Reporter {
        Reporter {
            app: Arc::from(self.name.as_str()),
            alarm: self.alarm.clone(),
        }
    }

    fn lock_servers(&self) -> std::sync::MutexGuard<'_, Vec<Arc<dyn Server>>> {
        self.servers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: LifecycleState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn transition_to_running(&self) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != LifecycleState::Created {
            return Err(AppError::AlreadyRun(self.name.clone()));
        }
        *state = LifecycleState::Running;
        Ok(())
    }
}

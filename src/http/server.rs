//! HTTP server adapter.
//!
//! # Responsibilities
//! - Bind the listener on start (a bind failure is a fatal start error)
//! - Serve the router in the background
//! - Drain in-flight requests on stop, bounded by the stop deadline

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::schema::{BusinessConfig, HttpConfig};
use crate::lifecycle::{Server, ServerError, Shutdown};
use crate::user::UserService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    /// Live business config. `ConfigWatcher` swaps it on reload; read with `load()`
    /// per request, never cache the guard.
    pub business: Arc<ArcSwap<BusinessConfig>>,
}

/// HTTP API server.
pub struct HttpServer {
    config: HttpConfig,
    router: Router,
    shutdown: Shutdown,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl HttpServer {
    /// Create a server for `router`; nothing is bound until `start`.
    pub fn new(config: HttpConfig, router: Router) -> Self {
        Self {
            config,
            router,
            shutdown: Shutdown::new(),
            local_addr: Mutex::new(None),
        }
    }

    /// Address the server is bound to, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Server for HttpServer {
    fn name(&self) -> &str {
        "http"
    }

    async fn start(&self, ctx: CancellationToken) -> Result<(), ServerError> {
        if self.local_addr().is_some() {
            return Err(ServerError::AlreadyStarted(self.name().to_string()));
        }

        let listener = TcpListener::bind(&self.config.bind_address)
            .await
            .map_err(|source| ServerError::Bind {
                address: self.config.bind_address.clone(),
                source,
            })?;
        let addr = listener.local_addr()?;
        *self.local_addr.lock().unwrap_or_else(PoisonError::into_inner) = Some(addr);

        let router = self.router.clone();
        let stop = self.shutdown.token();
        self.shutdown.track(tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(stop.cancelled_owned())
                .await;
            match result {
                Ok(()) => tracing::info!(address = %addr, "HTTP server stopped"),
                Err(e) => {
                    tracing::error!(address = %addr, error = %e, "HTTP server failed");
                    ctx.cancel();
                }
            }
        }));

        tracing::info!(address = %addr, "HTTP server listening");
        Ok(())
    }

    async fn stop(&self, deadline: Instant) -> Result<(), ServerError> {
        tracing::info!("HTTP server draining connections");
        self.shutdown.trigger_and_wait(deadline).await
    }
}

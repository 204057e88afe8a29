//! Configuration file watcher for hot reload.
//!
//! Only the `business` section is applied on reload. Everything else (bind address,
//! logging, alarms) is fixed for the lifetime of the process.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::BusinessConfig;
use crate::lifecycle::{Server, ServerError};

/// A server that watches the configuration file and hot-swaps the business config.
pub struct ConfigWatcher {
    path: PathBuf,
    business: Arc<ArcSwap<BusinessConfig>>,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl ConfigWatcher {
    /// Create a watcher publishing reloads into `business`.
    pub fn new(path: &Path, business: Arc<ArcSwap<BusinessConfig>>) -> Self {
        Self {
            path: path.to_path_buf(),
            business,
            watcher: Mutex::new(None),
        }
    }

    /// Reload the file and publish its business section.
    ///
    /// Returns whether the published value changed. On error the current value is kept.
    pub fn reload(path: &Path, business: &ArcSwap<BusinessConfig>) -> Result<bool, ConfigError> {
        let config = load_config(path)?;
        if **business.load() == config.business {
            return Ok(false);
        }
        business.store(Arc::new(config.business));
        Ok(true)
    }
}

#[async_trait]
impl Server for ConfigWatcher {
    fn name(&self) -> &str {
        "config-watcher"
    }

    async fn start(&self, _ctx: CancellationToken) -> Result<(), ServerError> {
        let path = self.path.clone();
        let business = Arc::clone(&self.business);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        match ConfigWatcher::reload(&path, &business) {
                            Ok(true) => tracing::info!(path = ?path, "Business config reloaded"),
                            Ok(false) => tracing::debug!(path = ?path, "Config changed, business section unchanged"),
                            Err(e) => tracing::error!(
                                error = %e,
                                "Failed to reload config. Keeping current configuration."
                            ),
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        *self.watcher.lock().unwrap_or_else(PoisonError::into_inner) = Some(watcher);
        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(())
    }

    async fn stop(&self, _deadline: Instant) -> Result<(), ServerError> {
        let watcher = self.watcher.lock().unwrap_or_else(PoisonError::into_inner).take();
        if watcher.is_some() {
            tracing::info!(path = ?self.path, "Config watcher stopped");
        }
        Ok(())
    }
}

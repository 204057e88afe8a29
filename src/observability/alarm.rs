//! Alarm delivery for events operators must not miss.
//!
//! Outside debug mode the lifecycle manager forwards its events here, so a release
//! that never came up (or crashed while starting) is noticed without reading logs.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;
use uuid::Uuid;

use crate::config::schema::AlarmConfig;

/// One alarm-worthy event.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AlarmEvent {
    /// Lets receivers drop duplicate deliveries.
    pub id: Uuid,
    pub app: String,
    pub tag: String,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

impl AlarmEvent {
    pub fn new(app: impl Into<String>, tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            app: app.into(),
            tag: tag.into(),
            message: message.into(),
            timestamp: Local::now(),
        }
    }
}

/// Destination for alarm events. Implementations must not block.
pub trait AlarmSink: Send + Sync {
    fn send(&self, event: AlarmEvent);
}

/// Writes alarms to the log under the `alarm` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAlarm;

impl AlarmSink for TracingAlarm {
    fn send(&self, event: AlarmEvent) {
        tracing::warn!(
            target: "alarm",
            app = %event.app,
            tag = %event.tag,
            "{}",
            event.message
        );
    }
}

/// Posts alarms as JSON to a webhook.
#[derive(Debug, Clone)]
pub struct WebhookAlarm {
    client: reqwest::Client,
    url: String,
}

impl WebhookAlarm {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl AlarmSink for WebhookAlarm {
    fn send(&self, event: AlarmEvent) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            TracingAlarm.send(event);
            return;
        };

        let client = self.client.clone();
        let url = self.url.clone();
        runtime.spawn(async move {
            let result = client
                .post(&url)
                .json(&event)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status);
            if let Err(e) = result {
                tracing::warn!(error = %e, tag = %event.tag, "Failed to deliver alarm");
            }
        });
    }
}

/// Build the sink described by the config.
pub fn from_config(config: &AlarmConfig) -> Result<Arc<dyn AlarmSink>, reqwest::Error> {
    if config.enabled {
        let webhook = WebhookAlarm::new(
            config.webhook_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Arc::new(webhook))
    } else {
        Ok(Arc::new(TracingAlarm))
    }
}

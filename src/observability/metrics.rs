//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, route, status
//! - `http_request_duration_seconds` (histogram): latency distribution
//! - `cron_task_runs_total` (counter): task runs by task and outcome
//! - `cron_task_duration_seconds` (histogram): task run time
//! - `app_server_events_total` (counter): lifecycle events by event
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus recorder.

use std::sync::OnceLock;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Safe to call more than once.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if let Some(handle) = HANDLE.get() {
        return Some(handle.clone());
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(HANDLE.get_or_init(|| handle).clone()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics recorder");
            None
        }
    }
}

/// Prometheus text exposition, if the recorder is installed.
pub fn render() -> Option<String> {
    HANDLE.get().map(PrometheusHandle::render)
}

/// Record a completed HTTP request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

/// Record a scheduled or manual task run.
pub fn record_task_run(task: &str, success: bool, start: Instant) {
    let outcome = if success { "success" } else { "failure" };
    counter!("cron_task_runs_total", "task" => task.to_string(), "outcome" => outcome)
        .increment(1);
    histogram!("cron_task_duration_seconds", "task" => task.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a lifecycle event (start, start_error, stop_error).
pub fn record_server_event(event: &'static str) {
    counter!("app_server_events_total", "event" => event).increment(1);
}

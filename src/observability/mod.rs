//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!     → alarm.rs (lifecycle events outside debug mode)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → GET /metrics (Prometheus scrape)
//!     → alarm webhook
//! ```

pub mod alarm;
pub mod logging;
pub mod metrics;

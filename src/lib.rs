//! Web service scaffold.
//!
//! Servers (the HTTP API, the task scheduler, the config watcher) implement
//! [`lifecycle::Server`] and are run together by a [`lifecycle::Application`], which
//! starts them concurrently, waits for a termination signal and stops them within one
//! grace period.

pub mod build_info;
pub mod config;
pub mod constants;
pub mod cron;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod user;
pub mod wire;

pub use build_info::BuildInfo;
pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::{Application, Server, ServerError};

//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Process-wide settings (name, run mode).
    pub base: BaseConfig,

    /// HTTP API settings.
    pub http: HttpConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Alarm delivery settings.
    pub alarm: AlarmConfig,

    /// Scheduled task settings.
    pub cron: CronConfig,

    /// Business settings. The only section applied on hot reload.
    pub business: BusinessConfig,
}

impl AppConfig {
    /// Whether lifecycle events should only be logged, not alarmed.
    pub fn is_debug(&self) -> bool {
        self.base.mode == RunMode::Debug
    }
}

/// Run mode of the process.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Debug,
    Release,
    Test,
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BaseConfig {
    /// Application name used in logs and alarms.
    pub app_name: String,

    /// Run mode (debug, release, test).
    pub mode: RunMode,

    /// Watch the config file and reload the business section on change.
    pub hot_reload: bool,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            app_name: "service-scaffold".to_string(),
            mode: RunMode::Debug,
            hot_reload: false,
        }
    }
}

/// HTTP API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// Maximum accepted request body in bytes.
    pub body_limit_bytes: usize,

    /// Origins allowed by CORS. Empty disables the CORS layer.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            request_timeout_secs: 15,
            body_limit_bytes: 1024 * 1024,
            cors_allowed_origins: Vec::new(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format (pretty, json).
    pub log_format: LogFormat,

    /// Expose `GET /metrics` on the HTTP API.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
        }
    }
}

/// Alarm delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AlarmConfig {
    /// Send alarms to the webhook. When disabled alarms go to the log only.
    pub enabled: bool,

    /// Webhook receiving alarm events as JSON.
    pub webhook_url: String,

    /// Webhook request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url: String::new(),
            timeout_secs: 5,
        }
    }
}

/// Scheduled task configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct CronConfig {
    /// Names of registered tasks that must not be scheduled.
    pub disabled_tasks: Vec<String>,
}

/// Business configuration. Every field is safe to hot reload.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct BusinessConfig {
    /// Login token encryption settings.
    pub token: CipherConfig,

    /// Personal information encryption settings.
    pub personal_information: CipherConfig,
}

/// Symmetric cipher key material.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct CipherConfig {
    /// Encryption key.
    pub key: String,

    /// Initialization vector.
    pub iv: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.is_debug());
        assert_eq!(config.http.request_timeout_secs, 15);
    }

    #[test]
    fn test_partial_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            [base]
            app_name = "demo"
            mode = "release"

            [http]
            bind_address = "127.0.0.1:9000"

            [observability]
            log_format = "json"

            [business.token]
            key = "0123456789abcdef"
            "#,
        )
        .unwrap();

        assert_eq!(config.base.app_name, "demo");
        assert!(!config.is_debug());
        assert_eq!(config.http.bind_address, "127.0.0.1:9000");
        assert_eq!(config.http.body_limit_bytes, 1024 * 1024);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.business.token.key, "0123456789abcdef");
        assert!(config.business.token.iv.is_empty());
    }
}

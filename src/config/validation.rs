//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All errors are collected so a
//! broken file is reported in one pass.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{AppConfig, CipherConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `http.bind_address`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.base.app_name.trim().is_empty() {
        errors.push(ValidationError::new("base.app_name", "must not be empty"));
    }

    if config.http.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "http.bind_address",
            format!("'{}' is not a socket address", config.http.bind_address),
        ));
    }
    if config.http.request_timeout_secs == 0 {
        errors.push(ValidationError::new("http.request_timeout_secs", "must be greater than 0"));
    }
    if config.http.body_limit_bytes == 0 {
        errors.push(ValidationError::new("http.body_limit_bytes", "must be greater than 0"));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    if config.alarm.enabled {
        match url::Url::parse(&config.alarm.webhook_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            _ => errors.push(ValidationError::new(
                "alarm.webhook_url",
                "must be an http(s) URL when alarms are enabled",
            )),
        }
        if config.alarm.timeout_secs == 0 {
            errors.push(ValidationError::new("alarm.timeout_secs", "must be greater than 0"));
        }
    }

    validate_cipher("business.token", &config.business.token, &mut errors);
    validate_cipher(
        "business.personal_information",
        &config.business.personal_information,
        &mut errors,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Keys are AES sized (16, 24 or 32 bytes) and the IV is one block, when set.
fn validate_cipher(prefix: &str, cipher: &CipherConfig, errors: &mut Vec<ValidationError>) {
    if !cipher.key.is_empty() && ![16, 24, 32].contains(&cipher.key.len()) {
        errors.push(ValidationError::new(
            format!("{prefix}.key"),
            "must be 16, 24 or 32 bytes long",
        ));
    }
    if !cipher.iv.is_empty() && cipher.iv.len() != 16 {
        errors.push(ValidationError::new(format!("{prefix}.iv"), "must be 16 bytes long"));
    }
}

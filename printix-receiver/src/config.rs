//! Receiver configuration.

use printix_core::ConfigError;
use printix_webhook::{EventFormat, WebhookValidator};
use secrecy::{ExposeSecret, SecretString};
use std::net::SocketAddr;
use std::str::FromStr;

use crate::telemetry::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    pub bind_addr: SocketAddr,
    pub webhook_secret: SecretString,
    /// Accepted alongside `webhook_secret` while a rotation is in progress.
    pub previous_secret: Option<SecretString>,
    pub format: EventFormat,
    pub log_format: LogFormat,
    pub max_body_bytes: usize,
}

impl ReceiverConfig {
    pub fn new(webhook_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            webhook_secret: SecretString::from(webhook_secret.into()),
            previous_secret: None,
            format: EventFormat::default(),
            log_format: LogFormat::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_previous_secret(mut self, secret: impl Into<String>) -> Self {
        self.previous_secret = Some(SecretString::from(secret.into()));
        self
    }

    pub fn with_format(mut self, format: EventFormat) -> Self {
        self.format = format;
        self
    }

    /// Create ReceiverConfig from environment variables.
    ///
    /// Environment variables:
    /// - `PRINTIX_WEBHOOK_SECRET`: Active shared secret (required)
    /// - `PRINTIX_WEBHOOK_PREVIOUS_SECRET`: Secret being rotated out
    /// - `PRINTIX_RECEIVER_BIND`: Listen address (default: 0.0.0.0:8080)
    /// - `PRINTIX_WEBHOOK_FORMAT`: "batch" or "discrete" (default: batch)
    /// - `PRINTIX_LOG_FORMAT`: "pretty" or "json" (default: pretty)
    /// - `PRINTIX_RECEIVER_MAX_BODY_BYTES`: Request body limit (default: 1 MiB)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("PRINTIX_WEBHOOK_SECRET")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired {
                field: "PRINTIX_WEBHOOK_SECRET".to_string(),
            })?;
        let mut config = Self::new(secret);

        config.previous_secret = lookup("PRINTIX_WEBHOOK_PREVIOUS_SECRET")
            .filter(|v| !v.is_empty())
            .map(SecretString::from);

        let bind =
            lookup("PRINTIX_RECEIVER_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        config.bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|e| invalid("PRINTIX_RECEIVER_BIND", &bind, e.to_string()))?;

        if let Some(raw) = lookup("PRINTIX_WEBHOOK_FORMAT") {
            config.format = EventFormat::from_str(&raw)
                .map_err(|reason| invalid("PRINTIX_WEBHOOK_FORMAT", &raw, reason))?;
        }

        if let Some(raw) = lookup("PRINTIX_LOG_FORMAT") {
            config.log_format = LogFormat::from_str(&raw)
                .map_err(|reason| invalid("PRINTIX_LOG_FORMAT", &raw, reason))?;
        }

        if let Some(raw) = lookup("PRINTIX_RECEIVER_MAX_BODY_BYTES") {
            config.max_body_bytes = match raw.parse::<usize>() {
                Ok(0) | Err(_) => {
                    return Err(invalid(
                        "PRINTIX_RECEIVER_MAX_BODY_BYTES",
                        &raw,
                        "must be a positive number of bytes".to_string(),
                    ))
                }
                Ok(n) => n,
            };
        }

        Ok(config)
    }

    /// Validator holding this configuration's secrets.
    pub fn validator(&self) -> WebhookValidator {
        let mut validator = WebhookValidator::new(self.webhook_secret.expose_secret());
        if let Some(previous) = &self.previous_secret {
            validator.set_previous_secret(previous.expose_secret());
        }
        validator
    }
}

fn invalid(field: &str, value: &str, reason: String) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason,
    }
}

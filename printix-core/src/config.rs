//! Client configuration.
//!
//! A [`ClientConfig`] can be assembled with chained `with_*` calls, loaded from
//! `PRINTIX_*` environment variables, or parsed from a TOML document.

use crate::error::ConfigError;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.printix.net";
pub const DEFAULT_AUTH_URL: &str = "https://auth.printix.net/oauth/token";
pub const TEST_AUTH_URL: &str = "https://auth.testenv.printix.net/oauth/token";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the Printix Cloud Print API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Explicit token endpoint. When unset, [`ClientConfig::auth_url`] picks the
    /// production or test endpoint based on `test_mode`.
    pub auth_url: Option<String>,
    pub client_id: String,
    pub client_secret: SecretString,
    pub tenant_id: Option<String>,
    pub test_mode: bool,
    /// Sent as the `user` query parameter on print submissions.
    pub user_identifier: Option<String>,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_url: None,
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            tenant_id: None,
            test_mode: false,
            user_identifier: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = Some(auth_url.into());
        self
    }

    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Route authentication to the test environment and mark submissions as tests.
    pub fn with_test_mode(mut self) -> Self {
        self.test_mode = true;
        self
    }

    pub fn with_user_identifier(mut self, user: impl Into<String>) -> Self {
        self.user_identifier = Some(user.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Token endpoint in effect for this configuration.
    pub fn auth_url(&self) -> &str {
        match &self.auth_url {
            Some(url) => url,
            None if self.test_mode => TEST_AUTH_URL,
            None => DEFAULT_AUTH_URL,
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Create ClientConfig from environment variables.
    ///
    /// Environment variables:
    /// - `PRINTIX_CLIENT_ID`: OAuth client id (required)
    /// - `PRINTIX_CLIENT_SECRET`: OAuth client secret (required)
    /// - `PRINTIX_TENANT_ID`: Tenant for tenant-scoped calls
    /// - `PRINTIX_BASE_URL`: API base URL (default: https://api.printix.net)
    /// - `PRINTIX_AUTH_URL`: Token endpoint override
    /// - `PRINTIX_TEST_MODE`: "true" or "1" to enable test mode
    /// - `PRINTIX_USER`: User identifier for print submissions
    /// - `PRINTIX_REQUEST_TIMEOUT_SECS`: Request timeout (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingRequired {
                    field: key.to_string(),
                })
        };

        let mut config = Self::new(
            required("PRINTIX_CLIENT_ID")?,
            required("PRINTIX_CLIENT_SECRET")?,
        );

        if let Some(base_url) = lookup("PRINTIX_BASE_URL") {
            config.base_url = base_url;
        }
        config.auth_url = lookup("PRINTIX_AUTH_URL").filter(|v| !v.is_empty());
        config.tenant_id = lookup("PRINTIX_TENANT_ID");
        config.user_identifier = lookup("PRINTIX_USER");
        config.test_mode = lookup("PRINTIX_TEST_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        if let Some(raw) = lookup("PRINTIX_REQUEST_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                field: "PRINTIX_REQUEST_TIMEOUT_SECS".to_string(),
                value: raw.clone(),
                reason: "must be a whole number of seconds".to_string(),
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document.
    ///
    /// ```toml
    /// client_id = "abc"
    /// client_secret = "s3cret"
    /// tenant_id = "tenant-1"
    /// test_mode = true
    /// request_timeout_secs = 10
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawClientConfig = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;

        let config = Self {
            base_url: raw.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            auth_url: raw.auth_url,
            client_id: raw.client_id,
            client_secret: SecretString::from(raw.client_secret),
            tenant_id: raw.tenant_id,
            test_mode: raw.test_mode,
            user_identifier: raw.user_identifier,
            request_timeout: raw
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "client_id".to_string(),
            });
        }
        if self.client_secret.expose_secret().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "client_secret".to_string(),
            });
        }
        check_url("base_url", &self.base_url)?;
        if let Some(auth_url) = &self.auth_url {
            check_url("auth_url", auth_url)?;
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout".to_string(),
                value: "0".to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

fn check_url(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be an http(s) URL".to_string(),
        })
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClientConfig {
    client_id: String,
    client_secret: String,
    base_url: Option<String>,
    auth_url: Option<String>,
    tenant_id: Option<String>,
    #[serde(default)]
    test_mode: bool,
    user_identifier: Option<String>,
    request_timeout_secs: Option<u64>,
}

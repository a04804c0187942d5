//! OAuth client-credentials token lifecycle.
//!
//! The cached token is re-checked lazily before every authenticated call and
//! renewed once it is within [`TOKEN_RENEWAL_BUFFER_SECS`] of expiry. There is
//! no background refresh.
//!
//! The cache lives behind an async mutex that stays locked across the token
//! request, so concurrent callers that find the token stale wait for a single
//! re-authentication instead of each sending their own. A cancelled or failed
//! request never touches the cache.

use crate::error::snippet;
use chrono::{DateTime, Duration, Utc};
use printix_core::{AuthError, ClientConfig, Clock};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Tokens are treated as expired this many seconds before their literal expiry.
pub const TOKEN_RENEWAL_BUFFER_SECS: i64 = 600;

/// A bearer token and the instant it stops being valid.
#[derive(Clone)]
pub struct AccessToken {
    value: SecretString,
    expires_at: DateTime<Utc>,
    token_type: String,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: SecretString::from(value.into()),
            expires_at,
            token_type: "Bearer".to_string(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn secret(&self) -> &SecretString {
        &self.value
    }

    /// Usable only while `now` is strictly before `expires_at - buffer`.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.value.expose_secret().is_empty()
            && now < self.expires_at - Duration::seconds(TOKEN_RENEWAL_BUFFER_SECS)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Observable state of the token cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    /// No token, or the cached token is inside the renewal buffer.
    Unauthenticated,
    Authenticated { expires_at: DateTime<Utc> },
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    token_type: Option<String>,
}

/// Acquires and caches the client-credentials bearer token.
pub struct TokenManager {
    http: reqwest::Client,
    auth_url: String,
    client_id: String,
    client_secret: SecretString,
    clock: Arc<dyn Clock>,
    state: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    pub fn new(http: reqwest::Client, config: &ClientConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            http,
            auth_url: config.auth_url().to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            clock,
            state: Mutex::new(None),
        }
    }

    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    /// Return a usable bearer token, authenticating first if needed.
    pub async fn bearer_token(&self) -> Result<SecretString, AuthError> {
        let mut state = self.state.lock().await;

        if let Some(token) = state.as_ref() {
            if token.is_usable_at(self.clock.now()) {
                return Ok(token.value.clone());
            }
            tracing::debug!(expires_at = %token.expires_at, "Access token inside renewal buffer");
        }

        let token = self.request_token().await?;
        let value = token.value.clone();
        *state = Some(token);
        Ok(value)
    }

    /// The cached token, whether or not it is still usable.
    pub async fn cached_token(&self) -> Option<AccessToken> {
        self.state.lock().await.clone()
    }

    pub async fn status(&self) -> TokenStatus {
        match self.state.lock().await.as_ref() {
            Some(token) if token.is_usable_at(self.clock.now()) => TokenStatus::Authenticated {
                expires_at: token.expires_at,
            },
            _ => TokenStatus::Unauthenticated,
        }
    }

    /// Drop the cached token so the next call re-authenticates.
    pub async fn invalidate(&self) {
        *self.state.lock().await = None;
    }

    async fn request_token(&self) -> Result<AccessToken, AuthError> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
        ];

        let response = self
            .http
            .post(&self.auth_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Token request rejected");
            return Err(AuthError::AuthenticationFailed {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        let body = response.bytes().await.map_err(|e| AuthError::Transport {
            reason: e.to_string(),
        })?;
        let parsed: TokenResponse =
            serde_json::from_slice(&body).map_err(|e| AuthError::InvalidTokenResponse {
                reason: e.to_string(),
            })?;

        if parsed.access_token.is_empty() {
            return Err(AuthError::InvalidTokenResponse {
                reason: "empty access_token".to_string(),
            });
        }

        let expires_at = (parsed.expires_in >= 0)
            .then(|| Duration::try_seconds(parsed.expires_in))
            .flatten()
            .and_then(|lifetime| self.clock.now().checked_add_signed(lifetime))
            .ok_or_else(|| AuthError::InvalidTokenResponse {
                reason: format!("expires_in out of range: {}", parsed.expires_in),
            })?;
        tracing::info!(%expires_at, "Obtained Printix access token");

        Ok(AccessToken {
            value: SecretString::from(parsed.access_token),
            expires_at,
            token_type: parsed.token_type.unwrap_or_else(|| "Bearer".to_string()),
        })
    }
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("auth_url", &self.auth_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

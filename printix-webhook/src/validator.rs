//! Inbound webhook validation.
//!
//! A request is accepted only when its timestamp is present, numeric, and
//! inside the replay window, and its signature matches the active secret or,
//! during a rotation, the previous secret. Checks run in that order and stop
//! at the first failure.

use crate::event::{self, DiscreteEvent, EventFormat, ParsedWebhook, WebhookPayload};
use crate::replay::ReplayGuard;
use crate::signature::{verify_signature, SignedPayload};
use bytes::Bytes;
use http::HeaderMap;
use printix_core::{Clock, EventError, PrintixResult, SystemClock, WebhookError};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

pub const TIMESTAMP_HEADER: &str = "x-printix-timestamp";
pub const SIGNATURE_HEADER: &str = "x-printix-signature";

/// Which secret produced the matching signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSlot {
    Active,
    Previous,
}

/// Active secret plus an optional previous one kept during rotation.
#[derive(Debug, Clone)]
pub struct WebhookSecrets {
    active: SecretString,
    previous: Option<SecretString>,
}

impl WebhookSecrets {
    pub fn new(active: impl Into<String>) -> Self {
        Self {
            active: SecretString::from(active.into()),
            previous: None,
        }
    }

    /// Candidates in the order they are checked. Never more than two.
    fn candidates(&self) -> impl Iterator<Item = (SecretSlot, &str)> {
        std::iter::once((SecretSlot::Active, self.active.expose_secret())).chain(
            self.previous
                .as_ref()
                .map(|s| (SecretSlot::Previous, s.expose_secret())),
        )
    }
}

/// Validates `X-Printix-Timestamp` / `X-Printix-Signature` on inbound webhooks.
#[derive(Debug, Clone)]
pub struct WebhookValidator {
    secrets: WebhookSecrets,
    guard: ReplayGuard,
    clock: Arc<dyn Clock>,
}

impl WebhookValidator {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secrets: WebhookSecrets::new(secret),
            guard: ReplayGuard::new(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Keep accepting signatures made with `secret`. An empty string clears it.
    pub fn set_previous_secret(&mut self, secret: impl Into<String>) {
        let secret = secret.into();
        self.secrets.previous = if secret.is_empty() {
            None
        } else {
            Some(SecretString::from(secret))
        };
    }

    pub fn clear_previous_secret(&mut self) {
        self.secrets.previous = None;
    }

    pub fn set_active_secret(&mut self, secret: impl Into<String>) {
        self.secrets.active = SecretString::from(secret.into());
    }

    /// Make `new_active` the active secret and demote the current one to previous.
    pub fn rotate(&mut self, new_active: impl Into<String>) {
        let old = std::mem::replace(
            &mut self.secrets.active,
            SecretString::from(new_active.into()),
        );
        self.secrets.previous = Some(old);
        tracing::info!("Webhook secret rotated; previous secret still accepted");
    }

    pub fn has_previous_secret(&self) -> bool {
        self.secrets.previous.is_some()
    }

    /// Decide whether a request is authentic and fresh.
    ///
    /// `body` is only borrowed, so the same bytes stay available to the
    /// event parser through the returned [`ValidatedWebhook`].
    pub fn validate(
        &self,
        headers: &HeaderMap,
        body: &Bytes,
    ) -> Result<ValidatedWebhook, WebhookError> {
        let result = self.check(headers, body);
        if let Err(err) = &result {
            tracing::warn!(reason = err.kind(), "Rejected Printix webhook");
        }
        result
    }

    /// Validate, then decode the body in `format`. Validation failures come
    /// back as [`PrintixError::Webhook`], decoding failures as
    /// [`PrintixError::Event`].
    ///
    /// [`PrintixError::Webhook`]: printix_core::PrintixError::Webhook
    /// [`PrintixError::Event`]: printix_core::PrintixError::Event
    pub fn validate_and_parse(
        &self,
        headers: &HeaderMap,
        body: &Bytes,
        format: EventFormat,
    ) -> PrintixResult<(ValidatedWebhook, ParsedWebhook)> {
        let validated = self.validate(headers, body)?;
        let parsed = validated.parse(format).map_err(|e| {
            tracing::warn!(%format, error = %e, "Undecodable Printix webhook");
            e
        })?;
        Ok((validated, parsed))
    }

    /// Convenience wrapper over [`WebhookValidator::validate`] for a buffered request.
    pub fn validate_request(
        &self,
        request: &http::Request<Bytes>,
    ) -> Result<ValidatedWebhook, WebhookError> {
        self.validate(request.headers(), request.body())
    }

    fn check(&self, headers: &HeaderMap, body: &Bytes) -> Result<ValidatedWebhook, WebhookError> {
        let timestamp_raw = match headers.get(TIMESTAMP_HEADER) {
            None => return Err(WebhookError::MissingTimestamp),
            Some(value) if value.is_empty() => return Err(WebhookError::MissingTimestamp),
            Some(value) => value.to_str().map_err(|_| WebhookError::InvalidTimestamp {
                value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
            })?,
        };

        let timestamp = timestamp_raw
            .parse::<i64>()
            .map_err(|_| WebhookError::InvalidTimestamp {
                value: timestamp_raw.to_string(),
            })?;

        self.guard.check(timestamp, self.clock.now())?;

        let signature = match headers.get(SIGNATURE_HEADER) {
            None => return Err(WebhookError::MissingSignature),
            Some(value) if value.is_empty() => return Err(WebhookError::MissingSignature),
            Some(value) => value.to_str().map_err(|_| WebhookError::InvalidSignature)?,
        };

        let payload = SignedPayload::new(timestamp_raw, body).to_bytes();

        for (slot, secret) in self.secrets.candidates() {
            if verify_signature(&payload, signature, secret) {
                if slot == SecretSlot::Previous {
                    tracing::debug!("Webhook signature matched previous secret");
                }
                return Ok(ValidatedWebhook {
                    timestamp,
                    body: body.clone(),
                    matched: slot,
                });
            }
        }

        Err(WebhookError::InvalidSignature)
    }
}

/// A request that passed validation, holding the exact body bytes that were signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedWebhook {
    timestamp: i64,
    body: Bytes,
    matched: SecretSlot,
}

impl ValidatedWebhook {
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }

    pub fn matched_secret(&self) -> SecretSlot {
        self.matched
    }

    pub fn parse_batch(&self) -> Result<WebhookPayload, EventError> {
        event::parse_batch(&self.body)
    }

    pub fn parse_discrete(&self) -> Result<DiscreteEvent, EventError> {
        event::parse_discrete(&self.body)
    }

    pub fn parse(&self, format: EventFormat) -> Result<ParsedWebhook, EventError> {
        event::parse(&self.body, format)
    }
}

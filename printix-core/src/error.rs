//! Error types for Printix operations

use thiserror::Error;

/// Inbound webhook validation errors.
///
/// Every variant is terminal for the request: the caller must reject it and
/// must not process the event.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("missing timestamp header")]
    MissingTimestamp,

    #[error("invalid timestamp: {value:?}")]
    InvalidTimestamp { value: String },

    #[error("timestamp outside acceptable window: {timestamp} is {skew_secs}s away from now")]
    StaleRequest { timestamp: i64, skew_secs: u64 },

    #[error("missing signature header")]
    MissingSignature,

    #[error("invalid signature")]
    InvalidSignature,
}

impl WebhookError {
    /// Stable identifier for logs and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            WebhookError::MissingTimestamp => "missing_timestamp",
            WebhookError::InvalidTimestamp { .. } => "invalid_timestamp",
            WebhookError::StaleRequest { .. } => "stale_request",
            WebhookError::MissingSignature => "missing_signature",
            WebhookError::InvalidSignature => "invalid_signature",
        }
    }

    /// True when the request was well-formed but not authentic or not fresh.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::StaleRequest { .. } | WebhookError::InvalidSignature
        )
    }
}

/// Webhook body decoding errors. These follow a successful validation, so
/// they indicate a publisher bug rather than an attack.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("decoding webhook payload: {reason}")]
    MalformedPayload { reason: String },

    #[error("unexpected event type: expected {expected}, got {actual}")]
    UnexpectedEventType { expected: String, actual: String },

    #[error("decoding event data: {reason}")]
    MalformedEventData { reason: String },
}

/// OAuth client-credentials errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("authentication failed with status {status}: {body}")]
    AuthenticationFailed { status: u16, body: String },

    #[error("executing auth request: {reason}")]
    Transport { reason: String },

    #[error("decoding auth response: {reason}")]
    InvalidTokenResponse { reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to parse configuration: {reason}")]
    Parse { reason: String },
}

/// Master error type for all Printix errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PrintixError {
    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for Printix operations.
pub type PrintixResult<T> = Result<T, PrintixError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_error_display_matches_wire_wording() {
        assert_eq!(
            WebhookError::MissingTimestamp.to_string(),
            "missing timestamp header"
        );
        assert_eq!(
            WebhookError::MissingSignature.to_string(),
            "missing signature header"
        );
        assert_eq!(WebhookError::InvalidSignature.to_string(), "invalid signature");

        let err = WebhookError::InvalidTimestamp {
            value: "abc".to_string(),
        };
        assert!(err.to_string().contains("invalid timestamp"));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_stale_request_display() {
        let err = WebhookError::StaleRequest {
            timestamp: 1_700_000_000,
            skew_secs: 1800,
        };
        let msg = err.to_string();
        assert!(msg.contains("outside acceptable window"));
        assert!(msg.contains("1800"));
    }

    #[test]
    fn test_authentication_failure_classification() {
        assert!(WebhookError::InvalidSignature.is_authentication_failure());
        assert!(WebhookError::StaleRequest {
            timestamp: 0,
            skew_secs: 901
        }
        .is_authentication_failure());
        assert!(!WebhookError::MissingTimestamp.is_authentication_failure());
        assert!(!WebhookError::MissingSignature.is_authentication_failure());
    }

    #[test]
    fn test_auth_error_display_carries_status_and_body() {
        let err = AuthError::AuthenticationFailed {
            status: 401,
            body: "invalid_client".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("invalid_client"));
    }

    #[test]
    fn test_event_error_display_unexpected_type() {
        let err = EventError::UnexpectedEventType {
            expected: "job.status.changed".to_string(),
            actual: "printer.online".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("job.status.changed"));
        assert!(msg.contains("printer.online"));
    }

    #[test]
    fn test_printix_error_from_variants() {
        let webhook = PrintixError::from(WebhookError::MissingSignature);
        assert!(matches!(webhook, PrintixError::Webhook(_)));

        let event = PrintixError::from(EventError::MalformedPayload {
            reason: "eof".to_string(),
        });
        assert!(matches!(event, PrintixError::Event(_)));

        let auth = PrintixError::from(AuthError::Transport {
            reason: "connection refused".to_string(),
        });
        assert!(matches!(auth, PrintixError::Auth(_)));

        let config = PrintixError::from(ConfigError::MissingRequired {
            field: "client_id".to_string(),
        });
        assert!(matches!(config, PrintixError::Config(_)));
    }
}

//! Error Types for the Printix webhook receiver
//!
//! Every rejection is answered with a JSON body `{ "code", "message" }` and a
//! status derived from the [`ErrorCode`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use printix_core::{ConfigError, EventError, PrintixError, WebhookError};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::handler::HandlerError;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Malformed requests (400)
    // ========================================================================
    MissingTimestamp,
    InvalidTimestamp,
    MissingSignature,
    MalformedPayload,
    UnexpectedEventType,
    MalformedEventData,

    // ========================================================================
    // Authentication failures (401)
    // ========================================================================
    /// Timestamp outside the replay window
    StaleRequest,
    InvalidSignature,

    // ========================================================================
    // Server errors (500)
    // ========================================================================
    /// The event handler refused or failed to process a valid event
    HandlerFailed,
    InternalError,
}

impl ErrorCode {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::MissingTimestamp
            | ErrorCode::InvalidTimestamp
            | ErrorCode::MissingSignature
            | ErrorCode::MalformedPayload
            | ErrorCode::UnexpectedEventType
            | ErrorCode::MalformedEventData => StatusCode::BAD_REQUEST,

            ErrorCode::StaleRequest | ErrorCode::InvalidSignature => StatusCode::UNAUTHORIZED,

            ErrorCode::HandlerFailed | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::MissingTimestamp => "Missing webhook timestamp",
            ErrorCode::InvalidTimestamp => "Invalid webhook timestamp",
            ErrorCode::MissingSignature => "Missing webhook signature",
            ErrorCode::MalformedPayload => "Malformed webhook payload",
            ErrorCode::UnexpectedEventType => "Unexpected event type",
            ErrorCode::MalformedEventData => "Malformed event data",
            ErrorCode::StaleRequest => "Webhook timestamp outside acceptable window",
            ErrorCode::InvalidSignature => "Invalid webhook signature",
            ErrorCode::HandlerFailed => "Webhook could not be processed",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// RECEIVER ERROR
// ============================================================================

/// Structured error response returned by the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverError {
    pub code: ErrorCode,
    pub message: String,
}

pub type ReceiverResult<T> = Result<T, ReceiverError>;

impl ReceiverError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ReceiverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ReceiverError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ReceiverError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self)).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// Validation failures keep the failure class but not the offending values.
impl From<WebhookError> for ReceiverError {
    fn from(err: WebhookError) -> Self {
        let code = match err {
            WebhookError::MissingTimestamp => ErrorCode::MissingTimestamp,
            WebhookError::InvalidTimestamp { .. } => ErrorCode::InvalidTimestamp,
            WebhookError::StaleRequest { .. } => ErrorCode::StaleRequest,
            WebhookError::MissingSignature => ErrorCode::MissingSignature,
            WebhookError::InvalidSignature => ErrorCode::InvalidSignature,
        };
        Self::from_code(code)
    }
}

impl From<EventError> for ReceiverError {
    fn from(err: EventError) -> Self {
        let code = match err {
            EventError::MalformedPayload { .. } => ErrorCode::MalformedPayload,
            EventError::UnexpectedEventType { .. } => ErrorCode::UnexpectedEventType,
            EventError::MalformedEventData { .. } => ErrorCode::MalformedEventData,
        };
        Self::new(code, err.to_string())
    }
}

impl From<PrintixError> for ReceiverError {
    fn from(err: PrintixError) -> Self {
        match err {
            PrintixError::Webhook(e) => e.into(),
            PrintixError::Event(e) => e.into(),
            PrintixError::Config(e) => e.into(),
            PrintixError::Auth(e) => Self::internal_error(e.to_string()),
        }
    }
}

impl From<HandlerError> for ReceiverError {
    fn from(err: HandlerError) -> Self {
        tracing::error!(error = %err, "Webhook handler failed");
        Self::from_code(ErrorCode::HandlerFailed)
    }
}

impl From<ConfigError> for ReceiverError {
    fn from(err: ConfigError) -> Self {
        Self::internal_error(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================

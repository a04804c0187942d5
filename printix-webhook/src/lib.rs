//! Printix Webhook - inbound webhook verification and decoding
//!
//! Validation and parsing are separate steps. [`WebhookValidator::validate`]
//! decides whether a request is authentic and fresh, and hands back the exact
//! body bytes it checked. Those bytes are then decoded by the functions in
//! [`event`].
//!
//! ```no_run
//! use bytes::Bytes;
//! use http::HeaderMap;
//! use printix_webhook::{EventFormat, WebhookValidator};
//!
//! # fn handle(headers: HeaderMap, body: Bytes) -> Result<(), Box<dyn std::error::Error>> {
//! let validator = WebhookValidator::new("shared-secret");
//! let validated = validator.validate(&headers, &body)?;
//! let parsed = validated.parse(EventFormat::Batch)?;
//! # let _ = parsed;
//! # Ok(())
//! # }
//! ```

pub mod event;
pub mod replay;
pub mod signature;
pub mod validator;

pub use event::{
    parse, parse_batch, parse_discrete, parse_job_status_change, DiscreteEvent, EventFormat,
    JobStatusChange, ParsedWebhook, WebhookEvent, WebhookPayload, JOB_STATUS_CHANGED,
    USER_CREATE_EVENT,
};
pub use replay::{ReplayGuard, REPLAY_WINDOW_SECS};
pub use signature::{sign, verify_signature, SignedPayload, SIGNATURE_HEX_LEN};
pub use validator::{
    SecretSlot, ValidatedWebhook, WebhookSecrets, WebhookValidator, SIGNATURE_HEADER,
    TIMESTAMP_HEADER,
};

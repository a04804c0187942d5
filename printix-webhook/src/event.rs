//! Webhook body decoding.
//!
//! Printix has published two shapes over time:
//!
//! - **Batch**: `{"emitted": <secs>, "events": [{"name", "href", "time"}]}`
//! - **Discrete**: `{"id", "type", "timestamp", "data"}`
//!
//! A deployment picks one with [`EventFormat`]. The parser never guesses.

use chrono::{DateTime, Utc};
use printix_core::EventError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const USER_CREATE_EVENT: &str = "RESOURCE.TENANT_USER.CREATE";
pub const JOB_STATUS_CHANGED: &str = "job.status.changed";

// ============================================================================
// BATCH VARIANT
// ============================================================================

/// One entry of a batch payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Resource-action identifier, e.g. `RESOURCE.TENANT_USER.CREATE`.
    pub name: String,
    /// Link to the affected resource.
    pub href: String,
    /// Fractional Unix seconds.
    pub time: f64,
}

impl WebhookEvent {
    pub fn is_user_create_event(&self) -> bool {
        self.name == USER_CREATE_EVENT
    }

    /// Names are matched on the `JOB` and `STATUS` tokens, case-sensitively.
    pub fn is_job_status_change_event(&self) -> bool {
        self.name.contains("JOB") && self.name.contains("STATUS")
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        fractional_secs_to_datetime(self.time)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Fractional Unix seconds at which the batch was emitted.
    pub emitted: f64,
    pub events: Vec<WebhookEvent>,
}

impl WebhookPayload {
    pub fn emitted_at(&self) -> Option<DateTime<Utc>> {
        fractional_secs_to_datetime(self.emitted)
    }
}

fn fractional_secs_to_datetime(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
}

// ============================================================================
// DISCRETE VARIANT
// ============================================================================

/// A single typed event. `data` is kept undecoded until a typed extractor
/// such as [`parse_job_status_change`] asks for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl DiscreteEvent {
    pub fn is_job_status_change_event(&self) -> bool {
        self.event_type == JOB_STATUS_CHANGED
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusChange {
    pub job_id: String,
    pub printer_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Extract the job-status payload of a `job.status.changed` event.
pub fn parse_job_status_change(event: &DiscreteEvent) -> Result<JobStatusChange, EventError> {
    if event.event_type != JOB_STATUS_CHANGED {
        return Err(EventError::UnexpectedEventType {
            expected: JOB_STATUS_CHANGED.to_string(),
            actual: event.event_type.clone(),
        });
    }
    JobStatusChange::deserialize(&event.data).map_err(|e| EventError::MalformedEventData {
        reason: e.to_string(),
    })
}

// ============================================================================
// FORMAT SELECTION
// ============================================================================

/// Which body shape a deployment receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventFormat {
    #[default]
    Batch,
    Discrete,
}

impl fmt::Display for EventFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventFormat::Batch => write!(f, "batch"),
            EventFormat::Discrete => write!(f, "discrete"),
        }
    }
}

impl FromStr for EventFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batch" => Ok(EventFormat::Batch),
            "discrete" => Ok(EventFormat::Discrete),
            other => Err(format!("unknown webhook format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedWebhook {
    Batch(WebhookPayload),
    Discrete(DiscreteEvent),
}

pub fn parse_batch(body: &[u8]) -> Result<WebhookPayload, EventError> {
    serde_json::from_slice(body).map_err(|e| EventError::MalformedPayload {
        reason: e.to_string(),
    })
}

pub fn parse_discrete(body: &[u8]) -> Result<DiscreteEvent, EventError> {
    serde_json::from_slice(body).map_err(|e| EventError::MalformedPayload {
        reason: e.to_string(),
    })
}

pub fn parse(body: &[u8], format: EventFormat) -> Result<ParsedWebhook, EventError> {
    match format {
        EventFormat::Batch => parse_batch(body).map(ParsedWebhook::Batch),
        EventFormat::Discrete => parse_discrete(body).map(ParsedWebhook::Discrete),
    }
}

//! Dispatch of validated webhook events.

use async_trait::async_trait;
use printix_webhook::{
    parse_job_status_change, DiscreteEvent, ParsedWebhook, ValidatedWebhook, WebhookEvent,
};
use thiserror::Error;

/// Failure reported by an [`EventHandler`]. Answered with 500 so the
/// publisher redelivers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Receives every webhook that passed validation and parsing.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(
        &self,
        webhook: &ValidatedWebhook,
        event: ParsedWebhook,
    ) -> Result<(), HandlerError>;
}

/// Coarse classification used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    UserCreate,
    JobStatusChange,
    Other,
}

impl EventClass {
    pub fn of_batch_event(event: &WebhookEvent) -> Self {
        if event.is_user_create_event() {
            EventClass::UserCreate
        } else if event.is_job_status_change_event() {
            EventClass::JobStatusChange
        } else {
            EventClass::Other
        }
    }

    pub fn of_discrete_event(event: &DiscreteEvent) -> Self {
        if event.is_job_status_change_event() {
            EventClass::JobStatusChange
        } else {
            EventClass::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventClass::UserCreate => "user_create",
            EventClass::JobStatusChange => "job_status_change",
            EventClass::Other => "other",
        }
    }
}

/// Default handler: logs each event with its classification and accepts it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventHandler;

#[async_trait]
impl EventHandler for LoggingEventHandler {
    async fn handle(
        &self,
        webhook: &ValidatedWebhook,
        event: ParsedWebhook,
    ) -> Result<(), HandlerError> {
        match event {
            ParsedWebhook::Batch(payload) => {
                tracing::info!(
                    timestamp = webhook.timestamp(),
                    events = payload.events.len(),
                    "Received Printix webhook batch"
                );
                for event in &payload.events {
                    tracing::info!(
                        event_name = %event.name,
                        href = %event.href,
                        class = EventClass::of_batch_event(event).as_str(),
                        "Printix event"
                    );
                }
            }
            ParsedWebhook::Discrete(event) => {
                let class = EventClass::of_discrete_event(&event);
                match class {
                    EventClass::JobStatusChange => match parse_job_status_change(&event) {
                        Ok(change) => tracing::info!(
                            event_id = %event.id,
                            job_id = %change.job_id,
                            printer_id = %change.printer_id,
                            status = %change.status,
                            class = class.as_str(),
                            "Printix job status changed"
                        ),
                        Err(e) => tracing::warn!(
                            event_id = %event.id,
                            error = %e,
                            "Job status event carried unreadable data"
                        ),
                    },
                    _ => tracing::info!(
                        event_id = %event.id,
                        event_type = %event.event_type,
                        class = class.as_str(),
                        "Printix event"
                    ),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printix_webhook::parse_batch;

    #[test]
    fn test_batch_event_classification() {
        let payload = parse_batch(
            br#"{"emitted":1.0,"events":[
                {"name":"RESOURCE.TENANT_USER.CREATE","href":"h1","time":1.0},
                {"name":"RESOURCE.JOB.STATUS_CHANGE","href":"h2","time":1.0},
                {"name":"RESOURCE.PRINTER.UPDATE","href":"h3","time":1.0}
            ]}"#,
        )
        .unwrap();

        let classes: Vec<_> = payload.events.iter().map(EventClass::of_batch_event).collect();
        assert_eq!(
            classes,
            vec![
                EventClass::UserCreate,
                EventClass::JobStatusChange,
                EventClass::Other
            ]
        );
    }

    #[test]
    fn test_handler_error_display() {
        assert_eq!(HandlerError::new("queue full").to_string(), "queue full");
    }
}

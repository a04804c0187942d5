//! Shared application state for the receiver router.

use std::sync::Arc;

use printix_webhook::{EventFormat, WebhookValidator};

use crate::config::ReceiverConfig;
use crate::handler::{EventHandler, LoggingEventHandler};

#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<WebhookValidator>,
    /// Body shape this deployment is subscribed to.
    pub format: EventFormat,
    pub handler: Arc<dyn EventHandler>,
}

impl AppState {
    pub fn new(
        validator: WebhookValidator,
        format: EventFormat,
        handler: Arc<dyn EventHandler>,
    ) -> Self {
        Self {
            validator: Arc::new(validator),
            format,
            handler,
        }
    }

    /// State with the logging handler.
    pub fn from_config(config: &ReceiverConfig) -> Self {
        Self::new(
            config.validator(),
            config.format,
            Arc::new(LoggingEventHandler),
        )
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("format", &self.format)
            .field("previous_secret", &self.validator.has_previous_secret())
            .finish_non_exhaustive()
    }
}

//! Printix Receiver - HTTP endpoint for signed Printix webhooks
//!
//! Each delivery is validated (timestamp, replay window, HMAC signature),
//! decoded in the deployment's configured [`EventFormat`], and handed to an
//! [`EventHandler`]. Rejections carry a JSON `{ code, message }` body.
//!
//! [`EventFormat`]: printix_webhook::EventFormat

pub mod config;
pub mod error;
pub mod handler;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::{ReceiverConfig, DEFAULT_BIND_ADDR, DEFAULT_MAX_BODY_BYTES};
pub use error::{ErrorCode, ReceiverError, ReceiverResult};
pub use handler::{EventClass, EventHandler, HandlerError, LoggingEventHandler};
pub use routes::create_router;
pub use state::AppState;
pub use telemetry::{init_tracing, LogFormat};

//! Printix Core - shared types for the Printix cloud print client
//!
//! - Error taxonomy for webhook validation, event parsing, and authentication
//! - Clock abstraction used by time-sensitive checks
//! - Client configuration

pub mod clock;
pub mod config;
pub mod error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    ClientConfig, DEFAULT_AUTH_URL, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT, TEST_AUTH_URL,
};
pub use error::{AuthError, ConfigError, EventError, PrintixError, PrintixResult, WebhookError};

//! Timestamp window check against replayed or badly skewed requests.

use chrono::{DateTime, Utc};
use printix_core::WebhookError;

/// Accepted distance between the declared timestamp and now, in either direction.
pub const REPLAY_WINDOW_SECS: u64 = 15 * 60;

/// Symmetric timestamp window. Past and future timestamps are treated alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayGuard {
    window_secs: u64,
}

impl Default for ReplayGuard {
    fn default() -> Self {
        Self {
            window_secs: REPLAY_WINDOW_SECS,
        }
    }
}

impl ReplayGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn window_secs(&self) -> u64 {
        self.window_secs
    }

    /// Accept `timestamp` (Unix seconds) when it lies within the closed
    /// interval `[now - window, now + window]`.
    pub fn check(&self, timestamp: i64, now: DateTime<Utc>) -> Result<(), WebhookError> {
        let skew_secs = now.timestamp().abs_diff(timestamp);
        if skew_secs > self.window_secs {
            return Err(WebhookError::StaleRequest {
                timestamp,
                skew_secs,
            });
        }
        Ok(())
    }
}

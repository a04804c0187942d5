//! Printix Test Utilities
//!
//! Shared test infrastructure for the Printix workspace:
//! - Independent HMAC-SHA512 signing for building authentic webhook requests
//! - Proptest generators for secrets, bodies, and timestamps
//! - Fixture payloads for both webhook body shapes
//! - Mock OAuth token endpoint helpers for `wiremock`
//!
//! Signing here is computed directly with `hmac`/`sha2` rather than through
//! `printix-webhook`, so the verifier is checked against a separate oracle.

pub use printix_core::{ClientConfig, ManualClock};

use bytes::Bytes;
use hmac::{Hmac, Mac};
use http::{HeaderMap, HeaderValue};
use sha2::Sha512;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TIMESTAMP_HEADER: &str = "x-printix-timestamp";
pub const SIGNATURE_HEADER: &str = "x-printix-signature";

// ============================================================================
// SIGNING
// ============================================================================

/// Lowercase hex HMAC-SHA512 of `<timestamp>.<body>` under `secret`.
pub fn sign_webhook(timestamp: &str, body: &[u8], secret: &str) -> String {
    let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Headers for a correctly signed request.
pub fn signed_headers(timestamp: i64, body: &[u8], secret: &str) -> HeaderMap {
    let ts = timestamp.to_string();
    let signature = sign_webhook(&ts, body, secret);
    headers_with(Some(&ts), Some(&signature))
}

/// Headers with arbitrary (possibly absent) timestamp and signature values.
pub fn headers_with(timestamp: Option<&str>, signature: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(ts) = timestamp {
        headers.insert(
            TIMESTAMP_HEADER,
            HeaderValue::from_str(ts).expect("timestamp must be a valid header value"),
        );
    }
    if let Some(sig) = signature {
        headers.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(sig).expect("signature must be a valid header value"),
        );
    }
    headers
}

// ============================================================================
// FIXTURES
// ============================================================================

/// 2024-06-11T08:17:26Z, the emission time of [`SAMPLE_BATCH_BODY`].
pub const FIXED_NOW: i64 = 1_718_093_846;

pub const SAMPLE_BATCH_BODY: &str = r#"{"emitted":1718093846.488,"events":[{"name":"RESOURCE.TENANT_USER.CREATE","href":"https://api.printix.net/cloudprint/tenants/tenant-1/users/456","time":1718093846.488}]}"#;

pub const SAMPLE_DISCRETE_BODY: &str = r#"{"id":"evt-123","type":"job.status.changed","timestamp":"2024-06-11T08:17:26Z","data":{"jobId":"job-123","printerId":"printer-456","status":"completed"}}"#;

/// Discrete-shape body with the given type and `data` JSON.
pub fn discrete_body(event_type: &str, data: serde_json::Value) -> Bytes {
    let body = serde_json::json!({
        "id": "evt-1",
        "type": event_type,
        "timestamp": "2024-06-11T08:17:26Z",
        "data": data,
    });
    Bytes::from(body.to_string())
}

/// A clock pinned to [`FIXED_NOW`].
pub fn fixed_clock() -> ManualClock {
    ManualClock::at_unix(FIXED_NOW)
}

// ============================================================================
// MOCK TOKEN ENDPOINT
// ============================================================================

pub const TOKEN_PATH: &str = "/oauth/token";

/// Client configuration pointing both API and token endpoint at `server`.
pub fn mock_client_config(server: &MockServer) -> ClientConfig {
    ClientConfig::new("test-client", "test-secret")
        .with_base_url(server.uri())
        .with_auth_url(format!("{}{}", server.uri(), TOKEN_PATH))
}

/// Answer client-credentials grants with `token`, expecting exactly `calls` requests.
pub async fn mount_token_success(server: &MockServer, token: &str, expires_in: i64, calls: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": token,
            "expires_in": expires_in,
            "token_type": "Bearer",
        })))
        .expect(calls)
        .mount(server)
        .await;
}

/// Reject every token request with `status` and a plain-text `body`.
pub async fn mount_token_failure(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use proptest::prelude::*;

    /// Non-empty printable secret.
    pub fn arb_secret() -> impl Strategy<Value = String> {
        "[ -~]{1,64}"
    }

    /// Two distinct secrets.
    pub fn arb_distinct_secrets() -> impl Strategy<Value = (String, String)> {
        (arb_secret(), arb_secret()).prop_filter("secrets must differ", |(a, b)| a != b)
    }

    /// Three pairwise distinct secrets.
    pub fn arb_three_secrets() -> impl Strategy<Value = (String, String, String)> {
        (arb_secret(), arb_secret(), arb_secret())
            .prop_filter("secrets must differ", |(a, b, c)| a != b && b != c && a != c)
    }

    /// Arbitrary body bytes, including non-UTF-8.
    pub fn arb_body() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(any::<u8>(), 0..2048)
    }

    /// Plausible Unix timestamps (2001 to 2286).
    pub fn arb_unix_secs() -> impl Strategy<Value = i64> {
        1_000_000_000i64..10_000_000_000i64
    }

    /// Offsets, in seconds, that stay inside a window of `window` either way.
    pub fn arb_offset_within(window: i64) -> impl Strategy<Value = i64> {
        -window..=window
    }

    /// Offsets, in seconds, that fall outside a window of `window`.
    pub fn arb_offset_outside(window: i64) -> impl Strategy<Value = i64> {
        prop_oneof![
            (window + 1)..(window + 1_000_000),
            (-window - 1_000_000)..(-window),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_webhook_is_hex_sha512() {
        let sig = sign_webhook("1", b"{}", "secret");
        assert_eq!(sig.len(), 128);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_headers_with_omits_absent_values() {
        let headers = headers_with(None, Some("abc"));
        assert!(headers.get(TIMESTAMP_HEADER).is_none());
        assert_eq!(headers.get(SIGNATURE_HEADER).unwrap(), "abc");
    }

    #[test]
    fn test_fixtures_are_valid_json() {
        serde_json::from_str::<serde_json::Value>(SAMPLE_BATCH_BODY).unwrap();
        serde_json::from_str::<serde_json::Value>(SAMPLE_DISCRETE_BODY).unwrap();
    }
}

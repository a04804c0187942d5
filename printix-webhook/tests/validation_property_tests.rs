//! Property-Based Tests for Webhook Validation
//!
//! For any body and secret, a request signed with that secret and carrying a
//! fresh timestamp is accepted, and the accepted body is byte-identical to the
//! one received. Requests signed with any other secret, or stamped outside the
//! replay window, are rejected.

use bytes::Bytes;
use chrono::DateTime;
use printix_core::{ManualClock, WebhookError};
use printix_test_utils::generators::*;
use printix_test_utils::{headers_with, sign_webhook, signed_headers};
use printix_webhook::{
    sign, verify_signature, ReplayGuard, SecretSlot, SignedPayload, WebhookValidator,
    REPLAY_WINDOW_SECS,
};
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// TEST CONFIGURATION
// ============================================================================

fn validator_at(secret: &str, now: i64) -> WebhookValidator {
    WebhookValidator::new(secret).with_clock(Arc::new(ManualClock::at_unix(now)))
}

const WINDOW: i64 = REPLAY_WINDOW_SECS as i64;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ========================================================================
    // SIGNATURE PROPERTIES
    // ========================================================================

    #[test]
    fn prop_sign_then_verify_accepts(body in arb_body(), secret in arb_secret()) {
        let signature = sign(&body, &secret);
        prop_assert!(verify_signature(&body, &signature, &secret));
    }

    #[test]
    fn prop_verify_rejects_other_secret(
        body in arb_body(),
        (s1, s2) in arb_distinct_secrets(),
    ) {
        let signature = sign(&body, &s1);
        prop_assert!(!verify_signature(&body, &signature, &s2));
    }

    #[test]
    fn prop_sign_agrees_with_independent_hmac(
        ts in arb_unix_secs(),
        body in arb_body(),
        secret in arb_secret(),
    ) {
        let ts = ts.to_string();
        let payload = SignedPayload::new(&ts, &body).to_bytes();
        prop_assert_eq!(sign(&payload, &secret), sign_webhook(&ts, &body, &secret));
    }

    // ========================================================================
    // REPLAY WINDOW PROPERTIES
    // ========================================================================

    #[test]
    fn prop_replay_guard_accepts_inside_window(
        now in arb_unix_secs(),
        offset in arb_offset_within(WINDOW),
    ) {
        let now_dt = DateTime::from_timestamp(now, 0).unwrap();
        prop_assert!(ReplayGuard::new().check(now + offset, now_dt).is_ok());
    }

    #[test]
    fn prop_replay_guard_rejects_outside_window(
        now in arb_unix_secs(),
        offset in arb_offset_outside(WINDOW),
    ) {
        let now_dt = DateTime::from_timestamp(now, 0).unwrap();
        let is_stale = matches!(
            ReplayGuard::new().check(now + offset, now_dt),
            Err(WebhookError::StaleRequest { .. })
        );
        prop_assert!(is_stale);
    }

    // ========================================================================
    // VALIDATOR PROPERTIES
    // ========================================================================

    #[test]
    fn prop_signed_fresh_request_round_trips_body(
        now in arb_unix_secs(),
        offset in arb_offset_within(WINDOW),
        body in arb_body(),
        secret in arb_secret(),
    ) {
        let headers = signed_headers(now + offset, &body, &secret);
        let body = Bytes::from(body);

        let validated = validator_at(&secret, now).validate(&headers, &body).unwrap();
        prop_assert_eq!(validated.body(), &body);
        prop_assert_eq!(validated.timestamp(), now + offset);
    }

    #[test]
    fn prop_missing_timestamp_regardless_of_signature(
        body in arb_body(),
        secret in arb_secret(),
        signature in proptest::option::of("[0-9a-f]{128}"),
    ) {
        let headers = headers_with(None, signature.as_deref());
        let err = validator_at(&secret, 1_718_093_846)
            .validate(&headers, &Bytes::from(body))
            .unwrap_err();
        prop_assert_eq!(err, WebhookError::MissingTimestamp);
    }

    #[test]
    fn prop_non_numeric_timestamp_is_invalid(ts in "[a-zA-Z][a-zA-Z0-9]{0,15}") {
        let headers = headers_with(Some(&ts), Some("deadbeef"));
        let err = validator_at("secret", 1_718_093_846)
            .validate(&headers, &Bytes::new())
            .unwrap_err();
        prop_assert_eq!(err, WebhookError::InvalidTimestamp { value: ts });
    }

    #[test]
    fn prop_rotation_accepts_old_and_new_only(
        (a, b, c) in arb_three_secrets(),
        body in arb_body(),
    ) {
        let now = 1_718_093_846;
        let mut validator = validator_at(&a, now);
        validator.set_previous_secret(a.clone());
        validator.set_active_secret(b.clone());
        let body = Bytes::from(body);

        let via_a = validator.validate(&signed_headers(now, &body, &a), &body).unwrap();
        prop_assert_eq!(via_a.matched_secret(), SecretSlot::Previous);

        let via_b = validator.validate(&signed_headers(now, &body, &b), &body).unwrap();
        prop_assert_eq!(via_b.matched_secret(), SecretSlot::Active);

        let via_c = validator.validate(&signed_headers(now, &body, &c), &body);
        prop_assert_eq!(via_c.unwrap_err(), WebhookError::InvalidSignature);
    }

    #[test]
    fn prop_tampered_body_is_rejected(
        body in arb_body().prop_filter("needs a byte to flip", |b| !b.is_empty()),
        index in any::<prop::sample::Index>(),
        secret in arb_secret(),
    ) {
        let now = 1_718_093_846;
        let headers = signed_headers(now, &body, &secret);

        let mut tampered = body.clone();
        let i = index.index(tampered.len());
        tampered[i] ^= 0x01;

        let err = validator_at(&secret, now)
            .validate(&headers, &Bytes::from(tampered))
            .unwrap_err();
        prop_assert_eq!(err, WebhookError::InvalidSignature);
    }
}

// ============================================================================
// BOUNDARY TESTS
// ============================================================================

#[test]
fn test_replay_window_boundaries_through_validator() {
    let now = 1_718_093_846;
    let body = Bytes::from_static(b"{}");
    let validator = validator_at("secret", now);

    for ts in [now - WINDOW, now - WINDOW + 1, now + WINDOW - 1, now + WINDOW] {
        assert!(
            validator.validate(&signed_headers(ts, &body, "secret"), &body).is_ok(),
            "timestamp {} should be accepted",
            ts
        );
    }

    for ts in [now - WINDOW - 1, now + WINDOW + 1] {
        let err = validator
            .validate(&signed_headers(ts, &body, "secret"), &body)
            .unwrap_err();
        assert!(matches!(err, WebhookError::StaleRequest { .. }));
    }
}

//! In-process tests for the webhook receiver router.
//!
//! Requests are driven through `tower::ServiceExt::oneshot`; the clock is
//! pinned so signed fixtures stay inside the replay window.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use printix_receiver::{
    create_router, AppState, EventHandler, HandlerError, LoggingEventHandler,
};
use printix_test_utils::{
    discrete_body, fixed_clock, headers_with, signed_headers, FIXED_NOW, SAMPLE_BATCH_BODY,
    SAMPLE_DISCRETE_BODY,
};
use printix_webhook::{EventFormat, ParsedWebhook, SecretSlot, ValidatedWebhook, WebhookValidator};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const SECRET: &str = "receiver-test-secret";
const MAX_BODY: usize = 64 * 1024;

// ============================================================================
// TEST CONFIGURATION
// ============================================================================

#[derive(Default)]
struct RecordingHandler {
    seen: Mutex<Vec<(SecretSlot, ParsedWebhook)>>,
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn handle(
        &self,
        webhook: &ValidatedWebhook,
        event: ParsedWebhook,
    ) -> Result<(), HandlerError> {
        self.seen.lock().unwrap().push((webhook.matched_secret(), event));
        Ok(())
    }
}

struct FailingHandler;

#[async_trait]
impl EventHandler for FailingHandler {
    async fn handle(
        &self,
        _webhook: &ValidatedWebhook,
        _event: ParsedWebhook,
    ) -> Result<(), HandlerError> {
        Err(HandlerError::new("downstream unavailable"))
    }
}

fn validator() -> WebhookValidator {
    WebhookValidator::new(SECRET).with_clock(Arc::new(fixed_clock()))
}

fn app_with(
    validator: WebhookValidator,
    format: EventFormat,
    handler: Arc<dyn EventHandler>,
) -> Router {
    create_router(AppState::new(validator, format, handler), MAX_BODY)
}

fn webhook_request(headers: HeaderMap, body: impl Into<Body>) -> Request<Body> {
    let mut request = Request::builder()
        .method("POST")
        .uri("/webhooks")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();
    request.headers_mut().extend(headers);
    request
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// ACCEPTED DELIVERIES
// ============================================================================

#[tokio::test]
async fn batch_delivery_is_dispatched() {
    let handler = Arc::new(RecordingHandler::default());
    let app = app_with(validator(), EventFormat::Batch, handler.clone());

    let headers = signed_headers(FIXED_NOW, SAMPLE_BATCH_BODY.as_bytes(), SECRET);
    let response = app
        .oneshot(webhook_request(headers, SAMPLE_BATCH_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let seen = handler.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    match &seen[0] {
        (SecretSlot::Active, ParsedWebhook::Batch(payload)) => {
            assert_eq!(payload.events.len(), 1);
            assert!(payload.events[0].is_user_create_event());
        }
        other => panic!("unexpected dispatch: {:?}", other),
    }
}

#[tokio::test]
async fn discrete_delivery_is_dispatched() {
    let handler = Arc::new(RecordingHandler::default());
    let app = app_with(validator(), EventFormat::Discrete, handler.clone());

    let headers = signed_headers(FIXED_NOW, SAMPLE_DISCRETE_BODY.as_bytes(), SECRET);
    let response = app
        .oneshot(webhook_request(headers, SAMPLE_DISCRETE_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let seen = handler.seen.lock().unwrap();
    match &seen[0].1 {
        ParsedWebhook::Discrete(event) => assert!(event.is_job_status_change_event()),
        other => panic!("unexpected dispatch: {:?}", other),
    }
}

#[tokio::test]
async fn logging_handler_accepts_unknown_discrete_types() {
    let app = app_with(validator(), EventFormat::Discrete, Arc::new(LoggingEventHandler));
    let body = discrete_body("printer.online", json!({"printerId": "printer-456"}));

    let headers = signed_headers(FIXED_NOW, &body, SECRET);
    let response = app.oneshot(webhook_request(headers, body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn previous_secret_accepted_during_rotation() {
    let handler = Arc::new(RecordingHandler::default());
    let mut validator = WebhookValidator::new("old-secret").with_clock(Arc::new(fixed_clock()));
    validator.rotate("new-secret");
    let app = app_with(validator, EventFormat::Batch, handler.clone());

    let headers = signed_headers(FIXED_NOW, SAMPLE_BATCH_BODY.as_bytes(), "old-secret");
    let response = app
        .oneshot(webhook_request(headers, SAMPLE_BATCH_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(handler.seen.lock().unwrap()[0].0, SecretSlot::Previous);
}

// ============================================================================
// REJECTIONS
// ============================================================================

#[tokio::test]
async fn header_failures_are_bad_requests() {
    let signature = "ab".repeat(64);
    let now = FIXED_NOW.to_string();
    let cases = [
        (headers_with(None, Some(signature.as_str())), "MISSING_TIMESTAMP"),
        (headers_with(Some("abc"), Some(signature.as_str())), "INVALID_TIMESTAMP"),
        (headers_with(Some(now.as_str()), None), "MISSING_SIGNATURE"),
    ];

    for (headers, code) in cases {
        let handler = Arc::new(RecordingHandler::default());
        let app = app_with(validator(), EventFormat::Batch, handler.clone());
        let response = app
            .oneshot(webhook_request(headers, SAMPLE_BATCH_BODY))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", code);
        assert_eq!(json_body(response).await["code"], code);
        assert!(handler.seen.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn stale_request_is_unauthorized() {
    let app = app_with(validator(), EventFormat::Batch, Arc::new(LoggingEventHandler));
    let headers = signed_headers(FIXED_NOW - 901, SAMPLE_BATCH_BODY.as_bytes(), SECRET);

    let response = app
        .oneshot(webhook_request(headers, SAMPLE_BATCH_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["code"], "STALE_REQUEST");
}

#[tokio::test]
async fn wrong_secret_is_unauthorized() {
    let handler = Arc::new(RecordingHandler::default());
    let app = app_with(validator(), EventFormat::Batch, handler.clone());
    let headers = signed_headers(FIXED_NOW, SAMPLE_BATCH_BODY.as_bytes(), "someone-else");

    let response = app
        .oneshot(webhook_request(headers, SAMPLE_BATCH_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["code"], "INVALID_SIGNATURE");
    assert!(handler.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn tampered_body_is_unauthorized() {
    let app = app_with(validator(), EventFormat::Batch, Arc::new(LoggingEventHandler));
    let headers = signed_headers(FIXED_NOW, SAMPLE_BATCH_BODY.as_bytes(), SECRET);
    let tampered = SAMPLE_BATCH_BODY.replace("456", "457");

    let response = app.oneshot(webhook_request(headers, tampered)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authentic_but_malformed_body_is_bad_request() {
    let body = "{\"emitted\": \"yesterday\"}";
    let app = app_with(validator(), EventFormat::Batch, Arc::new(LoggingEventHandler));
    let headers = signed_headers(FIXED_NOW, body.as_bytes(), SECRET);

    let response = app.oneshot(webhook_request(headers, body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "MALFORMED_PAYLOAD");
}

#[tokio::test]
async fn batch_body_in_discrete_deployment_is_bad_request() {
    let app = app_with(validator(), EventFormat::Discrete, Arc::new(LoggingEventHandler));
    let headers = signed_headers(FIXED_NOW, SAMPLE_BATCH_BODY.as_bytes(), SECRET);

    let response = app
        .oneshot(webhook_request(headers, SAMPLE_BATCH_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn handler_failure_is_server_error() {
    let app = app_with(validator(), EventFormat::Batch, Arc::new(FailingHandler));
    let headers = signed_headers(FIXED_NOW, SAMPLE_BATCH_BODY.as_bytes(), SECRET);

    let response = app
        .oneshot(webhook_request(headers, SAMPLE_BATCH_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["code"], "HANDLER_FAILED");
    assert!(!body["message"].as_str().unwrap().contains("downstream"));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = app_with(validator(), EventFormat::Batch, Arc::new(LoggingEventHandler));
    let body = vec![b'x'; MAX_BODY + 1];
    let headers = signed_headers(FIXED_NOW, &body, SECRET);

    let response = app.oneshot(webhook_request(headers, body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// ============================================================================
// HEALTH
// ============================================================================

#[tokio::test]
async fn health_reports_ok() {
    let app = app_with(validator(), EventFormat::Batch, Arc::new(LoggingEventHandler));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn webhooks_route_rejects_get() {
    let app = app_with(validator(), EventFormat::Batch, Arc::new(LoggingEventHandler));

    let response = app
        .oneshot(Request::builder().uri("/webhooks").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

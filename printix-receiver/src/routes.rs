//! HTTP routes.
//!
//! - `POST /webhooks` validates, parses, and dispatches one delivery
//! - `GET /health` liveness check

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::error::ReceiverResult;
use crate::state::AppState;

pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/webhooks", post(receive_webhook))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ReceiverResult<StatusCode> {
    let (validated, event) = state
        .validator
        .validate_and_parse(&headers, &body, state.format)?;

    state.handler.handle(&validated, event).await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

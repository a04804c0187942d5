//! Printix webhook receiver entry point.

use axum::Router;
use printix_receiver::{
    create_router, init_tracing, AppState, ReceiverConfig, ReceiverError, ReceiverResult,
};

#[tokio::main]
async fn main() -> ReceiverResult<()> {
    let config = ReceiverConfig::from_env()?;
    init_tracing(config.log_format)?;

    let state = AppState::from_config(&config);
    let app: Router = create_router(state, config.max_body_bytes);

    let addr = config.bind_addr;
    tracing::info!(
        %addr,
        format = %config.format,
        rotating = config.previous_secret.is_some(),
        "Starting Printix webhook receiver"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ReceiverError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ReceiverError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

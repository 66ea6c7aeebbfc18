use crate::exporter::state::ExporterState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use prometheus::{Encoder, TextEncoder};
use tracing::error;

pub const METRICS_ENDPOINT: &str = "/metrics";

/// The scrape runs on its own task and reaches logout even when the client
/// disconnects first.
pub async fn metrics(State(state): State<ExporterState>) -> Response {
    let engine = state.engine();
    match tokio::spawn(async move { engine.collect().await }).await {
        Ok(Ok(body)) => (
            [(header::CONTENT_TYPE, TextEncoder::new().format_type().to_string())],
            body,
        )
            .into_response(),
        Ok(Err(e)) => {
            error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            error!("scrape task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

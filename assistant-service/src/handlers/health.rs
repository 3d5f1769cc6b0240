use crate::services::metrics::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde_json::json;

/// Liveness. Running without persistence is still healthy.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let persistence = if state.assistant.history_store().is_available() {
        "connected"
    } else {
        "disabled"
    };

    Json(json!({
        "status": "ok",
        "service": "assistant-service",
        "version": env!("CARGO_PKG_VERSION"),
        "persistence": persistence
    }))
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        get_metrics(),
    )
}

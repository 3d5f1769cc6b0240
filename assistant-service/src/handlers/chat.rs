use crate::models::{AskResponse, HistoryResponse, Query};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use service_core::error::AppError;

/// `POST /ask`. Always 200 for a well-formed body; see [`crate::services::Assistant::ask`].
pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<Query>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let Json(query) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Rejected /ask body");
        AppError::BadRequest(anyhow::anyhow!(e.body_text()))
    })?;

    Ok(Json(state.assistant.ask(&query).await))
}

/// `GET /history`. Always 200.
pub async fn history(State(state): State<AppState>) -> Json<HistoryResponse> {
    Json(state.assistant.history().await)
}

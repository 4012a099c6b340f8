//! Health and metrics endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::state::SharedState;
use crate::utils::{run_blocking, ApiError};

pub async fn health_handler(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    let contacts = run_blocking(&state, |service| service.count()).await?;
    let body = serde_json::json!({
        "status": "ok",
        "contacts": contacts,
    });
    Ok((StatusCode::OK, axum::Json(body)))
}

pub async fn metrics_handler(State(state): State<SharedState>) -> impl IntoResponse {
    (StatusCode::OK, axum::Json(state.service.metrics()))
}

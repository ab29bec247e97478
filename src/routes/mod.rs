use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::app_state::AppState;
use crate::models::submission::FieldErrors;

pub mod health;
pub mod jobs;
pub mod metrics;
pub mod submit;
pub mod summary;

/// Routes backed by [`AppState`]. The Prometheus endpoint is attached by the
/// binary since it carries its own state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/submit", axum::routing::post(submit::submit_channel))
        .route("/api/performance-summary", get(summary::toggle_summary))
        .route("/api/jobs/{job_id}", get(jobs::get_job))
        .with_state(state)
}

/// Error body returned by every API route.
#[derive(Debug)]
pub enum ApiError {
    Validation(FieldErrors),
    NotFound(&'static str),
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid input.", "details": details })),
            )
                .into_response(),
            ApiError::NotFound(what) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": what }))).into_response()
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response(),
        }
    }
}

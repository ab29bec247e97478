use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::job::JobRecord;
use crate::routes::ApiError;

/// GET /api/jobs/{job_id}: current state of a title job.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobRecord>, ApiError> {
    match state.jobs.get(job_id).await {
        Ok(Some(job)) => Ok(Json(job)),
        Ok(None) => Err(ApiError::NotFound("Job not found")),
        Err(e) => {
            tracing::error!(job_id = %job_id, error = %e, "Failed to load job");
            Err(ApiError::Internal)
        }
    }
}

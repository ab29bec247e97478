use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::models::event::{Event, SubmitPayload};
use crate::models::submission::{
    field_errors, ApiResponse, FieldErrors, SubmitData, SubmitRequest,
};
use crate::routes::ApiError;

const ACCEPTED_MESSAGE: &str =
    "Submission received. You will get an email soon containing the suggestions.";

/// POST /api/submit: queue a title-improvement job for a channel.
pub async fn submit_channel(
    State(state): State<AppState>,
    body: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SubmitData>>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::info!(error = %rejection, "Rejected malformed submission");
        ApiError::Validation(FieldErrors::from([(
            "body".to_string(),
            vec![rejection.body_text()],
        )]))
    })?;

    let request = body.trimmed();
    if let Err(report) = request.validate() {
        tracing::info!(errors = %report, "Rejected submission");
        return Err(ApiError::Validation(field_errors(&report)));
    }

    let job = state
        .jobs
        .create(&request.channel, &request.email)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create job record");
            ApiError::Internal
        })?;

    let event = Event::Submit(SubmitPayload {
        job_id: job.job_id,
        channel: job.channel.clone(),
        email: job.email.clone(),
    });

    if let Err(e) = state.events.publish(&event).await {
        tracing::error!(job_id = %job.job_id, error = %e, "Failed to publish submit event");
        if let Err(e) = state.jobs.mark_failed(job.job_id, &e.to_string()).await {
            tracing::error!(job_id = %job.job_id, error = %e, "Failed to record job failure");
        }
        return Err(ApiError::Internal);
    }

    metrics::counter!("title_jobs_submitted_total").increment(1);
    tracing::info!(job_id = %job.job_id, channel = %job.channel, "Job submitted");

    Ok(Json(ApiResponse {
        success: true,
        message: ACCEPTED_MESSAGE.to_string(),
        data: SubmitData { job_id: job.job_id },
    }))
}

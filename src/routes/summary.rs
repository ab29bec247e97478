use axum::extract::{Query, State};
use axum::Json;

use crate::app_state::AppState;
use crate::models::submission::{ApiResponse, ToggleData, ToggleSummaryQuery};
use crate::models::summary::ChannelInfo;
use crate::routes::ApiError;

/// GET /api/performance-summary: set the channel the scheduled summary
/// reports on, and whether it runs at all.
pub async fn toggle_summary(
    State(state): State<AppState>,
    Query(query): Query<ToggleSummaryQuery>,
) -> Result<Json<ApiResponse<ToggleData>>, ApiError> {
    let channel = ChannelInfo {
        channel_id: query.channel_id,
        channel_name: query.channel_name,
        should_enable_summary: query.should_enable_summary,
    };

    state
        .settings
        .save(&channel, &query.email)
        .await
        .map_err(|e| {
            tracing::error!(channel_id = %channel.channel_id, error = %e, "Failed to store summary target");
            ApiError::Internal
        })?;

    tracing::info!(
        channel_id = %channel.channel_id,
        enabled = channel.should_enable_summary,
        "Performance summary toggled"
    );

    Ok(Json(ApiResponse {
        success: true,
        message: "Channel state set successfully! Performance summary toggled.".to_string(),
        data: ToggleData {
            channel_id: channel.channel_id,
            should_enable_summary: channel.should_enable_summary,
        },
    }))
}

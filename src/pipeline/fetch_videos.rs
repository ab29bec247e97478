use std::sync::Arc;

use async_trait::async_trait;

use crate::db::jobs::JobRepository;
use crate::models::event::{
    ChannelResolvedPayload, Event, StepFailurePayload, Topic, VideosFetchedPayload,
};
use crate::models::job::JobStatus;
use crate::pipeline::{record_failure, unexpected_event, Step, StepError, INTERACTIVE_VIDEO_LIMIT};
use crate::services::youtube::VideoPlatform;

const NAME: &str = "FetchVideos";
const FAILURE_MESSAGE: &str = "Failed to fetch videos. Please try again!";

/// Lists the resolved channel's most recent uploads.
pub struct FetchVideos {
    jobs: JobRepository,
    platform: Arc<dyn VideoPlatform>,
}

impl FetchVideos {
    pub fn new(jobs: JobRepository, platform: Arc<dyn VideoPlatform>) -> Self {
        Self { jobs, platform }
    }

    async fn fetch(&self, data: &ChannelResolvedPayload) -> Result<Event, StepError> {
        if data.channel_id.trim().is_empty() {
            return Err(StepError::MissingChannelId);
        }

        tracing::info!(job_id = %data.job_id, channel_id = %data.channel_id, "Fetching channel videos");

        self.jobs.advance(data.job_id, JobStatus::FetchingVideos).await?;

        let videos = self
            .platform
            .latest_videos(&data.channel_id, INTERACTIVE_VIDEO_LIMIT)
            .await?;

        if videos.is_empty() {
            tracing::warn!(job_id = %data.job_id, channel_id = %data.channel_id, "No videos found for the channel");
            return Err(StepError::NoVideos);
        }

        tracing::info!(job_id = %data.job_id, video_count = videos.len(), "Videos fetched");

        Ok(Event::VideosFetched(VideosFetchedPayload {
            job_id: data.job_id,
            channel_name: data.channel_name.clone(),
            channel_id: data.channel_id.clone(),
            videos,
            email: data.email.clone(),
        }))
    }
}

#[async_trait]
impl Step for FetchVideos {
    fn name(&self) -> &'static str {
        NAME
    }

    fn subscribes(&self) -> &'static [Topic] {
        &[Topic::ChannelResolved]
    }

    fn emits(&self) -> &'static [Topic] {
        &[Topic::VideosFetched, Topic::VideosError]
    }

    async fn handle(&self, event: &Event) -> Option<Event> {
        let Event::ChannelResolved(data) = event else {
            return unexpected_event(NAME, event);
        };

        match self.fetch(data).await {
            Ok(next) => Some(next),
            Err(err) => {
                if !record_failure(&self.jobs, NAME, data.job_id, &err).await {
                    return None;
                }
                Some(Event::VideosError(StepFailurePayload {
                    job_id: data.job_id,
                    email: data.email.clone(),
                    channel_name: Some(data.channel_name.clone()),
                    error: Some(err.user_message(FAILURE_MESSAGE)),
                }))
            }
        }
    }
}

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::jobs::JobRepository;
use crate::models::event::{ChannelResolvedPayload, Event, StepFailurePayload, SubmitPayload, Topic};
use crate::models::job::JobStatus;
use crate::pipeline::{record_failure, unexpected_event, Step, StepError};
use crate::services::youtube::VideoPlatform;

const NAME: &str = "ResolveChannel";
const FAILURE_MESSAGE: &str = "Failed to resolve channel. Please try again!";

/// Turns a handle (`@name`) or free-text channel name into a channel id.
pub struct ResolveChannel {
    jobs: JobRepository,
    platform: Arc<dyn VideoPlatform>,
}

impl ResolveChannel {
    pub fn new(jobs: JobRepository, platform: Arc<dyn VideoPlatform>) -> Self {
        Self { jobs, platform }
    }

    async fn resolve(&self, data: &SubmitPayload) -> Result<Event, StepError> {
        tracing::info!(job_id = %data.job_id, channel = %data.channel, "Resolving YouTube channel");

        self.jobs
            .advance(data.job_id, JobStatus::ResolvingChannel)
            .await?;

        let query = search_query(&data.channel);
        let channel = self
            .platform
            .search_channel(query)
            .await?
            .ok_or(StepError::ChannelNotFound)?;

        self.jobs
            .record_channel(data.job_id, &channel.channel_id, &channel.channel_name)
            .await?;

        tracing::info!(
            job_id = %data.job_id,
            channel_id = %channel.channel_id,
            channel_name = %channel.channel_name,
            "Channel resolved"
        );

        Ok(Event::ChannelResolved(ChannelResolvedPayload {
            job_id: data.job_id,
            channel_id: channel.channel_id,
            channel_name: channel.channel_name,
            email: data.email.clone(),
        }))
    }
}

/// Handles are searched without their `@` sigil; names are searched as-is.
pub fn search_query(channel: &str) -> &str {
    channel.strip_prefix('@').unwrap_or(channel)
}

#[async_trait]
impl Step for ResolveChannel {
    fn name(&self) -> &'static str {
        NAME
    }

    fn subscribes(&self) -> &'static [Topic] {
        &[Topic::Submit]
    }

    fn emits(&self) -> &'static [Topic] {
        &[Topic::ChannelResolved, Topic::ChannelError]
    }

    async fn handle(&self, event: &Event) -> Option<Event> {
        let Event::Submit(data) = event else {
            return unexpected_event(NAME, event);
        };

        match self.resolve(data).await {
            Ok(next) => Some(next),
            Err(err) => {
                if !record_failure(&self.jobs, NAME, data.job_id, &err).await {
                    return None;
                }
                Some(Event::ChannelError(StepFailurePayload {
                    job_id: data.job_id,
                    email: data.email.clone(),
                    channel_name: None,
                    error: Some(err.user_message(FAILURE_MESSAGE)),
                }))
            }
        }
    }
}

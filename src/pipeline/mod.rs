//! Event-driven title-improvement pipeline.
//!
//! ```text
//! yt.submit ─► ResolveChannel ─► FetchVideos ─► GenerateTitles ─► SendEmail ─► yt.email.sent
//!                   │                 │               │               │
//!                   └── *.error ──────┴───────────────┴───────────────┴──► ErrorNotifier
//! ```
//!
//! Each step consumes one event, advances the job record, and returns exactly
//! one success or error event. Failures never escape a step: they are
//! recorded on the job and turned into that step's error topic.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::jobs::{JobRepository, JobUpdateError};
use crate::models::event::{Event, Topic};
use crate::services::email::{EmailError, Mailer};
use crate::services::gemini::{GenerationError, TextGenerator};
use crate::services::youtube::{VideoPlatform, YouTubeError};

pub mod completion;
pub mod error_notifier;
pub mod fetch_videos;
pub mod generate_titles;
pub mod performance;
pub mod registry;
pub mod resolve_channel;
pub mod send_email;

pub use registry::{Pipeline, Registry, RegistryError};

/// Videos fetched for an interactive title job.
pub const INTERACTIVE_VIDEO_LIMIT: u32 = 5;

/// Name under which the submission route is registered as an event source.
pub const SUBMIT_SOURCE: &str = "SubmitChannel";

/// External services the steps call.
#[derive(Clone)]
pub struct Collaborators {
    pub jobs: JobRepository,
    pub platform: Arc<dyn VideoPlatform>,
    pub generator: Arc<dyn TextGenerator>,
    pub mailer: Arc<dyn Mailer>,
    pub public_base_url: String,
}

/// Wire every step of the title pipeline plus the terminal tracker.
pub fn build_pipeline(c: &Collaborators) -> Result<Pipeline, RegistryError> {
    Registry::new()
        .source(SUBMIT_SOURCE, &[Topic::Submit])
        .source(performance::SOURCE_NAME, performance::EMITS)
        .register(Arc::new(resolve_channel::ResolveChannel::new(
            c.jobs.clone(),
            c.platform.clone(),
        )))
        .register(Arc::new(fetch_videos::FetchVideos::new(
            c.jobs.clone(),
            c.platform.clone(),
        )))
        .register(Arc::new(generate_titles::GenerateTitles::new(
            c.jobs.clone(),
            c.generator.clone(),
        )))
        .register(Arc::new(send_email::SendEmail::new(
            c.jobs.clone(),
            c.mailer.clone(),
            c.public_base_url.clone(),
        )))
        .register(Arc::new(error_notifier::ErrorNotifier::new(c.mailer.clone())))
        .register(Arc::new(completion::CompletionTracker))
        .build()
}

pub fn performance_reporter(c: &Collaborators) -> performance::PerformanceReporter {
    performance::PerformanceReporter::new(c.platform.clone(), c.generator.clone(), c.mailer.clone())
}

/// One unit of the pipeline, subscribed to a fixed set of topics.
#[async_trait]
pub trait Step: Send + Sync {
    fn name(&self) -> &'static str;

    fn subscribes(&self) -> &'static [Topic];

    /// Every topic `handle` may return. Anything else is dropped.
    fn emits(&self) -> &'static [Topic];

    async fn handle(&self, event: &Event) -> Option<Event>;
}

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("channel not found")]
    ChannelNotFound,

    #[error("channel id missing")]
    MissingChannelId,

    #[error("No videos found")]
    NoVideos,

    #[error("No video details found")]
    NoStatistics,

    #[error("model returned {actual} titles for {expected} videos")]
    TitleCountMismatch { expected: usize, actual: usize },

    #[error("failed to parse model response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    YouTube(#[from] YouTubeError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Email(#[from] EmailError),

    #[error(transparent)]
    Job(#[from] JobUpdateError),
}

impl StepError {
    /// Message safe to show the requester. Business failures are specific;
    /// technical ones collapse to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            StepError::ChannelNotFound => "No channel found for this name or handle".to_string(),
            StepError::NoVideos => "No videos found for this channel".to_string(),
            StepError::NoStatistics => "No video statistics found for this channel".to_string(),
            _ => fallback.to_string(),
        }
    }

    /// The job already reached a terminal state; the event must be dropped.
    pub fn job_closed(&self) -> bool {
        matches!(self, StepError::Job(JobUpdateError::Closed { .. }))
    }
}

/// Record a step failure on the job.
///
/// Returns `false` if the job is already terminal, in which case the caller
/// emits nothing.
pub(crate) async fn record_failure(
    jobs: &JobRepository,
    step: &'static str,
    job_id: Uuid,
    err: &StepError,
) -> bool {
    if err.job_closed() {
        tracing::warn!(step, job_id = %job_id, error = %err, "Dropping event for closed job");
        return false;
    }

    tracing::error!(step, job_id = %job_id, error = %err, "Step failed");

    if let Err(e) = jobs.mark_failed(job_id, &err.to_string()).await {
        tracing::error!(step, job_id = %job_id, error = %e, "Failed to record job failure");
    }
    true
}

pub(crate) fn unexpected_event(step: &'static str, event: &Event) -> Option<Event> {
    tracing::warn!(step, topic = %event.topic(), "Ignoring event with unexpected payload");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_failures_keep_specific_message() {
        let generic = "Failed to fetch videos. Please try again!";
        assert_eq!(StepError::NoVideos.user_message(generic), "No videos found for this channel");
        assert_eq!(
            StepError::Generation(GenerationError::EmptyResponse).user_message(generic),
            generic
        );
    }

    #[test]
    fn test_job_closed_detection() {
        let err = StepError::Job(JobUpdateError::Closed {
            job_id: Uuid::new_v4(),
            status: crate::models::job::JobStatus::Failed,
        });
        assert!(err.job_closed());
        assert!(!StepError::ChannelNotFound.job_closed());
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::db::jobs::JobRepository;
use crate::models::event::{
    Event, StepFailurePayload, TitlesReadyPayload, Topic, VideosFetchedPayload,
};
use crate::models::job::JobStatus;
use crate::models::video::{ImprovedTitle, Video};
use crate::pipeline::{record_failure, unexpected_event, Step, StepError};
use crate::services::gemini::{strip_code_fences, GenerationRequest, TextGenerator};
use crate::services::prompts;

const NAME: &str = "GenerateTitles";
const FAILURE_MESSAGE: &str = "Failed to generate improved titles. Please try again!";

#[derive(Deserialize)]
struct TitleResponse {
    titles: Vec<GeneratedTitle>,
}

#[derive(Deserialize)]
struct GeneratedTitle {
    original: String,
    improved: String,
    rationale: String,
}

/// Asks the model for a better title per video.
pub struct GenerateTitles {
    jobs: JobRepository,
    generator: Arc<dyn TextGenerator>,
}

impl GenerateTitles {
    pub fn new(jobs: JobRepository, generator: Arc<dyn TextGenerator>) -> Self {
        Self { jobs, generator }
    }

    async fn generate(&self, data: &VideosFetchedPayload) -> Result<Event, StepError> {
        if data.videos.is_empty() {
            return Err(StepError::NoVideos);
        }

        tracing::info!(
            job_id = %data.job_id,
            channel_name = %data.channel_name,
            video_count = data.videos.len(),
            "Generating improved titles"
        );

        self.jobs.advance(data.job_id, JobStatus::GeneratingTitles).await?;

        let raw = self
            .generator
            .generate(GenerationRequest {
                prompt: prompts::title_prompt(&data.videos, &data.channel_name),
                system_instruction: prompts::TITLE_SYSTEM_INSTRUCTION,
                temperature: prompts::TITLE_TEMPERATURE,
                json_response: true,
            })
            .await?;

        let improved_titles = pair_titles(&raw, &data.videos)?;
        self.jobs
            .record_titles(data.job_id, improved_titles.clone())
            .await?;

        tracing::info!(job_id = %data.job_id, count = improved_titles.len(), "Titles generated");

        Ok(Event::TitlesReady(TitlesReadyPayload {
            job_id: data.job_id,
            channel_name: data.channel_name.clone(),
            channel_id: data.channel_id.clone(),
            improved_titles,
            email: data.email.clone(),
        }))
    }
}

/// Parse the model's `{"titles": [...]}` answer and pair entry `i` with
/// video `i`. A count mismatch is rejected rather than mis-pairing URLs.
pub fn pair_titles(raw: &str, videos: &[Video]) -> Result<Vec<ImprovedTitle>, StepError> {
    let response: TitleResponse = serde_json::from_str(strip_code_fences(raw))?;

    if response.titles.len() != videos.len() {
        return Err(StepError::TitleCountMismatch {
            expected: videos.len(),
            actual: response.titles.len(),
        });
    }

    Ok(response
        .titles
        .into_iter()
        .zip(videos)
        .map(|(title, video)| ImprovedTitle {
            original: title.original,
            improved: title.improved,
            rationale: title.rationale,
            url: video.url.clone(),
        })
        .collect())
}

#[async_trait]
impl Step for GenerateTitles {
    fn name(&self) -> &'static str {
        NAME
    }

    fn subscribes(&self) -> &'static [Topic] {
        &[Topic::VideosFetched]
    }

    fn emits(&self) -> &'static [Topic] {
        &[Topic::TitlesReady, Topic::TitlesError]
    }

    async fn handle(&self, event: &Event) -> Option<Event> {
        let Event::VideosFetched(data) = event else {
            return unexpected_event(NAME, event);
        };

        match self.generate(data).await {
            Ok(next) => Some(next),
            Err(err) => {
                if !record_failure(&self.jobs, NAME, data.job_id, &err).await {
                    return None;
                }
                Some(Event::TitlesError(StepFailurePayload {
                    job_id: data.job_id,
                    email: data.email.clone(),
                    channel_name: Some(data.channel_name.clone()),
                    error: Some(FAILURE_MESSAGE.to_string()),
                }))
            }
        }
    }
}

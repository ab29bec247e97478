//! Scheduled channel performance summary.
//!
//! Runs from the cron scheduler, not from the event chain, and never touches
//! job records. A run either emits one `yt.performance.ready` or one
//! `yt.performance.error`, or nothing when no enabled target is stored.

use std::sync::Arc;

use crate::models::event::{Event, PerformanceErrorPayload, PerformanceReadyPayload, Topic};
use crate::models::summary::{PerformanceSummary, SummaryTarget};
use crate::pipeline::StepError;
use crate::services::email::Mailer;
use crate::services::gemini::{strip_code_fences, GenerationRequest, TextGenerator};
use crate::services::prompts;
use crate::services::templates;
use crate::services::youtube::VideoPlatform;

/// Videos analyzed per scheduled summary.
pub const REPORT_VIDEO_LIMIT: u32 = 10;

pub const SOURCE_NAME: &str = "PerformanceReporter";
pub const EMITS: &[Topic] = &[Topic::PerformanceReady, Topic::PerformanceError];

pub struct PerformanceReporter {
    platform: Arc<dyn VideoPlatform>,
    generator: Arc<dyn TextGenerator>,
    mailer: Arc<dyn Mailer>,
}

impl PerformanceReporter {
    pub fn new(
        platform: Arc<dyn VideoPlatform>,
        generator: Arc<dyn TextGenerator>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            platform,
            generator,
            mailer,
        }
    }

    /// One scheduled run against `target`. Returns `None` when there is no
    /// target or it has been toggled off.
    pub async fn run(&self, target: Option<&SummaryTarget>) -> Option<Event> {
        let Some(target) = target.filter(|t| t.is_enabled()) else {
            tracing::info!("Performance summary generation is disabled");
            return None;
        };

        match self.report(target).await {
            Ok(event) => Some(event),
            Err(err) => {
                tracing::error!(
                    channel_id = %target.channel.channel_id,
                    error = %err,
                    "Error generating performance summary"
                );
                Some(Event::PerformanceError(PerformanceErrorPayload {
                    error: err.to_string(),
                }))
            }
        }
    }

    async fn report(&self, target: &SummaryTarget) -> Result<Event, StepError> {
        let channel = &target.channel;
        tracing::info!(
            channel_id = %channel.channel_id,
            channel_name = %channel.channel_name,
            "Generating performance summary"
        );

        let videos = self
            .platform
            .latest_videos(&channel.channel_id, REPORT_VIDEO_LIMIT)
            .await?;
        if videos.is_empty() {
            return Err(StepError::NoVideos);
        }

        let ids: Vec<String> = videos.into_iter().map(|v| v.video_id).collect();
        let stats = self.platform.video_statistics(&ids).await?;
        if stats.is_empty() {
            return Err(StepError::NoStatistics);
        }

        tracing::info!(video_count = stats.len(), "Requesting performance summary from model");

        let raw = self
            .generator
            .generate(GenerationRequest {
                prompt: prompts::summary_prompt(&channel.channel_name, &stats)?,
                system_instruction: prompts::SUMMARY_SYSTEM_INSTRUCTION,
                temperature: prompts::SUMMARY_TEMPERATURE,
                json_response: false,
            })
            .await?;

        let summary: PerformanceSummary = serde_json::from_str(strip_code_fences(&raw))?;
        let email_html = templates::summary_email(&channel.channel_name, &summary);
        let subject = format!("Your performance summary for {}", channel.channel_name);

        let email_id = self
            .mailer
            .send(&target.email_to, &subject, &email_html)
            .await?;
        tracing::info!(email_id = %email_id, "Performance summary email sent");

        Ok(Event::PerformanceReady(PerformanceReadyPayload {
            channel_id: channel.channel_id.clone(),
            channel_name: channel.channel_name.clone(),
            summary,
            email_html,
        }))
    }
}

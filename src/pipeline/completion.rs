use async_trait::async_trait;

use crate::models::event::{Event, Topic};
use crate::pipeline::Step;

/// Terminal subscriber: counts and logs how each chain ended.
pub struct CompletionTracker;

#[async_trait]
impl Step for CompletionTracker {
    fn name(&self) -> &'static str {
        "CompletionTracker"
    }

    fn subscribes(&self) -> &'static [Topic] {
        &[
            Topic::EmailSent,
            Topic::ErrorNotified,
            Topic::PerformanceReady,
            Topic::PerformanceError,
        ]
    }

    fn emits(&self) -> &'static [Topic] {
        &[]
    }

    async fn handle(&self, event: &Event) -> Option<Event> {
        match event {
            Event::EmailSent(p) => {
                metrics::counter!("title_jobs_completed_total").increment(1);
                tracing::info!(job_id = %p.job_id, email_id = %p.email_id, "Job completed");
            }
            Event::ErrorNotified(p) => {
                tracing::info!(job_id = %p.job_id, email_id = %p.email_id, "Requester notified of failure");
            }
            Event::PerformanceReady(p) => {
                metrics::counter!("performance_summaries_total", "outcome" => "ready").increment(1);
                tracing::info!(channel_id = %p.channel_id, "Performance summary delivered");
            }
            Event::PerformanceError(p) => {
                metrics::counter!("performance_summaries_total", "outcome" => "error").increment(1);
                tracing::warn!(error = %p.error, "Performance summary failed");
            }
            _ => {}
        }
        None
    }
}

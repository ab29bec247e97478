use std::sync::Arc;

use async_trait::async_trait;

use crate::db::jobs::JobRepository;
use crate::models::event::{EmailSentPayload, Event, StepFailurePayload, TitlesReadyPayload, Topic};
use crate::models::job::JobStatus;
use crate::pipeline::{record_failure, unexpected_event, Step, StepError};
use crate::services::email::Mailer;
use crate::services::templates;

const NAME: &str = "SendEmail";
const FAILURE_MESSAGE: &str = "Failed to send email. Please try again!";

/// Emails the improved titles and completes the job.
pub struct SendEmail {
    jobs: JobRepository,
    mailer: Arc<dyn Mailer>,
    public_base_url: String,
}

impl SendEmail {
    pub fn new(jobs: JobRepository, mailer: Arc<dyn Mailer>, public_base_url: String) -> Self {
        Self {
            jobs,
            mailer,
            public_base_url,
        }
    }

    async fn send(&self, data: &TitlesReadyPayload) -> Result<Event, StepError> {
        tracing::info!(
            job_id = %data.job_id,
            email = %data.email,
            title_count = data.improved_titles.len(),
            "Sending titles email"
        );

        self.jobs.advance(data.job_id, JobStatus::SendingEmail).await?;

        let html = templates::titles_email(
            &self.public_base_url,
            &data.channel_id,
            &data.channel_name,
            &data.email,
            &data.improved_titles,
        );
        let subject = format!("Your AI-optimized titles for {}", data.channel_name);
        let email_id = self.mailer.send(&data.email, &subject, &html).await?;

        tracing::info!(job_id = %data.job_id, email_id = %email_id, "Email sent");

        // Already delivered; a record that cannot be closed is only logged.
        if let Err(e) = self
            .jobs
            .mark_completed(data.job_id, data.improved_titles.clone())
            .await
        {
            tracing::error!(job_id = %data.job_id, error = %e, "Failed to mark delivered job completed");
        }

        Ok(Event::EmailSent(EmailSentPayload {
            job_id: data.job_id,
            email_id,
            email: data.email.clone(),
        }))
    }
}

#[async_trait]
impl Step for SendEmail {
    fn name(&self) -> &'static str {
        NAME
    }

    fn subscribes(&self) -> &'static [Topic] {
        &[Topic::TitlesReady]
    }

    fn emits(&self) -> &'static [Topic] {
        &[Topic::EmailSent, Topic::EmailError]
    }

    async fn handle(&self, event: &Event) -> Option<Event> {
        let Event::TitlesReady(data) = event else {
            return unexpected_event(NAME, event);
        };

        match self.send(data).await {
            Ok(next) => Some(next),
            Err(err) => {
                if !record_failure(&self.jobs, NAME, data.job_id, &err).await {
                    return None;
                }
                Some(Event::EmailError(StepFailurePayload {
                    job_id: data.job_id,
                    email: data.email.clone(),
                    channel_name: Some(data.channel_name.clone()),
                    error: Some(FAILURE_MESSAGE.to_string()),
                }))
            }
        }
    }
}

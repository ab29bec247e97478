use std::sync::Arc;

use async_trait::async_trait;

use crate::models::event::{EmailSentPayload, Event, Topic};
use crate::pipeline::{unexpected_event, Step};
use crate::services::email::Mailer;
use crate::services::templates;

const NAME: &str = "ErrorNotifier";

/// Single sink for every job failure: emails the requester.
///
/// Its own failures are logged only and never fed back into the pipeline.
pub struct ErrorNotifier {
    mailer: Arc<dyn Mailer>,
}

impl ErrorNotifier {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }
}

#[async_trait]
impl Step for ErrorNotifier {
    fn name(&self) -> &'static str {
        NAME
    }

    fn subscribes(&self) -> &'static [Topic] {
        &[
            Topic::ChannelError,
            Topic::VideosError,
            Topic::TitlesError,
            Topic::EmailError,
        ]
    }

    fn emits(&self) -> &'static [Topic] {
        &[Topic::ErrorNotified]
    }

    async fn handle(&self, event: &Event) -> Option<Event> {
        let Some(failure) = event.as_failure() else {
            return unexpected_event(NAME, event);
        };

        tracing::info!(
            job_id = %failure.job_id,
            topic = %event.topic(),
            email = %failure.email,
            "Handling error notification"
        );

        let html = templates::failure_email(failure.channel_name.as_deref(), failure.error.as_deref());
        let subject = format!(
            "Request failed for {}",
            failure.channel_name.as_deref().unwrap_or("your channel")
        );

        match self.mailer.send(&failure.email, &subject, &html).await {
            Ok(email_id) => Some(Event::ErrorNotified(EmailSentPayload {
                job_id: failure.job_id,
                email_id,
                email: failure.email.clone(),
            })),
            Err(e) => {
                tracing::error!(job_id = %failure.job_id, error = %e, "Failed to send error notification");
                None
            }
        }
    }
}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const RESEND_URL: &str = "https://api.resend.com/emails";

/// Transactional email delivery. Returns the provider's message id.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<String, EmailError>;
}

/// Client for the Resend email API.
pub struct ResendClient {
    http: Client,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct SendEmailResponse {
    id: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

impl ResendClient {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for ResendClient {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<String, EmailError> {
        if self.api_key.trim().is_empty() {
            return Err(EmailError::MissingCredentials("RESEND_API_KEY"));
        }
        if self.from.trim().is_empty() {
            return Err(EmailError::MissingCredentials("RESEND_FROM_EMAIL"));
        }

        let response = self
            .http
            .post(RESEND_URL)
            .bearer_auth(&self.api_key)
            .json(&SendEmailRequest {
                from: &self.from,
                to: vec![to],
                subject,
                html,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| "Unknown Email Error".to_string());
            return Err(EmailError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let sent: SendEmailResponse = response.json().await?;
        Ok(sent.id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("{0} not configured")]
    MissingCredentials(&'static str),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Resend API error ({status}): {message}")]
    Provider { status: u16, message: String },
}

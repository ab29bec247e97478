use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use crate::models::video::ImprovedTitle;

/// Status of a title-improvement job as it moves through the pipeline.
///
/// The happy path is strictly ordered; `Failed` is reachable from every
/// non-terminal state. Neither `Completed` nor `Failed` is ever left.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, PartialEq, Eq)]
pub enum JobStatus {
    #[serde(rename = "queued")]
    #[strum(serialize = "queued")]
    Queued,
    #[serde(rename = "resolving channel")]
    #[strum(serialize = "resolving channel")]
    ResolvingChannel,
    #[serde(rename = "fetching videos")]
    #[strum(serialize = "fetching videos")]
    FetchingVideos,
    #[serde(rename = "generating titles")]
    #[strum(serialize = "generating titles")]
    GeneratingTitles,
    #[serde(rename = "sending email")]
    #[strum(serialize = "sending email")]
    SendingEmail,
    #[serde(rename = "completed")]
    #[strum(serialize = "completed")]
    Completed,
    #[serde(rename = "failed")]
    #[strum(serialize = "failed")]
    Failed,
}

impl JobStatus {
    fn rank(self) -> u8 {
        match self {
            JobStatus::Queued => 0,
            JobStatus::ResolvingChannel => 1,
            JobStatus::FetchingVideos => 2,
            JobStatus::GeneratingTitles => 3,
            JobStatus::SendingEmail => 4,
            JobStatus::Completed => 5,
            JobStatus::Failed => u8::MAX,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether a record in `self` may move to `next`.
    ///
    /// Forward moves may skip states but never go back, and nothing leaves a
    /// terminal state.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == JobStatus::Failed || next.rank() > self.rank()
    }
}

/// Persisted state of one job, keyed by `job_id` in the state store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub job_id: Uuid,
    pub channel: String,
    pub email: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub improved_titles: Vec<ImprovedTitle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    pub fn new(channel: String, email: String) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            channel,
            email,
            status: JobStatus::Queued,
            channel_id: None,
            channel_name: None,
            improved_titles: Vec::new(),
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// Fields to shallow-merge into a stored [`JobRecord`]. `None` leaves the
/// stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub channel_id: Option<String>,
    pub channel_name: Option<String>,
    pub improved_titles: Option<Vec<ImprovedTitle>>,
    pub error: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobPatch {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn apply(self, record: &mut JobRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(channel_id) = self.channel_id {
            record.channel_id = Some(channel_id);
        }
        if let Some(channel_name) = self.channel_name {
            record.channel_name = Some(channel_name);
        }
        if let Some(titles) = self.improved_titles {
            record.improved_titles = titles;
        }
        if let Some(error) = self.error {
            record.error = Some(error);
        }
        if let Some(completed_at) = self.completed_at {
            record.completed_at = Some(completed_at);
        }
    }
}

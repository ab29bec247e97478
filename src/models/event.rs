use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::models::summary::PerformanceSummary;
use crate::models::video::{ImprovedTitle, Video};

/// Every topic that travels over the event queue.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
)]
pub enum Topic {
    #[strum(serialize = "yt.submit")]
    Submit,
    #[strum(serialize = "yt.channel.resolved")]
    ChannelResolved,
    #[strum(serialize = "yt.channel.error")]
    ChannelError,
    #[strum(serialize = "yt.videos.fetched")]
    VideosFetched,
    #[strum(serialize = "yt.videos.error")]
    VideosError,
    #[strum(serialize = "yt.titles.ready")]
    TitlesReady,
    #[strum(serialize = "yt.titles.error")]
    TitlesError,
    #[strum(serialize = "yt.email.sent")]
    EmailSent,
    #[strum(serialize = "yt.email.error")]
    EmailError,
    #[strum(serialize = "yt.error.notified")]
    ErrorNotified,
    #[strum(serialize = "yt.performance.ready")]
    PerformanceReady,
    #[strum(serialize = "yt.performance.error")]
    PerformanceError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPayload {
    pub job_id: Uuid,
    pub channel: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResolvedPayload {
    pub job_id: Uuid,
    pub channel_id: String,
    pub channel_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideosFetchedPayload {
    pub job_id: Uuid,
    pub channel_name: String,
    pub channel_id: String,
    pub videos: Vec<Video>,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TitlesReadyPayload {
    pub job_id: Uuid,
    pub channel_name: String,
    pub channel_id: String,
    pub improved_titles: Vec<ImprovedTitle>,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmailSentPayload {
    pub job_id: Uuid,
    pub email_id: String,
    pub email: String,
}

/// Shared payload of every job-scoped `*.error` topic.
///
/// `error` is the user-facing message; internal detail stays in the job
/// record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepFailurePayload {
    pub job_id: Uuid,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReadyPayload {
    pub channel_id: String,
    pub channel_name: String,
    pub summary: PerformanceSummary,
    #[serde(rename = "emailHTML")]
    pub email_html: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceErrorPayload {
    pub error: String,
}

/// An event as published on the queue: `{"topic": "...", "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "topic", content = "data")]
pub enum Event {
    #[serde(rename = "yt.submit")]
    Submit(SubmitPayload),
    #[serde(rename = "yt.channel.resolved")]
    ChannelResolved(ChannelResolvedPayload),
    #[serde(rename = "yt.channel.error")]
    ChannelError(StepFailurePayload),
    #[serde(rename = "yt.videos.fetched")]
    VideosFetched(VideosFetchedPayload),
    #[serde(rename = "yt.videos.error")]
    VideosError(StepFailurePayload),
    #[serde(rename = "yt.titles.ready")]
    TitlesReady(TitlesReadyPayload),
    #[serde(rename = "yt.titles.error")]
    TitlesError(StepFailurePayload),
    #[serde(rename = "yt.email.sent")]
    EmailSent(EmailSentPayload),
    #[serde(rename = "yt.email.error")]
    EmailError(StepFailurePayload),
    #[serde(rename = "yt.error.notified")]
    ErrorNotified(EmailSentPayload),
    #[serde(rename = "yt.performance.ready")]
    PerformanceReady(PerformanceReadyPayload),
    #[serde(rename = "yt.performance.error")]
    PerformanceError(PerformanceErrorPayload),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Submit(_) => Topic::Submit,
            Event::ChannelResolved(_) => Topic::ChannelResolved,
            Event::ChannelError(_) => Topic::ChannelError,
            Event::VideosFetched(_) => Topic::VideosFetched,
            Event::VideosError(_) => Topic::VideosError,
            Event::TitlesReady(_) => Topic::TitlesReady,
            Event::TitlesError(_) => Topic::TitlesError,
            Event::EmailSent(_) => Topic::EmailSent,
            Event::EmailError(_) => Topic::EmailError,
            Event::ErrorNotified(_) => Topic::ErrorNotified,
            Event::PerformanceReady(_) => Topic::PerformanceReady,
            Event::PerformanceError(_) => Topic::PerformanceError,
        }
    }

    /// Job the event belongs to; `None` for the scheduled summary path.
    pub fn job_id(&self) -> Option<Uuid> {
        match self {
            Event::Submit(p) => Some(p.job_id),
            Event::ChannelResolved(p) => Some(p.job_id),
            Event::VideosFetched(p) => Some(p.job_id),
            Event::TitlesReady(p) => Some(p.job_id),
            Event::EmailSent(p) | Event::ErrorNotified(p) => Some(p.job_id),
            Event::ChannelError(p)
            | Event::VideosError(p)
            | Event::TitlesError(p)
            | Event::EmailError(p) => Some(p.job_id),
            Event::PerformanceReady(_) | Event::PerformanceError(_) => None,
        }
    }

    /// The failure payload if this is one of the job-scoped error topics.
    pub fn as_failure(&self) -> Option<&StepFailurePayload> {
        match self {
            Event::ChannelError(p)
            | Event::VideosError(p)
            | Event::TitlesError(p)
            | Event::EmailError(p) => Some(p),
            _ => None,
        }
    }
}

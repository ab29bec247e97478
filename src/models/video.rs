use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// A channel returned by a channel-type search.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMatch {
    pub channel_id: String,
    pub channel_name: String,
}

/// One of a channel's recent uploads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub video_id: String,
    pub title: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub thumbnail: String,
}

impl Video {
    pub fn watch_url(video_id: &str) -> String {
        format!("{WATCH_URL_PREFIX}{video_id}")
    }
}

/// Model-generated rewrite of one video title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImprovedTitle {
    pub original: String,
    pub improved: String,
    pub rationale: String,
    pub url: String,
}

/// Per-video statistics embedded in the performance-summary prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoStats {
    pub title: String,
    pub description: String,
    pub published_at: String,
    pub duration: Option<String>,
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub favorites: Option<u64>,
    pub privacy: Option<String>,
    pub topics: Vec<String>,
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Channel the scheduled summary is produced for, as set by the toggle
/// endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    pub channel_id: String,
    pub channel_name: String,
    pub should_enable_summary: bool,
}

/// Explicit input of one scheduled run: the stored channel plus recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTarget {
    pub channel: ChannelInfo,
    pub email_to: String,
}

impl SummaryTarget {
    pub fn is_enabled(&self) -> bool {
        self.channel.should_enable_summary
    }
}

/// A count the model may return either as a number or as a string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Metric {
    Count(u64),
    Text(String),
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Count(n) => write!(f, "{n}"),
            Metric::Text(s) => f.write_str(s),
        }
    }
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Text(String::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoHighlight {
    pub title: String,
    #[serde(default)]
    pub views: Metric,
    #[serde(default)]
    pub likes: Metric,
    #[serde(default)]
    pub comments: Metric,
}

/// Analytical digest returned by the model for the scheduled report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub overall_trend: String,
    #[serde(default)]
    pub best_videos: Vec<VideoHighlight>,
    #[serde(default)]
    pub worst_videos: Vec<VideoHighlight>,
    #[serde(default)]
    pub engagement_insights: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub topic_patterns: Vec<String>,
}

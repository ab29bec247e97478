use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::models::video::{ChannelMatch, Video, VideoStats};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Channel search, upload listing and statistics lookup.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// First channel-type search hit for `query`, if any.
    async fn search_channel(&self, query: &str) -> Result<Option<ChannelMatch>, YouTubeError>;

    /// Most recent uploads of `channel_id`, newest first.
    async fn latest_videos(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<Video>, YouTubeError>;

    async fn video_statistics(&self, video_ids: &[String]) -> Result<Vec<VideoStats>, YouTubeError>;
}

/// Client for the YouTube Data API v3.
pub struct YouTubeClient {
    http: Client,
    api_key: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchId,
    snippet: Snippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    video_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    channel_id: String,
    title: String,
    #[serde(default)]
    description: String,
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Deserialize, Default)]
struct Thumbnails {
    default: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    snippet: Snippet,
    statistics: Option<Statistics>,
    content_details: Option<ContentDetails>,
    status: Option<Status>,
    topic_details: Option<TopicDetails>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
    favorite_count: Option<String>,
}

#[derive(Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    privacy_status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicDetails {
    #[serde(default)]
    topic_categories: Vec<String>,
}

impl YouTubeClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
        }
    }

    fn key(&self) -> Result<&str, YouTubeError> {
        if self.api_key.trim().is_empty() {
            return Err(YouTubeError::MissingApiKey);
        }
        Ok(&self.api_key)
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, YouTubeError> {
        let key = self.key()?;
        let response = self
            .http
            .get(format!("{API_BASE}/{path}"))
            .query(query)
            .query(&[("key", key)])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl VideoPlatform for YouTubeClient {
    async fn search_channel(&self, query: &str) -> Result<Option<ChannelMatch>, YouTubeError> {
        let response: SearchResponse = self
            .get(
                "search",
                &[("part", "snippet"), ("type", "channel"), ("q", query)],
            )
            .await?;

        Ok(first_channel(response))
    }

    async fn latest_videos(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<Video>, YouTubeError> {
        let max_results = max_results.to_string();
        let response: SearchResponse = self
            .get(
                "search",
                &[
                    ("part", "snippet"),
                    ("channelId", channel_id),
                    ("order", "date"),
                    ("type", "video"),
                    ("maxResults", max_results.as_str()),
                ],
            )
            .await?;

        Ok(videos_from_search(response))
    }

    async fn video_statistics(&self, video_ids: &[String]) -> Result<Vec<VideoStats>, YouTubeError> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = video_ids.join(",");
        let response: VideoListResponse = self
            .get(
                "videos",
                &[
                    ("part", "snippet,statistics,contentDetails,topicDetails,status"),
                    ("id", ids.as_str()),
                ],
            )
            .await?;

        Ok(response.items.into_iter().map(video_stats).collect())
    }
}

fn first_channel(response: SearchResponse) -> Option<ChannelMatch> {
    response.items.into_iter().next().map(|item| ChannelMatch {
        channel_id: item.snippet.channel_id,
        channel_name: item.snippet.title,
    })
}

fn videos_from_search(response: SearchResponse) -> Vec<Video> {
    let mut videos: Vec<Video> = response
        .items
        .into_iter()
        .filter_map(|item| {
            let video_id = item.id.video_id?;
            Some(Video {
                url: Video::watch_url(&video_id),
                title: item.snippet.title,
                published_at: item.snippet.published_at.unwrap_or_default(),
                thumbnail: item
                    .snippet
                    .thumbnails
                    .default
                    .map(|t| t.url)
                    .unwrap_or_default(),
                video_id,
            })
        })
        .collect();

    videos.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    videos
}

fn video_stats(item: VideoItem) -> VideoStats {
    let count = |value: Option<&String>| -> Option<u64> { value.and_then(|v| v.parse().ok()) };
    let statistics = item.statistics.as_ref();

    VideoStats {
        title: item.snippet.title,
        description: item.snippet.description,
        published_at: item
            .snippet
            .published_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default(),
        duration: item.content_details.and_then(|c| c.duration),
        views: count(statistics.and_then(|s| s.view_count.as_ref())),
        likes: count(statistics.and_then(|s| s.like_count.as_ref())),
        comments: count(statistics.and_then(|s| s.comment_count.as_ref())),
        favorites: count(statistics.and_then(|s| s.favorite_count.as_ref())),
        privacy: item.status.and_then(|s| s.privacy_status),
        topics: item
            .topic_details
            .map(|t| t.topic_categories)
            .unwrap_or_default(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum YouTubeError {
    #[error("YouTube API key not configured")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

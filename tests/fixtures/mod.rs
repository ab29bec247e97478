//! Canned upstream data for pipeline and route tests.
#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use titleforge::models::video::{ChannelMatch, Video, VideoStats};

pub const CHANNEL_ID: &str = "UC_somehandle_0001";
pub const CHANNEL_NAME: &str = "Some Handle";
pub const REQUESTER: &str = "a@b.com";

pub fn sample_channel() -> ChannelMatch {
    ChannelMatch {
        channel_id: CHANNEL_ID.to_string(),
        channel_name: CHANNEL_NAME.to_string(),
    }
}

/// `count` uploads, newest first, one day apart.
pub fn sample_videos(count: usize) -> Vec<Video> {
    let newest = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let video_id = format!("vid{i:03}");
            Video {
                url: Video::watch_url(&video_id),
                title: format!("My video number {i}"),
                published_at: newest - Duration::days(i as i64),
                thumbnail: format!("https://i.ytimg.com/vi/{video_id}/hqdefault.jpg"),
                video_id,
            }
        })
        .collect()
}

pub fn sample_stats(count: usize) -> Vec<VideoStats> {
    (0..count)
        .map(|i| VideoStats {
            title: format!("My video number {i}"),
            description: "A video".to_string(),
            published_at: "2025-03-10T12:00:00Z".to_string(),
            duration: Some("PT8M".to_string()),
            views: Some(1000 + i as u64 * 100),
            likes: Some(50),
            comments: Some(5),
            favorites: Some(0),
            privacy: Some("public".to_string()),
            topics: vec![],
        })
        .collect()
}

/// Model output with one improved title per video, in order.
pub fn titles_json(videos: &[Video]) -> String {
    let titles: Vec<_> = videos
        .iter()
        .map(|v| {
            json!({
                "original": v.title,
                "improved": format!("{} (You Won't Believe It)", v.title),
                "rationale": "Adds curiosity"
            })
        })
        .collect();
    json!({ "titles": titles }).to_string()
}

/// Summary wrapped in a code fence, as the model tends to return it.
pub fn fenced_summary_json() -> String {
    let body = json!({
        "overallTrend": "Views are climbing week over week",
        "bestVideos": [{"title": "My video number 4", "views": "1400", "likes": 50, "comments": 5}],
        "worstVideos": [{"title": "My video number 0", "views": 1000, "likes": "50", "comments": 5}],
        "engagementInsights": "Likes track views closely",
        "recommendations": ["Keep posting on weekends"],
        "topicPatterns": ["Tutorials"]
    });
    format!("```json\n{body}\n```")
}

use crate::models::video::{Video, VideoStats};

pub const TITLE_SYSTEM_INSTRUCTION: &str = "You are a YouTube SEO and engagement expert. \
Your task is to help creators craft compelling, search-optimized video titles that boost \
visibility, click-through rates, and audience retention. You consider trending keywords, \
audience intent, and best practices for engagement when suggesting improvements.";

pub const SUMMARY_SYSTEM_INSTRUCTION: &str = "You are a YouTube analytics and growth expert. \
Your task is to analyze the performance of a creator's videos and provide actionable insights. \
Consider metrics such as views, likes, comments, favorites, video duration, publication date, \
topics, categories, and engagement trends. Provide a concise summary highlighting overall \
performance, best and worst performing videos, patterns, and recommendations to improve \
channel growth.";

pub const TITLE_TEMPERATURE: f32 = 0.7;
pub const SUMMARY_TEMPERATURE: f32 = 0.5;

/// `1. "First title"` lines, one per video, in input order.
pub fn numbered_titles(videos: &[Video]) -> String {
    videos
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{}. \"{}\"", i + 1, v.title))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn title_prompt(videos: &[Video], channel_name: &str) -> String {
    format!(
        r#"You are a YouTube title optimization expert. Below are {count} video titles from the channel "{channel_name}".

For each title, provide:
1. An improved version that is more engaging, SEO-friendly and likely to get more clicks.
2. A brief rationale (1-2 sentences) explaining why the improved title is better.

Guidelines:
- Keep the core topic and authenticity.
- Use action verbs, numbers and specific value propositions.
- Make it curiosity-inducing without being clickbait.
- Optimise for searchability and clarity.

Return exactly {count} entries, in the same order as the titles below.

Video Titles:
{titles}

Respond in JSON format:
{{
    "titles": [
        {{ "original": "...", "improved": "...", "rationale": "..." }}
    ]
}}"#,
        count = videos.len(),
        titles = numbered_titles(videos),
    )
}

pub fn summary_prompt(channel_name: &str, stats: &[VideoStats]) -> Result<String, serde_json::Error> {
    let data = serde_json::to_string(stats)?;
    Ok(format!(
        r#"You are a YouTube analytics expert.
Analyze the following video data for channel "{channel_name}" to generate a performance summary.
Include:
  1. Overall performance trend
  2. Best and worst performing videos
  3. Engagement insights (likes, comments, favorites)
  4. Recommendations to improve click-through and retention
  5. Topic or category patterns
Respond only with a JSON object with this structure:
{{
  "overallTrend": "string",
  "bestVideos": [{{"title": "", "views": "", "likes": "", "comments": ""}}],
  "worstVideos": [{{"title": "", "views": "", "likes": "", "comments": ""}}],
  "engagementInsights": "string",
  "recommendations": ["string"],
  "topicPatterns": ["string"]
}}

Video Data: {data}"#
    ))
}

//! HTML bodies for the three outgoing emails.

use chrono::{Datelike, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::models::summary::{PerformanceSummary, VideoHighlight};
use crate::models::video::ImprovedTitle;

const BRAND_COLOR: &str = "#5F51E8";
const DEFAULT_FAILURE: &str = "An unexpected error occurred during title generation.";

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <title>{title}</title>
  </head>
  <body style="background-color:#ffffff;margin:0;padding:0;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;">
    <table align="center" width="100%" cellpadding="0" cellspacing="0" role="presentation" style="max-width:600px;margin:0 auto;padding:20px;">
      <tr>
        <td>
{body}
          <hr style="border:none;border-top:1px solid #eaeaea;margin:20px 0;" />
          <p style="font-size:12px;color:#8898aa;text-align:center;">&copy; {year} TitleForge &middot; AI tools for YouTube creators</p>
        </td>
      </tr>
    </table>
  </body>
</html>"#,
        title = escape_html(title),
        year = Utc::now().year(),
    )
}

/// Success email listing every improved title, with a link that enables the
/// daily performance summary for the channel.
pub fn titles_email(
    public_base_url: &str,
    channel_id: &str,
    channel_name: &str,
    email: &str,
    titles: &[ImprovedTitle],
) -> String {
    let items: String = titles
        .iter()
        .map(|t| {
            format!(
                r#"            <li style="margin-bottom:12px;">
              <b>Original:</b> {original}<br />
              <b>Improved:</b> <a href="{url}" style="color:{BRAND_COLOR};">{improved}</a><br />
              <i>{rationale}</i>
            </li>
"#,
                original = escape_html(&t.original),
                improved = escape_html(&t.improved),
                rationale = escape_html(&t.rationale),
                url = escape_html(&t.url),
            )
        })
        .collect();

    let toggle_url = format!(
        "{}/api/performance-summary?channelId={}&channelName={}&email={}&shouldEnableSummary=true",
        public_base_url.trim_end_matches('/'),
        encode(channel_id),
        encode(channel_name),
        encode(email),
    );

    let body = format!(
        r#"          <h1 style="text-align:center;color:{BRAND_COLOR};">TitleForge</h1>
          <p style="font-size:16px;line-height:26px;">Hi Creator,</p>
          <p style="font-size:16px;line-height:26px;">
            We've analyzed the YouTube channel <b>{channel}</b> and generated AI-optimized titles designed to improve your click-through rate.
          </p>
          <ul style="font-size:15px;line-height:24px;padding-left:20px;">
{items}          </ul>
          <p style="font-size:16px;line-height:26px;margin-top:24px;text-align:center;">
            <a href="{toggle}" style="color:{BRAND_COLOR};text-decoration:underline;" target="_blank">Enable performance updates for this channel</a>
          </p>
          <p style="font-size:16px;line-height:26px;">Best,<br />The <b>TitleForge</b> Team</p>"#,
        channel = escape_html(channel_name),
        toggle = escape_html(&toggle_url),
    );

    layout("Your AI-optimized titles", &body)
}

/// Failure email. Missing pieces fall back to neutral wording.
pub fn failure_email(channel_name: Option<&str>, error: Option<&str>) -> String {
    let channel = channel_name.unwrap_or("your channel");
    let error = error.filter(|e| !e.trim().is_empty()).unwrap_or(DEFAULT_FAILURE);

    let body = format!(
        r#"          <h1 style="text-align:center;color:{BRAND_COLOR};">TitleForge</h1>
          <p style="font-size:16px;line-height:26px;">Hi there,</p>
          <p style="font-size:16px;line-height:26px;">
            Unfortunately, we ran into an issue while processing improved titles for <strong>{channel}</strong>.
          </p>
          <blockquote style="border-left:3px solid {BRAND_COLOR};padding-left:12px;margin:12px 0;color:#555;font-style:italic;">{error}</blockquote>
          <p style="font-size:16px;line-height:26px;">You can safely retry your request after a few minutes.</p>
          <p style="font-size:16px;line-height:26px;">Thanks for your patience,<br /><strong>The TitleForge Team</strong></p>"#,
        channel = escape_html(channel),
        error = escape_html(error),
    );

    layout("TitleForge - Error Notification", &body)
}

fn highlight_list(videos: &[VideoHighlight]) -> String {
    videos
        .iter()
        .enumerate()
        .map(|(i, v)| {
            format!(
                "            <li style=\"margin-bottom:12px;\"><b>{}. {}</b><br />Views: {} | Likes: {} | Comments: {}</li>\n",
                i + 1,
                escape_html(&v.title),
                escape_html(&v.views.to_string()),
                escape_html(&v.likes.to_string()),
                escape_html(&v.comments.to_string()),
            )
        })
        .collect()
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("            <li style=\"margin-bottom:8px;\">{}</li>\n", escape_html(item)))
        .collect()
}

pub fn summary_email(channel_name: &str, summary: &PerformanceSummary) -> String {
    let body = format!(
        r#"          <h1 style="text-align:center;color:{BRAND_COLOR};">TitleForge Performance Summary</h1>
          <p style="font-size:16px;line-height:24px;">
            We've analyzed the YouTube channel <b>{channel}</b> and generated a performance summary for your recent videos.
          </p>
          <h2 style="color:{BRAND_COLOR};">Overall Trend</h2>
          <p>{trend}</p>
          <h2 style="color:{BRAND_COLOR};">Top Performing Videos</h2>
          <ul style="padding-left:20px;">
{best}          </ul>
          <h2 style="color:{BRAND_COLOR};">Least Performing Videos</h2>
          <ul style="padding-left:20px;">
{worst}          </ul>
          <h2 style="color:{BRAND_COLOR};">Engagement Insights</h2>
          <p>{insights}</p>
          <h2 style="color:{BRAND_COLOR};">Recommendations</h2>
          <ul style="padding-left:20px;">
{recommendations}          </ul>
          <h2 style="color:{BRAND_COLOR};">Topic / Category Patterns</h2>
          <ul style="padding-left:20px;">
{topics}          </ul>"#,
        channel = escape_html(channel_name),
        trend = escape_html(&summary.overall_trend),
        best = highlight_list(&summary.best_videos),
        worst = highlight_list(&summary.worst_videos),
        insights = escape_html(&summary.engagement_insights),
        recommendations = bullet_list(&summary.recommendations),
        topics = bullet_list(&summary.topic_patterns),
    );

    layout("Performance Summary", &body)
}

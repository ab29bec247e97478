//! TitleForge
//!
//! Event-driven pipeline that resolves a YouTube channel, asks Gemini for
//! better titles for its latest videos, and emails the suggestions through
//! Resend. A cron-driven reporter mails a periodic performance summary for
//! one operator-selected channel.

pub mod app_state;
pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod scheduler;
pub mod services;

//! Hand-written fakes for the upstream services and the event queue.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use titleforge::db::jobs::JobRepository;
use titleforge::db::state_store::{MemoryStateStore, StateKey, StateStore, StoreError};
use titleforge::models::event::Event;
use titleforge::models::video::{ChannelMatch, Video, VideoStats};
use titleforge::pipeline::Collaborators;
use titleforge::services::email::{EmailError, Mailer};
use titleforge::services::gemini::{GenerationError, GenerationRequest, TextGenerator};
use titleforge::services::queue::{EventSink, QueueError};
use titleforge::services::youtube::{VideoPlatform, YouTubeError};

#[derive(Default)]
pub struct FakePlatform {
    pub channel: Option<ChannelMatch>,
    pub videos: Vec<Video>,
    pub stats: Vec<VideoStats>,
    pub searches: Mutex<Vec<String>>,
    pub listings: Mutex<Vec<(String, u32)>>,
}

impl FakePlatform {
    pub fn new(channel: Option<ChannelMatch>, videos: Vec<Video>) -> Self {
        Self {
            channel,
            videos,
            ..Default::default()
        }
    }

    pub fn with_stats(mut self, stats: Vec<VideoStats>) -> Self {
        self.stats = stats;
        self
    }
}

#[async_trait]
impl VideoPlatform for FakePlatform {
    async fn search_channel(&self, query: &str) -> Result<Option<ChannelMatch>, YouTubeError> {
        self.searches.lock().unwrap().push(query.to_string());
        Ok(self.channel.clone())
    }

    async fn latest_videos(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<Video>, YouTubeError> {
        self.listings
            .lock()
            .unwrap()
            .push((channel_id.to_string(), max_results));
        Ok(self.videos.iter().take(max_results as usize).cloned().collect())
    }

    async fn video_statistics(&self, video_ids: &[String]) -> Result<Vec<VideoStats>, YouTubeError> {
        Ok(self.stats.iter().take(video_ids.len()).cloned().collect())
    }
}

/// Returns the same reply to every request, or fails with an empty response.
#[derive(Default)]
pub struct FakeGenerator {
    reply: Option<String>,
    missing_key: bool,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeGenerator {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    /// Behaves like a client started without an API key.
    pub fn misconfigured() -> Self {
        Self {
            missing_key: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request);
        if self.missing_key {
            return Err(GenerationError::MissingApiKey);
        }
        self.reply.clone().ok_or(GenerationError::EmptyResponse)
    }
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Default)]
pub struct FakeMailer {
    reject: bool,
    pub sent: Mutex<Vec<SentEmail>>,
}

impl FakeMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider rejects every message.
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<String, EmailError> {
        if self.reject {
            return Err(EmailError::Provider {
                status: 422,
                message: "The from address is not verified".to_string(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(format!("email-{}", sent.len()))
    }
}

/// In-memory event sink; optionally refuses every publish.
#[derive(Default)]
pub struct CollectingSink {
    offline: bool,
    pub events: Mutex<Vec<Event>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSink for CollectingSink {
    async fn publish(&self, event: &Event) -> Result<(), QueueError> {
        if self.offline {
            return Err(QueueError::Redis(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "queue offline",
            ))));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), QueueError> {
        if self.offline {
            return Err(QueueError::Redis(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "queue offline",
            ))));
        }
        Ok(())
    }
}

/// In-memory store that fails selected operations like an unavailable pool.
pub struct FaultyStore {
    inner: Arc<MemoryStateStore>,
    unreadable: bool,
    refused_status: Option<&'static str>,
}

impl FaultyStore {
    /// Every read fails.
    pub fn unreadable() -> Self {
        Self {
            inner: Arc::new(MemoryStateStore::new()),
            unreadable: true,
            refused_status: None,
        }
    }

    /// Writes of a document whose `status` equals `status` fail.
    pub fn refusing_status(inner: Arc<MemoryStateStore>, status: &'static str) -> Self {
        Self {
            inner,
            unreadable: false,
            refused_status: Some(status),
        }
    }
}

fn pool_timeout() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl StateStore for FaultyStore {
    async fn get(&self, key: &StateKey) -> Result<Option<Value>, StoreError> {
        if self.unreadable {
            return Err(pool_timeout());
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &StateKey, value: Value) -> Result<(), StoreError> {
        if let Some(status) = self.refused_status {
            if value.get("status").and_then(Value::as_str) == Some(status) {
                return Err(pool_timeout());
            }
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &StateKey) -> Result<(), StoreError> {
        self.inner.delete(key).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        if self.unreadable {
            return Err(pool_timeout());
        }
        Ok(())
    }
}

/// Everything a pipeline test needs, sharing one in-memory store.
pub struct Harness {
    pub store: Arc<MemoryStateStore>,
    pub platform: Arc<FakePlatform>,
    pub generator: Arc<FakeGenerator>,
    pub mailer: Arc<FakeMailer>,
    pub collaborators: Collaborators,
}

impl Harness {
    pub fn new(platform: FakePlatform, generator: FakeGenerator, mailer: FakeMailer) -> Self {
        let store = Arc::new(MemoryStateStore::new());
        Self::with_store(store.clone(), store, platform, generator, mailer)
    }

    /// Jobs go through `jobs_store`; `store` is the memory it ends up in.
    pub fn with_store(
        store: Arc<MemoryStateStore>,
        jobs_store: Arc<dyn StateStore>,
        platform: FakePlatform,
        generator: FakeGenerator,
        mailer: FakeMailer,
    ) -> Self {
        let platform = Arc::new(platform);
        let generator = Arc::new(generator);
        let mailer = Arc::new(mailer);
        let collaborators = Collaborators {
            jobs: JobRepository::new(jobs_store),
            platform: platform.clone(),
            generator: generator.clone(),
            mailer: mailer.clone(),
            public_base_url: "http://localhost:3000".to_string(),
        };
        Self {
            store,
            platform,
            generator,
            mailer,
            collaborators,
        }
    }

    pub fn jobs(&self) -> &JobRepository {
        &self.collaborators.jobs
    }
}

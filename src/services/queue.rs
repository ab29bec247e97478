use async_trait::async_trait;
use redis::AsyncCommands;

use crate::models::event::Event;

const QUEUE_KEY: &str = "titleforge:events";
const PROCESSING_KEY: &str = "titleforge:processing";
const DEAD_LETTER_KEY: &str = "titleforge:dead_letter";

/// Anything that can accept an event for later dispatch.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: &Event) -> Result<(), QueueError>;

    /// Check backend connectivity (for health checks).
    async fn health_check(&self) -> Result<(), QueueError>;
}

/// An event popped from the queue, with the payload needed to acknowledge it.
#[derive(Debug)]
pub struct Delivery {
    pub event: Event,
    raw: String,
}

/// Redis-backed event queue shared by the API server and worker.
pub struct EventQueue {
    client: redis::Client,
}

impl EventQueue {
    pub fn new(redis_url: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(redis_url).map_err(QueueError::Redis)?;
        Ok(Self { client })
    }

    /// Pop the oldest event, parking it in the processing list until
    /// [`EventQueue::complete`] is called.
    pub async fn dequeue(&self) -> Result<Option<Delivery>, QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(QueueError::Redis)?;
        let result: Option<String> = conn
            .rpoplpush(QUEUE_KEY, PROCESSING_KEY)
            .await
            .map_err(QueueError::Redis)?;

        match result {
            Some(raw) => match serde_json::from_str::<Event>(&raw) {
                Ok(event) => Ok(Some(Delivery { event, raw })),
                Err(e) => {
                    tracing::error!(error = %e, "Moving undecodable event to dead letter list");
                    redis::pipe()
                        .atomic()
                        .lrem(PROCESSING_KEY, 1, &raw)
                        .ignore()
                        .lpush(DEAD_LETTER_KEY, &raw)
                        .ignore()
                        .query_async::<()>(&mut conn)
                        .await
                        .map_err(QueueError::Redis)?;
                    Err(QueueError::Serialize(e))
                }
            },
            None => Ok(None),
        }
    }

    /// Number of payloads parked because they could not be decoded.
    pub async fn dead_letter_depth(&self) -> Result<u64, QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(QueueError::Redis)?;
        let depth: u64 = conn.llen(DEAD_LETTER_KEY).await.map_err(QueueError::Redis)?;
        Ok(depth)
    }

    /// Get the current queue depth (pending events).
    pub async fn queue_depth(&self) -> Result<u64, QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(QueueError::Redis)?;
        let depth: u64 = conn.llen(QUEUE_KEY).await.map_err(QueueError::Redis)?;
        Ok(depth)
    }

    /// Acknowledge a delivery (remove from processing list).
    pub async fn complete(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(QueueError::Redis)?;
        conn.lrem::<_, _, ()>(PROCESSING_KEY, 1, &delivery.raw)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }
}

#[async_trait]
impl EventSink for EventQueue {
    async fn publish(&self, event: &Event) -> Result<(), QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(QueueError::Redis)?;
        let payload = serde_json::to_string(event).map_err(QueueError::Serialize)?;
        conn.lpush::<_, _, ()>(QUEUE_KEY, &payload)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(QueueError::Redis)?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

//! Key-value state shared across pipeline steps.
//!
//! Keys are structured as `(namespace, id)` so job records and scheduler
//! settings can never collide. Values are JSON documents; typed access goes
//! through [`load`] and [`save`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sqlx::{PgPool, Row};
use strum::Display;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Namespace {
    Job,
    Scheduler,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    pub namespace: Namespace,
    pub id: String,
}

impl StateKey {
    pub fn new(namespace: Namespace, id: impl Into<String>) -> Self {
        Self {
            namespace,
            id: id.into(),
        }
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.id)
    }
}

/// Durable upsert/get/delete by key. Each call completes before returning.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, key: &StateKey) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: &StateKey, value: Value) -> Result<(), StoreError>;

    async fn delete(&self, key: &StateKey) -> Result<(), StoreError>;

    /// Check backend connectivity (for health checks).
    async fn health_check(&self) -> Result<(), StoreError>;
}

pub async fn load<T: DeserializeOwned>(
    store: &dyn StateStore,
    key: &StateKey,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

pub async fn save<T: Serialize>(
    store: &dyn StateStore,
    key: &StateKey,
    value: &T,
) -> Result<(), StoreError> {
    store.set(key, serde_json::to_value(value)?).await
}

/// PostgreSQL-backed store over the `state_entries` table.
pub struct PgStateStore {
    pool: PgPool,
}

impl PgStateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StateStore for PgStateStore {
    async fn get(&self, key: &StateKey) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT value
            FROM state_entries
            WHERE namespace = $1 AND key = $2
            "#,
        )
        .bind(key.namespace.to_string())
        .bind(&key.id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(r) => Some(r.try_get("value")?),
            None => None,
        })
    }

    async fn set(&self, key: &StateKey, value: Value) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO state_entries (namespace, key, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (namespace, key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key.namespace.to_string())
        .bind(&key.id)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, key: &StateKey) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM state_entries WHERE namespace = $1 AND key = $2")
            .bind(key.namespace.to_string())
            .bind(&key.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// In-process store, used by tests and single-process runs.
#[derive(Default)]
pub struct MemoryStateStore {
    entries: RwLock<HashMap<StateKey, Value>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Snapshot of every key currently stored.
    pub async fn keys(&self) -> Vec<StateKey> {
        self.entries.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, key: &StateKey) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &StateKey, value: Value) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.clone(), value);
        Ok(())
    }

    async fn delete(&self, key: &StateKey) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::db::state_store::{self, Namespace, StateKey, StateStore, StoreError};
use crate::models::job::{JobPatch, JobRecord, JobStatus};
use crate::models::video::ImprovedTitle;

/// Typed access to job records in the state store.
///
/// Every update is read, shallow-merge, write back. Updates to the same job
/// are assumed to come from one step at a time and are not locked.
#[derive(Clone)]
pub struct JobRepository {
    store: Arc<dyn StateStore>,
}

fn job_key(job_id: Uuid) -> StateKey {
    StateKey::new(Namespace::Job, job_id.to_string())
}

impl JobRepository {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Insert a fresh `queued` record with a newly generated id.
    pub async fn create(&self, channel: &str, email: &str) -> Result<JobRecord, StoreError> {
        let record = JobRecord::new(channel.to_string(), email.to_string());
        state_store::save(self.store.as_ref(), &job_key(record.job_id), &record).await?;
        Ok(record)
    }

    pub async fn get(&self, job_id: Uuid) -> Result<Option<JobRecord>, StoreError> {
        state_store::load(self.store.as_ref(), &job_key(job_id)).await
    }

    /// Merge `patch` into the stored record.
    ///
    /// Fails without writing if the record is absent, already terminal, or
    /// the patch would move the status backwards.
    pub async fn update(&self, job_id: Uuid, patch: JobPatch) -> Result<JobRecord, JobUpdateError> {
        let mut record = self
            .get(job_id)
            .await?
            .ok_or(JobUpdateError::NotFound(job_id))?;

        if record.status.is_terminal() {
            return Err(JobUpdateError::Closed {
                job_id,
                status: record.status,
            });
        }

        if let Some(next) = patch.status {
            if !record.status.can_transition_to(next) {
                return Err(JobUpdateError::InvalidTransition {
                    from: record.status,
                    to: next,
                });
            }
        }

        patch.apply(&mut record);
        state_store::save(self.store.as_ref(), &job_key(job_id), &record).await?;
        Ok(record)
    }

    pub async fn advance(&self, job_id: Uuid, status: JobStatus) -> Result<JobRecord, JobUpdateError> {
        self.update(job_id, JobPatch::status(status)).await
    }

    pub async fn record_channel(
        &self,
        job_id: Uuid,
        channel_id: &str,
        channel_name: &str,
    ) -> Result<JobRecord, JobUpdateError> {
        self.update(
            job_id,
            JobPatch {
                channel_id: Some(channel_id.to_string()),
                channel_name: Some(channel_name.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn record_titles(
        &self,
        job_id: Uuid,
        titles: Vec<ImprovedTitle>,
    ) -> Result<JobRecord, JobUpdateError> {
        self.update(
            job_id,
            JobPatch {
                improved_titles: Some(titles),
                ..Default::default()
            },
        )
        .await
    }

    /// Move the job to `failed`, keeping `error` for operators.
    pub async fn mark_failed(&self, job_id: Uuid, error: &str) -> Result<JobRecord, JobUpdateError> {
        let record = self
            .update(
                job_id,
                JobPatch {
                    status: Some(JobStatus::Failed),
                    error: Some(error.to_string()),
                    ..Default::default()
                },
            )
            .await?;

        metrics::counter!("title_jobs_failed_total").increment(1);
        Ok(record)
    }

    pub async fn mark_completed(
        &self,
        job_id: Uuid,
        titles: Vec<ImprovedTitle>,
    ) -> Result<JobRecord, JobUpdateError> {
        self.update(
            job_id,
            JobPatch {
                status: Some(JobStatus::Completed),
                improved_titles: Some(titles),
                completed_at: Some(Utc::now()),
                ..Default::default()
            },
        )
        .await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobUpdateError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Job {0} not found")]
    NotFound(Uuid),

    #[error("Job {job_id} is already {status}")]
    Closed { job_id: Uuid, status: JobStatus },

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },
}

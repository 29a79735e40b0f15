//! Job persistence
//!
//! One row per ingestion batch. Status strings use the uppercase wire form
//! (`QUEUED` .. `FAILED`); jobs are never deleted by the pipeline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::types::{Job, JobStatus};
use crate::error::IngestError;

/// Job record store used by the coordinator and the status API.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Create a job in `QUEUED`.
    async fn create(&self, source: &str, input_root: Option<&Path>) -> Result<Job, IngestError>;

    async fn get(&self, id: Uuid) -> Result<Option<Job>, IngestError>;

    async fn set_status(&self, id: Uuid, status: JobStatus) -> Result<(), IngestError>;

    /// Record where the extracted tree landed after staging.
    async fn set_input_root(&self, id: Uuid, input_root: &Path) -> Result<(), IngestError>;

    /// Record the fan-out size and enter `PARSING` in one step.
    async fn mark_parsing(&self, id: Uuid, file_count: i64) -> Result<(), IngestError>;

    /// Enter `FAILED` with a fan-out-level error message.
    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), IngestError>;

    async fn list_recent(&self, limit: i64) -> Result<Vec<Job>, IngestError>;
}

// ============================================================================
// Postgres implementation
// ============================================================================

pub struct PgJobStore {
    pool: Arc<PgPool>,
}

impl PgJobStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, source: &str, input_root: Option<&Path>) -> Result<Job, IngestError> {
        let job = Job {
            id: Uuid::new_v4(),
            status: JobStatus::Queued,
            source: source.to_string(),
            input_root: input_root.map(|p| p.to_string_lossy().into_owned()),
            file_count: None,
            error: None,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO ingest_jobs (id, status, source, input_root, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(job.id)
        .bind(job.status.as_str())
        .bind(&job.source)
        .bind(&job.input_root)
        .bind(job.created_at)
        .execute(&*self.pool)
        .await?;

        Ok(job)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Job>, IngestError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, status, source, input_root, file_count, error, created_at
            FROM ingest_jobs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(Job::from))
    }

    async fn set_status(&self, id: Uuid, status: JobStatus) -> Result<(), IngestError> {
        sqlx::query("UPDATE ingest_jobs SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    async fn set_input_root(&self, id: Uuid, input_root: &Path) -> Result<(), IngestError> {
        sqlx::query("UPDATE ingest_jobs SET input_root = $1 WHERE id = $2")
            .bind(input_root.to_string_lossy().into_owned())
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    async fn mark_parsing(&self, id: Uuid, file_count: i64) -> Result<(), IngestError> {
        sqlx::query("UPDATE ingest_jobs SET status = $1, file_count = $2 WHERE id = $3")
            .bind(JobStatus::Parsing.as_str())
            .bind(file_count)
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), IngestError> {
        sqlx::query("UPDATE ingest_jobs SET status = $1, error = $2 WHERE id = $3")
            .bind(JobStatus::Failed.as_str())
            .bind(error)
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Job>, IngestError> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, status, source, input_root, file_count, error, created_at
            FROM ingest_jobs
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows.into_iter().map(Job::from).collect())
    }
}

// Helper struct for sqlx query_as
#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    status: String,
    source: String,
    input_root: Option<String>,
    file_count: Option<i64>,
    error: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Job {
            id: row.id,
            status: row.status.into(),
            source: row.source,
            input_root: row.input_root,
            file_count: row.file_count,
            error: row.error,
            created_at: row.created_at,
        }
    }
}

// ============================================================================
// In-memory implementation
// ============================================================================

/// Process-local job store. Also records every status transition per job,
/// which lifecycle tests assert against.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<Uuid, Job>>,
    history: RwLock<HashMap<Uuid, Vec<JobStatus>>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status transitions observed for a job, in order, starting at `QUEUED`.
    pub async fn history(&self, id: Uuid) -> Vec<JobStatus> {
        self.history.read().await.get(&id).cloned().unwrap_or_default()
    }

    async fn record_transition(&self, id: Uuid, status: JobStatus) {
        self.history.write().await.entry(id).or_default().push(status);
    }

    async fn update<F>(&self, id: Uuid, apply: F) -> Result<(), IngestError>
    where
        F: FnOnce(&mut Job),
    {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or(IngestError::JobNotFound(id))?;
        apply(job);
        Ok(())
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, source: &str, input_root: Option<&Path>) -> Result<Job, IngestError> {
        let job = Job {
            id: Uuid::new_v4(),
            status: JobStatus::Queued,
            source: source.to_string(),
            input_root: input_root.map(|p| p.to_string_lossy().into_owned()),
            file_count: None,
            error: None,
            created_at: Utc::now(),
        };
        self.jobs.write().await.insert(job.id, job.clone());
        self.record_transition(job.id, JobStatus::Queued).await;
        Ok(job)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Job>, IngestError> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }

    async fn set_status(&self, id: Uuid, status: JobStatus) -> Result<(), IngestError> {
        self.update(id, |job| job.status = status).await?;
        self.record_transition(id, status).await;
        Ok(())
    }

    async fn set_input_root(&self, id: Uuid, input_root: &Path) -> Result<(), IngestError> {
        let root = input_root.to_string_lossy().into_owned();
        self.update(id, |job| job.input_root = Some(root)).await
    }

    async fn mark_parsing(&self, id: Uuid, file_count: i64) -> Result<(), IngestError> {
        self.update(id, |job| {
            job.status = JobStatus::Parsing;
            job.file_count = Some(file_count);
        })
        .await?;
        self.record_transition(id, JobStatus::Parsing).await;
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), IngestError> {
        let message = error.to_string();
        self.update(id, |job| {
            job.status = JobStatus::Failed;
            job.error = Some(message);
        })
        .await?;
        self.record_transition(id, JobStatus::Failed).await;
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Job>, IngestError> {
        let mut jobs: Vec<Job> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(limit.max(0) as usize);
        Ok(jobs)
    }
}

//! Get job query
//!
//! Read-only projection of a single job record.

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::IngestError;
use crate::ingest::{Job, JobStore};

/// Query to get a job by ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetJobQuery {
    pub job_id: Uuid,
}

/// Job details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetails {
    pub id: Uuid,
    pub status: String,
    pub source: String,
    pub input_root: Option<String>,
    pub file_count: Option<i64>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Job> for JobDetails {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            status: job.status.as_str().to_string(),
            source: job.source,
            input_root: job.input_root,
            file_count: job.file_count,
            error: job.error,
            created_at: job.created_at,
        }
    }
}

/// Error type for get job query
#[derive(Debug, thiserror::Error)]
pub enum GetJobError {
    #[error("Job not found")]
    NotFound,
    #[error("Store error: {0}")]
    Store(#[from] IngestError),
}

impl Request<Result<JobDetails, GetJobError>> for GetJobQuery {}

pub async fn handle(
    jobs: Arc<dyn JobStore>,
    query: GetJobQuery,
) -> Result<JobDetails, GetJobError> {
    let job = jobs
        .get(query.job_id)
        .await?
        .ok_or(GetJobError::NotFound)?;

    Ok(job.into())
}

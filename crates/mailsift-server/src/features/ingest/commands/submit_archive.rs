//! Submit archive command
//!
//! Accepts an uploaded zip archive, stages it to a per-job directory and
//! hands the job to the coordinator. Responds as soon as staging is done;
//! parsing progress is exposed through the job record.

use mediator::Request;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::IngestError;
use crate::ingest::staging::stage_archive;
use crate::ingest::types::JobStatus;
use crate::ingest::{JobCoordinator, JobStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitArchiveCommand {
    /// Original archive filename, kept as the job's source label.
    pub archive_name: String,
    #[serde(skip)]
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitArchiveResponse {
    pub job_id: Uuid,
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitArchiveError {
    #[error("Archive name is required and cannot be empty")]
    NameRequired,
    #[error("Archive content is required and cannot be empty")]
    ContentRequired,
    #[error("Staging failed: {0}")]
    Staging(String),
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),
}

impl Request<Result<SubmitArchiveResponse, SubmitArchiveError>> for SubmitArchiveCommand {}

impl SubmitArchiveCommand {
    pub fn validate(&self) -> Result<(), SubmitArchiveError> {
        if self.archive_name.trim().is_empty() {
            return Err(SubmitArchiveError::NameRequired);
        }
        if self.content.is_empty() {
            return Err(SubmitArchiveError::ContentRequired);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(coordinator, jobs, command), fields(archive = %command.archive_name))]
pub async fn handle(
    coordinator: JobCoordinator,
    jobs: Arc<dyn JobStore>,
    staging_dir: PathBuf,
    command: SubmitArchiveCommand,
) -> Result<SubmitArchiveResponse, SubmitArchiveError> {
    command.validate()?;

    let job = jobs.create(&command.archive_name, None).await?;
    jobs.set_status(job.id, JobStatus::Staging).await?;

    let job_id = job.id;
    let bytes = command.content;
    let staged = tokio::task::spawn_blocking(move || stage_archive(&staging_dir, job_id, &bytes))
        .await
        .map_err(|e| SubmitArchiveError::Staging(e.to_string()))?;

    let input_root = match staged {
        Ok(root) => root,
        Err(e) => {
            if let Err(mark_err) = jobs.mark_failed(job_id, &e.to_string()).await {
                tracing::error!(job_id = %job_id, error = %mark_err, "Failed to record staging failure");
            }
            return Err(SubmitArchiveError::Staging(e.to_string()));
        },
    };

    jobs.set_input_root(job_id, &input_root).await?;

    tokio::spawn(async move {
        coordinator.start(job_id).await;
    });

    Ok(SubmitArchiveResponse {
        job_id,
        status: JobStatus::Staging.as_str().to_string(),
    })
}

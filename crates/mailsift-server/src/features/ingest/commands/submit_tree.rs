//! Submit tree command
//!
//! Begins a job over an already-staged local tree, the operator path that
//! skips archive upload.

use mediator::Request;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::error::IngestError;
use crate::ingest::types::JobStatus;
use crate::ingest::JobCoordinator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTreeCommand {
    pub input_root: PathBuf,
    /// Label recorded on the job, e.g. the dataset name.
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTreeResponse {
    pub job_id: Uuid,
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitTreeError {
    #[error("Source label is required and cannot be empty")]
    SourceRequired,
    #[error("Input root {0} is not a readable directory")]
    InputRootMissing(String),
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),
}

impl Request<Result<SubmitTreeResponse, SubmitTreeError>> for SubmitTreeCommand {}

impl SubmitTreeCommand {
    pub fn validate(&self) -> Result<(), SubmitTreeError> {
        if self.source.trim().is_empty() {
            return Err(SubmitTreeError::SourceRequired);
        }
        if !self.input_root.is_dir() {
            return Err(SubmitTreeError::InputRootMissing(
                self.input_root.display().to_string(),
            ));
        }
        Ok(())
    }
}

#[tracing::instrument(skip(coordinator, command), fields(source = %command.source))]
pub async fn handle(
    coordinator: JobCoordinator,
    command: SubmitTreeCommand,
) -> Result<SubmitTreeResponse, SubmitTreeError> {
    command.validate()?;

    let job_id = coordinator
        .submit_job(&command.input_root, &command.source)
        .await?;

    Ok(SubmitTreeResponse {
        job_id,
        status: JobStatus::Queued.as_str().to_string(),
    })
}

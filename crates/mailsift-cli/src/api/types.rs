//! API request/response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response to an archive or tree submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub job_id: Uuid,
    pub status: String,
}

/// Job status projection returned by the server
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

/// Job listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListJobsResponse {
    pub jobs: Vec<JobDetails>,
}

/// Staged tree submission request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTreeRequest {
    pub input_root: String,
    pub source: String,
}

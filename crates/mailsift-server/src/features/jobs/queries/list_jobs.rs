//! List jobs query

use mediator::Request;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::get_job::JobDetails;
use crate::error::IngestError;
use crate::ingest::JobStore;

/// Default number of jobs returned when no limit is given.
pub const DEFAULT_LIMIT: i64 = 50;

/// Maximum number of jobs returned per request.
pub const MAX_LIMIT: i64 = 500;

/// Query to list recent jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListJobsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListJobsResponse {
    pub jobs: Vec<JobDetails>,
}

/// Error type for list jobs query
#[derive(Debug, thiserror::Error)]
pub enum ListJobsError {
    #[error("Store error: {0}")]
    Store(#[from] IngestError),
}

impl Request<Result<ListJobsResponse, ListJobsError>> for ListJobsQuery {}

pub async fn handle(
    jobs: Arc<dyn JobStore>,
    query: ListJobsQuery,
) -> Result<ListJobsResponse, ListJobsError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let jobs = jobs.list_recent(limit).await?;

    Ok(ListJobsResponse {
        jobs: jobs.into_iter().map(JobDetails::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::MemoryJobStore;

    #[tokio::test]
    async fn test_limit_defaults_and_clamps() {
        let store = Arc::new(MemoryJobStore::new());
        for i in 0..3 {
            store.create(&format!("a{}.zip", i), None).await.unwrap();
        }

        let response = handle(store.clone(), ListJobsQuery { limit: None })
            .await
            .unwrap();
        assert_eq!(response.jobs.len(), 3);

        let response = handle(store.clone(), ListJobsQuery { limit: Some(2) })
            .await
            .unwrap();
        assert_eq!(response.jobs.len(), 2);

        let response = handle(store, ListJobsQuery { limit: Some(-5) })
            .await
            .unwrap();
        assert_eq!(response.jobs.len(), 1);
    }
}

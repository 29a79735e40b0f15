//! Job routes
//!
//! Public read-only routes for querying job status. These endpoints do NOT
//! allow triggering jobs.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use super::queries::{
    get_job::handle as handle_get_job, list_jobs::handle as handle_list_jobs, GetJobError,
    GetJobQuery, ListJobsQuery,
};
use crate::features::FeatureState;

/// Create job routes
pub fn jobs_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_jobs))
        .route("/:job_id", get(get_job))
}

/// List recent jobs
///
/// GET /jobs?limit=50
async fn list_jobs(
    State(state): State<FeatureState>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Response, StatusCode> {
    match handle_list_jobs(state.jobs.clone(), query).await {
        Ok(response) => Ok((StatusCode::OK, Json(json!(response))).into_response()),
        Err(e) => {
            tracing::error!("Failed to list jobs: {:?}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        },
    }
}

/// Get a specific job by ID
///
/// GET /jobs/:job_id
async fn get_job(
    State(state): State<FeatureState>,
    Path(job_id): Path<Uuid>,
) -> Result<Response, StatusCode> {
    match handle_get_job(state.jobs.clone(), GetJobQuery { job_id }).await {
        Ok(job) => Ok((StatusCode::OK, Json(json!(job))).into_response()),
        Err(GetJobError::NotFound) => {
            tracing::debug!(job_id = %job_id, "Job not found");
            Err(StatusCode::NOT_FOUND)
        },
        Err(e) => {
            tracing::error!("Failed to get job: {:?}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::memory_state;
    use crate::ingest::jobs::JobStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app(state: FeatureState) -> Router {
        jobs_routes().with_state(state)
    }

    #[tokio::test]
    async fn test_list_jobs_empty() {
        let staging = tempfile::tempdir().unwrap();
        let (state, _jobs, _emails) = memory_state(staging.path().to_path_buf());

        let response = app(state)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_job_found() {
        let staging = tempfile::tempdir().unwrap();
        let (state, jobs, _emails) = memory_state(staging.path().to_path_buf());
        let job = jobs.create("maildir.zip", None).await.unwrap();

        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri(format!("/{}", job.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed["status"], "QUEUED");
        assert_eq!(parsed["source"], "maildir.zip");
    }

    #[tokio::test]
    async fn test_get_job_not_found() {
        let staging = tempfile::tempdir().unwrap();
        let (state, _jobs, _emails) = memory_state(staging.path().to_path_buf());

        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri(format!("/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

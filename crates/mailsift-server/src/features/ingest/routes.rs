//! Ingest routes
//!
//! Write entry points: archive upload (multipart) and direct tree
//! submission. Both respond before parsing completes; callers follow the
//! job status endpoints.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use super::commands::{
    submit_archive::handle as handle_submit_archive,
    submit_tree::handle as handle_submit_tree,
    SubmitArchiveCommand, SubmitArchiveError, SubmitTreeCommand, SubmitTreeError,
};
use crate::features::FeatureState;

/// Create ingest routes
pub fn ingest_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", post(submit_archive))
        .route("/tree", post(submit_tree))
}

/// Upload a zip archive of a mailbox tree
///
/// POST /ingest  (multipart field "file")
async fn submit_archive(
    State(state): State<FeatureState>,
    mut multipart: Multipart,
) -> Result<Response, StatusCode> {
    let mut archive_name: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::debug!(error = %e, "Unreadable multipart field");
        StatusCode::BAD_REQUEST
    })? {
        if field.name() == Some("file") {
            archive_name = field.file_name().map(|name| name.to_string());
            let bytes = field.bytes().await.map_err(|e| {
                tracing::debug!(error = %e, "Unreadable multipart body");
                StatusCode::BAD_REQUEST
            })?;
            content = Some(bytes.to_vec());
        }
    }

    let Some(content) = content else {
        return Err(StatusCode::BAD_REQUEST);
    };

    let command = SubmitArchiveCommand {
        archive_name: archive_name.unwrap_or_else(|| "upload.zip".to_string()),
        content,
    };

    match handle_submit_archive(
        state.coordinator.clone(),
        state.jobs.clone(),
        state.staging_dir.clone(),
        command,
    )
    .await
    {
        Ok(response) => Ok((StatusCode::ACCEPTED, Json(json!(response))).into_response()),
        Err(e @ (SubmitArchiveError::NameRequired | SubmitArchiveError::ContentRequired)) => {
            tracing::debug!(error = %e, "Invalid archive submission");
            Err(StatusCode::BAD_REQUEST)
        },
        Err(SubmitArchiveError::Staging(msg)) => {
            tracing::warn!(error = %msg, "Archive staging failed");
            Err(StatusCode::UNPROCESSABLE_ENTITY)
        },
        Err(e) => {
            tracing::error!(error = %e, "Archive submission failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        },
    }
}

/// Submit an already-staged local tree
///
/// POST /ingest/tree  {"input_root": "/path", "source": "label"}
async fn submit_tree(
    State(state): State<FeatureState>,
    Json(command): Json<SubmitTreeCommand>,
) -> Result<Response, StatusCode> {
    match handle_submit_tree(state.coordinator.clone(), command).await {
        Ok(response) => Ok((StatusCode::ACCEPTED, Json(json!(response))).into_response()),
        Err(
            e @ (SubmitTreeError::SourceRequired | SubmitTreeError::InputRootMissing(_)),
        ) => {
            tracing::debug!(error = %e, "Invalid tree submission");
            Err(StatusCode::BAD_REQUEST)
        },
        Err(e) => {
            tracing::error!(error = %e, "Tree submission failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::memory_state;
    use crate::ingest::jobs::JobStore;
    use crate::ingest::store::EmailStore;
    use crate::ingest::types::JobStatus;
    use axum::body::Body;
    use axum::http::Request;
    use std::io::Write;
    use std::time::Duration;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app(state: FeatureState) -> Router {
        ingest_routes().with_state(state)
    }

    async fn wait_for_terminal(
        jobs: &crate::ingest::MemoryJobStore,
        id: Uuid,
    ) -> crate::ingest::Job {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(job) = jobs.get(id).await.unwrap() {
                    if job.status.is_terminal() {
                        return job;
                    }
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_submit_tree_accepted_and_parses() {
        let staging = tempfile::tempdir().unwrap();
        let (state, jobs, emails) = memory_state(staging.path().to_path_buf());

        let tree = tempfile::tempdir().unwrap();
        let dir = tree.path().join("allen-p/inbox");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("1.eml"),
            b"Message-ID: <t@x>\r\nFrom: a@b.com\r\nSubject: s\r\n\r\nbody\r\n",
        )
        .unwrap();

        let body = serde_json::json!({
            "input_root": tree.path(),
            "source": "maildir"
        });
        let response = app(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/tree")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let job_id: Uuid = parsed["job_id"].as_str().unwrap().parse().unwrap();

        let job = wait_for_terminal(&jobs, job_id).await;
        assert_eq!(job.status, JobStatus::Parsed);
        assert_eq!(job.file_count, Some(1));
        assert_eq!(emails.len().await, 1);
    }

    #[tokio::test]
    async fn test_submit_tree_missing_root_is_bad_request() {
        let staging = tempfile::tempdir().unwrap();
        let (state, _jobs, _emails) = memory_state(staging.path().to_path_buf());

        let body = serde_json::json!({
            "input_root": "/definitely/not/here",
            "source": "maildir"
        });
        let response = app(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/tree")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submit_archive_multipart_roundtrip() {
        let staging = tempfile::tempdir().unwrap();
        let (state, jobs, emails) = memory_state(staging.path().to_path_buf());

        // Minimal zip with one conforming message
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file("allen-p/inbox/1.eml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(b"Message-ID: <zip@x>\r\nFrom: a@b.com\r\nSubject: s\r\n\r\nbody\r\n")
            .unwrap();
        let archive = writer.finish().unwrap().into_inner();

        let boundary = "mailsift-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"maildir.zip\"\r\nContent-Type: application/zip\r\n\r\n",
                boundary
            )
            .as_bytes(),
        );
        body.extend_from_slice(&archive);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let response = app(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={}", boundary),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let job_id: Uuid = parsed["job_id"].as_str().unwrap().parse().unwrap();

        let job = wait_for_terminal(&jobs, job_id).await;
        assert_eq!(job.status, JobStatus::Parsed);
        assert!(emails.get("zip@x").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_submit_archive_without_file_field_is_bad_request() {
        let staging = tempfile::tempdir().unwrap();
        let (state, _jobs, _emails) = memory_state(staging.path().to_path_buf());

        let boundary = "mailsift-test-boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{b}--\r\n",
            b = boundary
        );

        let response = app(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={}", boundary),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

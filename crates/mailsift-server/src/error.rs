//! Server-specific error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the ingestion pipeline.
///
/// Per-file failures (`MalformedMessage`, `Io`) are absorbed at the parse-task
/// boundary and never fail a batch; `StagingFailure` moves the owning job to
/// `FAILED`.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Job not found: {0}")]
    JobNotFound(Uuid),

    #[error("Staging failure: {0}")]
    StagingFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<sqlx::Error> for IngestError {
    fn from(err: sqlx::Error) -> Self {
        IngestError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::Store(err.to_string())
    }
}

/// Application error types surfaced by the HTTP layer
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Mailsift error: {0}")]
    Common(#[from] mailsift_common::MailsiftError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "A database error occurred".to_string())
            },
            AppError::NotFound(ref message) => (StatusCode::NOT_FOUND, message.clone()),
            AppError::Validation(ref message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Internal(ref message) => {
                tracing::error!("Internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
            },
            AppError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An IO error occurred".to_string())
            },
            AppError::Ingest(ref e) => match e {
                IngestError::JobNotFound(id) => {
                    (StatusCode::NOT_FOUND, format!("Job not found: {}", id))
                },
                IngestError::MalformedMessage(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                other => {
                    tracing::error!("Ingest error: {:?}", other);
                    (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
                },
            },
            AppError::Common(ref e) => {
                tracing::error!("Mailsift error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            },
            AppError::BadRequest(ref message) => (StatusCode::BAD_REQUEST, message.clone()),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

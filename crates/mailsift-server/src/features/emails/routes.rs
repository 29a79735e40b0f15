//! Email routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::queries::{get_email::handle as handle_get_email, GetEmailError, GetEmailQuery};
use crate::error::AppError;
use crate::features::FeatureState;

/// Create email routes
pub fn emails_routes() -> Router<FeatureState> {
    Router::new().route("/:dedupe_key", get(get_email))
}

/// Get a canonical email record by dedupe key
///
/// GET /emails/:dedupe_key
async fn get_email(
    State(state): State<FeatureState>,
    Path(dedupe_key): Path<String>,
) -> Result<Response, AppError> {
    let query = GetEmailQuery {
        dedupe_key: dedupe_key.clone(),
    };
    match handle_get_email(state.emails.clone(), query).await {
        Ok(record) => Ok((StatusCode::OK, Json(json!(record))).into_response()),
        Err(GetEmailError::NotFound) => {
            Err(AppError::NotFound(format!("No email with key {}", dedupe_key)))
        },
        Err(GetEmailError::Store(e)) => Err(AppError::Ingest(e)),
    }
}

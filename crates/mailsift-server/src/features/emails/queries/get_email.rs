//! Get email query
//!
//! Returns the canonical record for one dedupe key, exactly as the merge
//! protocol persisted it.

use mediator::Request;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::IngestError;
use crate::ingest::{EmailRecord, EmailStore};

/// Query to get an email record by dedupe key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetEmailQuery {
    pub dedupe_key: String,
}

/// Error type for get email query
#[derive(Debug, thiserror::Error)]
pub enum GetEmailError {
    #[error("Email not found")]
    NotFound,
    #[error("Store error: {0}")]
    Store(#[from] IngestError),
}

impl Request<Result<EmailRecord, GetEmailError>> for GetEmailQuery {}

pub async fn handle(
    emails: Arc<dyn EmailStore>,
    query: GetEmailQuery,
) -> Result<EmailRecord, GetEmailError> {
    let record = emails
        .get(&query.dedupe_key)
        .await?
        .ok_or(GetEmailError::NotFound)?;

    Ok(record)
}

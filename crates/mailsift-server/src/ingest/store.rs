//! Merge store
//!
//! Upsert protocol for canonical email records: the first sighting of an
//! identity inserts the full record, every later sighting unions its source
//! location into the existing record without touching any other field. Safe
//! under arbitrary concurrent invocation for the same or different keys.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::types::EmailRecord;
use crate::error::IngestError;

/// Result of one merge call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// True when this call created the base record, false when it degraded
    /// to a location union against an existing record.
    pub created: bool,
}

/// Document store contract required by the pipeline: an atomic
/// conditional-insert-or-location-union keyed by `dedupe_key`, plus a
/// read-back used by the query surface.
#[async_trait]
pub trait EmailStore: Send + Sync {
    /// Merge one sighting. The record's location set carries the sighting
    /// being merged (exactly one triple when produced by the normalizer).
    async fn merge(&self, record: &EmailRecord) -> Result<MergeOutcome, IngestError>;

    async fn get(&self, dedupe_key: &str) -> Result<Option<EmailRecord>, IngestError>;
}

// ============================================================================
// Postgres implementation
// ============================================================================

/// Postgres-backed store. The insert path and the location-union path are one
/// compound statement, so two concurrent first-sightings of a new identity
/// cannot both win: exactly one inserts, the other degrades to a union.
pub struct PgEmailStore {
    pool: Arc<PgPool>,
}

impl PgEmailStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

const MERGE_SQL: &str = r#"
INSERT INTO emails (
    dedupe_key, message_id, date, sender, recipients, cc, bcc,
    subject, body, attachments, headers, source_locations, enrichment
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, jsonb_build_array($12::jsonb), '[]'::jsonb)
ON CONFLICT (dedupe_key) DO UPDATE
SET source_locations = CASE
        WHEN emails.source_locations @> excluded.source_locations
            THEN emails.source_locations
        ELSE emails.source_locations || excluded.source_locations
    END
RETURNING (xmax = 0) AS created
"#;

#[async_trait]
impl EmailStore for PgEmailStore {
    async fn merge(&self, record: &EmailRecord) -> Result<MergeOutcome, IngestError> {
        let location = record
            .source_locations
            .first()
            .ok_or_else(|| IngestError::Store("record carries no source location".to_string()))?;
        let location_json = serde_json::to_value(location)?;

        loop {
            let result = sqlx::query_scalar::<_, bool>(MERGE_SQL)
                .bind(&record.dedupe_key)
                .bind(&record.message_id)
                .bind(record.date)
                .bind(&record.sender)
                .bind(serde_json::to_value(&record.recipients)?)
                .bind(serde_json::to_value(&record.cc)?)
                .bind(serde_json::to_value(&record.bcc)?)
                .bind(&record.subject)
                .bind(&record.body)
                .bind(serde_json::to_value(&record.attachments)?)
                .bind(serde_json::to_value(&record.headers)?)
                .bind(&location_json)
                .fetch_one(&*self.pool)
                .await;

            match result {
                Ok(created) => return Ok(MergeOutcome { created }),
                // A uniqueness violation here means the insert lost a race;
                // the next attempt resolves as a union against the winner.
                Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                    tracing::debug!(
                        dedupe_key = %record.dedupe_key,
                        "Insert lost identity race, retrying as location union"
                    );
                    continue;
                },
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn get(&self, dedupe_key: &str) -> Result<Option<EmailRecord>, IngestError> {
        let row = sqlx::query_as::<_, EmailRow>(
            r#"
            SELECT dedupe_key, message_id, date, sender, recipients, cc, bcc,
                   subject, body, attachments, headers, source_locations, enrichment
            FROM emails
            WHERE dedupe_key = $1
            "#,
        )
        .bind(dedupe_key)
        .fetch_optional(&*self.pool)
        .await?;

        row.map(EmailRecord::try_from).transpose()
    }
}

// Helper struct for sqlx query_as
#[derive(Debug, sqlx::FromRow)]
struct EmailRow {
    dedupe_key: String,
    message_id: Option<String>,
    date: Option<DateTime<Utc>>,
    sender: String,
    recipients: serde_json::Value,
    cc: serde_json::Value,
    bcc: serde_json::Value,
    subject: String,
    body: String,
    attachments: serde_json::Value,
    headers: serde_json::Value,
    source_locations: serde_json::Value,
    enrichment: serde_json::Value,
}

impl TryFrom<EmailRow> for EmailRecord {
    type Error = IngestError;

    fn try_from(row: EmailRow) -> Result<Self, Self::Error> {
        Ok(EmailRecord {
            dedupe_key: row.dedupe_key,
            message_id: row.message_id,
            date: row.date,
            sender: row.sender,
            recipients: serde_json::from_value(row.recipients)?,
            cc: serde_json::from_value(row.cc)?,
            bcc: serde_json::from_value(row.bcc)?,
            subject: row.subject,
            body: row.body,
            attachments: serde_json::from_value(row.attachments)?,
            headers: serde_json::from_value(row.headers)?,
            source_locations: serde_json::from_value(row.source_locations)?,
            enrichment: serde_json::from_value(row.enrichment)?,
        })
    }
}

// ============================================================================
// In-memory implementation
// ============================================================================

/// Process-local store with the same merge semantics, the compound operation
/// performed under a single write lock. Backs tests and local pipelines that
/// run without Postgres.
#[derive(Default)]
pub struct MemoryEmailStore {
    records: RwLock<HashMap<String, EmailRecord>>,
}

impl MemoryEmailStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl EmailStore for MemoryEmailStore {
    async fn merge(&self, record: &EmailRecord) -> Result<MergeOutcome, IngestError> {
        let mut records = self.records.write().await;
        match records.get_mut(&record.dedupe_key) {
            Some(existing) => {
                for location in &record.source_locations {
                    if !existing.source_locations.contains(location) {
                        existing.source_locations.push(location.clone());
                    }
                }
                Ok(MergeOutcome { created: false })
            },
            None => {
                records.insert(record.dedupe_key.clone(), record.clone());
                Ok(MergeOutcome { created: true })
            },
        }
    }

    async fn get(&self, dedupe_key: &str) -> Result<Option<EmailRecord>, IngestError> {
        Ok(self.records.read().await.get(dedupe_key).cloned())
    }
}

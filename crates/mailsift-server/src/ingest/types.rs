//! Core types for the ingestion pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// One place a logical email was found: `owner/folder/filename` in the
/// staged input tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub owner: String,
    pub folder: String,
    pub filename: String,
}

/// Attachment metadata. Payload bytes are measured and discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMeta {
    pub filename: String,
    pub content_type: String,
    pub size: i64,
}

/// The canonical, deduplicated representation of one logical email.
///
/// Every field except `source_locations` is written exactly once, from
/// whichever file first establishes the identity. Later sightings of the
/// same `dedupe_key` only grow the location set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRecord {
    /// Identity of the logical email. Unique and immutable.
    pub dedupe_key: String,
    /// Original Message-ID header, when present.
    pub message_id: Option<String>,
    /// Normalized to UTC; absent when the date header is unparseable.
    pub date: Option<DateTime<Utc>>,
    /// Lower-cased sender address, or empty.
    pub sender: String,
    pub recipients: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<AttachmentMeta>,
    /// Lower-cased header name to value; repeated headers newline-joined
    /// in encounter order.
    pub headers: BTreeMap<String, String>,
    /// Set semantics: a triple already present is never duplicated.
    pub source_locations: Vec<SourceLocation>,
    /// Reserved for downstream enrichment; empty at creation.
    pub enrichment: Vec<serde_json::Value>,
}

/// Ingestion job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Queued,
    Staging,
    Parsing,
    Parsed,
    Empty,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Staging => "STAGING",
            JobStatus::Parsing => "PARSING",
            JobStatus::Parsed => "PARSED",
            JobStatus::Empty => "EMPTY",
            JobStatus::Failed => "FAILED",
        }
    }

    /// Terminal states are never left once entered.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Parsed | JobStatus::Empty | JobStatus::Failed)
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "QUEUED" => JobStatus::Queued,
            "STAGING" => JobStatus::Staging,
            "PARSING" => JobStatus::Parsing,
            "PARSED" => JobStatus::Parsed,
            "EMPTY" => JobStatus::Empty,
            "FAILED" => JobStatus::Failed,
            _ => JobStatus::Queued,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ingestion batch (maps to the ingest_jobs table)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    /// Original archive name or caller-supplied label.
    pub source: String,
    /// Path to the staged, extracted tree; absent until staging completes.
    pub input_root: Option<String>,
    /// Total tasks fanned out; set once, at fan-out time.
    pub file_count: Option<i64>,
    /// Fan-out-level failure message; only set with `FAILED`.
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One unit of fan-out work: a single file to parse and merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTask {
    pub path: PathBuf,
    pub location: SourceLocation,
}

//! Dedupe key derivation
//!
//! Every canonical record gets exactly one identity string. A non-empty
//! Message-ID wins; otherwise the key is a content fingerprint over a fixed
//! field subset. The fingerprint intentionally collapses messages whose
//! sender, recipients, date, subject and truncated body are identical.

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Marker prefix on fingerprint-derived keys, distinguishing them from
/// protocol-derived (Message-ID) keys.
pub const FINGERPRINT_PREFIX: &str = "hash_";

/// Body characters included in the content fingerprint.
pub const BODY_PREVIEW_CHARS: usize = 2000;

/// Derive the dedupe key for a parsed message.
pub fn dedupe_key(
    message_id: Option<&str>,
    sender: &str,
    recipients: &[String],
    date: Option<DateTime<Utc>>,
    subject: &str,
    body: &str,
) -> String {
    if let Some(id) = message_id {
        let trimmed = id.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    content_fingerprint(sender, recipients, date, subject, body)
}

/// Deterministic fingerprint: key-sorted JSON over the canonical field set,
/// hashed with SHA-256.
fn content_fingerprint(
    sender: &str,
    recipients: &[String],
    date: Option<DateTime<Utc>>,
    subject: &str,
    body: &str,
) -> String {
    let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
    let date_iso = date
        .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default();

    // BTreeMap keeps the serialized key order stable across runs.
    let mut fields: BTreeMap<&str, serde_json::Value> = BTreeMap::new();
    fields.insert("from", serde_json::Value::from(sender));
    fields.insert("to", serde_json::Value::from(recipients.to_vec()));
    fields.insert("date", serde_json::Value::from(date_iso));
    fields.insert("subject", serde_json::Value::from(subject));
    fields.insert("body_preview", serde_json::Value::from(preview));

    let payload = serde_json::to_string(&fields).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    format!("{}{}", FINGERPRINT_PREFIX, hex::encode(hasher.finalize()))
}

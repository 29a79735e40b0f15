//! Message normalization
//!
//! Turns one raw message into a canonical [`EmailRecord`]: a pure transform
//! over the input bytes, no I/O. Charset and transfer-encoding handling is
//! delegated to mail-parser, which decodes declared charsets and falls back
//! lossily, so text decoding never fails; a bad date header yields an absent
//! timestamp rather than an error.

use mail_parser::{Address, Message, MessageParser, MimeHeaders, PartType};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use super::identity;
use super::types::{AttachmentMeta, EmailRecord, SourceLocation};
use crate::error::IngestError;

/// Parse raw message bytes into a canonical record whose location set
/// contains exactly the given triple.
pub fn normalize(raw: &[u8], location: SourceLocation) -> Result<EmailRecord, IngestError> {
    if raw.is_empty() {
        return Err(IngestError::MalformedMessage("empty input".to_string()));
    }

    let message = MessageParser::default()
        .parse(raw)
        .ok_or_else(|| IngestError::MalformedMessage("unparseable message".to_string()))?;

    let message_id = message
        .message_id()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());
    let subject = message.subject().map(str::trim).unwrap_or_default().to_string();

    let sender = first_address(message.from());
    let recipients = collect_addresses(message.to());
    let cc = collect_addresses(message.cc());
    let bcc = collect_addresses(message.bcc());

    // mail-parser resolves the zone offset; an offset-less date reads as UTC.
    let date = message.date().and_then(|d| {
        chrono::DateTime::parse_from_rfc3339(&d.to_rfc3339())
            .ok()
            .map(|parsed| parsed.with_timezone(&chrono::Utc))
    });

    let body = extract_text_body(&message);
    let attachments = collect_attachments(&message);
    let headers = raw_header_map(&message);

    let dedupe_key = identity::dedupe_key(
        message_id.as_deref(),
        &sender,
        &recipients,
        date,
        &subject,
        &body,
    );

    Ok(EmailRecord {
        dedupe_key,
        message_id,
        date,
        sender,
        recipients,
        cc,
        bcc,
        subject,
        body,
        attachments,
        headers,
        source_locations: vec![location],
        enrichment: Vec::new(),
    })
}

/// First address of an address header, lower-cased, display name dropped.
fn first_address(addr: Option<&Address>) -> String {
    addr.and_then(|a| a.first())
        .and_then(|a| a.address())
        .map(|a| a.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

/// All addresses of an address header, lower-cased, empties dropped.
fn collect_addresses(addr: Option<&Address>) -> Vec<String> {
    let Some(addr) = addr else {
        return Vec::new();
    };
    addr.iter()
        .filter_map(|a| a.address())
        .map(|a| a.trim().to_ascii_lowercase())
        .filter(|a| !a.is_empty())
        .collect()
}

/// Concatenation of every text/plain part payload in part order; "" when the
/// message has no text part. Parts without a declared content type count as
/// plain text.
fn extract_text_body(message: &Message) -> String {
    let mut body = String::new();
    for part in &message.parts {
        let PartType::Text(text) = &part.body else {
            continue;
        };
        let declared_plain = part
            .content_type()
            .map(|ct| {
                ct.ctype().eq_ignore_ascii_case("text")
                    && ct.subtype().map_or(true, |s| s.eq_ignore_ascii_case("plain"))
            })
            .unwrap_or(true);
        if declared_plain {
            body.push_str(text);
        }
    }
    body
}

/// Every part carrying an attachment filename contributes one metadata
/// entry; payloads are only measured.
fn collect_attachments(message: &Message) -> Vec<AttachmentMeta> {
    let mut attachments = Vec::new();
    for part in &message.parts {
        let Some(name) = part.attachment_name() else {
            continue;
        };
        let content_type = part
            .content_type()
            .map(|ct| match ct.subtype() {
                Some(subtype) => format!("{}/{}", ct.ctype(), subtype),
                None => ct.ctype().to_string(),
            })
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let size = match &part.body {
            PartType::Binary(data) | PartType::InlineBinary(data) => data.len(),
            PartType::Text(text) | PartType::Html(text) => text.len(),
            _ => 0,
        } as i64;

        attachments.push(AttachmentMeta {
            filename: name.to_string(),
            content_type,
            size,
        });
    }
    attachments
}

/// Top-level headers as lower-cased name to raw value; repeated names are
/// newline-joined in encounter order.
fn raw_header_map(message: &Message) -> BTreeMap<String, String> {
    let raw: &[u8] = &message.raw_message;
    let mut headers: BTreeMap<String, String> = BTreeMap::new();

    for header in message.root_part().headers() {
        let name = header.name.as_str().to_ascii_lowercase();
        let value = raw
            .get(header.offset_start as usize..header.offset_end as usize)
            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
            .unwrap_or_default();

        match headers.entry(name) {
            Entry::Occupied(mut entry) => {
                let joined = entry.get_mut();
                joined.push('\n');
                joined.push_str(&value);
            },
            Entry::Vacant(entry) => {
                entry.insert(value);
            },
        }
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn location() -> SourceLocation {
        SourceLocation {
            owner: "allen-p".to_string(),
            folder: "inbox".to_string(),
            filename: "1.eml".to_string(),
        }
    }

    const SIMPLE: &[u8] = b"Message-ID: <x@y>\r\n\
From: Alice Example <ALICE@Example.COM>\r\n\
To: bob@example.com, Carol <carol@example.com>\r\n\
Cc: dave@example.com\r\n\
Subject: Quarterly numbers\r\n\
Date: Mon, 14 May 2001 16:39:00 -0700\r\n\
X-Note: first\r\n\
X-Note: second\r\n\
Content-Type: text/plain; charset=us-ascii\r\n\
\r\n\
Please find the numbers attached.\r\n";

    #[test]
    fn test_simple_message_fields() {
        let record = normalize(SIMPLE, location()).unwrap();

        // mail-parser strips the angle brackets from the Message-ID
        assert_eq!(record.dedupe_key, "x@y");
        assert_eq!(record.message_id.as_deref(), Some("x@y"));
        assert_eq!(record.sender, "alice@example.com");
        assert_eq!(record.recipients, vec!["bob@example.com", "carol@example.com"]);
        assert_eq!(record.cc, vec!["dave@example.com"]);
        assert!(record.bcc.is_empty());
        assert_eq!(record.subject, "Quarterly numbers");
        assert!(record.body.contains("Please find the numbers attached."));
        assert!(record.attachments.is_empty());
        assert_eq!(record.source_locations, vec![location()]);
        assert!(record.enrichment.is_empty());

        // -0700 normalizes to UTC
        let expected = Utc.with_ymd_and_hms(2001, 5, 14, 23, 39, 0).unwrap();
        assert_eq!(record.date, Some(expected));
    }

    #[test]
    fn test_repeated_headers_newline_joined() {
        let record = normalize(SIMPLE, location()).unwrap();
        assert_eq!(record.headers.get("x-note").map(String::as_str), Some("first\nsecond"));
        assert_eq!(record.headers.get("subject").map(String::as_str), Some("Quarterly numbers"));
        assert!(record.headers.contains_key("message-id"));
    }

    const MULTIPART: &[u8] = b"Message-ID: <multi@y>\r\n\
From: alice@example.com\r\n\
To: bob@example.com\r\n\
Subject: With attachment\r\n\
Date: Tue, 15 May 2001 09:00:00 +0000\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"xyz\"\r\n\
\r\n\
--xyz\r\n\
Content-Type: text/plain; charset=us-ascii\r\n\
\r\n\
first part\r\n\
--xyz\r\n\
Content-Type: text/html\r\n\
\r\n\
<b>not body</b>\r\n\
--xyz\r\n\
Content-Type: application/pdf; name=\"doc.pdf\"\r\n\
Content-Disposition: attachment; filename=\"doc.pdf\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
AAAA\r\n\
--xyz--\r\n";

    #[test]
    fn test_multipart_body_is_plain_text_parts_only() {
        let record = normalize(MULTIPART, location()).unwrap();
        assert!(record.body.contains("first part"));
        assert!(!record.body.contains("not body"));
    }

    #[test]
    fn test_multipart_attachment_metadata() {
        let record = normalize(MULTIPART, location()).unwrap();
        assert_eq!(record.attachments.len(), 1);
        let attachment = &record.attachments[0];
        assert_eq!(attachment.filename, "doc.pdf");
        assert_eq!(attachment.content_type, "application/pdf");
        assert_eq!(attachment.size, 3);
    }

    #[test]
    fn test_bad_date_yields_absent_timestamp() {
        let raw = b"Message-ID: <d@y>\r\n\
From: alice@example.com\r\n\
Date: not a date at all\r\n\
Subject: s\r\n\
\r\n\
body\r\n";
        let record = normalize(raw, location()).unwrap();
        assert_eq!(record.date, None);
        assert_eq!(record.dedupe_key, "d@y");
    }

    #[test]
    fn test_missing_message_id_gets_fingerprint_key() {
        let raw = b"From: alice@example.com\r\n\
To: bob@example.com\r\n\
Subject: no id\r\n\
\r\n\
body\r\n";
        let record = normalize(raw, location()).unwrap();
        assert!(record.message_id.is_none());
        assert!(record.dedupe_key.starts_with(identity::FINGERPRINT_PREFIX));

        // Same bytes, same identity
        let again = normalize(raw, location()).unwrap();
        assert_eq!(record.dedupe_key, again.dedupe_key);
    }

    #[test]
    fn test_empty_input_is_malformed() {
        let result = normalize(b"", location());
        assert!(matches!(result, Err(IngestError::MalformedMessage(_))));
    }
}

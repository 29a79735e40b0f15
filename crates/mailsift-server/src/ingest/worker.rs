//! Parse task execution
//!
//! One task = one file: read, normalize, merge. Tasks are fully independent;
//! the only shared resource they touch is the merge store.

use std::sync::Arc;

use super::normalizer::normalize;
use super::store::{EmailStore, MergeOutcome};
use super::types::ParseTask;
use crate::error::IngestError;

/// Run one parse task, absorbing its failure at the task boundary. A file
/// that cannot be read or parsed is logged and counted, never fatal to the
/// group.
pub async fn execute_parse_task(store: Arc<dyn EmailStore>, task: ParseTask) -> bool {
    match parse_and_merge(store.as_ref(), &task).await {
        Ok(outcome) => {
            tracing::debug!(
                path = %task.path.display(),
                created = outcome.created,
                "Parsed and merged"
            );
            true
        },
        Err(e) => {
            tracing::warn!(
                path = %task.path.display(),
                owner = %task.location.owner,
                folder = %task.location.folder,
                error = %e,
                "Parse task failed"
            );
            false
        },
    }
}

/// Read the file, normalize it and merge the resulting record.
pub async fn parse_and_merge(
    store: &dyn EmailStore,
    task: &ParseTask,
) -> Result<MergeOutcome, IngestError> {
    let raw = tokio::fs::read(&task.path).await?;
    let record = normalize(&raw, task.location.clone())?;
    store.merge(&record).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::store::MemoryEmailStore;
    use crate::ingest::types::SourceLocation;
    use std::path::PathBuf;

    fn task(path: PathBuf) -> ParseTask {
        ParseTask {
            path,
            location: SourceLocation {
                owner: "allen-p".to_string(),
                folder: "inbox".to_string(),
                filename: "1.eml".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_parse_and_merge_stores_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.eml");
        std::fs::write(
            &path,
            b"Message-ID: <w@x>\r\nFrom: a@b.com\r\nSubject: s\r\n\r\nbody\r\n",
        )
        .unwrap();

        let store = MemoryEmailStore::new();
        let outcome = parse_and_merge(&store, &task(path)).await.unwrap();

        assert!(outcome.created);
        assert!(store.get("w@x").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_execute_absorbs_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.eml");
        std::fs::write(&path, b"").unwrap();

        let store = Arc::new(MemoryEmailStore::new());
        let ok = execute_parse_task(store.clone(), task(path)).await;

        assert!(!ok);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_execute_absorbs_missing_file() {
        let store = Arc::new(MemoryEmailStore::new());
        let ok = execute_parse_task(store, task(PathBuf::from("/nonexistent/1.eml"))).await;
        assert!(!ok);
    }
}

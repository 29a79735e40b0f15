//! Job coordinator
//!
//! Drives one ingestion batch through its lifecycle: enumerate the staged
//! tree, fan one parse task out per file, fan completions back in to a
//! single terminal status. Fan-out submission never blocks the caller;
//! progress is observable only through the job record.

use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use super::jobs::JobStore;
use super::store::EmailStore;
use super::tasks::TaskGroup;
use super::types::{JobStatus, ParseTask};
use super::walker::walk_tree;
use super::worker;
use crate::error::IngestError;

/// Coordinates ingestion jobs. Holds explicitly constructed store clients;
/// lifecycle of the underlying connections is owned by the process entry
/// point.
#[derive(Clone)]
pub struct JobCoordinator {
    jobs: Arc<dyn JobStore>,
    emails: Arc<dyn EmailStore>,
    parse_concurrency: usize,
}

impl JobCoordinator {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        emails: Arc<dyn EmailStore>,
        parse_concurrency: usize,
    ) -> Self {
        Self {
            jobs,
            emails,
            parse_concurrency,
        }
    }

    /// Create a job for an already-staged tree and begin its lifecycle in
    /// the background. Returns as soon as the job record exists.
    pub async fn submit_job(&self, input_root: &Path, source: &str) -> Result<Uuid, IngestError> {
        let job = self.jobs.create(source, Some(input_root)).await?;
        let job_id = job.id;
        tracing::info!(job_id = %job_id, source = %source, "Job submitted");

        let coordinator = self.clone();
        tokio::spawn(async move {
            coordinator.start(job_id).await;
        });

        Ok(job_id)
    }

    /// Run the fan-out for a job. Any fan-out-level failure moves the job to
    /// `FAILED`; a stale or deleted job id is a logged no-op.
    pub async fn start(&self, job_id: Uuid) {
        if let Err(e) = self.run(job_id).await {
            tracing::error!(job_id = %job_id, error = %e, "Fan-out failed");
            if let Err(mark_err) = self.jobs.mark_failed(job_id, &e.to_string()).await {
                tracing::error!(
                    job_id = %job_id,
                    error = %mark_err,
                    "Failed to record job failure"
                );
            }
        }
    }

    async fn run(&self, job_id: Uuid) -> Result<(), IngestError> {
        let Some(job) = self.jobs.get(job_id).await? else {
            tracing::warn!(job_id = %job_id, "Job not found at start, nothing to do");
            return Ok(());
        };

        let input_root = job.input_root.ok_or_else(|| {
            IngestError::StagingFailure("job has no staged input root".to_string())
        })?;

        let tasks: Vec<ParseTask> = walk_tree(Path::new(&input_root))?.collect();

        if tasks.is_empty() {
            tracing::info!(job_id = %job_id, input_root = %input_root, "No files to parse");
            self.jobs.set_status(job_id, JobStatus::Empty).await?;
            return Ok(());
        }

        let file_count = tasks.len() as i64;
        self.jobs.mark_parsing(job_id, file_count).await?;
        tracing::info!(job_id = %job_id, file_count, "Parse tasks queued");

        let mut group = TaskGroup::new(self.parse_concurrency);
        for task in tasks {
            group.submit(worker::execute_parse_task(self.emails.clone(), task));
        }

        // Fan-in continuation: fires once when every task has finished,
        // regardless of individual outcomes.
        let jobs = self.jobs.clone();
        group.join(move |stats| async move {
            tracing::info!(
                job_id = %job_id,
                submitted = stats.submitted,
                succeeded = stats.succeeded,
                failed = stats.failed,
                "Parse group complete"
            );
            if let Err(e) = jobs.set_status(job_id, JobStatus::Parsed).await {
                tracing::error!(job_id = %job_id, error = %e, "Failed to mark job parsed");
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::jobs::MemoryJobStore;
    use crate::ingest::store::MemoryEmailStore;
    use crate::ingest::types::Job;
    use std::fs;
    use std::time::Duration;

    fn coordinator() -> (JobCoordinator, Arc<MemoryJobStore>, Arc<MemoryEmailStore>) {
        let jobs = Arc::new(MemoryJobStore::new());
        let emails = Arc::new(MemoryEmailStore::new());
        let coordinator = JobCoordinator::new(jobs.clone(), emails.clone(), 4);
        (coordinator, jobs, emails)
    }

    fn write_message(root: &Path, owner: &str, folder: &str, file: &str, message_id: &str) {
        let dir = root.join(owner).join(folder);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(file),
            format!(
                "Message-ID: {}\r\nFrom: a@b.com\r\nTo: c@d.com\r\nSubject: s\r\n\r\nbody\r\n",
                message_id
            ),
        )
        .unwrap();
    }

    async fn wait_for_terminal(jobs: &MemoryJobStore, id: Uuid) -> Job {
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
    async fn test_empty_tree_goes_empty_without_fanout() {
        let (coordinator, jobs, emails) = coordinator();
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("allen-p")).unwrap();

        let job = jobs.create("empty.zip", Some(dir.path())).await.unwrap();
        coordinator.start(job.id).await;

        let job = jobs.get(job.id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Empty);
        assert_eq!(job.file_count, None);
        assert!(emails.is_empty().await);
        assert_eq!(
            jobs.history(job.id).await,
            vec![JobStatus::Queued, JobStatus::Empty]
        );
    }

    #[tokio::test]
    async fn test_full_lifecycle_reaches_parsed() {
        let (coordinator, jobs, emails) = coordinator();
        let dir = tempfile::tempdir().unwrap();
        write_message(dir.path(), "allen-p", "inbox", "1.eml", "<1@x>");
        write_message(dir.path(), "allen-p", "inbox", "2.eml", "<2@x>");
        write_message(dir.path(), "beck-s", "sent", "3.eml", "<3@x>");

        let job_id = coordinator
            .submit_job(dir.path(), "archive.zip")
            .await
            .unwrap();

        let job = wait_for_terminal(&jobs, job_id).await;
        assert_eq!(job.status, JobStatus::Parsed);
        assert_eq!(job.file_count, Some(3));
        assert_eq!(emails.len().await, 3);
        assert_eq!(
            jobs.history(job_id).await,
            vec![JobStatus::Queued, JobStatus::Parsing, JobStatus::Parsed]
        );
    }

    #[tokio::test]
    async fn test_malformed_files_do_not_fail_the_batch() {
        let (coordinator, jobs, emails) = coordinator();
        let dir = tempfile::tempdir().unwrap();
        write_message(dir.path(), "allen-p", "inbox", "1.eml", "<1@x>");
        // Unparseable member of the batch
        let bad_dir = dir.path().join("allen-p").join("inbox");
        fs::write(bad_dir.join("0_bad.eml"), b"").unwrap();

        let job_id = coordinator
            .submit_job(dir.path(), "archive.zip")
            .await
            .unwrap();

        let job = wait_for_terminal(&jobs, job_id).await;
        assert_eq!(job.status, JobStatus::Parsed);
        assert_eq!(job.file_count, Some(2));
        assert_eq!(emails.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_message_across_mailboxes_merges() {
        let (coordinator, jobs, emails) = coordinator();
        let dir = tempfile::tempdir().unwrap();
        write_message(dir.path(), "allen-p", "inbox", "a.eml", "<x@y>");
        write_message(dir.path(), "allen-p", "sent", "a_copy.eml", "<x@y>");

        let job_id = coordinator
            .submit_job(dir.path(), "archive.zip")
            .await
            .unwrap();
        wait_for_terminal(&jobs, job_id).await;

        assert_eq!(emails.len().await, 1);
        let record = emails.get("x@y").await.unwrap().unwrap();
        assert_eq!(record.source_locations.len(), 2);
        let folders: Vec<&str> = record
            .source_locations
            .iter()
            .map(|l| l.folder.as_str())
            .collect();
        assert!(folders.contains(&"inbox"));
        assert!(folders.contains(&"sent"));
    }

    #[tokio::test]
    async fn test_reingestion_is_idempotent() {
        let (coordinator, jobs, emails) = coordinator();
        let dir = tempfile::tempdir().unwrap();
        write_message(dir.path(), "allen-p", "inbox", "1.eml", "<1@x>");
        write_message(dir.path(), "allen-p", "sent", "2.eml", "<2@x>");

        for _ in 0..2 {
            let job_id = coordinator
                .submit_job(dir.path(), "archive.zip")
                .await
                .unwrap();
            wait_for_terminal(&jobs, job_id).await;
        }

        assert_eq!(emails.len().await, 2);
        let record = emails.get("1@x").await.unwrap().unwrap();
        assert_eq!(record.source_locations.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_job_is_a_noop() {
        let (coordinator, _jobs, emails) = coordinator();
        coordinator.start(Uuid::new_v4()).await;
        assert!(emails.is_empty().await);
    }

    #[tokio::test]
    async fn test_unreadable_input_root_fails_the_job() {
        let (coordinator, jobs, _emails) = coordinator();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("never-staged");

        let job = jobs.create("archive.zip", Some(&missing)).await.unwrap();
        coordinator.start(job.id).await;

        let job = jobs.get(job.id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.error.is_some());
    }
}

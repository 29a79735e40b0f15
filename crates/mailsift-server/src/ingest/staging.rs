//! Archive staging
//!
//! Extracts an uploaded zip archive into a per-job directory under the
//! configured staging root. Extraction is synchronous; callers on the async
//! path run it through `spawn_blocking`.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::IngestError;

/// Extract `bytes` as a zip archive into `<staging_root>/job-<id>` and
/// return the extracted tree's root.
pub fn stage_archive(
    staging_root: &Path,
    job_id: Uuid,
    bytes: &[u8],
) -> Result<PathBuf, IngestError> {
    let target = staging_root.join(format!("job-{}", job_id));
    std::fs::create_dir_all(&target)?;

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| IngestError::StagingFailure(format!("unreadable archive: {}", e)))?;
    archive
        .extract(&target)
        .map_err(|e| IngestError::StagingFailure(format!("archive extraction failed: {}", e)))?;

    tracing::debug!(
        job_id = %job_id,
        entries = archive.len(),
        target = %target.display(),
        "Archive staged"
    );

    Ok(target)
}

//! Submit command: upload a zip archive for ingestion

use std::path::PathBuf;

use crate::api::ApiClient;
use crate::error::{CliError, Result};

pub async fn run(archive: PathBuf) -> Result<()> {
    if !archive.is_file() {
        return Err(CliError::InvalidArgument(format!(
            "{} is not a readable file",
            archive.display()
        )));
    }

    let client = ApiClient::from_env()?;
    let response = client.submit_archive(&archive).await?;

    tracing::info!(job_id = %response.job_id, "Archive submitted");
    println!("Submitted {}", archive.display());
    println!("  job id: {}", response.job_id);
    println!("  status: {}", response.status);
    println!();
    println!("Follow progress with: mailsift status {}", response.job_id);

    Ok(())
}

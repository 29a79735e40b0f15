//! Jobs command: list recent jobs

use crate::api::ApiClient;
use crate::error::Result;

pub async fn run(limit: Option<i64>) -> Result<()> {
    let client = ApiClient::from_env()?;
    let response = client.list_jobs(limit).await?;

    if response.jobs.is_empty() {
        println!("No jobs found");
        return Ok(());
    }

    for job in &response.jobs {
        let files = job
            .file_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {:<8} files={:<6} {}",
            job.id, job.status, files, job.source
        );
    }

    Ok(())
}

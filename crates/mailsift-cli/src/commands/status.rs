//! Status command: show one job's status projection

use uuid::Uuid;

use crate::api::ApiClient;
use crate::error::{CliError, Result};

pub async fn run(job_id: String) -> Result<()> {
    // Validate locally so typos fail before any request
    let job_id: Uuid = job_id
        .parse()
        .map_err(|_| CliError::InvalidArgument(format!("{} is not a job id", job_id)))?;

    let client = ApiClient::from_env()?;
    let job = client.get_job(&job_id.to_string()).await?;

    println!("Job {}", job.id);
    println!("  status:     {}", job.status);
    println!("  source:     {}", job.source);
    println!("  created at: {}", job.created_at);
    if let Some(file_count) = job.file_count {
        println!("  files:      {}", file_count);
    }
    if let Some(input_root) = &job.input_root {
        println!("  input root: {}", input_root);
    }
    if let Some(error) = &job.error {
        println!("  error:      {}", error);
    }

    Ok(())
}

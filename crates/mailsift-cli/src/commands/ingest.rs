//! Ingest command: submit an already-staged tree on the server host

use std::path::PathBuf;

use crate::api::ApiClient;
use crate::error::Result;

pub async fn run(input_root: PathBuf, source: String) -> Result<()> {
    let client = ApiClient::from_env()?;
    let response = client.submit_tree(&input_root, &source).await?;

    tracing::info!(job_id = %response.job_id, "Tree submitted");
    println!("Triggered job {} for {}", response.job_id, input_root.display());
    println!("  status: {}", response.status);

    Ok(())
}

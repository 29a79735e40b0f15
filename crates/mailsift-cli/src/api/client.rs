//! HTTP API client for the mailsift server

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use std::path::Path;
use std::time::Duration;

use crate::api::{endpoints, types::*};
use crate::error::{CliError, Result};

// ============================================================================
// API Client Constants
// ============================================================================

/// Default timeout for API requests in seconds.
/// Can be overridden via MAILSIFT_API_TIMEOUT_SECS. Generous to accommodate
/// large archive uploads.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 300;

/// Default mailsift server URL when not specified via environment variable.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// API client for the mailsift server
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: String) -> Result<Self> {
        let timeout_secs = std::env::var("MAILSIFT_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_API_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("MAILSIFT_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());

        Self::new(base_url)
    }

    /// Check server health
    pub async fn health_check(&self) -> Result<bool> {
        let url = endpoints::health_url(&self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Upload a zip archive for ingestion
    pub async fn submit_archive(&self, archive: &Path) -> Result<SubmitResponse> {
        let url = endpoints::ingest_url(&self.base_url);

        let filename = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.zip".to_string());
        let bytes = tokio::fs::read(archive).await?;

        let form = Form::new().part(
            "file",
            Part::bytes(bytes)
                .file_name(filename)
                .mime_str("application/zip")?,
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// Submit an already-staged tree on the server host
    pub async fn submit_tree(&self, input_root: &Path, source: &str) -> Result<SubmitResponse> {
        let url = endpoints::ingest_tree_url(&self.base_url);

        let request = SubmitTreeRequest {
            input_root: input_root.to_string_lossy().into_owned(),
            source: source.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// Fetch one job's status projection
    pub async fn get_job(&self, job_id: &str) -> Result<JobDetails> {
        let url = endpoints::job_url(&self.base_url, job_id);

        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CliError::api(format!("Job not found: {}", job_id)));
        }

        Ok(response.error_for_status()?.json().await?)
    }

    /// List recent jobs
    pub async fn list_jobs(&self, limit: Option<i64>) -> Result<ListJobsResponse> {
        let mut url = endpoints::jobs_url(&self.base_url);
        if let Some(limit) = limit {
            url = format!("{}?limit={}", url, limit);
        }

        let response = self.client.get(&url).send().await?.error_for_status()?;

        Ok(response.json().await?)
    }
}

//! API endpoint URL construction

/// Health check endpoint
pub fn health_url(base: &str) -> String {
    format!("{}/health", base.trim_end_matches('/'))
}

/// Archive upload endpoint
pub fn ingest_url(base: &str) -> String {
    format!("{}/api/v1/ingest", base.trim_end_matches('/'))
}

/// Staged tree submission endpoint
pub fn ingest_tree_url(base: &str) -> String {
    format!("{}/api/v1/ingest/tree", base.trim_end_matches('/'))
}

/// Job listing endpoint
pub fn jobs_url(base: &str) -> String {
    format!("{}/api/v1/jobs", base.trim_end_matches('/'))
}

/// Single job endpoint
pub fn job_url(base: &str, job_id: &str) -> String {
    format!("{}/api/v1/jobs/{}", base.trim_end_matches('/'), job_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_strip_trailing_slash() {
        assert_eq!(health_url("http://x:8000/"), "http://x:8000/health");
        assert_eq!(ingest_url("http://x:8000"), "http://x:8000/api/v1/ingest");
        assert_eq!(
            job_url("http://x:8000/", "abc"),
            "http://x:8000/api/v1/jobs/abc"
        );
    }
}

//! Feature modules implementing the mailsift API
//!
//! Each feature is a vertical slice with its own commands/queries and
//! routes:
//!
//! - **ingest**: archive upload and tree submission (write operations)
//! - **jobs**: job status projections (read operations)
//! - **emails**: canonical record readback (read operations)
//!
//! Commands and queries implement the mediator pattern via the `mediator`
//! crate's `Request` trait and are invoked directly by their routes.

pub mod emails;
pub mod ingest;
pub mod jobs;

use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;

use crate::ingest::{EmailStore, JobCoordinator, JobStore};

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Drives job fan-out/fan-in.
    pub coordinator: JobCoordinator,
    /// Job record store, shared with the coordinator.
    pub jobs: Arc<dyn JobStore>,
    /// Canonical email record store, shared with the parse tasks.
    pub emails: Arc<dyn EmailStore>,
    /// Where uploaded archives are extracted.
    pub staging_dir: PathBuf,
}

/// Creates the main API router with all feature routes mounted
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/ingest", ingest::ingest_routes())
        .nest("/jobs", jobs::jobs_routes())
        .nest("/emails", emails::emails_routes())
        .with_state(state)
}

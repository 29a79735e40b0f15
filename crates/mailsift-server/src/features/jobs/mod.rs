//! Jobs feature: read-only job status projections

pub mod queries;
pub mod routes;

pub use routes::jobs_routes;

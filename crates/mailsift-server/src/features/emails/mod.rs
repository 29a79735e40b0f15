//! Emails feature: canonical record readback

pub mod queries;
pub mod routes;

pub use routes::emails_routes;

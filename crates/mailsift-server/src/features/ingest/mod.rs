//! Ingest feature: archive upload and tree submission

pub mod commands;
pub mod routes;

pub use routes::ingest_routes;

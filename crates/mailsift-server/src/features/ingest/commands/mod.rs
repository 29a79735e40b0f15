//! Ingest commands

pub mod submit_archive;
pub mod submit_tree;

pub use submit_archive::{SubmitArchiveCommand, SubmitArchiveError, SubmitArchiveResponse};
pub use submit_tree::{SubmitTreeCommand, SubmitTreeError, SubmitTreeResponse};

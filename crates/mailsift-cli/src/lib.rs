//! Mailsift CLI Library
//!
//! Operator interface against a running mailsift server: upload archives,
//! submit staged trees, and follow job status.

pub mod api;
pub mod commands;
pub mod error;

pub use error::{CliError, Result};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mailsift email archive ingestion CLI
#[derive(Parser)]
#[command(name = "mailsift", version, about = "Ingest bulk email archives into the mailsift store")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a zip archive of a mailbox tree for ingestion
    Submit {
        /// Path to the zip archive
        archive: PathBuf,
    },
    /// Submit an already-staged tree on the server host
    Ingest {
        /// Path to the staged owner/folder/file tree
        input_root: PathBuf,
        /// Source label recorded on the job
        #[arg(short, long, default_value = "manual_trigger")]
        source: String,
    },
    /// Show the status of one job
    Status {
        /// Job id returned at submission
        job_id: String,
    },
    /// List recent jobs
    Jobs {
        /// Maximum number of jobs to show
        #[arg(short, long)]
        limit: Option<i64>,
    },
}

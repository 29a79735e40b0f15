//! Mailsift CLI - Main entry point

use clap::Parser;
use mailsift_cli::{Cli, Commands};
use mailsift_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Verbose mode logs debug to console; normal mode only warnings
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("mailsift-cli".to_string())
        .build();

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    // The CLI keeps working even if logging cannot initialize
    let _ = init_logging(&log_config);

    let result = match cli.command {
        Commands::Submit { archive } => mailsift_cli::commands::submit::run(archive).await,
        Commands::Ingest { input_root, source } => {
            mailsift_cli::commands::ingest::run(input_root, source).await
        },
        Commands::Status { job_id } => mailsift_cli::commands::status::run(job_id).await,
        Commands::Jobs { limit } => mailsift_cli::commands::jobs::run(limit).await,
    };

    if let Err(e) = result {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

//! CLI command definitions and dispatch.

pub mod companies;
pub mod ingest;
pub mod jobs;
pub mod migrate;
pub mod purge;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use jobfeed_core::config::AppConfig;
use jobfeed_core::error::AppError;
use jobfeed_database::DatabasePool;

/// JobFeed bulk job-posting ingestion
#[derive(Debug, Parser)]
#[command(name = "jobfeed", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Ingest a spreadsheet or CSV export
    Ingest(ingest::IngestArgs),
    /// Delete expired job postings
    Purge(purge::PurgeArgs),
    /// Browse and delete job postings
    Jobs(jobs::JobsArgs),
    /// List registered companies
    Companies,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate => migrate::execute(&self.config).await,
            Commands::Ingest(args) => ingest::execute(args, &self.config, self.format).await,
            Commands::Purge(args) => purge::execute(args, &self.config).await,
            Commands::Jobs(args) => jobs::execute(args, &self.config, self.format).await,
            Commands::Companies => companies::execute(&self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(config_path)
}

/// Helper: create database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

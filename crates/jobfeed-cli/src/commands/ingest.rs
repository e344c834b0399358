//! Manual ingestion of an export file.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use crate::output::{self, OutputFormat};
use jobfeed_core::error::AppError;
use jobfeed_core::traits::{Clock, SystemClock};
use jobfeed_database::repositories::{CompanyRepository, JobRepository};
use jobfeed_database::{CompanyStore, JobStore, MemoryStore};
use jobfeed_ingest::{IngestSource, IngestionPipeline};

/// Arguments for the ingest command
#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Path to the `.xlsx` or `.csv` file
    pub file: PathBuf,

    /// Run the full pipeline against an in-memory store; nothing is written
    #[arg(long)]
    pub dry_run: bool,

    /// Delete the file afterwards, as the upload path does
    #[arg(long)]
    pub remove: bool,
}

/// Execute the ingest command
pub async fn execute(
    args: &IngestArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let mut source = IngestSource::drop_file(&args.file)?;
    source.remove_after = args.remove;

    if args.dry_run {
        let store = Arc::new(MemoryStore::new());
        let mut ingest_config = config.ingest.clone();
        // Keep dry-run copies out of the real archive.
        ingest_config.archive_dir = std::env::temp_dir()
            .join("jobfeed-dry-run")
            .display()
            .to_string();
        let pipeline = IngestionPipeline::new(store.clone(), store, clock, &ingest_config);

        let outcome = pipeline.ingest(&source).await?;
        output::print_warning("Dry run: nothing was written to the database.");
        output::print_item(&outcome, format);
        return Ok(());
    }

    let db = super::create_db_pool(&config).await?;
    let jobs: Arc<dyn JobStore> = Arc::new(JobRepository::new(db.pool().clone()));
    let companies: Arc<dyn CompanyStore> = Arc::new(CompanyRepository::new(db.pool().clone()));
    let pipeline = IngestionPipeline::new(jobs, companies, clock, &config.ingest);

    let result = pipeline.ingest(&source).await;
    db.close().await;

    let outcome = result?;
    output::print_success(&outcome.message);
    output::print_item(&outcome, format);
    Ok(())
}

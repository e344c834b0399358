//! Expired posting purge command.

use chrono::Utc;
use clap::Args;

use crate::output;
use jobfeed_core::error::AppError;
use jobfeed_database::repositories::JobRepository;
use jobfeed_ingest::ExpiryReaper;

/// Arguments for the purge command
#[derive(Debug, Args)]
pub struct PurgeArgs {
    /// Only report how many postings would be deleted
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(long)]
    pub force: bool,
}

/// Execute the purge command
pub async fn execute(args: &PurgeArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::create_db_pool(&config).await?;
    let reaper = ExpiryReaper::new(std::sync::Arc::new(JobRepository::new(db.pool().clone())));
    let now = Utc::now();

    let expired = reaper.count_expired(now).await?;
    if expired == 0 || args.dry_run {
        println!("{} expired job postings as of {}", expired, now.format("%Y-%m-%d %H:%M:%S"));
        db.close().await;
        return Ok(());
    }

    if !args.force {
        let confirm = dialoguer::Confirm::new()
            .with_prompt(format!("Delete {} expired job postings?", expired))
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;

        if !confirm {
            println!("Cancelled.");
            db.close().await;
            return Ok(());
        }
    }

    let deleted = reaper.purge_expired(now).await?;
    output::print_success(&format!("Deleted {} expired job postings.", deleted));
    db.close().await;
    Ok(())
}

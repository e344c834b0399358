//! JobFeed Server: bulk job-posting ingestion service
//!
//! Main entry point that wires the crates together, starts the daily
//! triggers, and runs until a shutdown signal arrives.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use jobfeed_core::config::AppConfig;
use jobfeed_core::error::AppError;
use jobfeed_core::traits::{Clock, SystemClock};
use jobfeed_database::repositories::{CompanyRepository, JobRepository};
use jobfeed_database::{CompanyStore, DatabasePool, JobStore};
use jobfeed_ingest::{ExpiryReaper, IngestionPipeline};
use jobfeed_worker::{DailyIngestionTask, ExpiryCleanupTask, Scheduler};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    match std::env::var("JOBFEED_CONFIG") {
        Ok(path) => AppConfig::load_from(&path),
        Err(_) => {
            let env = std::env::var("JOBFEED_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting JobFeed v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Create ingest directories ────────────────────────
    for dir in [&config.ingest.upload_dir, &config.ingest.archive_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::internal(format!("Failed to create dir '{}': {}", dir, e)))?;
    }

    // ── Step 2: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;
    jobfeed_database::migration::run_migrations(db.pool()).await?;

    // ── Step 3: Stores and pipeline ──────────────────────────────
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let jobs: Arc<dyn JobStore> = Arc::new(JobRepository::new(db.pool().clone()));
    let companies: Arc<dyn CompanyStore> = Arc::new(CompanyRepository::new(db.pool().clone()));

    let pipeline = IngestionPipeline::new(
        Arc::clone(&jobs),
        companies,
        Arc::clone(&clock),
        &config.ingest,
    );

    // ── Step 4: Daily triggers ───────────────────────────────────
    let ingestion_task = Arc::new(DailyIngestionTask::new(
        pipeline,
        &config.ingest,
        config.scheduler.timezone,
    ));
    let expiry_task = Arc::new(ExpiryCleanupTask::new(
        ExpiryReaper::new(jobs),
        Arc::clone(&clock),
    ));
    let scheduler = Scheduler::new(clock, &config.scheduler, ingestion_task, expiry_task);
    scheduler.start().await?;

    // ── Step 5: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");

    scheduler.stop().await;
    db.close().await;

    tracing::info!("JobFeed server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

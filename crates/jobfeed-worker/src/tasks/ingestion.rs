//! Daily ingestion of the collector's drop file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde_json::{Value, json};

use jobfeed_core::config::IngestConfig;
use jobfeed_core::error::{AppError, ErrorKind};
use jobfeed_core::result::AppResult;
use jobfeed_ingest::reader::SourceFormat;
use jobfeed_ingest::{IngestSource, IngestionPipeline};

use crate::scheduler::ScheduledTask;

/// Looks for `<upload_dir>/<YYYY-MM-DD>.xlsx` (then `.csv`) for the fire
/// date and ingests it. A missing file is not an error.
#[derive(Debug)]
pub struct DailyIngestionTask {
    /// Pipeline the drop file is fed through
    pipeline: IngestionPipeline,
    /// Directory the collector drops files into
    upload_dir: PathBuf,
    /// Zone in which the fire date is taken
    timezone: Tz,
}

impl DailyIngestionTask {
    /// Create a new daily ingestion task
    pub fn new(pipeline: IngestionPipeline, config: &IngestConfig, timezone: Tz) -> Self {
        Self {
            pipeline,
            upload_dir: PathBuf::from(&config.upload_dir),
            timezone,
        }
    }

    /// Candidate drop files for `date`, in lookup order.
    pub fn candidates(&self, date: NaiveDate) -> Vec<PathBuf> {
        [SourceFormat::Spreadsheet, SourceFormat::Delimited]
            .iter()
            .map(|format| self.upload_dir.join(format!("{date}.{}", format.extension())))
            .collect()
    }

    /// The first candidate that exists. An unreadable upload directory is an
    /// error, not a missing file.
    async fn find_drop_file(&self, date: NaiveDate) -> AppResult<Option<PathBuf>> {
        for candidate in self.candidates(date) {
            if exists(&candidate).await? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }
}

async fn exists(path: &Path) -> AppResult<bool> {
    tokio::fs::try_exists(path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Io,
            format!("Failed to look for drop file '{}'", path.display()),
            e,
        )
    })
}

#[async_trait]
impl ScheduledTask for DailyIngestionTask {
    fn name(&self) -> &'static str {
        "daily_ingestion"
    }

    async fn run(&self, fired_at: DateTime<Utc>) -> AppResult<Value> {
        let date = fired_at.with_timezone(&self.timezone).date_naive();

        let Some(path) = self.find_drop_file(date).await? else {
            tracing::info!(
                "No drop file for {} in '{}'; skipping",
                date,
                self.upload_dir.display()
            );
            return Ok(json!({
                "task": "daily_ingestion",
                "date": date.to_string(),
                "file": null,
                "inserted": 0,
            }));
        };

        tracing::info!("Found drop file '{}'", path.display());
        let source = IngestSource::drop_file(&path)?;
        let outcome = self.pipeline.ingest(&source).await?;

        Ok(json!({
            "task": "daily_ingestion",
            "date": date.to_string(),
            "file": path.display().to_string(),
            "inserted": outcome.inserted_count,
            "companies_created": outcome.companies_created,
        }))
    }
}

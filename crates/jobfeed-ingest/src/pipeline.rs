//! End-to-end ingestion of one input file.
//!
//! parse → load location table → stamp batch → normalize → register
//! companies → bulk insert → archive. Whatever happens, an uploaded file
//! is removed before control returns to the caller.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use jobfeed_core::config::IngestConfig;
use jobfeed_core::error::AppError;
use jobfeed_core::result::AppResult;
use jobfeed_core::traits::Clock;
use jobfeed_core::types::response::ErrorPayload;
use jobfeed_database::store::{CompanyStore, JobStore};

use crate::archive::ArchivalSidecar;
use crate::loader::BulkLoader;
use crate::location::LocationTable;
use crate::normalize::FieldNormalizer;
use crate::reader::{self, SourceFormat};
use crate::registry::CompanyRegistry;

/// An input file queued for ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSource {
    /// Where the file currently lives.
    pub path: PathBuf,
    /// Name used for the archive copy.
    pub original_name: String,
    /// Parser to use.
    pub format: SourceFormat,
    /// Delete `path` once the run is over.
    pub remove_after: bool,
}

impl IngestSource {
    /// An uploaded file whose format comes from the declared extension.
    ///
    /// Uploads are always removed after the run.
    pub fn upload(path: impl Into<PathBuf>, declared_extension: &str) -> AppResult<Self> {
        let path = path.into();
        let format = SourceFormat::from_extension(declared_extension)?;
        let original_name = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => format!("{stem}.{}", format.extension()),
            None => format!("upload.{}", format.extension()),
        };
        Ok(Self {
            path,
            original_name,
            format,
            remove_after: true,
        })
    }

    /// A file dropped in place by the collector. It is left where it is.
    pub fn drop_file(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let format = SourceFormat::from_path(&path)?;
        let original_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("drop")
            .to_string();
        Ok(Self {
            path,
            original_name,
            format,
            remove_after: false,
        })
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOutcome {
    /// Job postings persisted.
    pub inserted_count: u64,
    /// Companies seen for the first time.
    pub companies_created: u64,
    /// Human-readable summary.
    pub message: String,
    /// Creation timestamp shared by the whole batch.
    pub batch_timestamp: DateTime<Utc>,
}

/// What the request layer hands back for an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadResponse {
    /// The batch was persisted.
    #[serde(rename_all = "camelCase")]
    Success { inserted_count: u64, message: String },
    /// Nothing was persisted.
    Failure(ErrorPayload),
}

impl From<AppResult<IngestOutcome>> for UploadResponse {
    fn from(result: AppResult<IngestOutcome>) -> Self {
        match result {
            Ok(outcome) => Self::Success {
                inserted_count: outcome.inserted_count,
                message: outcome.message,
            },
            Err(e) => Self::Failure(e.to_payload()),
        }
    }
}

/// Runs ingestion batches against a job store and a company store.
#[derive(Debug, Clone)]
pub struct IngestionPipeline {
    loader: BulkLoader,
    registry: CompanyRegistry,
    archive: ArchivalSidecar,
    location_table: PathBuf,
    clock: Arc<dyn Clock>,
}

impl IngestionPipeline {
    /// Create a pipeline from its stores, a clock, and the ingest settings.
    pub fn new(
        jobs: Arc<dyn JobStore>,
        companies: Arc<dyn CompanyStore>,
        clock: Arc<dyn Clock>,
        config: &IngestConfig,
    ) -> Self {
        Self {
            loader: BulkLoader::new(jobs),
            registry: CompanyRegistry::new(companies),
            archive: ArchivalSidecar::new(&config.archive_dir),
            location_table: PathBuf::from(&config.location_table),
            clock,
        }
    }

    /// Ingest `source`, archive it, and remove it if asked to.
    ///
    /// A successful run archives the file. A failed run of a file that is
    /// kept in place copies it under the archive's `failed/` directory, so
    /// every exit path either archives or removes the input.
    pub async fn ingest(&self, source: &IngestSource) -> AppResult<IngestOutcome> {
        info!(
            path = %source.path.display(),
            format = %source.format,
            "Starting ingestion run"
        );

        let result = self.run(source).await;

        match &result {
            Ok(outcome) => {
                self.archive
                    .archive(&source.path, &source.original_name, outcome.batch_timestamp)
                    .await;
                info!(
                    inserted = outcome.inserted_count,
                    companies_created = outcome.companies_created,
                    "Ingestion run finished"
                );
            }
            Err(e) => {
                error!(path = %source.path.display(), error = %e, "Ingestion run failed");
                if !source.remove_after {
                    self.archive
                        .archive_failed(&source.path, &source.original_name, self.clock.now())
                        .await;
                }
            }
        }

        if source.remove_after {
            remove_quietly(&source.path).await;
        }
        result
    }

    /// Entry point for the request layer: ingest an uploaded file and
    /// render the single response body.
    pub async fn handle_upload(&self, path: &Path, declared_extension: &str) -> UploadResponse {
        let source = match IngestSource::upload(path, declared_extension) {
            Ok(source) => source,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Upload rejected");
                remove_quietly(path).await;
                return UploadResponse::Failure(e.to_payload());
            }
        };
        self.ingest(&source).await.into()
    }

    async fn run(&self, source: &IngestSource) -> AppResult<IngestOutcome> {
        let path = source.path.clone();
        let format = source.format;
        let table_path = self.location_table.clone();
        let (rows, table) = tokio::task::spawn_blocking(move || {
            let rows = reader::parse(&path, format)?;
            let table = LocationTable::load(&table_path)?;
            Ok::<_, AppError>((rows, table))
        })
        .await
        .map_err(|e| AppError::internal(format!("Parser task failed: {e}")))??;

        let batch_timestamp = self.clock.now().trunc_subsecs(6);
        let jobs = FieldNormalizer::new(&table).normalize_all(&rows, batch_timestamp)?;
        // A batch the loader would reject must not leave companies behind.
        BulkLoader::validate_batch(&jobs)?;
        let companies_created = self.registry.register_batch(&jobs).await?;
        let summary = self.loader.insert_batch(&jobs).await?;

        Ok(IngestOutcome {
            inserted_count: summary.inserted_count,
            companies_created,
            message: format!("{} from '{}'", summary.summary, source.original_name),
            batch_timestamp,
        })
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove input file");
        }
    }
}

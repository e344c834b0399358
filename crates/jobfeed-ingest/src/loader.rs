//! All-or-nothing batch persistence of job records.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use jobfeed_core::error::{AppError, ErrorKind};
use jobfeed_core::result::AppResult;
use jobfeed_database::store::JobStore;
use jobfeed_entity::job::NewJob;

/// Result of a successful batch insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// Number of records persisted.
    pub inserted_count: u64,
    /// Human-readable summary line.
    pub summary: String,
}

/// Validates and persists batches of normalized job records.
#[derive(Debug, Clone)]
pub struct BulkLoader {
    store: Arc<dyn JobStore>,
}

impl BulkLoader {
    /// Create a loader writing to `store`.
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Check every record against the job constraints without touching
    /// the store. The first violation is reported as a persistence error
    /// naming the 1-based record.
    pub fn validate_batch(jobs: &[NewJob]) -> AppResult<()> {
        for (index, job) in jobs.iter().enumerate() {
            if let Err(e) = job.validate() {
                warn!(record = index + 1, error = %e, "Batch rejected by validation");
                return Err(AppError::with_source(
                    ErrorKind::Persistence,
                    format!("Record {} violates job constraints", index + 1),
                    e,
                ));
            }
        }
        Ok(())
    }

    /// Persist every record in `jobs`, or none of them.
    ///
    /// Every record is validated before the store is touched. The first
    /// violation rejects the batch with a persistence error naming the
    /// record. An empty batch succeeds without writing.
    pub async fn insert_batch(&self, jobs: &[NewJob]) -> AppResult<BatchSummary> {
        if jobs.is_empty() {
            return Ok(BatchSummary {
                inserted_count: 0,
                summary: "No records to insert".to_string(),
            });
        }

        Self::validate_batch(jobs)?;

        let inserted_count = self.store.insert_batch(jobs).await.map_err(|e| {
            warn!(error = %e, "Batch rejected by the store");
            match e.kind {
                ErrorKind::Persistence => e,
                _ => AppError::new(
                    ErrorKind::Persistence,
                    format!("Batch insert failed: {}", e.message),
                ),
            }
        })?;

        info!(inserted = inserted_count, "Job batch persisted");
        Ok(BatchSummary {
            inserted_count,
            summary: format!("Inserted {inserted_count} job postings"),
        })
    }
}

//! Daily purge of expired job postings.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use jobfeed_core::result::AppResult;
use jobfeed_core::traits::Clock;
use jobfeed_ingest::ExpiryReaper;

use crate::scheduler::ScheduledTask;

/// Deletes every posting whose validity window has closed.
#[derive(Debug)]
pub struct ExpiryCleanupTask {
    reaper: ExpiryReaper,
    clock: Arc<dyn Clock>,
}

impl ExpiryCleanupTask {
    /// Create a new expiry cleanup task
    pub fn new(reaper: ExpiryReaper, clock: Arc<dyn Clock>) -> Self {
        Self { reaper, clock }
    }
}

#[async_trait]
impl ScheduledTask for ExpiryCleanupTask {
    fn name(&self) -> &'static str {
        "expiry_cleanup"
    }

    async fn run(&self, _fired_at: DateTime<Utc>) -> AppResult<Value> {
        let now = self.clock.now();
        let deleted = self.reaper.purge_expired(now).await?;
        tracing::info!("Cleaned up {} expired job postings", deleted);

        Ok(json!({
            "task": "expiry_cleanup",
            "expired_jobs_removed": deleted,
        }))
    }
}

//! Time-based removal of lapsed postings.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use jobfeed_core::result::AppResult;
use jobfeed_database::store::JobStore;

/// Deletes job postings whose validity window has closed.
#[derive(Debug, Clone)]
pub struct ExpiryReaper {
    store: Arc<dyn JobStore>,
}

impl ExpiryReaper {
    /// Create a reaper over `store`.
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Delete every posting that expired strictly before `now`.
    ///
    /// Companies are left alone. Calling again without new expirations
    /// returns 0.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let deleted = self.store.delete_expired(now).await?;
        info!(deleted, %now, "Expired job postings purged");
        Ok(deleted)
    }

    /// How many postings a purge at `now` would delete.
    pub async fn count_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.store.count_expired(now).await
    }
}

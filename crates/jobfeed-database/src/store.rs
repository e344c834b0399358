//! Store traits the ingestion pipeline, reaper, and read side are written
//! against.
//!
//! [`crate::repositories`] implements them on PostgreSQL and
//! [`crate::memory::MemoryStore`] implements them in process.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobfeed_core::result::AppResult;
use jobfeed_core::types::pagination::{PageRequest, PageResponse};
use jobfeed_entity::company::{Company, NewCompany};
use jobfeed_entity::job::{Job, NewJob};

/// Case-insensitive substring filters for active job listings.
///
/// Unset or blank fields do not constrain the result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSearch {
    /// Match against the employer name.
    pub company: Option<String>,
    /// Match against the title.
    pub title: Option<String>,
    /// Match against the extracted skill list.
    pub skills: Option<String>,
    /// Match against the resolved location.
    pub location: Option<String>,
}

impl JobSearch {
    /// The non-blank filter terms paired with the column they apply to.
    pub fn terms(&self) -> Vec<(&'static str, &str)> {
        [
            ("company_name", &self.company),
            ("title", &self.title),
            ("skills", &self.skills),
            ("location", &self.location),
        ]
        .into_iter()
        .filter_map(|(column, term)| {
            term.as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| (column, t))
        })
        .collect()
    }
}

/// Persistence of job postings.
#[async_trait]
pub trait JobStore: Send + Sync + fmt::Debug + 'static {
    /// Insert every record or none of them. Returns the number inserted.
    ///
    /// A constraint violation on any record fails with
    /// [`jobfeed_core::ErrorKind::Persistence`] and leaves the store
    /// unchanged.
    async fn insert_batch(&self, jobs: &[NewJob]) -> AppResult<u64>;

    /// Delete every posting whose expiry is strictly before `now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;

    /// Count postings whose expiry is strictly before `now`.
    async fn count_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;

    /// Active, unexpired postings matching `search`, newest first.
    async fn search_active(
        &self,
        search: &JobSearch,
        page: &PageRequest,
        now: DateTime<Utc>,
    ) -> AppResult<PageResponse<Job>>;

    /// A single active, unexpired posting.
    async fn find_active(&self, id: i64, now: DateTime<Utc>) -> AppResult<Option<Job>>;

    /// Explicit delete. Returns `true` if a row was removed.
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

/// Persistence of employers.
#[async_trait]
pub trait CompanyStore: Send + Sync + fmt::Debug + 'static {
    /// Look a company up by its exact name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Company>>;

    /// Insert `company` unless one with the same name exists.
    ///
    /// Returns the stored row and whether this call created it. An existing
    /// row is returned untouched.
    async fn create_if_absent(&self, company: &NewCompany) -> AppResult<(Company, bool)>;

    /// All companies ordered by id.
    async fn list(&self) -> AppResult<Vec<Company>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_terms_are_ignored() {
        let search = JobSearch {
            company: Some("  ".to_string()),
            title: Some(" engineer ".to_string()),
            skills: None,
            location: Some("Berlin".to_string()),
        };
        assert_eq!(
            search.terms(),
            vec![("title", "engineer"), ("location", "Berlin")]
        );
    }
}

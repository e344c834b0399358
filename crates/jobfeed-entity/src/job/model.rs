//! Job entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::status::JobStatus;

/// Maximum stored length of an apply URL, in characters.
pub const MAX_APPLY_URL_LEN: usize = 1000;

/// How long an ingested posting stays listed.
pub const VALIDITY_PERIOD_DAYS: i64 = 60;

/// A persisted job posting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    /// Store-assigned identifier.
    pub id: i64,
    /// Posting title.
    pub title: String,
    /// Employer name as given in the source row.
    pub company_name: String,
    /// Location after code resolution.
    pub location: String,
    /// Salary display text.
    pub salary_range: Option<String>,
    /// Comma-separated skill keywords.
    pub skills: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Free-text requirements.
    pub requirements: Option<String>,
    /// Where candidates apply.
    pub job_apply_url: String,
    /// Whether the posting is remote.
    pub is_remote: bool,
    /// Batch timestamp of the ingestion that created the posting.
    pub created_at: DateTime<Utc>,
    /// End of the validity window.
    pub expires_at: DateTime<Utc>,
    /// Posting status.
    pub status: JobStatus,
}

impl Job {
    /// Whether the posting has lapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// A canonical job record ready for bulk insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_window"))]
pub struct NewJob {
    /// Posting title.
    #[validate(length(max = 255))]
    pub title: String,
    /// Employer name.
    #[validate(length(max = 255))]
    pub company_name: String,
    /// Location after code resolution.
    #[validate(length(max = 255))]
    pub location: String,
    /// Salary display text.
    #[validate(length(max = 100))]
    pub salary_range: String,
    /// Comma-separated skill keywords.
    pub skills: String,
    /// Free-text description.
    pub description: String,
    /// Free-text requirements.
    pub requirements: String,
    /// Where candidates apply.
    #[validate(length(min = 1, max = 1000))]
    pub job_apply_url: String,
    /// Whether the posting is remote.
    pub is_remote: bool,
    /// Batch timestamp.
    pub created_at: DateTime<Utc>,
    /// End of the validity window.
    pub expires_at: DateTime<Utc>,
    /// Posting status.
    pub status: JobStatus,
}

fn validate_window(job: &NewJob) -> Result<(), ValidationError> {
    if job.expires_at <= job.created_at {
        return Err(ValidationError::new("expiry_not_after_creation"));
    }
    Ok(())
}

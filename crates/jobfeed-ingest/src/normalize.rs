//! Row normalization.
//!
//! [`JobFields`] is the one place that knows which column names an export
//! may use and how absent values default. [`FieldNormalizer`] turns those
//! fields into a [`NewJob`] for a given batch.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use jobfeed_core::error::AppError;
use jobfeed_core::result::AppResult;
use jobfeed_entity::job::{JobStatus, NewJob, VALIDITY_PERIOD_DAYS};

use crate::location::LocationTable;
use crate::reader::RawRow;
use crate::{skills, url};

/// Salary text stored for every posting. Salaries are not parsed.
pub const NEGOTIABLE_SALARY: &str = "Negotiable";

const TITLE_COLUMNS: &[&str] = &["title", "Title"];
const COMPANY_COLUMNS: &[&str] = &["company_name", "Company", "company"];
const LOCATION_COLUMNS: &[&str] = &["location", "Location"];
const DESCRIPTION_COLUMNS: &[&str] = &["description", "Description"];
const REQUIREMENTS_COLUMNS: &[&str] = &["requirements", "Requirements"];
const APPLY_URL_COLUMNS: &[&str] = &["job_apply_url", "ApplyURL", "job_url_direct", "job_url"];
const REMOTE_COLUMNS: &[&str] = &["is_remote", "IsRemote"];

/// The recognised fields of one raw row, trimmed, `None` when absent or
/// blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFields {
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub apply_url: Option<String>,
    pub is_remote: Option<String>,
}

impl JobFields {
    /// Pick each field from the first alias column holding a value.
    pub fn from_row(row: &RawRow) -> Self {
        Self {
            title: first_value(row, TITLE_COLUMNS),
            company_name: first_value(row, COMPANY_COLUMNS),
            location: first_value(row, LOCATION_COLUMNS),
            description: first_value(row, DESCRIPTION_COLUMNS),
            requirements: first_value(row, REQUIREMENTS_COLUMNS),
            apply_url: first_value(row, APPLY_URL_COLUMNS),
            is_remote: first_value(row, REMOTE_COLUMNS),
        }
    }

    /// Whether no recognised field carries a value.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Interpret the remote column; anything unrecognised is `false`.
    pub fn remote(&self) -> bool {
        self.is_remote.as_deref().is_some_and(|v| {
            ["true", "yes", "1", "y", "t"]
                .iter()
                .any(|truthy| v.eq_ignore_ascii_case(truthy))
        })
    }
}

fn first_value(row: &RawRow, columns: &[&str]) -> Option<String> {
    columns
        .iter()
        .filter_map(|column| row.get(column))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Converts raw rows into canonical job records against one location table.
#[derive(Debug, Clone, Copy)]
pub struct FieldNormalizer<'a> {
    locations: &'a LocationTable,
}

impl<'a> FieldNormalizer<'a> {
    /// Create a normalizer resolving codes through `locations`.
    pub fn new(locations: &'a LocationTable) -> Self {
        Self { locations }
    }

    /// Normalize one row.
    ///
    /// Fails with a validation error when no recognised column has a value
    /// or the apply URL is missing. Every other gap defaults to an empty
    /// string.
    pub fn normalize(&self, row: &RawRow, batch_timestamp: DateTime<Utc>) -> AppResult<NewJob> {
        let fields = JobFields::from_row(row);
        if fields.is_empty() {
            return Err(AppError::validation("no recognised job fields"));
        }

        let job_apply_url = fields
            .apply_url
            .as_deref()
            .map(url::clean_apply_url)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::validation("missing apply URL"))?;

        let is_remote = fields.remote();
        let location = fields
            .location
            .as_deref()
            .map(|raw| self.locations.resolve(raw))
            .unwrap_or_default();

        Ok(NewJob {
            skills: skills::extract_joined(fields.requirements.as_deref()),
            title: fields.title.unwrap_or_default(),
            company_name: fields.company_name.unwrap_or_default(),
            location,
            salary_range: NEGOTIABLE_SALARY.to_string(),
            description: fields.description.unwrap_or_default(),
            requirements: fields.requirements.unwrap_or_default(),
            job_apply_url,
            is_remote,
            created_at: batch_timestamp,
            expires_at: batch_timestamp + Duration::days(VALIDITY_PERIOD_DAYS),
            status: JobStatus::Active,
        })
    }

    /// Normalize every row in file order, stopping at the first failure.
    ///
    /// The error names the 1-based data row that failed.
    pub fn normalize_all(
        &self,
        rows: &[RawRow],
        batch_timestamp: DateTime<Utc>,
    ) -> AppResult<Vec<NewJob>> {
        rows.iter()
            .enumerate()
            .map(|(index, row)| {
                self.normalize(row, batch_timestamp).map_err(|e| {
                    AppError::new(e.kind, format!("Row {}: {}", index + 1, e.message))
                })
            })
            .collect()
    }
}

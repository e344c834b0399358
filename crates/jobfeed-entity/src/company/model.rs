//! Company entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Maximum stored length of a career URL, in characters.
pub const MAX_CAREER_URL_LEN: usize = 500;

/// An employer, unique by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Company {
    /// Store-assigned identifier.
    pub id: i64,
    /// Employer name (unique).
    pub company_name: String,
    /// Derived landing page for the employer's listings. Set once.
    pub career_url: Option<String>,
    /// When the company was first seen.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Data required to register a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewCompany {
    /// Employer name.
    #[validate(length(min = 1, max = 255))]
    pub company_name: String,
    /// Derived career URL.
    #[validate(length(max = 500))]
    pub career_url: Option<String>,
}

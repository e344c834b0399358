//! Company repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use jobfeed_core::error::{AppError, ErrorKind};
use jobfeed_core::result::AppResult;
use jobfeed_entity::company::{Company, NewCompany};

use crate::store::CompanyStore;

/// Repository for employers.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    /// Create a new company repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyStore for CompanyRepository {
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Company>> {
        sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE company_name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find company", e))
    }

    async fn create_if_absent(&self, company: &NewCompany) -> AppResult<(Company, bool)> {
        // The unique index on company_name makes concurrent ingestions
        // converge on a single row.
        let inserted = sqlx::query_as::<_, Company>(
            "INSERT INTO companies (company_name, career_url) VALUES ($1, $2) \
             ON CONFLICT (company_name) DO NOTHING RETURNING *",
        )
        .bind(&company.company_name)
        .bind(&company.career_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Persistence, "Failed to create company", e)
        })?;

        if let Some(created) = inserted {
            return Ok((created, true));
        }

        let existing = self.find_by_name(&company.company_name).await?.ok_or_else(|| {
            AppError::database(format!(
                "Company '{}' conflicted on insert but could not be read back",
                company.company_name
            ))
        })?;
        Ok((existing, false))
    }

    async fn list(&self) -> AppResult<Vec<Company>> {
        sqlx::query_as::<_, Company>("SELECT * FROM companies ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list companies", e))
    }
}

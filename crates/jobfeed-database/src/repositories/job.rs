//! Job posting repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use jobfeed_core::error::{AppError, ErrorKind};
use jobfeed_core::result::AppResult;
use jobfeed_core::types::pagination::{PageRequest, PageResponse};
use jobfeed_entity::job::{Job, JobStatus, NewJob};

use crate::store::{JobSearch, JobStore};

/// Repository for job postings.
#[derive(Debug, Clone)]
pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    /// Create a new job repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Append the visibility predicate and search filters to `qb`.
fn push_active_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    search: &JobSearch,
    now: DateTime<Utc>,
) {
    qb.push(" WHERE status = ")
        .push_bind(JobStatus::Active)
        .push(" AND expires_at > ")
        .push_bind(now);

    for (column, term) in search.terms() {
        qb.push(" AND ")
            .push(column)
            .push(" ILIKE ")
            .push_bind(format!("%{term}%"));
    }
}

#[async_trait]
impl JobStore for JobRepository {
    async fn insert_batch(&self, jobs: &[NewJob]) -> AppResult<u64> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin batch transaction", e)
        })?;

        for (index, job) in jobs.iter().enumerate() {
            sqlx::query(
                "INSERT INTO jobs (title, company_name, location, salary_range, skills, \
                 description, requirements, job_apply_url, is_remote, created_at, expires_at, status) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            )
            .bind(&job.title)
            .bind(&job.company_name)
            .bind(&job.location)
            .bind(&job.salary_range)
            .bind(&job.skills)
            .bind(&job.description)
            .bind(&job.requirements)
            .bind(&job.job_apply_url)
            .bind(job.is_remote)
            .bind(job.created_at)
            .bind(job.expires_at)
            .bind(job.status)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Persistence,
                    format!("Record {} rejected by the store", index + 1),
                    e,
                )
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Persistence, "Failed to commit job batch", e)
        })?;

        debug!(count = jobs.len(), "Inserted job batch");
        Ok(jobs.len() as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM jobs WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete expired jobs", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn count_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE expires_at < $1")
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count expired jobs", e)
            })?;
        Ok(count as u64)
    }

    async fn search_active(
        &self,
        search: &JobSearch,
        page: &PageRequest,
        now: DateTime<Utc>,
    ) -> AppResult<PageResponse<Job>> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM jobs");
        push_active_filters(&mut count_qb, search, now);
        let total: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count jobs", e))?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM jobs");
        push_active_filters(&mut qb, search, now);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let jobs = qb
            .build_query_as::<Job>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list jobs", e))?;

        Ok(PageResponse::new(jobs, page, total as u64))
    }

    async fn find_active(&self, id: i64, now: DateTime<Utc>) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE id = $1 AND status = $2 AND expires_at > $3",
        )
        .bind(id)
        .bind(JobStatus::Active)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find job", e))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete job", e))?;
        Ok(result.rows_affected() > 0)
    }
}

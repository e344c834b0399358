//! Employer deduplication.

use std::sync::Arc;

use tracing::{debug, info};

use jobfeed_core::result::AppResult;
use jobfeed_database::store::CompanyStore;
use jobfeed_entity::company::{Company, NewCompany};
use jobfeed_entity::job::NewJob;

use crate::url::derive_career_url;

/// Get-or-create access to companies, keyed by exact name.
#[derive(Debug, Clone)]
pub struct CompanyRegistry {
    store: Arc<dyn CompanyStore>,
}

impl CompanyRegistry {
    /// Create a registry over `store`.
    pub fn new(store: Arc<dyn CompanyStore>) -> Self {
        Self { store }
    }

    /// Return the company called `name`, creating it on first sight.
    ///
    /// The career URL is derived from `apply_url` only when the company is
    /// created; an existing row is never revised. Returns whether this call
    /// created the row.
    pub async fn ensure_company(&self, name: &str, apply_url: &str) -> AppResult<(Company, bool)> {
        if let Some(existing) = self.store.find_by_name(name).await? {
            return Ok((existing, false));
        }

        let new_company = NewCompany {
            company_name: name.to_string(),
            career_url: derive_career_url(apply_url),
        };
        let (company, created) = self.store.create_if_absent(&new_company).await?;
        if created {
            debug!(
                company = %company.company_name,
                career_url = company.career_url.as_deref().unwrap_or_default(),
                "Registered company"
            );
        }
        Ok((company, created))
    }

    /// Ensure a company exists for every job in `jobs`, strictly in order.
    ///
    /// Rows with a blank employer name are skipped. Returns how many
    /// companies were created.
    pub async fn register_batch(&self, jobs: &[NewJob]) -> AppResult<u64> {
        let mut created_count = 0;
        for job in jobs {
            let name = job.company_name.trim();
            if name.is_empty() {
                continue;
            }
            let (_, created) = self.ensure_company(name, &job.job_apply_url).await?;
            if created {
                created_count += 1;
            }
        }
        if created_count > 0 {
            info!(created = created_count, "New companies registered");
        }
        Ok(created_count)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use jobfeed_database::MemoryStore;
    use jobfeed_entity::job::JobStatus;

    use super::*;

    fn job(company: &str, url: &str) -> NewJob {
        let created_at = Utc.with_ymd_and_hms(2026, 6, 1, 21, 0, 0).unwrap();
        NewJob {
            title: "Engineer".to_string(),
            company_name: company.to_string(),
            location: String::new(),
            salary_range: "Negotiable".to_string(),
            skills: String::new(),
            description: String::new(),
            requirements: String::new(),
            job_apply_url: url.to_string(),
            is_remote: false,
            created_at,
            expires_at: created_at + Duration::days(60),
            status: JobStatus::Active,
        }
    }

    #[tokio::test]
    async fn test_same_name_creates_one_company() {
        let store = Arc::new(MemoryStore::new());
        let registry = CompanyRegistry::new(store.clone());

        let created = registry
            .register_batch(&[
                job("Acme", "https://acme.com/jobs/eng"),
                job("Acme", "https://acme.com/career/qa"),
            ])
            .await
            .unwrap();

        assert_eq!(created, 1);
        let companies = store.list().await.unwrap();
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].career_url.as_deref(), Some("https://acme.com/jobs"));
    }

    #[tokio::test]
    async fn test_career_url_is_never_revised() {
        let store = Arc::new(MemoryStore::new());
        let registry = CompanyRegistry::new(store.clone());

        registry
            .ensure_company("Acme", "https://acme.com/jobs/eng")
            .await
            .unwrap();
        let (company, created) = registry
            .ensure_company("Acme", "https://other.net/x")
            .await
            .unwrap();

        assert!(!created);
        assert_eq!(company.career_url.as_deref(), Some("https://acme.com/jobs"));
    }

    #[tokio::test]
    async fn test_blank_names_are_skipped() {
        let store = Arc::new(MemoryStore::new());
        let registry = CompanyRegistry::new(store.clone());

        let created = registry
            .register_batch(&[job("  ", "https://acme.com/jobs/eng")])
            .await
            .unwrap();

        assert_eq!(created, 0);
        assert!(store.list().await.unwrap().is_empty());
    }
}

//! In-process store with the same semantics as the PostgreSQL repositories.
//!
//! Used by tests and by dry runs. Batch inserts re-check the column
//! constraints the database schema enforces and are all-or-nothing.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use validator::Validate;

use jobfeed_core::error::{AppError, ErrorKind};
use jobfeed_core::result::AppResult;
use jobfeed_core::traits::{Clock, SystemClock};
use jobfeed_core::types::pagination::{PageRequest, PageResponse};
use jobfeed_entity::company::{Company, NewCompany};
use jobfeed_entity::job::{Job, JobStatus, NewJob};

use crate::store::{CompanyStore, JobSearch, JobStore};

#[derive(Debug, Default)]
struct State {
    jobs: BTreeMap<i64, Job>,
    companies: BTreeMap<i64, Company>,
    next_job_id: i64,
    next_company_id: i64,
}

/// In-memory job and company store.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<State>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Create an empty store stamping company rows with the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store stamping company rows with `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(State::default()),
            clock,
        }
    }

    /// Every stored job, expired or not, in insertion order.
    pub async fn all_jobs(&self) -> Vec<Job> {
        self.state.lock().await.jobs.values().cloned().collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(job: &Job, search: &JobSearch) -> bool {
    search.terms().into_iter().all(|(column, term)| {
        let haystack = match column {
            "company_name" => job.company_name.as_str(),
            "title" => job.title.as_str(),
            "skills" => job.skills.as_deref().unwrap_or_default(),
            "location" => job.location.as_str(),
            _ => return false,
        };
        haystack.to_lowercase().contains(&term.to_lowercase())
    })
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn insert_batch(&self, jobs: &[NewJob]) -> AppResult<u64> {
        for (index, job) in jobs.iter().enumerate() {
            job.validate().map_err(|e| {
                AppError::with_source(
                    ErrorKind::Persistence,
                    format!("Record {} rejected by the store", index + 1),
                    e,
                )
            })?;
        }

        let mut state = self.state.lock().await;
        for job in jobs {
            state.next_job_id += 1;
            let id = state.next_job_id;
            state.jobs.insert(
                id,
                Job {
                    id,
                    title: job.title.clone(),
                    company_name: job.company_name.clone(),
                    location: job.location.clone(),
                    salary_range: Some(job.salary_range.clone()),
                    skills: Some(job.skills.clone()),
                    description: Some(job.description.clone()),
                    requirements: Some(job.requirements.clone()),
                    job_apply_url: job.job_apply_url.clone(),
                    is_remote: job.is_remote,
                    created_at: job.created_at,
                    expires_at: job.expires_at,
                    status: job.status,
                },
            );
        }
        Ok(jobs.len() as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.jobs.len();
        state.jobs.retain(|_, job| !job.is_expired(now));
        Ok((before - state.jobs.len()) as u64)
    }

    async fn count_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let state = self.state.lock().await;
        Ok(state.jobs.values().filter(|job| job.is_expired(now)).count() as u64)
    }

    async fn search_active(
        &self,
        search: &JobSearch,
        page: &PageRequest,
        now: DateTime<Utc>,
    ) -> AppResult<PageResponse<Job>> {
        let state = self.state.lock().await;
        let mut hits: Vec<&Job> = state
            .jobs
            .values()
            .filter(|job| job.status == JobStatus::Active && job.expires_at > now)
            .filter(|job| matches(job, search))
            .collect();
        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = hits.len() as u64;
        let items = hits
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok(PageResponse::new(items, page, total))
    }

    async fn find_active(&self, id: i64, now: DateTime<Utc>) -> AppResult<Option<Job>> {
        let state = self.state.lock().await;
        Ok(state
            .jobs
            .get(&id)
            .filter(|job| job.status == JobStatus::Active && job.expires_at > now)
            .cloned())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        Ok(self.state.lock().await.jobs.remove(&id).is_some())
    }
}

#[async_trait]
impl CompanyStore for MemoryStore {
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Company>> {
        let state = self.state.lock().await;
        Ok(state
            .companies
            .values()
            .find(|c| c.company_name == name)
            .cloned())
    }

    async fn create_if_absent(&self, company: &NewCompany) -> AppResult<(Company, bool)> {
        company.validate().map_err(|e| {
            AppError::with_source(
                ErrorKind::Persistence,
                format!("Company '{}' rejected by the store", company.company_name),
                e,
            )
        })?;

        let mut state = self.state.lock().await;
        if let Some(existing) = state
            .companies
            .values()
            .find(|c| c.company_name == company.company_name)
        {
            return Ok((existing.clone(), false));
        }

        state.next_company_id += 1;
        let now = self.clock.now();
        let created = Company {
            id: state.next_company_id,
            company_name: company.company_name.clone(),
            career_url: company.career_url.clone(),
            created_at: now,
            updated_at: now,
        };
        state.companies.insert(created.id, created.clone());
        Ok((created, true))
    }

    async fn list(&self) -> AppResult<Vec<Company>> {
        Ok(self.state.lock().await.companies.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn batch_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 21, 0, 0).unwrap()
    }

    fn job(title: &str, url: &str) -> NewJob {
        NewJob {
            title: title.to_string(),
            company_name: "Acme".to_string(),
            location: "Berlin".to_string(),
            salary_range: "Negotiable".to_string(),
            skills: "Python".to_string(),
            description: String::new(),
            requirements: String::new(),
            job_apply_url: url.to_string(),
            is_remote: false,
            created_at: batch_time(),
            expires_at: batch_time() + Duration::days(60),
            status: JobStatus::Active,
        }
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let store = MemoryStore::new();
        let batch = vec![job("Engineer", "https://acme.com/a"), job("Tester", "")];

        let err = store.insert_batch(&batch).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Persistence);
        assert!(err.message.contains("Record 2"));
        assert!(store.all_jobs().await.is_empty());
    }

    #[tokio::test]
    async fn test_company_rows_are_stamped_by_the_clock() {
        let clock = Arc::new(jobfeed_core::traits::ManualClock::new(batch_time()));
        let store = MemoryStore::with_clock(clock.clone());

        let (acme, created) = store
            .create_if_absent(&NewCompany {
                company_name: "Acme".to_string(),
                career_url: None,
            })
            .await
            .unwrap();

        assert!(created);
        assert_eq!(acme.created_at, batch_time());
        assert_eq!(acme.updated_at, batch_time());
    }

    #[tokio::test]
    async fn test_delete_expired_is_strict() {
        let store = MemoryStore::new();
        store
            .insert_batch(&[job("Engineer", "https://acme.com/a")])
            .await
            .unwrap();
        let expiry = batch_time() + Duration::days(60);

        assert_eq!(store.delete_expired(expiry).await.unwrap(), 0);
        assert_eq!(
            store
                .delete_expired(expiry + Duration::seconds(1))
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_search_filters_case_insensitively() {
        let store = MemoryStore::new();
        store
            .insert_batch(&[
                job("Backend Engineer", "https://acme.com/a"),
                job("QA Tester", "https://acme.com/b"),
            ])
            .await
            .unwrap();

        let search = JobSearch {
            title: Some("engineer".to_string()),
            ..Default::default()
        };
        let page = store
            .search_active(&search, &PageRequest::default(), batch_time())
            .await
            .unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].title, "Backend Engineer");
    }

    #[tokio::test]
    async fn test_create_if_absent_keeps_first_row() {
        let store = MemoryStore::new();
        let first = NewCompany {
            company_name: "Acme".to_string(),
            career_url: Some("https://acme.com/jobs".to_string()),
        };
        let second = NewCompany {
            company_name: "Acme".to_string(),
            career_url: Some("https://acme.com/career".to_string()),
        };

        let (_, created) = store.create_if_absent(&first).await.unwrap();
        assert!(created);
        let (existing, created) = store.create_if_absent(&second).await.unwrap();
        assert!(!created);
        assert_eq!(existing.career_url.as_deref(), Some("https://acme.com/jobs"));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}

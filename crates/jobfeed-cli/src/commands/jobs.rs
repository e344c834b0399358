//! Job posting CLI commands.

use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use jobfeed_core::error::AppError;
use jobfeed_core::types::pagination::PageRequest;
use jobfeed_database::repositories::JobRepository;
use jobfeed_database::{JobSearch, JobStore};
use jobfeed_entity::job::Job;

/// Arguments for job commands
#[derive(Debug, Args)]
pub struct JobsArgs {
    /// Job subcommand
    #[command(subcommand)]
    pub command: JobsCommand,
}

/// Job subcommands
#[derive(Debug, Subcommand)]
pub enum JobsCommand {
    /// List active postings, newest first
    List {
        /// Filter by company name (substring, case-insensitive)
        #[arg(long)]
        company: Option<String>,
        /// Filter by title
        #[arg(long)]
        title: Option<String>,
        /// Filter by skill
        #[arg(long)]
        skills: Option<String>,
        /// Filter by location
        #[arg(long)]
        location: Option<String>,
        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Items per page
        #[arg(long, default_value_t = 30)]
        page_size: u64,
    },
    /// Show one active posting
    Show {
        /// Job ID
        id: i64,
    },
    /// Delete a posting regardless of expiry
    Delete {
        /// Job ID
        id: i64,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
}

/// Job display row
#[derive(Debug, Serialize, Tabled)]
struct JobRow {
    /// Job ID
    id: i64,
    /// Title
    title: String,
    /// Company
    company: String,
    /// Location
    location: String,
    /// Skills
    skills: String,
    /// Remote
    remote: String,
    /// Expires
    expires: String,
}

impl From<&Job> for JobRow {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            title: job.title.clone(),
            company: job.company_name.clone(),
            location: job.location.clone(),
            skills: job.skills.clone().unwrap_or_default(),
            remote: if job.is_remote { "✓" } else { "✗" }.to_string(),
            expires: job.expires_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Execute job commands
pub async fn execute(
    args: &JobsArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::create_db_pool(&config).await?;
    let job_repo = JobRepository::new(db.pool().clone());
    let now = Utc::now();

    match &args.command {
        JobsCommand::List {
            company,
            title,
            skills,
            location,
            page,
            page_size,
        } => {
            let search = JobSearch {
                company: company.clone(),
                title: title.clone(),
                skills: skills.clone(),
                location: location.clone(),
            };
            let result = job_repo
                .search_active(&search, &PageRequest::new(*page, *page_size), now)
                .await?;

            let rows: Vec<JobRow> = result.items.iter().map(JobRow::from).collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                println!(
                    "Page {}/{} ({} postings)",
                    result.page, result.total_pages, result.total_items
                );
            }
        }
        JobsCommand::Show { id } => {
            let job = job_repo
                .find_active(*id, now)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Job {} not found or expired", id)))?;
            output::print_item(&job, format);
        }
        JobsCommand::Delete { id, force } => {
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Delete job {}?", id))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;

                if !confirm {
                    println!("Cancelled.");
                    db.close().await;
                    return Ok(());
                }
            }

            if job_repo.delete(*id).await? {
                output::print_success(&format!("Job {} deleted.", id));
            } else {
                output::print_warning(&format!("Job {} does not exist.", id));
            }
        }
    }

    db.close().await;
    Ok(())
}

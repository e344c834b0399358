//! Company listing command.

use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use jobfeed_core::error::AppError;
use jobfeed_database::CompanyStore;
use jobfeed_database::repositories::CompanyRepository;

/// Company display row
#[derive(Debug, Serialize, Tabled)]
struct CompanyRow {
    /// Company ID
    id: i64,
    /// Name
    name: String,
    /// Career page
    career_url: String,
    /// First seen
    created: String,
}

/// List every registered company
pub async fn execute(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::create_db_pool(&config).await?;
    let companies = CompanyRepository::new(db.pool().clone()).list().await?;

    let rows: Vec<CompanyRow> = companies
        .iter()
        .map(|c| CompanyRow {
            id: c.id,
            name: c.company_name.clone(),
            career_url: c.career_url.clone().unwrap_or_else(|| "-".to_string()),
            created: c.created_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect();

    output::print_list(&rows, format);
    db.close().await;
    Ok(())
}

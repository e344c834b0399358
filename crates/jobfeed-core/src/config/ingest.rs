//! Ingestion pipeline configuration.

use serde::{Deserialize, Serialize};

/// Where input files arrive, where they are archived, and where the
/// location table lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Directory receiving uploads and the collector's daily drop files.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Directory receiving dated copies of successfully ingested files.
    #[serde(default = "default_archive_dir")]
    pub archive_dir: String,
    /// JSON file mapping location codes to display names.
    #[serde(default = "default_location_table")]
    pub location_table: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            archive_dir: default_archive_dir(),
            location_table: default_location_table(),
        }
    }
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

fn default_archive_dir() -> String {
    "./uploads/archive".to_string()
}

fn default_location_table() -> String {
    "config/locations.json".to_string()
}

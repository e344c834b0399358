//! Dated copies of ingested input files.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Subdirectory of the archive that receives drop files whose run failed.
pub const FAILED_SUBDIR: &str = "failed";

/// Copies raw input files into an archive directory.
///
/// Archival never fails the caller: errors are logged and reported as
/// `None`.
#[derive(Debug, Clone)]
pub struct ArchivalSidecar {
    archive_dir: PathBuf,
}

impl ArchivalSidecar {
    /// Create a sidecar writing into `archive_dir`.
    pub fn new(archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            archive_dir: archive_dir.into(),
        }
    }

    /// Directory archives are written to.
    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Archive file name for `original_name` at `at`:
    /// `<stem>_<YYYYMMDD_HHMMSS>.<ext>`.
    pub fn archive_name(original_name: &str, at: DateTime<Utc>) -> String {
        let original = Path::new(original_name);
        let stem = original
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("upload");
        let suffix = at.format("%Y%m%d_%H%M%S");
        match original.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{stem}_{suffix}.{ext}"),
            None => format!("{stem}_{suffix}"),
        }
    }

    /// Copy `source` into the archive. Returns the archived path on success.
    pub async fn archive(
        &self,
        source: &Path,
        original_name: &str,
        at: DateTime<Utc>,
    ) -> Option<PathBuf> {
        copy_into(&self.archive_dir, source, original_name, at).await
    }

    /// Copy a file whose run failed into `<archive_dir>/failed/`.
    pub async fn archive_failed(
        &self,
        source: &Path,
        original_name: &str,
        at: DateTime<Utc>,
    ) -> Option<PathBuf> {
        copy_into(&self.archive_dir.join(FAILED_SUBDIR), source, original_name, at).await
    }
}

async fn copy_into(
    dir: &Path,
    source: &Path,
    original_name: &str,
    at: DateTime<Utc>,
) -> Option<PathBuf> {
    let target = dir.join(ArchivalSidecar::archive_name(original_name, at));

    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        warn!(
            dir = %dir.display(),
            error = %e,
            "Failed to create archive directory"
        );
        return None;
    }

    match tokio::fs::copy(source, &target).await {
        Ok(bytes) => {
            info!(
                source = %source.display(),
                target = %target.display(),
                bytes,
                "Input file archived"
            );
            Some(target)
        }
        Err(e) => {
            warn!(
                source = %source.display(),
                target = %target.display(),
                error = %e,
                "Failed to archive input file"
            );
            None
        }
    }
}

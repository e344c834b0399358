//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

use jobfeed_core::config::IngestConfig;
use jobfeed_core::traits::ManualClock;
use jobfeed_database::MemoryStore;
use jobfeed_ingest::IngestionPipeline;

/// Batch time used by most scenarios.
pub fn batch_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 21, 0, 0).unwrap()
}

/// Test environment: a temp upload directory, an in-memory store, and a
/// manual clock wired into a pipeline.
pub struct TestEnv {
    /// Upload directory; archives land in `archive/` below it
    pub dir: TempDir,
    /// Job and company store
    pub store: Arc<MemoryStore>,
    /// Clock the pipeline stamps batches with
    pub clock: Arc<ManualClock>,
    /// Ingest settings pointing into `dir`
    pub config: IngestConfig,
    /// The pipeline under test
    pub pipeline: IngestionPipeline,
}

impl TestEnv {
    /// Create an environment whose location table is `locations_json`.
    pub fn new(locations_json: &str, now: DateTime<Utc>) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("locations.json"), locations_json)
            .expect("Failed to write location table");

        let config = IngestConfig {
            upload_dir: dir.path().display().to_string(),
            archive_dir: dir.path().join("archive").display().to_string(),
            location_table: dir.path().join("locations.json").display().to_string(),
        };
        let clock = Arc::new(ManualClock::new(now));
        let store = Arc::new(MemoryStore::with_clock(clock.clone()));
        let pipeline =
            IngestionPipeline::new(store.clone(), store.clone(), clock.clone(), &config);

        Self {
            dir,
            store,
            clock,
            config,
            pipeline,
        }
    }

    /// Write a text file into the upload directory.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("Failed to write fixture");
        path
    }

    /// Write a single-sheet workbook; the first row is the header.
    pub fn write_xlsx(&self, name: &str, rows: &[&[&str]]) -> PathBuf {
        let path = self.dir.path().join(name);
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                sheet
                    .write_string(r as u32, c as u16, *value)
                    .expect("Failed to write cell");
            }
        }
        workbook.save(&path).expect("Failed to save workbook");
        path
    }

    /// Path inside the archive directory.
    pub fn archived(&self, name: &str) -> PathBuf {
        self.dir.path().join("archive").join(name)
    }
}

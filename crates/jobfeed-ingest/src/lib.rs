//! # jobfeed-ingest
//!
//! The ingestion pipeline: read a bulk export, normalize each row into a
//! canonical posting, register the employers it mentions, persist the
//! batch atomically, and archive the source file. Also hosts the reaper
//! that purges postings past their validity window.
//!
//! Rows are always processed strictly in file order. Location resolution,
//! skill extraction, and "first row creates the company" all depend on it.

pub mod archive;
pub mod loader;
pub mod location;
pub mod normalize;
pub mod pipeline;
pub mod reader;
pub mod reaper;
pub mod registry;
pub mod skills;
pub mod url;

mod text;

pub use archive::{ArchivalSidecar, FAILED_SUBDIR};
pub use loader::{BatchSummary, BulkLoader};
pub use location::LocationTable;
pub use normalize::{FieldNormalizer, JobFields, NEGOTIABLE_SALARY};
pub use pipeline::{IngestOutcome, IngestSource, IngestionPipeline, UploadResponse};
pub use reader::{RawRow, SourceFormat};
pub use reaper::ExpiryReaper;
pub use registry::CompanyRegistry;

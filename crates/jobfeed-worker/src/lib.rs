//! Recurring background work for JobFeed.
//!
//! This crate provides:
//! - A scheduler owning one daily trigger per task, with overlap skipping
//!   and failure isolation
//! - The daily ingestion task that picks up the collector's drop file
//! - The expiry cleanup task that purges lapsed postings

pub mod scheduler;
pub mod tasks;

pub use scheduler::{EXPIRY_TRIGGER, INGESTION_TRIGGER, ScheduledTask, Scheduler, TriggerStats};
pub use tasks::{DailyIngestionTask, ExpiryCleanupTask};

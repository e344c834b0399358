//! Task implementations driven by the scheduler.

pub mod expiry;
pub mod ingestion;

pub use expiry::ExpiryCleanupTask;
pub use ingestion::DailyIngestionTask;

//! Job posting entities.

pub mod model;
pub mod status;

pub use model::{Job, MAX_APPLY_URL_LEN, NewJob, VALIDITY_PERIOD_DAYS};
pub use status::JobStatus;

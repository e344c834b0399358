//! # jobfeed-core
//!
//! Core crate for JobFeed. Contains configuration schemas, the clock
//! abstraction used by the scheduler, pagination and response types,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other JobFeed crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;

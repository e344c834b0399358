//! Core type definitions used across the JobFeed workspace.

pub mod pagination;
pub mod response;

pub use pagination::{PageRequest, PageResponse};
pub use response::ErrorPayload;

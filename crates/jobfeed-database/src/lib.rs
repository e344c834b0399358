//! # jobfeed-database
//!
//! PostgreSQL connection management, the store traits the pipeline is
//! written against, their PostgreSQL repositories, and an in-memory
//! store with the same semantics.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{CompanyStore, JobSearch, JobStore};

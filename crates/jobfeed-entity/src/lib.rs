//! # jobfeed-entity
//!
//! Domain entity models for JobFeed. Every struct in this crate represents
//! a database table row or the shape used to insert one. Row types derive
//! `sqlx::FromRow`; insert shapes derive `validator::Validate` and carry
//! the column constraints the store enforces.

pub mod company;
pub mod job;

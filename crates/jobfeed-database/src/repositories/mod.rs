//! PostgreSQL implementations of the store traits.

pub mod company;
pub mod job;

pub use company::CompanyRepository;
pub use job::JobRepository;

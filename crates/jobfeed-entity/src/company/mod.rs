//! Employer entities.

pub mod model;

pub use model::{Company, MAX_CAREER_URL_LEN, NewCompany};

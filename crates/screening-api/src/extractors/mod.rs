//! Custom Axum extractors.

pub mod employer;

pub use employer::{EMPLOYER_HEADER, Employer};

//! Screening coordinator: intake, retrieval, shortlisting, deletion.

pub mod service;
pub mod validation;

pub use service::{HealthReport, ScreeningCoordinator, ScreeningJobPage};

//! External collaborators the pipeline calls into.
//!
//! Each collaborator is a trait so the worker and coordinator can be
//! wired against HTTP clients in production and fakes in tests.

pub mod analyzer;
pub mod parser;
pub mod requirements;

use async_trait::async_trait;
use uuid::Uuid;

use screening_core::error::{AppError, ErrorKind};
use screening_core::result::AppResult;
use screening_entity::candidate::{ParsedResume, ResumeAnalysis};
use screening_entity::requirements::JobRequirements;

pub use analyzer::HttpResumeAnalyzer;
pub use parser::HttpResumeParser;

/// Extracts structured data from a resume file.
#[async_trait]
pub trait ResumeParser: Send + Sync + std::fmt::Debug + 'static {
    /// Parse a resume's raw bytes.
    async fn parse(&self, filename: &str, content: &[u8]) -> AppResult<ParsedResume>;
}

/// Produces a qualitative assessment of a resume against a posting.
#[async_trait]
pub trait ResumeAnalyzer: Send + Sync + std::fmt::Debug + 'static {
    /// Analyze a resume's text for a job.
    async fn analyze(
        &self,
        full_text: &str,
        job_title: &str,
        description: &str,
    ) -> AppResult<ResumeAnalysis>;
}

/// Looks up the requirements of a job posting.
#[async_trait]
pub trait RequirementsSource: Send + Sync + std::fmt::Debug + 'static {
    /// Requirements of a posting, `None` if the posting does not exist.
    async fn find_requirements(&self, job_id: Uuid) -> AppResult<Option<JobRequirements>>;
}

/// Classify a failed collaborator call.
///
/// Timeouts and connection problems are worth retrying; a 4xx answer means
/// the input itself was rejected.
pub(crate) fn map_request_error(collaborator: &str, e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        return AppError::with_source(
            ErrorKind::Timeout,
            format!("{collaborator} did not respond in time"),
            e,
        );
    }
    if e.is_decode() {
        return AppError::with_source(
            ErrorKind::Serialization,
            format!("{collaborator} returned an unreadable response"),
            e,
        );
    }
    match e.status() {
        Some(status) if status.is_client_error() => AppError::with_source(
            ErrorKind::Validation,
            format!("{collaborator} rejected the request ({status})"),
            e,
        ),
        _ => AppError::with_source(
            ErrorKind::Dependency,
            format!("{collaborator} request failed"),
            e,
        ),
    }
}

/// Build an HTTP client with a whole-request timeout.
pub(crate) fn build_client(
    collaborator: &str,
    timeout: std::time::Duration,
) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("resume-screening/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to build {collaborator} HTTP client"),
                e,
            )
        })
}

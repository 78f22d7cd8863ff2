//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use screening_entity::screening::{ScreeningJob, ScreeningStatus};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// A screening job with its progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningJobResponse {
    /// Screening job ID.
    pub id: Uuid,
    /// Owning employer.
    pub employer_id: Uuid,
    /// Job posting screened against.
    pub job_id: Uuid,
    /// Lifecycle status.
    pub status: ScreeningStatus,
    /// Resumes submitted.
    pub total_resumes: i32,
    /// Resumes scored.
    pub processed_count: i32,
    /// Resumes that could not be scored.
    pub failed_count: i32,
    /// Share of resumes settled, 0-100.
    pub progress_percent: f64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update.
    pub updated_at: DateTime<Utc>,
}

impl From<ScreeningJob> for ScreeningJobResponse {
    fn from(job: ScreeningJob) -> Self {
        Self {
            progress_percent: job.progress_percent(),
            id: job.id,
            employer_id: job.employer_id,
            job_id: job.job_id,
            status: job.status,
            total_resumes: job.total_resumes,
            processed_count: job.processed_count,
            failed_count: job.failed_count,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

/// Outcome of saving a shortlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortlistResponse {
    /// Results newly or again marked as shortlisted.
    pub updated: u64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Store reachable.
    pub database: bool,
    /// Cache reachable.
    pub cache: bool,
}

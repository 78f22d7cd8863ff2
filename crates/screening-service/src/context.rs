//! Request context carrying the acting employer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use screening_core::error::AppError;
use screening_entity::screening::ScreeningJob;

/// Who is calling a coordinator operation.
///
/// The API layer builds an employer context from the trusted upstream
/// header; the CLI acts as an operator and may touch any job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The employer on whose behalf the call is made, `None` for operators.
    pub employer_id: Option<Uuid>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Context for an employer request.
    pub fn employer(employer_id: Uuid) -> Self {
        Self {
            employer_id: Some(employer_id),
            request_time: Utc::now(),
        }
    }

    /// Context for an operator (CLI, maintenance) request.
    pub fn operator() -> Self {
        Self {
            employer_id: None,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the context may act on `job`.
    pub fn can_access(&self, job: &ScreeningJob) -> bool {
        self.employer_id.is_none_or(|id| id == job.employer_id)
    }

    /// Hide jobs owned by someone else behind the same error as a missing one.
    pub fn ensure_access(&self, job: ScreeningJob) -> Result<ScreeningJob, AppError> {
        if self.can_access(&job) {
            Ok(job)
        } else {
            Err(AppError::not_found(format!("Screening job {} not found", job.id)))
        }
    }
}

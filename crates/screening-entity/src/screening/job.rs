//! Screening job entity.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle state of a screening job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "screening_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScreeningStatus {
    /// Resumes are still queued or in flight.
    Processing,
    /// Every resume reached a terminal outcome and at least one was scored.
    Completed,
    /// Every resume failed.
    Failed,
}

impl ScreeningStatus {
    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ScreeningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A batch screening request for one job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ScreeningJob {
    /// Unique screening job identifier.
    pub id: Uuid,
    /// Employer who submitted the batch.
    pub employer_id: Uuid,
    /// External job posting the resumes are screened against.
    pub job_id: Uuid,
    /// Current status.
    pub status: ScreeningStatus,
    /// Number of resumes in the batch.
    pub total_resumes: i32,
    /// Resumes scored so far.
    pub processed_count: i32,
    /// Resumes whose task exhausted its retries.
    pub failed_count: i32,
    /// Fencing token; results are only written while it still matches.
    #[serde(skip_serializing, default)]
    pub generation: Uuid,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// When the job was last updated.
    pub updated_at: DateTime<Utc>,
}

impl ScreeningJob {
    /// Build a fresh job in the `processing` state.
    pub fn new(employer_id: Uuid, job_id: Uuid, total_resumes: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            employer_id,
            job_id,
            status: ScreeningStatus::Processing,
            total_resumes,
            processed_count: 0,
            failed_count: 0,
            generation: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Resumes that have not reached a terminal outcome yet.
    pub fn remaining(&self) -> i32 {
        (self.total_resumes - self.processed_count - self.failed_count).max(0)
    }

    /// Percentage of resumes that reached a terminal outcome.
    pub fn progress_percent(&self) -> f64 {
        if self.total_resumes == 0 {
            return 100.0;
        }
        let done = (self.processed_count + self.failed_count) as f64;
        (done / self.total_resumes as f64 * 100.0).min(100.0)
    }

    /// The status implied by the current counters.
    pub fn derived_status(&self) -> ScreeningStatus {
        if self.remaining() > 0 {
            ScreeningStatus::Processing
        } else if self.processed_count == 0 {
            ScreeningStatus::Failed
        } else {
            ScreeningStatus::Completed
        }
    }
}

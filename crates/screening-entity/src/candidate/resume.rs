//! Resume payloads.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One resume as submitted by an employer.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    /// Original file name.
    pub filename: String,
    /// Raw file content.
    pub content: Bytes,
}

impl ResumeUpload {
    /// Create a new upload.
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// Size of the payload in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// A resume persisted alongside its screening job, referenced by a task.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StagedResume {
    /// Resume identifier (the task's payload reference).
    pub id: Uuid,
    /// Owning screening job.
    pub screening_job_id: Uuid,
    /// Candidate this resume belongs to.
    pub candidate_id: Uuid,
    /// Original file name.
    pub filename: String,
    /// Raw file content.
    #[serde(skip)]
    pub content: Vec<u8>,
    /// Payload size in bytes.
    pub size_bytes: i64,
    /// When the resume was staged.
    pub created_at: DateTime<Utc>,
}

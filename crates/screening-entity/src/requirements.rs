//! Requirements of an external job posting.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// What a job posting asks for. Read-only to the screening pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobRequirements {
    /// The job posting this belongs to.
    pub job_id: Uuid,
    /// Posting title, forwarded to the analyzer.
    pub title: String,
    /// Free-text description, forwarded to the analyzer.
    pub description: String,
    /// Skills a candidate must have.
    #[serde(default)]
    pub skills_required: Vec<String>,
    /// Skills that earn a bonus.
    #[serde(default)]
    pub nice_to_have_skills: Vec<String>,
    /// Minimum years of experience.
    #[serde(default)]
    pub experience_required_years: f64,
    /// Strengths the employer hopes to see; empty means no preference.
    #[serde(default)]
    pub expected_strengths: Vec<String>,
}

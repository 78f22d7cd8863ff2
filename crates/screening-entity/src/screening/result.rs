//! Screening result entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The scored outcome for one candidate within a screening job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ScreeningResult {
    /// Unique result identifier.
    pub id: Uuid,
    /// Owning screening job.
    pub screening_job_id: Uuid,
    /// Candidate the result describes.
    pub candidate_id: Uuid,
    /// Resume file name the candidate was screened from.
    pub filename: String,
    /// Composite score in `0..=100`.
    pub match_percentage: i32,
    /// Required and nice-to-have skills the candidate covers, in posting order.
    pub skills_matched: Vec<String>,
    /// Required skills the candidate lacks, in posting order.
    pub skills_missing: Vec<String>,
    /// Candidate strengths reported by the analyzer.
    pub strengths: Vec<String>,
    /// Gaps reported by the analyzer.
    pub improvement_areas: Vec<String>,
    /// Recommendations reported by the analyzer.
    pub recommendations: Vec<String>,
    /// Years of experience the parser found.
    pub experience_years: f64,
    /// Whether the employer shortlisted this candidate.
    pub shortlisted: bool,
    /// When the result was first written.
    pub created_at: DateTime<Utc>,
    /// When the result was last written.
    pub updated_at: DateTime<Utc>,
}

/// Data a worker persists for a scored resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewScreeningResult {
    /// Owning screening job.
    pub screening_job_id: Uuid,
    /// Generation token the task was enqueued under.
    pub job_generation: Uuid,
    /// Candidate the result describes.
    pub candidate_id: Uuid,
    /// Resume file name.
    pub filename: String,
    /// Composite score, already clamped to `0..=100`.
    pub match_percentage: i32,
    /// Matched skills.
    pub skills_matched: Vec<String>,
    /// Missing required skills.
    pub skills_missing: Vec<String>,
    /// Analyzer strengths.
    pub strengths: Vec<String>,
    /// Analyzer gaps.
    pub improvement_areas: Vec<String>,
    /// Analyzer recommendations.
    pub recommendations: Vec<String>,
    /// Parsed experience.
    pub experience_years: f64,
}

impl NewScreeningResult {
    /// Materialise the row an insert would produce.
    pub fn into_result(self) -> ScreeningResult {
        let now = Utc::now();
        ScreeningResult {
            id: Uuid::new_v4(),
            screening_job_id: self.screening_job_id,
            candidate_id: self.candidate_id,
            filename: self.filename,
            match_percentage: self.match_percentage.clamp(0, 100),
            skills_matched: self.skills_matched,
            skills_missing: self.skills_missing,
            strengths: self.strengths,
            improvement_areas: self.improvement_areas,
            recommendations: self.recommendations,
            experience_years: self.experience_years,
            shortlisted: false,
            created_at: now,
            updated_at: now,
        }
    }
}

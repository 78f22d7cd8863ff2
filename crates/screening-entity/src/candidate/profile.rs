//! Parser and analyzer outputs.

use serde::{Deserialize, Serialize};

/// Structured data the resume parser extracts from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ParsedResume {
    /// Skills listed on the resume.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Total years of professional experience.
    #[serde(default)]
    pub experience_years: f64,
    /// Extracted plain text.
    #[serde(default)]
    pub full_text: String,
}

/// Qualitative assessment returned by the AI analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResumeAnalysis {
    /// Candidate strengths relevant to the posting.
    #[serde(default)]
    pub strengths: Vec<String>,
    /// Gaps relative to the posting (stored as improvement areas).
    #[serde(default)]
    pub gaps: Vec<String>,
    /// Suggestions for the employer or candidate.
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// The analyzer's own 0-100 fit estimate, when it provides one.
    #[serde(default)]
    pub overall_match: Option<f64>,
}

//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use screening_entity::{ScreeningJob, ScreeningResult};
use screening_service::RankedCandidate;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Print a JSON document; used for `--format json` on single records.
pub fn print_json<T: Serialize>(item: &T) {
    let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
    println!("{json}");
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{key}:"), value);
}

/// Screening job row.
#[derive(Debug, Serialize, Tabled)]
pub struct JobRow {
    /// Screening job id.
    #[tabled(rename = "ID")]
    pub id: String,
    /// Job posting id.
    #[tabled(rename = "Job")]
    pub job_id: String,
    /// Lifecycle status.
    #[tabled(rename = "Status")]
    pub status: String,
    /// Processed out of total.
    #[tabled(rename = "Progress")]
    pub progress: String,
    /// Failed resumes.
    #[tabled(rename = "Failed")]
    pub failed: i32,
    /// Creation time.
    #[tabled(rename = "Created")]
    pub created_at: String,
}

impl From<&ScreeningJob> for JobRow {
    fn from(job: &ScreeningJob) -> Self {
        Self {
            id: job.id.to_string(),
            job_id: job.job_id.to_string(),
            status: job.status.to_string(),
            progress: format!("{}/{}", job.processed_count, job.total_resumes),
            failed: job.failed_count,
            created_at: job.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Screening result row.
#[derive(Debug, Serialize, Tabled)]
pub struct ResultRow {
    /// Result id.
    #[tabled(rename = "ID")]
    pub id: String,
    /// Uploaded filename.
    #[tabled(rename = "File")]
    pub filename: String,
    /// Match score.
    #[tabled(rename = "Match %")]
    pub match_percentage: i32,
    /// Years of experience.
    #[tabled(rename = "Years")]
    pub experience_years: f64,
    /// Matched skills.
    #[tabled(rename = "Matched")]
    pub skills_matched: String,
    /// Shortlist flag.
    #[tabled(rename = "Shortlisted")]
    pub shortlisted: bool,
}

impl From<&ScreeningResult> for ResultRow {
    fn from(result: &ScreeningResult) -> Self {
        Self {
            id: result.id.to_string(),
            filename: result.filename.clone(),
            match_percentage: result.match_percentage,
            experience_years: result.experience_years,
            skills_matched: result.skills_matched.join(", "),
            shortlisted: result.shortlisted,
        }
    }
}

/// Ranked candidate row.
#[derive(Debug, Serialize, Tabled)]
pub struct RankRow {
    /// 1-based rank.
    #[tabled(rename = "#")]
    pub rank: usize,
    /// Uploaded filename.
    #[tabled(rename = "File")]
    pub filename: String,
    /// Match score.
    #[tabled(rename = "Score")]
    pub score: i32,
    /// Band.
    #[tabled(rename = "Category")]
    pub category: String,
    /// Result id.
    #[tabled(rename = "Result ID")]
    pub result_id: String,
}

impl From<&RankedCandidate<ScreeningResult>> for RankRow {
    fn from(ranked: &RankedCandidate<ScreeningResult>) -> Self {
        Self {
            rank: ranked.rank,
            filename: ranked.candidate.filename.clone(),
            score: ranked.score,
            category: ranked.category.to_string(),
            result_id: ranked.candidate.id.to_string(),
        }
    }
}

//! Screening job commands: submit, inspect, rank, shortlist, delete.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::output::{self, JobRow, OutputFormat, RankRow, ResultRow};
use screening_core::error::AppError;
use screening_entity::{ResultFilter, ResultSortBy, ResumeUpload};
use screening_service::RequestContext;

/// Arguments for screening commands
#[derive(Debug, Args)]
pub struct ScreeningArgs {
    /// Screening subcommand
    #[command(subcommand)]
    pub command: ScreeningCommand,
}

/// Screening subcommands
#[derive(Debug, Subcommand)]
pub enum ScreeningCommand {
    /// Submit resume files for screening against a job posting
    Submit {
        /// Employer submitting the batch
        #[arg(long)]
        employer: Uuid,
        /// Job posting to screen against
        #[arg(long)]
        job: Uuid,
        /// Resume files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List an employer's screening jobs
    List {
        /// Employer id
        #[arg(long)]
        employer: Uuid,
        /// Page size
        #[arg(long)]
        limit: Option<u32>,
        /// Page offset
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Show one screening job
    Show {
        /// Screening job id
        id: Uuid,
    },
    /// List scored results
    Results {
        /// Screening job id
        id: Uuid,
        /// Minimum match percentage
        #[arg(long)]
        min: Option<u8>,
        /// Sort column (match or created)
        #[arg(long)]
        sort: Option<ResultSortBy>,
        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,
        /// Page size
        #[arg(long)]
        limit: Option<u32>,
        /// Page offset
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Show score distribution
    Analytics {
        /// Screening job id
        id: Uuid,
    },
    /// Rank candidates by score
    Ranking {
        /// Screening job id
        id: Uuid,
        /// Only the top N
        #[arg(long)]
        top: Option<u32>,
    },
    /// Replace the shortlist with the given result ids
    Shortlist {
        /// Screening job id
        id: Uuid,
        /// Result ids to shortlist
        #[arg(required = true)]
        result_ids: Vec<Uuid>,
    },
    /// Show the current shortlist
    Shortlisted {
        /// Screening job id
        id: Uuid,
    },
    /// Delete a screening job with its results and pending tasks
    Delete {
        /// Screening job id
        id: Uuid,
    },
}

/// Execute screening commands
pub async fn execute(
    args: &ScreeningArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let runtime = super::Runtime::connect(config_path).await?;
    let outcome = run(&runtime, &args.command, format).await;
    runtime.shutdown().await;
    outcome
}

async fn run(
    runtime: &super::Runtime,
    command: &ScreeningCommand,
    format: OutputFormat,
) -> Result<(), AppError> {
    let coordinator = &runtime.coordinator;
    let ctx = RequestContext::operator();
    let default_limit = coordinator.config().default_page_limit;

    match command {
        ScreeningCommand::Submit {
            employer,
            job,
            files,
        } => {
            let mut uploads = Vec::with_capacity(files.len());
            for path in files {
                let content = tokio::fs::read(path).await.map_err(|e| {
                    AppError::validation(format!("Cannot read {}: {e}", path.display()))
                })?;
                let filename = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                uploads.push(ResumeUpload::new(filename, content));
            }

            let created = coordinator
                .initiate_bulk_screening(*employer, *job, uploads)
                .await?;
            match format {
                OutputFormat::Json => output::print_json(&created),
                OutputFormat::Table => {
                    output::print_success(&format!(
                        "Screening job {} queued with {} resume(s)",
                        created.id, created.total_resumes
                    ));
                }
            }
        }
        ScreeningCommand::List {
            employer,
            limit,
            offset,
        } => {
            let page = coordinator
                .list_screening_jobs(*employer, limit.unwrap_or(default_limit), *offset)
                .await?;
            let rows: Vec<JobRow> = page.jobs.iter().map(JobRow::from).collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                println!("Total: {}", page.total);
            }
        }
        ScreeningCommand::Show { id } => {
            let job = coordinator.get_screening_job(&ctx, *id).await?;
            match format {
                OutputFormat::Json => output::print_json(&job),
                OutputFormat::Table => {
                    println!("Screening Job {}:", job.id);
                    output::print_kv("Employer", &job.employer_id.to_string());
                    output::print_kv("Job Posting", &job.job_id.to_string());
                    output::print_kv("Status", job.status.as_str());
                    output::print_kv("Total Resumes", &job.total_resumes.to_string());
                    output::print_kv("Processed", &job.processed_count.to_string());
                    output::print_kv("Failed", &job.failed_count.to_string());
                    output::print_kv("Progress", &format!("{:.1}%", job.progress_percent()));
                    output::print_kv("Created", &job.created_at.to_rfc3339());
                }
            }
        }
        ScreeningCommand::Results {
            id,
            min,
            sort,
            asc,
            limit,
            offset,
        } => {
            let filter = ResultFilter {
                min_match_percentage: *min,
                sort_by: *sort,
                sort_desc: Some(!asc),
                limit: limit.unwrap_or(default_limit),
                offset: *offset,
            };
            let page = coordinator.get_screening_results(&ctx, *id, &filter).await?;
            let rows: Vec<ResultRow> = page.results.iter().map(ResultRow::from).collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                println!("Total: {}", page.total);
            }
        }
        ScreeningCommand::Analytics { id } => {
            let analytics = coordinator.get_screening_analytics(&ctx, *id).await?;
            match format {
                OutputFormat::Json => output::print_json(&analytics),
                OutputFormat::Table => {
                    println!("Screening Analytics:");
                    output::print_kv("Total Screened", &analytics.total_screened.to_string());
                    output::print_kv("Average Match", &format!("{:.2}", analytics.average_match));
                    output::print_kv("Strong", &analytics.strong_matches.to_string());
                    output::print_kv("Moderate", &analytics.moderate_matches.to_string());
                    output::print_kv("Weak", &analytics.weak_matches.to_string());
                }
            }
        }
        ScreeningCommand::Ranking { id, top } => {
            let ranked = coordinator.get_ranked_candidates(&ctx, *id, *top).await?;
            let rows: Vec<RankRow> = ranked.iter().map(RankRow::from).collect();
            output::print_list(&rows, format);
        }
        ScreeningCommand::Shortlist { id, result_ids } => {
            let updated = coordinator.save_shortlist(&ctx, *id, result_ids).await?;
            output::print_success(&format!("Shortlisted {updated} result(s)"));
        }
        ScreeningCommand::Shortlisted { id } => {
            let results = coordinator.get_shortlisted(&ctx, *id).await?;
            let rows: Vec<ResultRow> = results.iter().map(ResultRow::from).collect();
            output::print_list(&rows, format);
        }
        ScreeningCommand::Delete { id } => {
            coordinator.delete_screening_job(&ctx, *id).await?;
            output::print_success(&format!("Screening job {id} deleted"));
        }
    }

    Ok(())
}

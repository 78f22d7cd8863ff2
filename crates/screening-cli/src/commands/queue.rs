//! Task queue inspection commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use screening_core::error::AppError;

/// Arguments for queue commands
#[derive(Debug, Args)]
pub struct QueueArgs {
    /// Queue subcommand
    #[command(subcommand)]
    pub command: QueueCommand,
}

/// Queue subcommands
#[derive(Debug, Subcommand)]
pub enum QueueCommand {
    /// Show task counts per status and worker settings
    Status,
    /// Check database and cache connectivity
    Health,
}

/// Execute queue commands
pub async fn execute(
    args: &QueueArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let runtime = super::Runtime::connect(config_path).await?;

    match &args.command {
        QueueCommand::Status => {
            let stats = runtime.coordinator.queue_stats().await?;
            match format {
                OutputFormat::Json => output::print_json(&stats),
                OutputFormat::Table => {
                    let worker = &runtime.config.worker;
                    println!("Task Queue Status:");
                    output::print_kv("Pending", &stats.pending.to_string());
                    output::print_kv("Running", &stats.running.to_string());
                    output::print_kv("Completed", &stats.completed.to_string());
                    output::print_kv("Failed", &stats.failed.to_string());
                    output::print_kv("Cancelled", &stats.cancelled.to_string());
                    output::print_kv("Worker Enabled", &worker.enabled.to_string());
                    output::print_kv("Concurrency", &worker.concurrency.to_string());
                    output::print_kv("Lock Duration (s)", &worker.lock_duration_seconds.to_string());
                }
            }
        }
        QueueCommand::Health => {
            let report = runtime.coordinator.health().await;
            println!("Dependency Health:");
            output::print_kv("Database", if report.database { "up" } else { "down" });
            output::print_kv("Cache", if report.cache { "up" } else { "down" });
            if !report.is_ready() {
                runtime.shutdown().await;
                return Err(AppError::dependency("Database is unreachable"));
            }
        }
    }

    runtime.shutdown().await;
    Ok(())
}

//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use screening_core::error::AppError;
use screening_database::DatabasePool;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let database = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            screening_database::migration::run_migrations(database.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
    }

    database.close().await;
    Ok(())
}

//! CLI command definitions and dispatch.

pub mod migrate;
pub mod queue;
pub mod screening;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use screening_cache::{CacheManager, ScreeningCache};
use screening_core::config::AppConfig;
use screening_core::error::AppError;
use screening_core::traits::cache::CacheProvider;
use screening_database::repositories::TaskRepository;
use screening_database::{DatabasePool, PgScreeningStore, PgTaskQueue};
use screening_service::ScreeningCoordinator;

/// Resume screening pipeline operator tool
#[derive(Debug, Parser)]
#[command(name = "screening-cli", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Submit, inspect, and manage screening jobs
    Screening(screening::ScreeningArgs),
    /// Task queue inspection
    Queue(queue::QueueArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::Screening(args) => screening::execute(args, &self.config, self.format).await,
            Commands::Queue(args) => queue::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
        .map_err(|e| AppError::configuration(format!("Failed to load config: {e}")))
}

/// Connected database plus a coordinator bound to it.
pub struct Runtime {
    /// Loaded configuration.
    pub config: AppConfig,
    /// Database pool, closed by [`Runtime::shutdown`].
    pub database: DatabasePool,
    /// Coordinator over the Postgres store and queue.
    pub coordinator: ScreeningCoordinator,
}

impl Runtime {
    /// Load configuration, connect, and build the coordinator.
    pub async fn connect(config_path: &str) -> Result<Self, AppError> {
        let config = load_config(config_path)?;
        let database = DatabasePool::connect(&config.database).await?;

        let provider: Arc<dyn CacheProvider> = Arc::new(CacheManager::new(&config.cache).await?);
        let cache = ScreeningCache::new(provider, config.cache.ttl.clone());
        let pool = database.pool().clone();
        let coordinator = ScreeningCoordinator::new(
            Arc::new(PgScreeningStore::new(pool.clone())),
            Arc::new(PgTaskQueue::new(TaskRepository::new(pool))),
            cache,
            config.screening.clone(),
        );

        Ok(Self {
            config,
            database,
            coordinator,
        })
    }

    /// Close the database pool.
    pub async fn shutdown(self) {
        self.database.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::screening::ScreeningCommand;

    #[test]
    fn test_parses_submit() {
        let cli = Cli::try_parse_from([
            "screening-cli",
            "screening",
            "submit",
            "--employer",
            "6f1c1e5e-8f8b-4c57-9d0a-1b2c3d4e5f60",
            "--job",
            "0b7e3c1a-2d4f-4a6b-8c9d-0e1f2a3b4c5d",
            "alice.pdf",
            "bob.pdf",
        ])
        .unwrap();

        assert_eq!(cli.config, "config/default.toml");
        assert_eq!(cli.format, OutputFormat::Table);
        match cli.command {
            Commands::Screening(args) => match args.command {
                ScreeningCommand::Submit { files, .. } => assert_eq!(files.len(), 2),
                other => panic!("unexpected command {other:?}"),
            },
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_submit_requires_files() {
        let parsed = Cli::try_parse_from([
            "screening-cli",
            "screening",
            "submit",
            "--employer",
            "6f1c1e5e-8f8b-4c57-9d0a-1b2c3d4e5f60",
            "--job",
            "0b7e3c1a-2d4f-4a6b-8c9d-0e1f2a3b4c5d",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_parses_results_filters() {
        let cli = Cli::try_parse_from([
            "screening-cli",
            "-f",
            "json",
            "screening",
            "results",
            "6f1c1e5e-8f8b-4c57-9d0a-1b2c3d4e5f60",
            "--min",
            "60",
            "--sort",
            "created",
            "--asc",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Screening(args) => match args.command {
                ScreeningCommand::Results {
                    min, sort, asc, ..
                } => {
                    assert_eq!(min, Some(60));
                    assert_eq!(sort, Some(screening_entity::ResultSortBy::Created));
                    assert!(asc);
                }
                other => panic!("unexpected command {other:?}"),
            },
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_sort() {
        let parsed = Cli::try_parse_from([
            "screening-cli",
            "screening",
            "results",
            "6f1c1e5e-8f8b-4c57-9d0a-1b2c3d4e5f60",
            "--sort",
            "salary",
        ]);
        assert!(parsed.is_err());
    }
}

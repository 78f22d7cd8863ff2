//! Resume screening server.
//!
//! Loads configuration, prepares the database, and hands over to the API
//! crate, which also runs the worker pool when enabled.

use tracing_subscriber::{EnvFilter, fmt};

use screening_core::config::AppConfig;
use screening_core::error::AppError;
use screening_database::DatabasePool;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("SCREENING_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting resume screening");

    tracing::info!("Connecting to database...");
    let database = DatabasePool::connect(&config.database).await?;
    screening_database::migration::run_migrations(database.pool()).await?;

    screening_api::run_server(config, database).await
}

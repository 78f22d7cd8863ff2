//! Application state shared across all handlers.

use std::sync::Arc;

use screening_core::config::AppConfig;
use screening_service::ScreeningCoordinator;

/// Application state passed to every handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Entry point for every screening operation
    pub coordinator: Arc<ScreeningCoordinator>,
}

impl AppState {
    /// Creates the shared state.
    pub fn new(config: Arc<AppConfig>, coordinator: Arc<ScreeningCoordinator>) -> Self {
        Self {
            config,
            coordinator,
        }
    }
}

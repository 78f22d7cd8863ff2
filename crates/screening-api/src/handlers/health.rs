//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let report = state.coordinator.health().await;
    let status = if report.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let label = match (report.database, report.cache) {
        (true, true) => "ok",
        (true, false) => "degraded",
        _ => "unavailable",
    };

    (
        status,
        Json(ApiResponse::ok(HealthResponse {
            status: label.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: report.database,
            cache: report.cache,
        })),
    )
}

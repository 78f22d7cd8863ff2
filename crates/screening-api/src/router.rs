//! Route definitions for the screening HTTP API.
//!
//! All routes are mounted under `/api`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.config.server.body_limit_bytes).unwrap_or(usize::MAX);

    let api_routes = Router::new()
        .merge(screening_routes())
        .route("/health", get(handlers::health::health));

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors::build_cors_layer(&state.config.server))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Screening intake, results, analytics, shortlist and deletion
fn screening_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/screenings",
            post(handlers::screening::create_screening).get(handlers::screening::list_screenings),
        )
        .route(
            "/screenings/{id}",
            get(handlers::screening::get_screening).delete(handlers::screening::delete_screening),
        )
        .route("/screenings/{id}/results", get(handlers::screening::get_results))
        .route("/screenings/{id}/analytics", get(handlers::screening::get_analytics))
        .route("/screenings/{id}/ranking", get(handlers::screening::get_ranking))
        .route(
            "/screenings/{id}/shortlist",
            post(handlers::screening::save_shortlist).get(handlers::screening::get_shortlist),
        )
}

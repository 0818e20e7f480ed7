use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Vehicle state
        .route("/status", get(handlers::get_status))
        // Vehicle control
        .route("/start", post(handlers::start_vehicle))
        .route("/stop", post(handlers::stop_vehicle))
        .route("/lock", post(handlers::lock_vehicle))
        .route("/unlock", post(handlers::unlock_vehicle))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Shared state reads
        .route("/state", get(handlers::get_state))
        .route("/board", get(handlers::get_board))
        .route("/destinations", get(handlers::get_destinations))
        // Registration and staff actions
        .route("/queue", post(handlers::register_vehicle))
        .route("/queue/{id}/call", post(handlers::call_vehicle))
        .route("/queue/{id}/recall", post(handlers::recall_vehicle))
        .route("/queue/{id}/status", post(handlers::update_status))
        .route("/queue/archive", post(handlers::archive_queue))
        // Reports
        .route("/reports", get(handlers::get_report))
        .route("/reports/export", post(handlers::export_report))
        // Preferences and administration
        .route("/mute", get(handlers::get_mute))
        .route("/mute/toggle", post(handlers::toggle_mute))
        .route("/admin/reset", post(handlers::reset_all))
        // Live event feed
        .route("/events", get(handlers::stream_events));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Page queries
        .route("/status", get(handlers::get_status))
        .route("/devices", get(handlers::get_devices))
        // Session control
        .route("/connect", post(handlers::connect))
        .route("/disconnect", post(handlers::disconnect))
        .route("/devices/select", post(handlers::select_devices))
        // Playback
        .route("/playback/volume", post(handlers::set_volume))
        .route("/playback/mute", post(handlers::set_muted))
        .route("/playback/play", post(handlers::play))
        .route("/playback/pause", post(handlers::pause))
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

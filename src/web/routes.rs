//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Search API
        .route("/api/search/engines", get(handlers::engines))
        .route(
            "/api/search/search",
            get(handlers::search_get).post(handlers::search_post),
        )
        // Cache API
        .route("/api/cache/stats", get(handlers::cache_stats))
        .route("/api/cache/clear", post(handlers::clear_cache))
        .route("/api/cache/clear-expired", post(handlers::clear_expired_cache))
        .route("/health", get(handlers::health))
        // Add middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // Add state
        .with_state(state)
}

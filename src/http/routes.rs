//! HTTP Routes
//!
//! Configures the Axum routers for the peer endpoint and the front-end API.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    api_handler, health_handler, peer_get_handler, stats_handler, ApiState, PeerState,
};

/// Creates the router other nodes talk to.
///
/// # Endpoints
/// - `GET <base_path>:group/:key` - Value bytes for a key of a hosted group
/// - `GET /stats/:group` - Group and cache statistics
/// - `GET /health` - Health check endpoint
///
/// `base_path` must start and end with `/`, e.g. `/_peercache/`.
pub fn create_peer_router(state: PeerState, base_path: &str) -> Router {
    Router::new()
        .route(&format!("{base_path}:group/:key"), get(peer_get_handler))
        .route("/stats/:group", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Creates the front-end router serving a single group.
///
/// # Endpoints
/// - `GET /api?key=...` - Value bytes for a key
/// - `GET /health` - Health check endpoint
pub fn create_api_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api", get(api_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

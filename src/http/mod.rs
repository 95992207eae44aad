//! HTTP Module
//!
//! HTTP transport between nodes plus the front-end API.
//!
//! # Endpoints
//! - `GET /_peercache/:group/:key` - Peer fetch, raw value bytes
//! - `GET /stats/:group` - Group statistics
//! - `GET /api?key=...` - Front-end lookup on a single group
//! - `GET /health` - Health check endpoint

pub mod client;
pub mod handlers;
pub mod pool;
pub mod routes;

pub use client::HttpGetter;
pub use handlers::{ApiState, PeerState};
pub use pool::{HttpPool, DEFAULT_BASE_PATH, DEFAULT_REPLICAS};
pub use routes::{create_api_router, create_peer_router};

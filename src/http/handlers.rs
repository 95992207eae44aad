//! HTTP Handlers
//!
//! Request handlers for the peer endpoint and the front-end API.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::byteview::ByteView;
use crate::error::{GroupError, Result};
use crate::group::Group;
use crate::models::{ApiQuery, HealthResponse, StatsResponse};
use crate::registry::GroupRegistry;

/// State for the peer router: every group this node hosts.
#[derive(Clone)]
pub struct PeerState {
    pub registry: GroupRegistry,
}

impl PeerState {
    pub fn new(registry: GroupRegistry) -> Self {
        Self { registry }
    }

    fn group(&self, name: &str) -> Result<Arc<Group>> {
        self.registry
            .get_group(name)
            .ok_or_else(|| GroupError::GroupNotFound(name.to_string()))
    }
}

/// State for the front-end API: the single group it serves.
#[derive(Clone)]
pub struct ApiState {
    pub group: Arc<Group>,
}

impl ApiState {
    pub fn new(group: Arc<Group>) -> Self {
        Self { group }
    }
}

fn octet_stream(view: ByteView) -> Response {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        view.byte_slice(),
    )
        .into_response()
}

/// Handler for GET /_peercache/:group/:key
///
/// Serves a value to another node.
pub async fn peer_get_handler(
    State(state): State<PeerState>,
    Path((group, key)): Path<(String, String)>,
) -> Result<Response> {
    let group = state.group(&group)?;
    let view = group.get(&key).await?;

    Ok(octet_stream(view))
}

/// Handler for GET /stats/:group
pub async fn stats_handler(
    State(state): State<PeerState>,
    Path(group): Path<String>,
) -> Result<Json<StatsResponse>> {
    let group = state.group(&group)?;

    Ok(Json(StatsResponse::new(
        group.name(),
        group.stats(),
        group.cache_stats(),
    )))
}

/// Handler for GET /api?key=...
pub async fn api_handler(
    State(state): State<ApiState>,
    Query(query): Query<ApiQuery>,
) -> Result<Response> {
    let view = state.group.get(&query.key).await?;

    Ok(octet_stream(view))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

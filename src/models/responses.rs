//! Response DTOs for the HTTP endpoints
//!
//! Defines the structure of outgoing JSON response bodies. Cached values
//! themselves are served as raw bytes, not JSON.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::group::GroupStats;

/// Response body for the stats endpoint (GET /stats/:group)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Group name
    pub group: String,
    /// Group-level load counters
    pub loads: GroupStats,
    /// Local cache counters
    pub cache: CacheStats,
    /// Local cache hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from group and cache statistics
    pub fn new(group: impl Into<String>, loads: GroupStats, cache: CacheStats) -> Self {
        let hit_rate = cache.hit_rate();
        Self {
            group: group.into(),
            loads,
            cache,
            hit_rate,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Group Error Enum ==
/// Unified error type for cache groups and the peer transport.
///
/// Cloneable so every caller coalesced onto one in-flight load receives the
/// same error value.
#[derive(Error, Debug, Clone)]
pub enum GroupError {
    /// Empty key passed to `Group::get`
    #[error("key is required")]
    KeyRequired,

    /// The loader failed to produce a value
    #[error("{0}")]
    Load(Arc<anyhow::Error>),

    /// Fetching from a remote peer failed
    #[error("peer fetch failed: {0}")]
    Peer(String),

    /// No group registered under the requested name
    #[error("no such group: {0}")]
    GroupNotFound(String),

    /// Misconfiguration by the embedding application
    #[error("configuration error: {0}")]
    Config(String),
}

impl GroupError {
    /// Wraps a loader failure.
    pub fn load(err: anyhow::Error) -> Self {
        GroupError::Load(Arc::new(err))
    }

    /// True for caller-bug configuration errors.
    pub fn is_config(&self) -> bool {
        matches!(self, GroupError::Config(_))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for GroupError {
    fn into_response(self) -> Response {
        let status = match &self {
            GroupError::KeyRequired => StatusCode::BAD_REQUEST,
            GroupError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            GroupError::Peer(_) => StatusCode::BAD_GATEWAY,
            GroupError::Load(_) | GroupError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, GroupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_keeps_loader_message() {
        let err = GroupError::load(anyhow::anyhow!("unknown not exist"));
        assert_eq!(err.to_string(), "unknown not exist");
    }

    #[test]
    fn test_clone_shares_load_error() {
        let err = GroupError::load(anyhow::anyhow!("boom"));
        let cloned = err.clone();
        match (err, cloned) {
            (GroupError::Load(a), GroupError::Load(b)) => assert!(Arc::ptr_eq(&a, &b)),
            _ => panic!("expected load errors"),
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            GroupError::KeyRequired.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GroupError::GroupNotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GroupError::Peer("down".into()).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            GroupError::load(anyhow::anyhow!("missing"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_is_config() {
        assert!(GroupError::Config("twice".into()).is_config());
        assert!(!GroupError::KeyRequired.is_config());
    }
}

//! Request and Response models for the HTTP endpoints
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing query strings and JSON response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::ApiQuery;
pub use responses::{HealthResponse, StatsResponse};

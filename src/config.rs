//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;

use crate::http::DEFAULT_REPLICAS;

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// This node's base URL, as listed in `peers`
    pub self_addr: String,
    /// Base URLs of every node in the fleet, this one included
    pub peers: Vec<String>,
    /// Byte budget of the group's local cache
    pub cache_bytes: i64,
    /// Name of the group served by this node
    pub group_name: String,
    /// Virtual nodes per peer on the hash ring
    pub replicas: usize,
    /// Bind address of the front-end API server, disabled when `None`
    pub api_addr: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SELF_ADDR` - This node's base URL (default: http://localhost:8001)
    /// - `PEERS` - Comma-separated peer base URLs (default: localhost:8001-8003)
    /// - `CACHE_BYTES` - Local cache budget in bytes (default: 2048)
    /// - `GROUP_NAME` - Group name (default: scores)
    /// - `REPLICAS` - Virtual nodes per peer (default: 50)
    /// - `API_ADDR` - Front-end API bind address (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            self_addr: env::var("SELF_ADDR").unwrap_or(defaults.self_addr),
            peers: env::var("PEERS")
                .ok()
                .map(|v| parse_peers(&v))
                .filter(|peers| !peers.is_empty())
                .unwrap_or(defaults.peers),
            cache_bytes: env::var("CACHE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_bytes),
            group_name: env::var("GROUP_NAME").unwrap_or(defaults.group_name),
            replicas: env::var("REPLICAS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.replicas),
            api_addr: env::var("API_ADDR").ok().filter(|v| !v.is_empty()),
        }
    }

    /// Socket address to bind for peer traffic, derived from `self_addr`.
    pub fn listen_addr(&self) -> &str {
        let addr = self
            .self_addr
            .trim_start_matches("http://")
            .trim_start_matches("https://");
        addr.trim_end_matches('/')
    }
}

fn parse_peers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            self_addr: "http://localhost:8001".to_string(),
            peers: vec![
                "http://localhost:8001".to_string(),
                "http://localhost:8002".to_string(),
                "http://localhost:8003".to_string(),
            ],
            cache_bytes: 2 << 10,
            group_name: "scores".to_string(),
            replicas: DEFAULT_REPLICAS,
            api_addr: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.self_addr, "http://localhost:8001");
        assert_eq!(config.peers.len(), 3);
        assert_eq!(config.cache_bytes, 2048);
        assert_eq!(config.group_name, "scores");
        assert_eq!(config.replicas, 50);
        assert!(config.api_addr.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SELF_ADDR");
        env::remove_var("PEERS");
        env::remove_var("CACHE_BYTES");
        env::remove_var("GROUP_NAME");
        env::remove_var("REPLICAS");
        env::remove_var("API_ADDR");

        assert_eq!(Config::from_env(), Config::default());
    }

    #[test]
    fn test_parse_peers() {
        let peers = parse_peers(" http://a:1 ,http://b:2,, ");
        assert_eq!(peers, vec!["http://a:1", "http://b:2"]);
    }

    #[test]
    fn test_listen_addr() {
        let config = Config {
            self_addr: "http://localhost:8002/".to_string(),
            ..Config::default()
        };
        assert_eq!(config.listen_addr(), "localhost:8002");
    }
}

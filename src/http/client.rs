//! HTTP Peer Client
//!
//! Fetches values from a remote node's peer endpoint.

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::error::{GroupError, Result};
use crate::peers::PeerGetter;

// == HTTP Getter ==
/// [`PeerGetter`] for one remote node, addressed by its base URL including
/// the peer path (e.g. `http://10.0.0.2:8001/_peercache/`).
#[derive(Debug, Clone)]
pub struct HttpGetter {
    base_url: String,
    client: Client,
}

impl HttpGetter {
    // == Constructor ==
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    // == URL ==
    /// Builds `<base_url><group>/<key>` with both segments escaped.
    pub fn url_for(&self, group: &str, key: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| GroupError::Peer(format!("invalid peer url {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| GroupError::Peer(format!("peer url {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .push(group)
            .push(key);
        Ok(url)
    }
}

// == Fetch ==
#[async_trait]
impl PeerGetter for HttpGetter {
    async fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        let url = self.url_for(group, key)?;
        debug!(%url, "fetching from peer");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GroupError::Peer(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GroupError::Peer(format!("server returned: {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GroupError::Peer(format!("reading response body: {e}")))?;
        Ok(body.to_vec())
    }
}

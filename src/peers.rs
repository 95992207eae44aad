//! Peer capabilities used by a group to reach the rest of the fleet.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

// == Peer Picker ==
/// Locates the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the getter for the owning peer, or `None` when the key is
    /// owned by this node (or there are no peers).
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

// == Peer Getter ==
/// Fetches values from a group hosted on one remote peer.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    async fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>>;
}

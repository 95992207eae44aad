//! HTTP Peer Pool
//!
//! Tracks the fleet of peers and picks the owner of each key with a
//! consistent hash ring.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use reqwest::Client;
use tracing::{debug, info, warn};

use super::client::HttpGetter;
use crate::consistent_hash::HashRing;
use crate::peers::{PeerGetter, PeerPicker};

/// Path prefix under which nodes serve peer requests.
pub const DEFAULT_BASE_PATH: &str = "/_peercache/";

/// Virtual nodes per peer on the hash ring.
pub const DEFAULT_REPLICAS: usize = 50;

/// Upper bound on a single peer fetch.
pub const PEER_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct PoolState {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

// == HTTP Pool ==
/// Peer picker for a fleet of HTTP nodes.
///
/// The ring and getters are rebuilt together by [`HttpPool::set`] and swapped
/// in as one immutable snapshot, so lookups never see a half-built ring.
#[derive(Debug)]
pub struct HttpPool {
    /// This node's base URL, e.g. `http://localhost:8001`
    self_addr: String,
    base_path: String,
    replicas: usize,
    client: Client,
    state: RwLock<Arc<PoolState>>,
}

impl HttpPool {
    // == Constructor ==
    /// Creates a pool for the node at `self_addr` with no peers.
    pub fn new(self_addr: impl Into<String>) -> Self {
        Self::with_options(self_addr, DEFAULT_BASE_PATH, DEFAULT_REPLICAS)
    }

    pub fn with_options(
        self_addr: impl Into<String>,
        base_path: impl Into<String>,
        replicas: usize,
    ) -> Self {
        Self {
            self_addr: normalize(&self_addr.into()),
            base_path: base_path.into(),
            replicas,
            client: peer_client(),
            state: RwLock::new(Arc::new(PoolState {
                ring: HashRing::new(replicas, None),
                getters: HashMap::new(),
            })),
        }
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    // == Set ==
    /// Replaces the peer set. `peers` should include this node's own address.
    pub fn set<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let peers: Vec<String> = peers.into_iter().map(|p| normalize(p.as_ref())).collect();

        let mut ring = HashRing::new(self.replicas, None);
        ring.add(&peers);

        let getters = peers
            .iter()
            .map(|peer| {
                let getter = HttpGetter::new(
                    format!("{peer}{}", self.base_path),
                    self.client.clone(),
                );
                (peer.clone(), Arc::new(getter))
            })
            .collect();

        *self.state.write() = Arc::new(PoolState { ring, getters });
        info!(node = %self.self_addr, peers = ?peers, "peer set updated");
    }

    // == Owner ==
    /// Address of the peer owning `key`, possibly this node.
    pub fn owner(&self, key: &str) -> Option<String> {
        self.snapshot().ring.get(key).map(str::to_string)
    }

    /// Current peer addresses.
    pub fn peers(&self) -> Vec<String> {
        let mut peers: Vec<String> = self.snapshot().getters.keys().cloned().collect();
        peers.sort();
        peers
    }

    fn snapshot(&self) -> Arc<PoolState> {
        self.state.read().clone()
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.snapshot();
        let peer = state.ring.get(key)?;
        if peer == self.self_addr {
            debug!(key, "key owned by this node");
            return None;
        }

        info!(node = %self.self_addr, peer, key, "pick peer");
        let getter: Arc<dyn PeerGetter> = state.getters.get(peer)?.clone();
        Some(getter)
    }
}

/// Peers talk directly; system proxy settings are ignored.
fn peer_client() -> Client {
    Client::builder()
        .no_proxy()
        .timeout(PEER_TIMEOUT)
        .build()
        .unwrap_or_else(|err| {
            warn!(error = %err, "falling back to default http client");
            Client::new()
        })
}

fn normalize(addr: &str) -> String {
    addr.trim_end_matches('/').to_string()
}

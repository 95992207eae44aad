//! Cache Group Module
//!
//! A group is a named cache namespace: a byte-budgeted local cache in front of
//! a loader, with optional routing of misses to the peer that owns the key.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::byteview::ByteView;
use crate::cache::{CacheStats, CacheStore};
use crate::error::{GroupError, Result};
use crate::peers::{PeerGetter, PeerPicker};
use crate::singleflight::FlightGroup;

// == Getter ==
/// Loads the value for a key from the backing source on a cache miss.
#[async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

/// Adapts a plain function or closure into a [`Getter`].
pub struct GetterFn<F>(pub F);

#[async_trait]
impl<F> Getter for GetterFn<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        (self.0)(key)
    }
}

// == Group Stats ==
#[derive(Debug, Default)]
struct GroupCounters {
    gets: AtomicU64,
    cache_hits: AtomicU64,
    peer_loads: AtomicU64,
    peer_errors: AtomicU64,
    local_loads: AtomicU64,
    local_load_errs: AtomicU64,
}

/// Point-in-time group counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupStats {
    /// Calls to `get` with a non-empty key
    pub gets: u64,
    /// Gets answered by the local cache
    pub cache_hits: u64,
    /// Values fetched from a remote peer
    pub peer_loads: u64,
    /// Failed remote fetches (each followed by a local load)
    pub peer_errors: u64,
    /// Successful loader calls
    pub local_loads: u64,
    /// Failed loader calls
    pub local_load_errs: u64,
}

// == Group ==
/// A named cache namespace.
pub struct Group {
    name: String,
    getter: Arc<dyn Getter>,
    main_cache: CacheStore,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    /// Makes sure each key is only loaded once at a time
    loader: FlightGroup<Result<ByteView>>,
    counters: GroupCounters,
}

impl Group {
    // == Constructor ==
    /// Creates a group whose local cache holds up to `cache_bytes` bytes.
    ///
    /// A budget of zero or less disables eviction.
    pub fn new(name: impl Into<String>, cache_bytes: i64, getter: Arc<dyn Getter>) -> Self {
        Self {
            name: name.into(),
            getter,
            main_cache: CacheStore::new(cache_bytes),
            peers: OnceLock::new(),
            loader: FlightGroup::new(),
            counters: GroupCounters::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Register Peers ==
    /// Installs the peer picker used to route misses. Allowed once per group.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) -> Result<()> {
        self.peers.set(peers).map_err(|_| {
            GroupError::Config(format!(
                "register_peers called more than once for group {}",
                self.name
            ))
        })
    }

    // == Get ==
    /// Returns the value for `key`, from the local cache when present,
    /// otherwise from the owning peer or the loader.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(GroupError::KeyRequired);
        }
        self.counters.gets.fetch_add(1, Ordering::Relaxed);

        if let Some(value) = self.main_cache.get(key) {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }

        self.load(key).await
    }

    async fn load(&self, key: &str) -> Result<ByteView> {
        self.loader
            .run(key, || async {
                if let Some(peer) = self.peers.get().and_then(|peers| peers.pick_peer(key)) {
                    match self.get_from_peer(peer.as_ref(), key).await {
                        Ok(value) => {
                            self.counters.peer_loads.fetch_add(1, Ordering::Relaxed);
                            return Ok(value);
                        }
                        Err(err) => {
                            self.counters.peer_errors.fetch_add(1, Ordering::Relaxed);
                            warn!(group = %self.name, key, error = %err, "failed to get from peer");
                        }
                    }
                }

                self.load_locally(key).await
            })
            .await
    }

    /// Proxied values are returned without being cached on this node.
    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let bytes = peer.fetch(&self.name, key).await?;
        Ok(ByteView::from(bytes))
    }

    async fn load_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = match self.getter.get(key).await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.counters.local_load_errs.fetch_add(1, Ordering::Relaxed);
                return Err(GroupError::load(err));
            }
        };
        self.counters.local_loads.fetch_add(1, Ordering::Relaxed);
        info!(group = %self.name, key, "loaded locally");

        let value = ByteView::from(bytes);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.add(key, value);
    }

    // == Stats ==
    pub fn stats(&self) -> GroupStats {
        let c = &self.counters;
        GroupStats {
            gets: c.gets.load(Ordering::Relaxed),
            cache_hits: c.cache_hits.load(Ordering::Relaxed),
            peer_loads: c.peer_loads.load(Ordering::Relaxed),
            peer_errors: c.peer_errors.load(Ordering::Relaxed),
            local_loads: c.local_loads.load(Ordering::Relaxed),
            local_load_errs: c.local_load_errs.load(Ordering::Relaxed),
        }
    }

    /// Statistics of the local cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.main_cache.stats()
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("cache_bytes", &self.main_cache.cache_bytes())
            .field("has_peers", &self.peers.get().is_some())
            .finish()
    }
}

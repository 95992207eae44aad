//! Cache Store Module
//!
//! Mutex-guarded LRU cache shared by all callers of a group.

use parking_lot::Mutex;

use crate::byteview::ByteView;
use crate::cache::{CacheStats, LruCache};

#[derive(Debug, Default)]
struct StoreInner {
    /// Created on the first insertion
    lru: Option<LruCache<ByteView>>,
    stats: CacheStats,
}

// == Cache Store ==
/// Thread-safe wrapper around [`LruCache`].
///
/// Every operation holds a single lock for its whole duration; nothing slow
/// (loading, peer fetches) ever runs under it.
#[derive(Debug)]
pub struct CacheStore {
    inner: Mutex<StoreInner>,
    /// Byte budget handed to the LRU cache
    cache_bytes: i64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store; the LRU cache is built lazily.
    pub fn new(cache_bytes: i64) -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            cache_bytes,
        }
    }

    // == Add ==
    /// Inserts a value, evicting old entries as needed.
    pub fn add(&self, key: &str, value: ByteView) {
        let mut inner = self.inner.lock();
        let cache_bytes = self.cache_bytes;
        let lru = inner
            .lru
            .get_or_insert_with(|| LruCache::new(cache_bytes, None));
        let evicted = lru.add(key.to_string(), value);
        inner.stats.record_evictions(evicted);
    }

    // == Get ==
    /// Looks up a value, promoting it on a hit.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut inner = self.inner.lock();
        let found = inner.lru.as_mut().and_then(|lru| lru.get(key).cloned());

        match found {
            Some(_) => inner.stats.record_hit(),
            None => inner.stats.record_miss(),
        }
        found
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.inner.lock().lru.as_ref().map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cache_bytes(&self) -> i64 {
        self.cache_bytes
    }

    // == Stats ==
    /// Returns a snapshot of the store statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        if let Some(lru) = inner.lru.as_ref() {
            stats.total_entries = lru.len();
            stats.bytes = lru.bytes();
        }
        stats
    }
}

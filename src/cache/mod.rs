//! Cache Module
//!
//! Provides the byte-budgeted LRU cache and its locked per-group wrapper.

mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, CacheValue};
pub use lru::{EvictionCallback, LruCache};
pub use stats::CacheStats;
pub use store::CacheStore;

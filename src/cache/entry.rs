//! Cache Entry Module
//!
//! Defines the arena node stored in the eviction order list.

// == Cache Value ==
/// Values stored in the cache report the bytes they occupy.
pub trait CacheValue {
    fn byte_len(&self) -> usize;
}

impl CacheValue for String {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl CacheValue for Vec<u8> {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

// == Cache Entry ==
/// A key/value pair linked into the recency list by arena index.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cache key
    pub key: String,
    /// The stored value
    pub value: V,
    /// Neighbour towards the most recently used end
    pub(crate) prev: Option<usize>,
    /// Neighbour towards the least recently used end
    pub(crate) next: Option<usize>,
}

impl<V: CacheValue> CacheEntry<V> {
    // == Constructor ==
    /// Creates an unlinked entry.
    pub fn new(key: String, value: V) -> Self {
        Self {
            key,
            value,
            prev: None,
            next: None,
        }
    }

    // == Cost ==
    /// Bytes charged against the cache budget: key length plus value length.
    pub fn cost(&self) -> i64 {
        (self.key.len() + self.value.byte_len()) as i64
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation_is_unlinked() {
        let entry = CacheEntry::new("k1".to_string(), "1234".to_string());

        assert_eq!(entry.key, "k1");
        assert_eq!(entry.value, "1234");
        assert!(entry.prev.is_none());
        assert!(entry.next.is_none());
    }

    #[test]
    fn test_entry_cost_counts_key_and_value() {
        let entry = CacheEntry::new("key1".to_string(), "value1".to_string());
        assert_eq!(entry.cost(), 10);
    }

    #[test]
    fn test_entry_cost_bytes_value() {
        let entry = CacheEntry::new("k".to_string(), vec![0u8; 7]);
        assert_eq!(entry.cost(), 8);
    }
}

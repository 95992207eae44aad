//! LRU Cache Module
//!
//! Byte-budgeted Least Recently Used cache. Not safe for concurrent access;
//! see [`CacheStore`](super::CacheStore) for the locked wrapper.

use std::collections::HashMap;
use std::fmt;

use super::entry::{CacheEntry, CacheValue};

/// Invoked synchronously with each evicted key and value.
///
/// Must not call back into the cache that owns it.
pub type EvictionCallback<V> = Box<dyn FnMut(&str, &V) + Send>;

// == LRU Cache ==
/// Maps keys to values and evicts the least recently used entries once the
/// byte budget is exceeded.
///
/// Entries live in an arena (`slots`) and are chained by index:
/// - `head` = Most recently used
/// - `tail` = Least recently used
///
/// A budget of zero or less means the cache never evicts.
pub struct LruCache<V> {
    /// Byte budget, `<= 0` is unbounded
    max_bytes: i64,
    /// Bytes currently charged, sum of `key.len() + value.byte_len()`
    nbytes: i64,
    /// Key to arena slot
    index: HashMap<String, usize>,
    /// Arena of entries, `None` for vacant slots
    slots: Vec<Option<CacheEntry<V>>>,
    /// Vacant slot indices available for reuse
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    on_evicted: Option<EvictionCallback<V>>,
}

impl<V: CacheValue> LruCache<V> {
    // == Constructor ==
    /// Creates an empty cache with the given byte budget.
    pub fn new(max_bytes: i64, on_evicted: Option<EvictionCallback<V>>) -> Self {
        Self {
            max_bytes,
            nbytes: 0,
            index: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            on_evicted,
        }
    }

    // == Get ==
    /// Looks up a key and marks it as most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        Some(&self.node(idx).value)
    }

    // == Add ==
    /// Inserts or replaces a value and marks it as most recently used, then
    /// evicts from the least recently used end until back within budget.
    ///
    /// Returns the number of entries evicted.
    pub fn add(&mut self, key: String, value: V) -> usize {
        if let Some(&idx) = self.index.get(&key) {
            let entry = self.node_mut(idx);
            let delta = value.byte_len() as i64 - entry.value.byte_len() as i64;
            entry.value = value;
            self.nbytes += delta;
            self.move_to_front(idx);
        } else {
            let entry = CacheEntry::new(key.clone(), value);
            self.nbytes += entry.cost();
            let idx = self.alloc(entry);
            self.push_front(idx);
            self.index.insert(key, idx);
        }

        let mut evicted = 0;
        while self.max_bytes > 0 && self.nbytes > self.max_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
            evicted += 1;
        }
        evicted
    }

    // == Remove Oldest ==
    /// Removes and returns the least recently used entry.
    ///
    /// Fires the eviction callback when one is set.
    pub fn remove_oldest(&mut self) -> Option<(String, V)> {
        let idx = self.tail?;
        self.unlink(idx);
        let entry = self.slots[idx].take()?;
        self.free.push(idx);
        self.index.remove(&entry.key);
        self.nbytes -= entry.cost();

        if let Some(callback) = self.on_evicted.as_mut() {
            callback(&entry.key, &entry.value);
        }

        Some((entry.key, entry.value))
    }

    // == Length ==
    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Bytes currently charged against the budget.
    pub fn bytes(&self) -> i64 {
        self.nbytes
    }

    // == Contains ==
    /// Checks for a key without touching its recency.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Peek ==
    /// Looks up a key without touching its recency.
    pub fn peek(&self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        Some(&self.node(idx).value)
    }

    // == Keys ==
    /// Iterates keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        std::iter::successors(self.head, move |&idx| self.node(idx).next)
            .map(move |idx| self.node(idx).key.as_str())
    }

    // == Arena Helpers ==
    fn node(&self, idx: usize) -> &CacheEntry<V> {
        match &self.slots[idx] {
            Some(entry) => entry,
            None => unreachable!("linked slot {idx} is vacant"),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut CacheEntry<V> {
        match &mut self.slots[idx] {
            Some(entry) => entry,
            None => unreachable!("linked slot {idx} is vacant"),
        }
    }

    fn alloc(&mut self, entry: CacheEntry<V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(entry);
                idx
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let entry = self.node(idx);
            (entry.prev, entry.next)
        };

        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }

        let entry = self.node_mut(idx);
        entry.prev = None;
        entry.next = None;
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let entry = self.node_mut(idx);
            entry.prev = None;
            entry.next = old_head;
        }
        match old_head {
            Some(h) => self.node_mut(h).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }
}

impl<V> fmt::Debug for LruCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("max_bytes", &self.max_bytes)
            .field("nbytes", &self.nbytes)
            .field("len", &self.index.len())
            .field("has_on_evicted", &self.on_evicted.is_some())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn cache(max_bytes: i64) -> LruCache<String> {
        LruCache::new(max_bytes, None)
    }

    #[test]
    fn test_lru_new() {
        let lru = cache(0);
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.bytes(), 0);
    }

    #[test]
    fn test_lru_get_hit_and_miss() {
        let mut lru = cache(0);
        lru.add("key1".to_string(), "123".to_string());

        assert_eq!(lru.get("key1"), Some(&"123".to_string()));
        assert_eq!(lru.get("key2"), None);
    }

    #[test]
    fn test_lru_remove_oldest_on_overflow() {
        let (k1, k2, k3) = ("k1", "k2", "k3");
        let (v1, v2, v3) = ("value1", "value2", "v3");
        let mut lru = cache((v1.len() + v2.len()) as i64);

        lru.add(k1.to_string(), v1.to_string());
        lru.add(k2.to_string(), v2.to_string());
        lru.add(k3.to_string(), v3.to_string());

        assert!(lru.get(k1).is_none());
        assert_eq!(lru.len(), 2);
        assert!(lru.contains(k2));
        assert!(lru.contains(k3));
    }

    #[test]
    fn test_lru_on_evicted_order() {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = evicted.clone();
        let callback: EvictionCallback<String> = Box::new(move |key: &str, value: &String| {
            sink.lock().unwrap().push((key.to_string(), value.clone()));
        });

        let mut lru = LruCache::new(10, Some(callback));
        lru.add("k1".to_string(), "1234".to_string());
        lru.add("k2".to_string(), "56785123123".to_string());
        lru.add("k3".to_string(), "91".to_string());
        lru.add("k4".to_string(), "1221".to_string());

        assert_eq!(
            *evicted.lock().unwrap(),
            vec![
                ("k1".to_string(), "1234".to_string()),
                ("k2".to_string(), "56785123123".to_string()),
            ]
        );
        assert_eq!(lru.len(), 2);
    }

    #[test]
    fn test_lru_get_promotes() {
        let mut lru = cache(12);

        lru.add("a".to_string(), "111".to_string());
        lru.add("b".to_string(), "222".to_string());
        lru.add("c".to_string(), "333".to_string());

        // Touch a so b becomes the oldest
        lru.get("a");
        lru.add("d".to_string(), "444".to_string());

        assert!(lru.contains("a"));
        assert!(!lru.contains("b"));
        assert_eq!(lru.keys().collect::<Vec<_>>(), vec!["d", "a", "c"]);
    }

    #[test]
    fn test_lru_overwrite_adjusts_bytes() {
        let mut lru = cache(0);

        lru.add("key".to_string(), "ab".to_string());
        assert_eq!(lru.bytes(), 5);

        lru.add("key".to_string(), "abcdef".to_string());
        assert_eq!(lru.bytes(), 9);
        assert_eq!(lru.len(), 1);
        assert_eq!(lru.get("key"), Some(&"abcdef".to_string()));
    }

    #[test]
    fn test_lru_overwrite_promotes() {
        let mut lru = cache(0);

        lru.add("a".to_string(), "1".to_string());
        lru.add("b".to_string(), "2".to_string());
        lru.add("a".to_string(), "3".to_string());

        assert_eq!(lru.remove_oldest(), Some(("b".to_string(), "2".to_string())));
        assert_eq!(lru.remove_oldest(), Some(("a".to_string(), "3".to_string())));
        assert_eq!(lru.remove_oldest(), None);
    }

    #[test]
    fn test_lru_unbounded_never_evicts() {
        let mut lru = cache(0);
        for i in 0..1000 {
            lru.add(format!("key{i}"), "x".repeat(100));
        }
        assert_eq!(lru.len(), 1000);

        let mut negative = cache(-1);
        negative.add("k".to_string(), "x".repeat(1 << 12));
        assert_eq!(negative.len(), 1);
    }

    #[test]
    fn test_lru_entry_larger_than_budget_is_evicted() {
        let mut lru = cache(4);
        let evicted = lru.add("big".to_string(), "too large".to_string());

        assert_eq!(evicted, 1);
        assert!(lru.is_empty());
        assert_eq!(lru.bytes(), 0);
    }

    #[test]
    fn test_lru_slots_are_reused() {
        let mut lru = cache(6);

        for i in 0..10 {
            lru.add(format!("k{i}"), "v".to_string());
        }

        assert_eq!(lru.len(), 2);
        assert!(lru.slots.len() <= 3);
        assert_eq!(lru.keys().collect::<Vec<_>>(), vec!["k9", "k8"]);
    }

    #[test]
    fn test_lru_remove_oldest_empty() {
        let mut lru = cache(10);
        assert_eq!(lru.remove_oldest(), None);
    }
}

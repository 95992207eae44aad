//! Consistent hash ring with virtual nodes.
//!
//! Maps keys to peer identifiers. Each peer is placed on the ring `replicas`
//! times at `hash(i ++ peer)` so keys spread evenly over a small peer set.

use std::collections::HashMap;

/// Hash function placing keys and virtual nodes on the ring.
pub type HashFn = fn(&[u8]) -> u32;

// == Hash Ring ==
/// Consistent hash ring.
///
/// Built once from the full peer set; every `add` re-sorts the ring, so it is
/// not meant for frequent membership changes.
#[derive(Debug, Clone)]
pub struct HashRing {
    hash: HashFn,
    /// Virtual nodes per peer
    replicas: usize,
    /// Peers in insertion order
    peers: Vec<String>,
    /// Sorted virtual node hashes
    keys: Vec<u32>,
    /// Virtual node hash to peer id. Colliding hashes keep the latest peer.
    hash_map: HashMap<u32, String>,
}

impl HashRing {
    // == Constructor ==
    /// Create a ring using `hash`, or CRC-32 (IEEE) when `None`.
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or(crc32fast::hash),
            replicas,
            peers: Vec::new(),
            keys: Vec::new(),
            hash_map: HashMap::new(),
        }
    }

    // == Add ==
    /// Add peers to the ring.
    pub fn add<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for peer in peers {
            let peer = peer.as_ref().to_string();
            self.place(&peer);
            self.peers.push(peer);
        }
        self.keys.sort_unstable();
    }

    // == Remove ==
    /// Remove a peer from the ring.
    ///
    /// The remaining peers are placed again in their original order, so the
    /// result equals a ring built without `peer`, collisions included.
    pub fn remove(&mut self, peer: &str) {
        let before = self.peers.len();
        self.peers.retain(|p| p != peer);
        if self.peers.len() == before {
            return;
        }

        self.keys.clear();
        self.hash_map.clear();
        for peer in std::mem::take(&mut self.peers) {
            self.place(&peer);
            self.peers.push(peer);
        }
        self.keys.sort_unstable();
    }

    // == Get ==
    /// Get the peer owning `key`: the first virtual node at or after the
    /// key's hash, wrapping around to the start of the ring.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&k| k < hash);

        self.hash_map
            .get(&self.keys[idx % self.keys.len()])
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Pushes `peer`'s virtual nodes; the caller re-sorts `keys`.
    fn place(&mut self, peer: &str) {
        for i in 0..self.replicas {
            let hash = self.virtual_node_hash(i, peer);
            self.keys.push(hash);
            self.hash_map.insert(hash, peer.to_string());
        }
    }

    fn virtual_node_hash(&self, index: usize, peer: &str) -> u32 {
        (self.hash)(format!("{index}{peer}").as_bytes())
    }
}

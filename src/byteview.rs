//! Byte View Module
//!
//! Immutable view over a cached byte payload.

use std::fmt;
use std::sync::Arc;

use crate::cache::CacheValue;

// == Byte View ==
/// An immutable, cheaply cloneable byte payload.
///
/// The buffer is copied in on construction and never handed out mutably;
/// `byte_slice` returns a fresh copy.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ByteView {
    bytes: Arc<[u8]>,
}

impl ByteView {
    /// Creates a view holding its own copy of `bytes`.
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: Arc::from(bytes),
        }
    }

    /// Number of bytes in the payload.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns a copy of the payload.
    pub fn byte_slice(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::from(bytes),
        }
    }
}

impl CacheValue for ByteView {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView")
            .field("len", &self.len())
            .field("value", &String::from_utf8_lossy(&self.bytes))
            .finish()
    }
}

//! Peercache - An embeddable distributed read-through cache
//!
//! Caches loaded values per named group, shards key ownership across peers
//! with a consistent hash ring, and loads each missing key at most once at a
//! time per node.

pub mod byteview;
pub mod cache;
pub mod config;
pub mod consistent_hash;
pub mod error;
pub mod group;
pub mod http;
pub mod models;
pub mod peers;
pub mod registry;
pub mod singleflight;

pub use byteview::ByteView;
pub use config::Config;
pub use consistent_hash::HashRing;
pub use error::GroupError;
pub use group::{Getter, GetterFn, Group, GroupStats};
pub use http::HttpPool;
pub use peers::{PeerGetter, PeerPicker};
pub use registry::GroupRegistry;
pub use singleflight::FlightGroup;

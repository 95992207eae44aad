//! Group Registry Module
//!
//! Named lookup of cache groups, passed explicitly to whatever needs it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::group::{Getter, Group};

// == Group Registry ==
/// Shared, cloneable map from group name to group.
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    groups: Arc<RwLock<HashMap<String, Arc<Group>>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == New Group ==
    /// Creates a group and registers it under `name`, replacing any group
    /// previously registered under the same name.
    pub fn new_group(
        &self,
        name: impl Into<String>,
        cache_bytes: i64,
        getter: Arc<dyn Getter>,
    ) -> Arc<Group> {
        let name = name.into();
        let group = Arc::new(Group::new(name.clone(), cache_bytes, getter));
        self.groups.write().insert(name.clone(), group.clone());
        info!(group = %name, cache_bytes, "group registered");
        group
    }

    // == Get Group ==
    /// Looks up a group by name.
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::RwLock;

use super::{Datastore, InventoryAccessor, SubtreePath};

type Key = (String, Datastore, String);

/// In-memory inventory, keyed by node, datastore and rendered subtree path.
///
/// Paths can also be marked as failing (I/O error) or stalling (never
/// answers) to exercise the recoverable-read rules.
#[derive(Default)]
pub struct MemoryInventory {
    subtrees: RwLock<HashMap<Key, serde_json::Value>>,
    failing: RwLock<HashSet<Key>>,
    stalled: RwLock<HashSet<Key>>,
}

fn key(node_id: &str, datastore: Datastore, path: &SubtreePath) -> Key {
    (node_id.to_string(), datastore, path.to_string())
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of an operational subtree
    pub fn with(mut self, node_id: &str, path: SubtreePath, value: serde_json::Value) -> Self {
        self.subtrees
            .get_mut()
            .insert(key(node_id, Datastore::Operational, &path), value);
        self
    }

    /// Builder-style insert into a specific datastore
    pub fn with_in(
        mut self,
        node_id: &str,
        datastore: Datastore,
        path: SubtreePath,
        value: serde_json::Value,
    ) -> Self {
        self.subtrees
            .get_mut()
            .insert(key(node_id, datastore, &path), value);
        self
    }

    pub fn with_failure(mut self, node_id: &str, path: SubtreePath) -> Self {
        self.failing
            .get_mut()
            .insert(key(node_id, Datastore::Operational, &path));
        self
    }

    pub fn with_stall(mut self, node_id: &str, path: SubtreePath) -> Self {
        self.stalled
            .get_mut()
            .insert(key(node_id, Datastore::Operational, &path));
        self
    }

    /// Replace a subtree on a live inventory
    pub async fn set(
        &self,
        node_id: &str,
        datastore: Datastore,
        path: SubtreePath,
        value: serde_json::Value,
    ) {
        self.subtrees
            .write()
            .await
            .insert(key(node_id, datastore, &path), value);
    }

    pub async fn remove(&self, node_id: &str, datastore: Datastore, path: &SubtreePath) {
        self.subtrees
            .write()
            .await
            .remove(&key(node_id, datastore, path));
    }
}

#[async_trait]
impl InventoryAccessor for MemoryInventory {
    async fn read(
        &self,
        node_id: &str,
        datastore: Datastore,
        path: &SubtreePath,
        _timeout: Duration,
    ) -> Result<Option<serde_json::Value>> {
        let k = key(node_id, datastore, path);
        if self.failing.read().await.contains(&k) {
            return Err(anyhow::anyhow!("connection reset while reading {}", path));
        }
        if self.stalled.read().await.contains(&k) {
            std::future::pending::<()>().await;
        }
        Ok(self.subtrees.read().await.get(&k).cloned())
    }
}

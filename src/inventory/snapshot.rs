use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use super::{Datastore, InventoryAccessor, SubtreePath};

/// Captured device inventory: one JSON file per node.
///
/// Subtrees are keyed by their rendered [`SubtreePath`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeviceSnapshot {
    pub node_id: String,
    pub schema_version: String,
    #[serde(default)]
    pub operational: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub configuration: HashMap<String, serde_json::Value>,
}

/// Inventory accessor backed by a directory of device snapshots
pub struct SnapshotInventory {
    snapshots: HashMap<String, DeviceSnapshot>,
}

impl SnapshotInventory {
    /// Load every `*.json` snapshot found in `dir`
    pub async fn load_dir(dir: &str) -> Result<Self> {
        let mut snapshots = HashMap::new();
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .with_context(|| format!("Failed to read inventory directory {}", dir))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match load_snapshot(&path).await {
                Ok(snapshot) => {
                    tracing::debug!("Loaded snapshot for {} from {}", snapshot.node_id, path.display());
                    snapshots.insert(snapshot.node_id.clone(), snapshot);
                }
                Err(e) => {
                    tracing::warn!("Skipping snapshot {}: {}", path.display(), e);
                }
            }
        }

        Ok(Self { snapshots })
    }

    pub fn from_snapshots(snapshots: Vec<DeviceSnapshot>) -> Self {
        Self {
            snapshots: snapshots
                .into_iter()
                .map(|s| (s.node_id.clone(), s))
                .collect(),
        }
    }

    /// Node ids with the schema token each device advertises, sorted by node id
    pub fn nodes(&self) -> Vec<(String, String)> {
        let mut nodes: Vec<(String, String)> = self
            .snapshots
            .values()
            .map(|s| (s.node_id.clone(), s.schema_version.clone()))
            .collect();
        nodes.sort();
        nodes
    }
}

async fn load_snapshot(path: &Path) -> Result<DeviceSnapshot> {
    let content = tokio::fs::read_to_string(path).await?;
    let snapshot = serde_json::from_str(&content)?;
    Ok(snapshot)
}

#[async_trait]
impl InventoryAccessor for SnapshotInventory {
    async fn read(
        &self,
        node_id: &str,
        datastore: Datastore,
        path: &SubtreePath,
        _timeout: Duration,
    ) -> Result<Option<serde_json::Value>> {
        let Some(snapshot) = self.snapshots.get(node_id) else {
            return Ok(None);
        };
        let subtrees = match datastore {
            Datastore::Operational => &snapshot.operational,
            Datastore::Configuration => &snapshot.configuration,
        };
        Ok(subtrees.get(&path.to_string()).cloned())
    }
}

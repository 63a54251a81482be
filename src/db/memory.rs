use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::models::*;

use super::MappingStore;

/// Mapping store kept entirely in memory
#[derive(Default)]
pub struct MemoryStore {
    nodes: RwLock<HashMap<String, NodeDocument>>,
    merges: RwLock<Vec<NodeDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every partial document merged so far, in write order
    pub async fn merge_log(&self) -> Vec<NodeDocument> {
        self.merges.read().await.clone()
    }
}

#[async_trait]
impl MappingStore for MemoryStore {
    async fn merge(&self, node_id: &str, partial: &NodeDocument) -> Result<()> {
        let mut nodes = self.nodes.write().await;
        nodes
            .entry(node_id.to_string())
            .or_insert_with(|| NodeDocument::new(node_id))
            .merge(partial);
        self.merges.write().await.push(partial.clone());
        Ok(())
    }

    async fn get(&self, node_id: &str) -> Result<Option<NodeDocument>> {
        Ok(self.nodes.read().await.get(node_id).cloned())
    }

    async fn get_entry(&self, node_id: &str, lcp: &str) -> Result<Option<LcpRecord>> {
        Ok(self
            .nodes
            .read()
            .await
            .get(node_id)
            .and_then(|doc| doc.mapping.get(lcp).cloned()))
    }

    async fn get_entry_by_port(
        &self,
        node_id: &str,
        circuit_pack_name: &str,
        port_name: &str,
    ) -> Result<Option<LcpRecord>> {
        Ok(self
            .nodes
            .read()
            .await
            .get(node_id)
            .and_then(|doc| doc.mapping_by_port(circuit_pack_name, port_name).cloned()))
    }

    async fn delete(&self, node_id: &str) -> Result<()> {
        self.nodes.write().await.remove(node_id);
        Ok(())
    }
}

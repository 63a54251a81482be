use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{MappingError, Result};
use crate::models::{Interface, Port};

use super::{Datastore, InventoryAccessor, SubtreePath};

/// Typed, timeout-bounded view of one device's inventory for a single pass
pub struct DeviceReader<'a> {
    accessor: &'a dyn InventoryAccessor,
    node_id: &'a str,
    timeout: Duration,
}

impl<'a> DeviceReader<'a> {
    pub fn new(accessor: &'a dyn InventoryAccessor, node_id: &'a str, timeout: Duration) -> Self {
        Self {
            accessor,
            node_id,
            timeout,
        }
    }

    pub fn node_id(&self) -> &str {
        self.node_id
    }

    /// Read and decode an operational subtree; `Ok(None)` when it is absent
    pub async fn read<T: DeserializeOwned>(&self, path: &SubtreePath) -> Result<Option<T>> {
        self.read_from(Datastore::Operational, path).await
    }

    pub async fn read_from<T: DeserializeOwned>(
        &self,
        datastore: Datastore,
        path: &SubtreePath,
    ) -> Result<Option<T>> {
        let raw = match tokio::time::timeout(
            self.timeout,
            self.accessor.read(self.node_id, datastore, path, self.timeout),
        )
        .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                return Err(MappingError::DeviceUnreachableOrTimeout {
                    node_id: self.node_id.to_string(),
                    path: path.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(MappingError::DeviceUnreachableOrTimeout {
                    node_id: self.node_id.to_string(),
                    path: path.to_string(),
                    reason: format!("no answer within {:?}", self.timeout),
                })
            }
        };

        match raw {
            None => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|source| {
                MappingError::MalformedSubtree {
                    node_id: self.node_id.to_string(),
                    path: path.to_string(),
                    source,
                }
            }),
        }
    }

    /// Read a subtree the pass cannot do without
    pub async fn require<T: DeserializeOwned>(&self, path: &SubtreePath) -> Result<T> {
        self.read(path).await?.ok_or_else(|| MappingError::SubtreeAbsent {
            node_id: self.node_id.to_string(),
            path: path.to_string(),
        })
    }

    /// Read an optional subtree; failures are logged and treated as absence
    pub async fn optional<T: DeserializeOwned>(&self, path: &SubtreePath) -> Option<T> {
        match self.read(path).await {
            Ok(found) => {
                if found.is_none() {
                    tracing::debug!("{} : subtree {} is absent", self.node_id, path);
                }
                found
            }
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        }
    }

    /// Read an optional list subtree, empty when absent
    pub async fn list<T: DeserializeOwned>(&self, path: &SubtreePath) -> Vec<T> {
        self.list_from(Datastore::Operational, path).await
    }

    pub async fn list_from<T: DeserializeOwned>(
        &self,
        datastore: Datastore,
        path: &SubtreePath,
    ) -> Vec<T> {
        match self.read_from::<Vec<T>>(datastore, path).await {
            Ok(found) => found.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("{}", e);
                Vec::new()
            }
        }
    }

    pub async fn port(&self, circuit_pack: &str, port: &str) -> Option<Port> {
        self.optional(&SubtreePath::port(circuit_pack, port)).await
    }

    pub async fn interface(&self, name: &str) -> Option<Interface> {
        self.optional(&SubtreePath::Interface(name.to_string())).await
    }
}

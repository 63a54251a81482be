mod memory;
mod reader;
mod snapshot;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub use memory::MemoryInventory;
pub use reader::DeviceReader;
pub use snapshot::{DeviceSnapshot, SnapshotInventory};

/// Device datastore a subtree is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datastore {
    Operational,
    Configuration,
}

impl fmt::Display for Datastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datastore::Operational => write!(f, "operational"),
            Datastore::Configuration => write!(f, "configuration"),
        }
    }
}

/// Address of a device subtree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubtreePath {
    Info,
    CircuitPacks,
    CircuitPack(String),
    Port { circuit_pack: String, port: String },
    Degree(u16),
    SharedRiskGroup(u16),
    ConnectionMaps,
    Xponders,
    OduSwitchingPools,
    Interface(String),
    LldpPortConfigs,
    McCapabilityProfile(String),
    OcSystemState,
    OcComponents,
    OcComponent(String),
    OcLogicalChannels,
}

impl SubtreePath {
    pub fn port(circuit_pack: &str, port: &str) -> Self {
        SubtreePath::Port {
            circuit_pack: circuit_pack.to_string(),
            port: port.to_string(),
        }
    }
}

impl fmt::Display for SubtreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const ROOT: &str = "org-openroadm-device:org-openroadm-device";
        match self {
            SubtreePath::Info => write!(f, "{}/info", ROOT),
            SubtreePath::CircuitPacks => write!(f, "{}/circuit-packs", ROOT),
            SubtreePath::CircuitPack(cp) => write!(f, "{}/circuit-packs={}", ROOT, cp),
            SubtreePath::Port { circuit_pack, port } => {
                write!(f, "{}/circuit-packs={}/ports={}", ROOT, circuit_pack, port)
            }
            SubtreePath::Degree(n) => write!(f, "{}/degree={}", ROOT, n),
            SubtreePath::SharedRiskGroup(n) => write!(f, "{}/shared-risk-group={}", ROOT, n),
            SubtreePath::ConnectionMaps => write!(f, "{}/connection-map", ROOT),
            SubtreePath::Xponders => write!(f, "{}/xponder", ROOT),
            SubtreePath::OduSwitchingPools => write!(f, "{}/odu-switching-pools", ROOT),
            SubtreePath::Interface(name) => write!(f, "{}/interface={}", ROOT, name),
            SubtreePath::LldpPortConfigs => write!(f, "{}/protocols/lldp/port-config", ROOT),
            SubtreePath::McCapabilityProfile(name) => {
                write!(f, "{}/mc-capability-profile={}", ROOT, name)
            }
            SubtreePath::OcSystemState => write!(f, "openconfig-system:system/state"),
            SubtreePath::OcComponents => write!(f, "openconfig-platform:components"),
            SubtreePath::OcComponent(name) => {
                write!(f, "openconfig-platform:components/component={}", name)
            }
            SubtreePath::OcLogicalChannels => {
                write!(f, "openconfig-terminal-device:terminal-device/logical-channels")
            }
        }
    }
}

/// Transport-side access to device subtrees.
///
/// Implementations return `Ok(None)` for a subtree that does not exist on the
/// device and reserve `Err` for genuine I/O failures. `timeout` is the budget
/// for this read; [`DeviceReader`] enforces it as well.
#[async_trait]
pub trait InventoryAccessor: Send + Sync {
    async fn read(
        &self,
        node_id: &str,
        datastore: Datastore,
        path: &SubtreePath,
        timeout: Duration,
    ) -> Result<Option<serde_json::Value>>;
}

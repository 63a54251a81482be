pub mod capabilities;
pub mod classify;
mod context;
pub mod dispatch;
mod interfaces;
pub mod naming;
mod openconfig;
pub mod partner;
mod roadm;
mod strategy;
pub mod switching;
mod v121;
mod v221;
mod v710;
mod xponder;

use std::sync::Arc;
use std::time::Duration;

use crate::db::MappingStore;
use crate::error::{MappingError, Result};
use crate::inventory::{DeviceReader, InventoryAccessor, SubtreePath};
use crate::models::{LcpRecord, MetadataCatalog, NodeDocument, Port};

use context::Pass;

pub use context::{PassContext, XponderCounters};
pub use dispatch::SchemaVersion;
pub use interfaces::SupportingLayer;
pub use naming::{lcp_hash, LcpKind};

const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(240);

/// Builds, refreshes and serves the canonical port mapping of devices.
///
/// Each call to [`PortMapping::create_mapping_data`] runs one independent
/// pass; passes over different devices may run concurrently.
#[derive(Clone)]
pub struct PortMapping {
    accessor: Arc<dyn InventoryAccessor>,
    store: Arc<dyn MappingStore>,
    catalog: Arc<MetadataCatalog>,
    read_timeout: Duration,
}

impl PortMapping {
    pub fn new(accessor: Arc<dyn InventoryAccessor>, store: Arc<dyn MappingStore>) -> Self {
        Self {
            accessor,
            store,
            catalog: Arc::new(MetadataCatalog::default()),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Metadata catalog used to classify OpenConfig terminal devices
    pub fn with_catalog(mut self, catalog: MetadataCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    fn reader<'a>(&'a self, node_id: &'a str) -> DeviceReader<'a> {
        DeviceReader::new(self.accessor.as_ref(), node_id, self.read_timeout)
    }

    /// Build the full mapping of a device advertising `version`.
    ///
    /// Partial documents are merged into the store as the pass goes; on
    /// failure what was already merged stays, and nothing is rolled back.
    pub async fn create_mapping_data(&self, node_id: &str, version: &str) -> Result<NodeDocument> {
        let version = SchemaVersion::from_token(version)?;
        tracing::info!("{} : building port mapping for schema {}", node_id, version);

        let mut pass = Pass::new(self.reader(node_id), self.store.as_ref());
        match dispatch::build(version, &mut pass, &self.catalog).await {
            Ok(()) => {
                let doc = pass.into_document();
                tracing::info!(
                    "{} : port mapping built with {} logical connection points",
                    node_id,
                    doc.mapping.len()
                );
                Ok(doc)
            }
            Err(e) => {
                tracing::error!("{} : port mapping failed: {}", node_id, e);
                Err(e)
            }
        }
    }

    /// Refresh one existing LCP record from a freshly read port and write it
    /// back. Only admin/oper state and supporting interfaces change.
    pub async fn update_mapping(
        &self,
        node_id: &str,
        existing: &LcpRecord,
        fresh: &Port,
    ) -> Result<NodeDocument> {
        if node_id.is_empty() {
            return Err(MappingError::InvalidUpdate("node id is not set".to_string()));
        }
        if existing.logical_connection_point.is_empty() {
            return Err(MappingError::InvalidUpdate(format!(
                "{} : existing mapping is not set",
                node_id
            )));
        }

        let version = self.stored_version(node_id).await?;
        let updated = dispatch::update(version, &self.reader(node_id), existing, fresh).await?;
        tracing::debug!(
            "{} : updating {} (admin {:?}, oper {:?})",
            node_id,
            updated.logical_connection_point,
            updated.port_admin_state,
            updated.port_oper_state
        );

        let mut partial = NodeDocument::new(node_id);
        partial
            .mapping
            .insert(updated.logical_connection_point.clone(), updated);
        self.store.merge(node_id, &partial).await?;
        Ok(self.store.get(node_id).await?.unwrap_or(partial))
    }

    /// Re-read the port behind a stored LCP and update the record
    pub async fn refresh_mapping(&self, node_id: &str, lcp: &str) -> Result<NodeDocument> {
        let existing = self
            .store
            .get_entry(node_id, lcp)
            .await?
            .ok_or_else(|| MappingError::MappingNotFound {
                node_id: node_id.to_string(),
                lcp: lcp.to_string(),
            })?;
        let version = self.stored_version(node_id).await?;

        let reader = self.reader(node_id);
        let (fresh, path) = if version.is_openconfig() {
            (
                openconfig::fresh_port(&reader, &existing).await,
                SubtreePath::OcComponent(existing.supporting_port.clone()),
            )
        } else {
            (
                reader
                    .port(&existing.supporting_circuit_pack_name, &existing.supporting_port)
                    .await,
                SubtreePath::port(&existing.supporting_circuit_pack_name, &existing.supporting_port),
            )
        };
        let fresh = fresh.ok_or_else(|| MappingError::SubtreeAbsent {
            node_id: node_id.to_string(),
            path: path.to_string(),
        })?;

        self.update_mapping(node_id, &existing, &fresh).await
    }

    pub async fn get_mapping(&self, node_id: &str, lcp: &str) -> Result<Option<LcpRecord>> {
        Ok(self.store.get_entry(node_id, lcp).await?)
    }

    pub async fn get_mapping_by_port(
        &self,
        node_id: &str,
        circuit_pack_name: &str,
        port_name: &str,
    ) -> Result<Option<LcpRecord>> {
        Ok(self
            .store
            .get_entry_by_port(node_id, circuit_pack_name, port_name)
            .await?)
    }

    pub async fn get_node(&self, node_id: &str) -> Result<Option<NodeDocument>> {
        Ok(self.store.get(node_id).await?)
    }

    pub async fn is_node_exist(&self, node_id: &str) -> Result<bool> {
        Ok(self.store.get(node_id).await?.is_some())
    }

    /// Forget everything mapped for a decommissioned device
    pub async fn delete_mapping_data(&self, node_id: &str) -> Result<()> {
        tracing::info!("{} : deleting port mapping", node_id);
        self.store.delete(node_id).await?;
        Ok(())
    }

    async fn stored_version(&self, node_id: &str) -> Result<SchemaVersion> {
        let info = self
            .store
            .get(node_id)
            .await?
            .and_then(|doc| doc.node_info)
            .ok_or_else(|| {
                MappingError::InvalidUpdate(format!("{} : no node info stored", node_id))
            })?;
        SchemaVersion::from_token(&info.openroadm_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::inventory::{Datastore, MemoryInventory};
    use crate::models::InterfaceRef;
    use crate::testing::*;
    use serde_json::json;

    fn network_port(interfaces: &[&str]) -> serde_json::Value {
        let mut p = port("1", "xpdr-network", "bidirectional");
        p["supported-interface-capability"] = json!(["org-openroadm-port-types:if-OCH-OTU4-ODU4"]);
        p["interfaces"] = json!(interfaces
            .iter()
            .map(|name| json!({"interface-name": name}))
            .collect::<Vec<_>>());
        p
    }

    fn xponder(node: &str) -> MemoryInventory {
        let inventory = MemoryInventory::new()
            .with(node, SubtreePath::Info, info("xpdr", 0, 0))
            .with(
                node,
                SubtreePath::CircuitPacks,
                json!([circuit_pack("1/0/1-PLUG-NET", vec![network_port(&["XPDR1-NETWORK1-OTU"])])]),
            )
            .with(
                node,
                SubtreePath::Interface("XPDR1-NETWORK1-OTU".into()),
                json!({"name": "XPDR1-NETWORK1-OTU", "type": "org-openroadm-interfaces:otnOtu"}),
            )
            .with(
                node,
                SubtreePath::Interface("XPDR1-NETWORK1-ODU4".into()),
                json!({"name": "XPDR1-NETWORK1-ODU4", "type": "org-openroadm-interfaces:otnOdu"}),
            );
        with_port(inventory, node, "1/0/1-PLUG-NET", network_port(&["XPDR1-NETWORK1-OTU"]))
    }

    fn live(inventory: MemoryInventory) -> (PortMapping, Arc<MemoryInventory>, Arc<MemoryStore>) {
        let inventory = Arc::new(inventory);
        let store = Arc::new(MemoryStore::new());
        let engine = PortMapping::new(inventory.clone(), store.clone())
            .with_read_timeout(Duration::from_millis(200));
        (engine, inventory, store)
    }

    #[tokio::test]
    async fn test_update_changes_only_volatile_fields() {
        let (engine, _) = engine(xponder(XPDR));
        let doc = engine.create_mapping_data(XPDR, "2.2.1").await.unwrap();
        let existing = doc.mapping["XPDR1-NETWORK1"].clone();
        assert_eq!(existing.supporting_otu4.as_deref(), Some("XPDR1-NETWORK1-OTU"));

        let fresh = Port {
            port_name: "1".into(),
            administrative_state: Some("outOfService".into()),
            operational_state: Some("outOfService".into()),
            interfaces: vec![InterfaceRef {
                interface_name: "XPDR1-NETWORK1-ODU4".into(),
            }],
            ..Default::default()
        };
        let first = engine.update_mapping(XPDR, &existing, &fresh).await.unwrap();
        let second = engine.update_mapping(XPDR, &existing, &fresh).await.unwrap();
        assert_eq!(first, second);

        let updated = &first.mapping["XPDR1-NETWORK1"];
        assert_eq!(updated.port_admin_state.as_deref(), Some("outOfService"));
        assert_eq!(updated.supporting_odu4.as_deref(), Some("XPDR1-NETWORK1-ODU4"));
        assert!(updated.supporting_otu4.is_none());
        assert_eq!(updated.lcp_hash_val, existing.lcp_hash_val);
        assert_eq!(updated.supported_interface_capability, existing.supported_interface_capability);
        assert_eq!(updated.port_qual, existing.port_qual);
        assert_eq!(first.node_info, doc.node_info);
    }

    #[tokio::test]
    async fn test_update_without_interfaces_keeps_supporting_interfaces() {
        let (engine, _) = engine(xponder(XPDR));
        let doc = engine.create_mapping_data(XPDR, "2.2.1").await.unwrap();
        let existing = &doc.mapping["XPDR1-NETWORK1"];

        let fresh = Port {
            port_name: "1".into(),
            operational_state: Some("degraded".into()),
            ..Default::default()
        };
        let after = engine.update_mapping(XPDR, existing, &fresh).await.unwrap();
        let updated = &after.mapping["XPDR1-NETWORK1"];
        assert_eq!(updated.port_oper_state.as_deref(), Some("degraded"));
        assert!(updated.port_admin_state.is_none());
        assert_eq!(updated.supporting_otu4, existing.supporting_otu4);
    }

    #[tokio::test]
    async fn test_update_rejects_missing_inputs() {
        let (engine, store) = engine(MemoryInventory::new());
        let record = sample_record("XPDR1-NETWORK1", "1/0/1-PLUG-NET", "1");
        let fresh = Port::default();

        let err = engine.update_mapping("", &record, &fresh).await.unwrap_err();
        assert!(matches!(err, MappingError::InvalidUpdate(_)));

        let mut unnamed = record.clone();
        unnamed.logical_connection_point.clear();
        let err = engine.update_mapping(XPDR, &unnamed, &fresh).await.unwrap_err();
        assert!(matches!(err, MappingError::InvalidUpdate(_)));

        // nothing stored for the node yet
        let err = engine.update_mapping(XPDR, &record, &fresh).await.unwrap_err();
        assert!(matches!(err, MappingError::InvalidUpdate(_)));
        assert!(store.merge_log().await.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_reads_live_port() {
        let (engine, inventory, _) = live(xponder(XPDR));
        engine.create_mapping_data(XPDR, "2.2.1").await.unwrap();

        let mut changed = network_port(&["XPDR1-NETWORK1-OTU"]);
        changed["operational-state"] = json!("outOfService");
        inventory
            .set(XPDR, Datastore::Operational, SubtreePath::port("1/0/1-PLUG-NET", "1"), changed)
            .await;

        let doc = engine.refresh_mapping(XPDR, "XPDR1-NETWORK1").await.unwrap();
        assert_eq!(
            doc.mapping["XPDR1-NETWORK1"].port_oper_state.as_deref(),
            Some("outOfService")
        );

        let err = engine.refresh_mapping(XPDR, "XPDR1-CLIENT9").await.unwrap_err();
        assert!(matches!(err, MappingError::MappingNotFound { .. }));

        inventory
            .remove(XPDR, Datastore::Operational, &SubtreePath::port("1/0/1-PLUG-NET", "1"))
            .await;
        let err = engine.refresh_mapping(XPDR, "XPDR1-NETWORK1").await.unwrap_err();
        assert!(matches!(err, MappingError::SubtreeAbsent { .. }));
    }

    #[tokio::test]
    async fn test_failed_rebuild_keeps_previous_mapping() {
        let (engine, inventory, _) = live(xponder(XPDR));
        engine.create_mapping_data(XPDR, "2.2.1").await.unwrap();

        inventory
            .remove(XPDR, Datastore::Operational, &SubtreePath::CircuitPacks)
            .await;
        let err = tokio_test::assert_err!(engine.create_mapping_data(XPDR, "2.2.1").await);
        assert!(matches!(err, MappingError::SubtreeAbsent { .. }));

        let doc = engine.get_node(XPDR).await.unwrap().unwrap();
        assert!(doc.mapping.contains_key("XPDR1-NETWORK1"));
    }

    #[tokio::test]
    async fn test_lookups_and_delete() {
        let (engine, _) = engine(xponder(XPDR));
        assert!(!engine.is_node_exist(XPDR).await.unwrap());
        tokio_test::assert_ok!(engine.create_mapping_data(XPDR, "2.2.1").await);
        assert!(engine.is_node_exist(XPDR).await.unwrap());

        let by_lcp = engine.get_mapping(XPDR, "XPDR1-NETWORK1").await.unwrap().unwrap();
        let by_port = engine
            .get_mapping_by_port(XPDR, "1/0/1-PLUG-NET", "1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_lcp, by_port);
        assert!(engine.get_mapping(XPDR, "XPDR9-NETWORK1").await.unwrap().is_none());

        engine.delete_mapping_data(XPDR).await.unwrap();
        assert!(!engine.is_node_exist(XPDR).await.unwrap());
        assert!(engine.get_mapping(XPDR, "XPDR1-NETWORK1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_passes_over_different_nodes_run_concurrently() {
        let inventory = MemoryInventory::new()
            .with("XPDR-B1", SubtreePath::Info, info("xpdr", 0, 0))
            .with(
                "XPDR-B1",
                SubtreePath::CircuitPacks,
                json!([circuit_pack("CP1", vec![port("C1", "xpdr-client", "bidirectional")])]),
            )
            .with(XPDR, SubtreePath::Info, info("xpdr", 0, 0))
            .with(
                XPDR,
                SubtreePath::CircuitPacks,
                json!([circuit_pack("CP1", vec![port("N1", "xpdr-network", "bidirectional")])]),
            );
        let (engine, _) = engine(inventory);

        let (a, b) = tokio::join!(
            engine.create_mapping_data(XPDR, "2.2.1"),
            engine.create_mapping_data("XPDR-B1", "7.1")
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(a.mapping.contains_key("XPDR1-NETWORK1"));
        assert!(b.mapping.contains_key("XPDR1-CLIENT1"));
        assert_ne!(
            a.mapping["XPDR1-NETWORK1"].lcp_hash_val,
            crate::mapping::lcp_hash("XPDR-B1", "XPDR1-NETWORK1")
        );
        assert_eq!(b.node_info.unwrap().openroadm_version, "7.1");
    }
}

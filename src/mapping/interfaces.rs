use crate::inventory::DeviceReader;
use crate::models::openconfig::identity_name;
use crate::models::{Interface, LcpRecord, Port};

use super::naming::LcpKind;

/// Transport layer an interface provisioned on a port belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportingLayer {
    Ots,
    Oms,
    Otu4,
    Odu4,
    OtuCn,
    OduCn,
}

impl SupportingLayer {
    /// Layer of an interface judged by its type identity alone
    pub fn of_type(iface: &Interface) -> Option<Self> {
        match identity_name(&iface.interface_type) {
            "opticalTransport" => Some(SupportingLayer::Ots),
            "openROADMOpticalMultiplex" => Some(SupportingLayer::Oms),
            "otnOtu" => Some(SupportingLayer::Otu4),
            "otnOdu" => Some(SupportingLayer::Odu4),
            _ => None,
        }
    }

    /// Whether a record of `kind` keeps interfaces of this layer
    fn applies_to(self, kind: LcpKind) -> bool {
        match self {
            SupportingLayer::Ots | SupportingLayer::Oms => kind == LcpKind::Ttp,
            _ => kind == LcpKind::Network,
        }
    }

    fn set(self, record: &mut LcpRecord, name: &str) {
        let slot = match self {
            SupportingLayer::Ots => &mut record.supporting_ots,
            SupportingLayer::Oms => &mut record.supporting_oms,
            SupportingLayer::Otu4 => &mut record.supporting_otu4,
            SupportingLayer::Odu4 => &mut record.supporting_odu4,
            SupportingLayer::OtuCn => &mut record.supporting_otucn,
            SupportingLayer::OduCn => &mut record.supporting_oducn,
        };
        *slot = Some(name.to_string());
    }
}

/// Read every interface provisioned on `port` and record the supporting
/// transport-layer names on `record`. `layer_of` decides the layer of an
/// interface for the schema in use. Interfaces that cannot be read are
/// logged and skipped.
pub async fn resolve_supporting_interfaces<F>(
    reader: &DeviceReader<'_>,
    record: &mut LcpRecord,
    port: &Port,
    layer_of: F,
) where
    F: Fn(&Interface) -> Option<SupportingLayer>,
{
    let kind = LcpKind::of(&record.logical_connection_point);
    if !kind.has_supporting_interfaces() {
        return;
    }

    for iface_ref in &port.interfaces {
        let Some(iface) = reader.interface(&iface_ref.interface_name).await else {
            tracing::warn!(
                "{} : interface {} of {}/{} could not be read",
                reader.node_id(),
                iface_ref.interface_name,
                record.supporting_circuit_pack_name,
                record.supporting_port
            );
            continue;
        };
        match layer_of(&iface) {
            Some(layer) if layer.applies_to(kind) => layer.set(record, &iface.name),
            _ => tracing::debug!(
                "{} : interface {} ({}) does not support {}",
                reader.node_id(),
                iface.name,
                iface.interface_type,
                record.logical_connection_point
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{MemoryInventory, SubtreePath};
    use crate::models::InterfaceRef;
    use crate::testing::sample_record;
    use std::time::Duration;

    fn iface(name: &str, kind: &str) -> serde_json::Value {
        serde_json::json!({"name": name, "type": format!("org-openroadm-interfaces:{}", kind)})
    }

    fn port_with(names: &[&str]) -> Port {
        Port {
            port_name: "1".into(),
            interfaces: names
                .iter()
                .map(|n| InterfaceRef {
                    interface_name: n.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_ttp_keeps_ots_and_oms() {
        let inventory = MemoryInventory::new()
            .with("R1", SubtreePath::Interface("OTS-DEG1-TTP-TXRX".into()), iface("OTS-DEG1-TTP-TXRX", "opticalTransport"))
            .with("R1", SubtreePath::Interface("OMS-DEG1-TTP-TXRX".into()), iface("OMS-DEG1-TTP-TXRX", "openROADMOpticalMultiplex"));
        let reader = DeviceReader::new(&inventory, "R1", Duration::from_secs(1));
        let mut record = sample_record("DEG1-TTP-TXRX", "1/0", "L1");

        let port = port_with(&["OTS-DEG1-TTP-TXRX", "OMS-DEG1-TTP-TXRX", "GONE"]);
        resolve_supporting_interfaces(&reader, &mut record, &port, SupportingLayer::of_type).await;

        assert_eq!(record.supporting_ots.as_deref(), Some("OTS-DEG1-TTP-TXRX"));
        assert_eq!(record.supporting_oms.as_deref(), Some("OMS-DEG1-TTP-TXRX"));
        assert!(record.supporting_otu4.is_none());
    }

    #[tokio::test]
    async fn test_network_ignores_roadm_layers_and_clients_are_untouched() {
        let inventory = MemoryInventory::new()
            .with("X1", SubtreePath::Interface("XPDR1-NETWORK1-OTU".into()), iface("XPDR1-NETWORK1-OTU", "otnOtu"))
            .with("X1", SubtreePath::Interface("XPDR1-NETWORK1-OTS".into()), iface("XPDR1-NETWORK1-OTS", "opticalTransport"));
        let reader = DeviceReader::new(&inventory, "X1", Duration::from_secs(1));
        let port = port_with(&["XPDR1-NETWORK1-OTU", "XPDR1-NETWORK1-OTS"]);

        let mut network = sample_record("XPDR1-NETWORK1", "CP1", "1");
        resolve_supporting_interfaces(&reader, &mut network, &port, SupportingLayer::of_type).await;
        assert_eq!(network.supporting_otu4.as_deref(), Some("XPDR1-NETWORK1-OTU"));
        assert!(network.supporting_ots.is_none());

        let mut client = sample_record("XPDR1-CLIENT1", "CP1", "1");
        let before = client.clone();
        resolve_supporting_interfaces(&reader, &mut client, &port, SupportingLayer::of_type).await;
        assert_eq!(client, before);
    }
}

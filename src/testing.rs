//! Device fixtures shared by the unit tests.

use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::db::MemoryStore;
use crate::inventory::{MemoryInventory, SubtreePath};
use crate::mapping::PortMapping;
use crate::models::*;

pub const ROADM: &str = "ROADM-A1";
pub const XPDR: &str = "XPDR-A1";

pub fn sample_record(lcp: &str, circuit_pack: &str, port: &str) -> LcpRecord {
    LcpRecord {
        logical_connection_point: lcp.to_string(),
        supporting_circuit_pack_name: circuit_pack.to_string(),
        supporting_port: port.to_string(),
        port_direction: Direction::Bidirectional,
        port_qual: Some(PortQual::XpdrNetwork),
        port_admin_state: Some("InService".into()),
        port_oper_state: Some("inService".into()),
        xpdr_type: Some(XpdrType::Tpdr),
        partner_lcp: None,
        connection_map_lcp: None,
        supported_interface_capability: BTreeSet::from([InterfaceCapability::IfOCHOTU4ODU4]),
        lcp_hash_val: crate::mapping::naming::lcp_hash(XPDR, lcp),
        supporting_ots: None,
        supporting_oms: None,
        supporting_otu4: None,
        supporting_odu4: None,
        supporting_otucn: None,
        supporting_oducn: None,
        mpdr_restrictions: None,
        mc_capability_profile_name: Vec::new(),
    }
}

pub fn info(node_type: &str, max_degrees: u16, max_srgs: u16) -> Value {
    json!({
        "node-id": "node",
        "node-type": node_type,
        "clli": "NodeA",
        "vendor": "vendorA",
        "model": "model2",
        "ip-address": "1.2.3.4",
        "max-degrees": max_degrees,
        "max-srgs": max_srgs
    })
}

pub fn port(name: &str, qual: &str, direction: &str) -> Value {
    json!({
        "port-name": name,
        "port-qual": qual,
        "port-direction": direction,
        "administrative-state": "inService",
        "operational-state": "inService"
    })
}

pub fn uni_port(name: &str, qual: &str, direction: &str, partner_cp: &str, partner_port: &str) -> Value {
    let mut p = port(name, qual, direction);
    p["partner-port"] = json!({"circuit-pack-name": partner_cp, "port-name": partner_port});
    p
}

pub fn circuit_pack(name: &str, ports: Vec<Value>) -> Value {
    json!({"circuit-pack-name": name, "ports": ports})
}

/// Inventory with one port written both inside its circuit pack and at its
/// own port path
pub fn with_port(inventory: MemoryInventory, node: &str, cp: &str, port: Value) -> MemoryInventory {
    let name = port["port-name"].as_str().unwrap_or_default().to_string();
    inventory.with(node, SubtreePath::port(cp, &name), port)
}

pub fn engine(inventory: MemoryInventory) -> (PortMapping, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let mapping = PortMapping::new(Arc::new(inventory), store.clone())
        .with_read_timeout(Duration::from_millis(200));
    (mapping, store)
}

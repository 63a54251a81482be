use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Node types the mapping engine knows how to walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Rdm,
    Xpdr,
}

impl NodeType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rdm" | "roadm" => Some(NodeType::Rdm),
            "xpdr" | "xponder" => Some(NodeType::Xpdr),
            _ => None,
        }
    }
}

/// Port direction as seen by the mapping engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Tx,
    Rx,
    Bidirectional,
}

impl Direction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "tx" => Some(Direction::Tx),
            "rx" => Some(Direction::Rx),
            "bidirectional" => Some(Direction::Bidirectional),
            _ => None,
        }
    }

    /// Suffix used in TTP/PP logical connection point names
    pub fn lcp_suffix(self) -> &'static str {
        match self {
            Direction::Tx => "TX",
            Direction::Rx => "RX",
            Direction::Bidirectional => "TXRX",
        }
    }

    pub fn is_unidirectional(self) -> bool {
        !matches!(self, Direction::Bidirectional)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Tx => write!(f, "tx"),
            Direction::Rx => write!(f, "rx"),
            Direction::Bidirectional => write!(f, "bidirectional"),
        }
    }
}

/// Port qualifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortQual {
    RoadmExternal,
    RoadmInternal,
    XpdrNetwork,
    XpdrClient,
    SwitchNetwork,
    SwitchClient,
}

impl PortQual {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "roadm-external" => Some(PortQual::RoadmExternal),
            "roadm-internal" => Some(PortQual::RoadmInternal),
            "xpdr-network" => Some(PortQual::XpdrNetwork),
            "xpdr-client" => Some(PortQual::XpdrClient),
            "switch-network" => Some(PortQual::SwitchNetwork),
            "switch-client" => Some(PortQual::SwitchClient),
            _ => None,
        }
    }

    pub fn is_network(self) -> bool {
        matches!(self, PortQual::XpdrNetwork | PortQual::SwitchNetwork)
    }

    pub fn is_client(self) -> bool {
        matches!(self, PortQual::XpdrClient | PortQual::SwitchClient)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PortQual::RoadmExternal => "roadm-external",
            PortQual::RoadmInternal => "roadm-internal",
            PortQual::XpdrNetwork => "xpdr-network",
            PortQual::XpdrClient => "xpdr-client",
            PortQual::SwitchNetwork => "switch-network",
            PortQual::SwitchClient => "switch-client",
        }
    }
}

impl fmt::Display for PortQual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared xponder type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum XpdrType {
    Tpdr,
    Mpdr,
    Switch,
    Regen,
    RegenUni,
}

impl XpdrType {
    pub fn parse(raw: &str) -> Option<Self> {
        // Device values may carry a module prefix, e.g. "org-openroadm-switching-pool-types:mpdr"
        let name = raw.rsplit(':').next().unwrap_or(raw);
        match name.trim().to_ascii_lowercase().as_str() {
            "tpdr" => Some(XpdrType::Tpdr),
            "mpdr" => Some(XpdrType::Mpdr),
            "switch" => Some(XpdrType::Switch),
            "regen" => Some(XpdrType::Regen),
            "regen-uni" => Some(XpdrType::RegenUni),
            _ => None,
        }
    }
}

/// Canonical supported-interface capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InterfaceCapability {
    #[serde(rename = "if-1GE")]
    If1GE,
    #[serde(rename = "if-1GE-ODU0")]
    If1GEODU0,
    #[serde(rename = "if-10GE")]
    If10GE,
    #[serde(rename = "if-10GE-ODU2")]
    If10GEODU2,
    #[serde(rename = "if-10GE-ODU2e")]
    If10GEODU2e,
    #[serde(rename = "if-100GE")]
    If100GE,
    #[serde(rename = "if-100GE-ODU4")]
    If100GEODU4,
    #[serde(rename = "if-400GE")]
    If400GE,
    #[serde(rename = "if-OCH")]
    IfOCH,
    #[serde(rename = "if-OCH-OTU4-ODU4")]
    IfOCHOTU4ODU4,
    #[serde(rename = "if-n-OTU4-ODU4")]
    IfNOTU4ODU4,
    #[serde(rename = "if-OTUCn-ODUCn")]
    IfOTUCnODUCn,
    #[serde(rename = "if-otsi-otsigroup")]
    IfOtsiOtsigroup,
}

/// Tributary-slot window a muxponder client can use on its network port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MpdrRestrictions {
    pub min_trib_slot: String,
    pub max_trib_slot: String,
}

/// Canonical logical connection point record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LcpRecord {
    pub logical_connection_point: String,
    pub supporting_circuit_pack_name: String,
    pub supporting_port: String,
    pub port_direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_qual: Option<PortQual>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_admin_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_oper_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xpdr_type: Option<XpdrType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_lcp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_map_lcp: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub supported_interface_capability: BTreeSet<InterfaceCapability>,
    pub lcp_hash_val: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supporting_ots: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supporting_oms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supporting_otu4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supporting_odu4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supporting_otucn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supporting_oducn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mpdr_restrictions: Option<MpdrRestrictions>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mc_capability_profile_name: Vec<String>,
}

impl LcpRecord {
    /// Clear every supporting transport-layer interface name
    pub fn clear_supporting_interfaces(&mut self) {
        self.supporting_ots = None;
        self.supporting_oms = None;
        self.supporting_otu4 = None;
        self.supporting_odu4 = None;
        self.supporting_otucn = None;
        self.supporting_oducn = None;
    }
}

/// Node metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub node_type: NodeType,
    pub openroadm_version: String,
    pub node_clli: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_ip_address: Option<String>,
}

/// Circuit pack to degree association (ROADM only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpToDegree {
    pub circuit_pack_name: String,
    pub degree_number: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonBlockingList {
    pub nbl_number: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interconnect_bandwidth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interconnect_bandwidth_unit: Option<u64>,
    pub lcp_list: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchingPoolLcp {
    pub switching_pool_number: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switching_pool_type: Option<String>,
    pub non_blocking_list: BTreeMap<u16, NonBlockingList>,
}

/// Media-channel capability profile of a degree or SRG
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McCapabilityEntry {
    pub mc_node_name: String,
    pub center_freq_granularity: f64,
    pub slot_width_granularity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_slots: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_slots: Option<u32>,
}

/// Canonical per-node mapping document.
///
/// The same type describes a full document and a partial one handed to
/// [`crate::db::MappingStore::merge`]: absent parts are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDocument {
    pub node_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_info: Option<NodeInfo>,
    #[serde(default)]
    pub mapping: BTreeMap<String, LcpRecord>,
    #[serde(default)]
    pub cp_to_degree: BTreeMap<String, CpToDegree>,
    #[serde(default)]
    pub switching_pool_lcp: BTreeMap<u16, SwitchingPoolLcp>,
    #[serde(default)]
    pub mc_capabilities: BTreeMap<String, McCapabilityEntry>,
}

impl NodeDocument {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            ..Default::default()
        }
    }

    pub fn with_node_info(node_id: &str, info: NodeInfo) -> Self {
        Self {
            node_info: Some(info),
            ..Self::new(node_id)
        }
    }

    /// Upsert every keyed entry of `partial` into this document
    pub fn merge(&mut self, partial: &NodeDocument) {
        if let Some(info) = &partial.node_info {
            self.node_info = Some(info.clone());
        }
        for (lcp, record) in &partial.mapping {
            self.mapping.insert(lcp.clone(), record.clone());
        }
        for (cp, entry) in &partial.cp_to_degree {
            self.cp_to_degree.insert(cp.clone(), entry.clone());
        }
        for (number, pool) in &partial.switching_pool_lcp {
            self.switching_pool_lcp.insert(*number, pool.clone());
        }
        for (name, caps) in &partial.mc_capabilities {
            self.mc_capabilities.insert(name.clone(), caps.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.node_info.is_none()
            && self.mapping.is_empty()
            && self.cp_to_degree.is_empty()
            && self.switching_pool_lcp.is_empty()
            && self.mc_capabilities.is_empty()
    }

    /// Find the LCP supported by a given physical port
    pub fn mapping_by_port(&self, circuit_pack_name: &str, port_name: &str) -> Option<&LcpRecord> {
        self.mapping.values().find(|m| {
            m.supporting_circuit_pack_name == circuit_pack_name && m.supporting_port == port_name
        })
    }
}

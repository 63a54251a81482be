use serde::{Deserialize, Serialize};

// Raw device inventory as read from the device datastores. All OpenROADM
// schema versions are decoded into these shapes; fields a given version does
// not model are simply absent.

/// Device `info` container
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Info {
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub node_number: Option<u32>,
    #[serde(default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub clli: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_id: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub software_version: Option<String>,
    #[serde(default)]
    pub max_degrees: Option<u16>,
    #[serde(default)]
    pub max_srgs: Option<u16>,
}

/// Reference to a port, addressed by circuit pack and port name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PortRef {
    pub circuit_pack_name: String,
    pub port_name: String,
}

impl PortRef {
    /// Key used to look a physical port up in the LCP table: `cp+port`
    pub fn key(&self) -> String {
        port_key(&self.circuit_pack_name, &self.port_name)
    }
}

/// Build the `cp+port` lookup key for a physical port
pub fn port_key(circuit_pack_name: &str, port_name: &str) -> String {
    format!("{}+{}", circuit_pack_name, port_name)
}

/// Partner reference carried by a unidirectional port
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PartnerPort {
    #[serde(default)]
    pub circuit_pack_name: Option<String>,
    #[serde(default, alias = "port-ref")]
    pub port_name: Option<String>,
}

impl PartnerPort {
    /// Both halves of the reference, if fully declared
    pub fn target(&self) -> Option<(&str, &str)> {
        match (&self.circuit_pack_name, &self.port_name) {
            (Some(cp), Some(port)) if !cp.is_empty() && !port.is_empty() => {
                Some((cp.as_str(), port.as_str()))
            }
            _ => None,
        }
    }
}

/// Name of an interface provisioned on a port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InterfaceRef {
    pub interface_name: String,
}

/// Multiplexed-client tributary restriction (7.1 port capabilities)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MpdrClientRestriction {
    #[serde(default)]
    pub network_ho_odu_trib_port_number: Option<u16>,
    #[serde(default)]
    pub network_ho_odu_opucn_trib_slots: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OtnCapability {
    #[serde(default)]
    pub mpdr_client_restriction: Vec<MpdrClientRestriction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SupportedInterfaceCapability {
    pub if_cap_type: String,
    #[serde(default)]
    pub otn_capability: Option<OtnCapability>,
}

/// 7.1 `port-capabilities` container
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PortCapabilities {
    #[serde(default)]
    pub supported_interface_capability: Vec<SupportedInterfaceCapability>,
}

/// Physical port on a circuit pack
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Port {
    pub port_name: String,
    #[serde(default)]
    pub port_type: Option<String>,
    #[serde(default)]
    pub port_qual: Option<String>,
    #[serde(default)]
    pub port_direction: Option<String>,
    #[serde(default)]
    pub partner_port: Option<PartnerPort>,
    #[serde(default)]
    pub administrative_state: Option<String>,
    #[serde(default)]
    pub operational_state: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceRef>,
    #[serde(default)]
    pub supported_interface_capability: Vec<String>,
    #[serde(default)]
    pub port_capabilities: Option<PortCapabilities>,
}

/// Circuit pack and the ports it owns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CircuitPack {
    pub circuit_pack_name: String,
    #[serde(default)]
    pub circuit_pack_type: Option<String>,
    #[serde(default)]
    pub ports: Vec<Port>,
}

impl CircuitPack {
    pub fn port(&self, port_name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.port_name == port_name)
    }
}

/// Circuit pack membership of a degree or shared-risk-group
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CircuitPackRef {
    #[serde(default)]
    pub index: u32,
    pub circuit_pack_name: String,
}

/// Line-side port of a degree; one entry for a bidirectional TTP, two for a
/// unidirectional pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConnectionPorts {
    #[serde(default)]
    pub index: u32,
    pub circuit_pack_name: String,
    pub port_name: String,
}

/// Inline media-channel capabilities (2.2.1)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct McCapabilities {
    #[serde(default)]
    pub center_freq_granularity: Option<f64>,
    #[serde(default)]
    pub slot_width_granularity: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Degree {
    pub degree_number: u16,
    #[serde(default)]
    pub max_wavelengths: Option<u32>,
    #[serde(default)]
    pub circuit_packs: Vec<CircuitPackRef>,
    #[serde(default)]
    pub connection_ports: Vec<ConnectionPorts>,
    #[serde(default)]
    pub mc_capabilities: Option<McCapabilities>,
    #[serde(default)]
    pub mc_capability_profile_name: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SharedRiskGroup {
    pub srg_number: u16,
    #[serde(default)]
    pub max_add_drop_ports: Option<u32>,
    #[serde(default)]
    pub circuit_packs: Vec<CircuitPackRef>,
    #[serde(default)]
    pub mc_capabilities: Option<McCapabilities>,
    #[serde(default)]
    pub mc_capability_profile_name: Vec<String>,
}

/// Named media-channel capability profile (7.1)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct McCapabilityProfile {
    pub profile_name: String,
    #[serde(default)]
    pub center_freq_granularity: Option<f64>,
    #[serde(default)]
    pub slot_width_granularity: Option<f64>,
    #[serde(default)]
    pub min_slots: Option<u32>,
    #[serde(default)]
    pub max_slots: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConnectionMap {
    pub connection_map_number: u32,
    pub source: PortRef,
    #[serde(default)]
    pub destination: Vec<PortRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct XpdrPort {
    pub index: u32,
    pub circuit_pack_name: String,
    pub port_name: String,
}

/// Explicit line-card grouping (2.2.1 and later)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Xponder {
    pub xpdr_number: u16,
    #[serde(default)]
    pub xpdr_type: Option<String>,
    #[serde(default)]
    pub xpdr_port: Vec<XpdrPort>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawNonBlockingList {
    pub nbl_number: u16,
    #[serde(default)]
    pub interconnect_bandwidth_unit: Option<u64>,
    #[serde(default)]
    pub interconnect_bandwidth: Option<u32>,
    #[serde(default)]
    pub port_list: Vec<PortRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OduSwitchingPool {
    pub switching_pool_number: u16,
    #[serde(default)]
    pub switching_pool_type: Option<String>,
    #[serde(default)]
    pub non_blocking_list: Vec<RawNonBlockingList>,
}

/// Interface provisioned on the device
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Interface {
    pub name: String,
    #[serde(rename = "type")]
    pub interface_type: String,
    #[serde(default)]
    pub supporting_circuit_pack_name: Option<String>,
    #[serde(default)]
    pub supporting_port: Option<String>,
    #[serde(default)]
    pub rate: Option<String>,
}

/// LLDP per-interface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LldpPortConfig {
    pub ifname: String,
    #[serde(default)]
    pub admin_status: Option<String>,
}

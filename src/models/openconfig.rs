use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::mapping::{InterfaceCapability, XpdrType};

/// Canonical OpenConfig component type values (module prefix stripped)
pub mod component_type {
    pub const CHASSIS: &str = "CHASSIS";
    pub const LINECARD: &str = "LINECARD";
    pub const PORT: &str = "PORT";
    pub const TRANSCEIVER: &str = "TRANSCEIVER";
    pub const OPTICAL_CHANNEL: &str = "OPTICAL_CHANNEL";
}

/// Canonical OpenConfig optical-port-type values (module prefix stripped)
pub mod optical_port_type {
    pub const TERMINAL_LINE: &str = "TERMINAL_LINE";
    pub const TERMINAL_CLIENT: &str = "TERMINAL_CLIENT";
}

/// Strip a YANG identity prefix: `openconfig-platform-types:PORT` -> `PORT`
pub fn identity_name(raw: &str) -> &str {
    raw.rsplit(':').next().unwrap_or(raw)
}

/// `system/state` of an OpenConfig terminal device
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OcSystemState {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub software_version: Option<String>,
    #[serde(default)]
    pub mgmt_address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OcPortState {
    #[serde(default)]
    pub optical_port_type: Option<String>,
    #[serde(default)]
    pub admin_state: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OcTransceiverState {
    #[serde(default)]
    pub form_factor: Option<String>,
    #[serde(default)]
    pub ethernet_pmd: Option<String>,
    #[serde(default)]
    pub part_no: Option<String>,
}

/// Entry of the OpenConfig platform `components` list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Component {
    pub name: String,
    #[serde(default, rename = "type")]
    pub component_type: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub mfg_name: Option<String>,
    #[serde(default)]
    pub part_no: Option<String>,
    #[serde(default)]
    pub serial_no: Option<String>,
    #[serde(default)]
    pub oper_status: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub port: Option<OcPortState>,
    #[serde(default)]
    pub transceiver: Option<OcTransceiverState>,
}

impl Component {
    pub fn is_type(&self, wanted: &str) -> bool {
        self.component_type
            .as_deref()
            .map(|t| identity_name(t) == wanted)
            .unwrap_or(false)
    }
}

/// Client-to-line assignment taken from the terminal-device logical channels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LogicalChannelAssignment {
    pub index: u32,
    pub client_port: String,
    pub line_port: String,
}

/// Controller-side description of a line card model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LineCardProfile {
    pub part_no: String,
    #[serde(default)]
    pub xpdr_type: Option<XpdrType>,
    #[serde(default)]
    pub client_ports: Vec<String>,
    #[serde(default)]
    pub line_ports: Vec<String>,
    #[serde(default)]
    pub non_blocking_groups: Vec<NonBlockingGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NonBlockingGroup {
    pub nbl_number: u16,
    #[serde(default)]
    pub interconnect_bandwidth: Option<u32>,
    #[serde(default)]
    pub interconnect_bandwidth_unit: Option<u64>,
    /// Port component names local to the line card
    pub ports: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransceiverProfile {
    /// Ethernet PMD identity or transceiver part number
    pub id: String,
    pub supported_interface_capability: Vec<InterfaceCapability>,
}

/// Metadata catalog consulted to classify OpenConfig ports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MetadataCatalog {
    #[serde(default)]
    pub line_cards: Vec<LineCardProfile>,
    #[serde(default)]
    pub transceivers: Vec<TransceiverProfile>,
}

impl MetadataCatalog {
    pub fn line_card(&self, part_no: &str) -> Option<&LineCardProfile> {
        self.line_cards.iter().find(|lc| lc.part_no == part_no)
    }

    pub fn transceiver(&self, id: &str) -> Option<&TransceiverProfile> {
        let id = identity_name(id);
        self.transceivers.iter().find(|t| identity_name(&t.id) == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_type_ignores_prefix() {
        let c = Component {
            name: "port-1".into(),
            component_type: Some("openconfig-platform-types:PORT".into()),
            ..Default::default()
        };
        assert!(c.is_type(component_type::PORT));
        assert!(!c.is_type(component_type::LINECARD));
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog: MetadataCatalog = serde_json::from_value(serde_json::json!({
            "line-cards": [{"part-no": "LC-400", "xpdr-type": "mpdr", "line-ports": ["L1"]}],
            "transceivers": [{"id": "ETH_100GBASE_LR4", "supported-interface-capability": ["if-100GE"]}]
        }))
        .unwrap();

        assert_eq!(catalog.line_card("LC-400").unwrap().xpdr_type, Some(XpdrType::Mpdr));
        let t = catalog
            .transceiver("openconfig-transport-types:ETH_100GBASE_LR4")
            .unwrap();
        assert_eq!(t.supported_interface_capability, vec![InterfaceCapability::If100GE]);
    }
}

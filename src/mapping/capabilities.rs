use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};

use crate::models::openconfig::identity_name;
use crate::models::{InterfaceCapability, MpdrRestrictions, PortCapabilities};

use super::dispatch::SchemaVersion;

use InterfaceCapability::*;

const COMMON: &[(&str, InterfaceCapability)] = &[
    ("if-1GE", If1GE),
    ("if-1GE-ODU0", If1GEODU0),
    ("if-10GE", If10GE),
    ("if-10GE-ODU2", If10GEODU2),
    ("if-10GE-ODU2e", If10GEODU2e),
    ("if-100GE", If100GE),
    ("if-100GE-ODU4", If100GEODU4),
    ("if-OCH", IfOCH),
    ("if-OCH-OTU4-ODU4", IfOCHOTU4ODU4),
];

static V121_CAPABILITIES: Lazy<HashMap<&'static str, InterfaceCapability>> =
    Lazy::new(|| COMMON.iter().copied().collect());

static V221_CAPABILITIES: Lazy<HashMap<&'static str, InterfaceCapability>> = Lazy::new(|| {
    COMMON
        .iter()
        .copied()
        .chain([("if-n-OTU4-ODU4", IfNOTU4ODU4)])
        .collect()
});

static V710_CAPABILITIES: Lazy<HashMap<&'static str, InterfaceCapability>> = Lazy::new(|| {
    COMMON
        .iter()
        .copied()
        .chain([
            ("if-n-OTU4-ODU4", IfNOTU4ODU4),
            ("if-400GE", If400GE),
            ("if-OTUCn-ODUCn", IfOTUCnODUCn),
            ("if-otsi-otsigroup", IfOtsiOtsigroup),
        ])
        .collect()
});

/// Capability identities a schema version knows about
pub fn table(version: SchemaVersion) -> &'static HashMap<&'static str, InterfaceCapability> {
    match version {
        SchemaVersion::V121 => &V121_CAPABILITIES,
        SchemaVersion::V221 => &V221_CAPABILITIES,
        SchemaVersion::V710 | SchemaVersion::Oc190 => &V710_CAPABILITIES,
    }
}

/// Convert raw capability identities, with or without module prefix.
/// Unknown names are logged and dropped.
pub fn convert<S: AsRef<str>>(
    node_id: &str,
    version: SchemaVersion,
    lcp: &str,
    raw: &[S],
) -> BTreeSet<InterfaceCapability> {
    let known = table(version);
    raw.iter()
        .filter_map(|name| {
            let name = identity_name(name.as_ref());
            let found = known.get(name).copied();
            if found.is_none() {
                tracing::warn!(
                    "{} : {} unknown supported-interface-capability {} for schema {}",
                    node_id,
                    lcp,
                    name,
                    version.label()
                );
            }
            found
        })
        .collect()
}

/// Capabilities and muxponder tributary window from a 7.1 `port-capabilities`
/// container
pub fn from_port_capabilities(
    node_id: &str,
    lcp: &str,
    caps: &PortCapabilities,
) -> (BTreeSet<InterfaceCapability>, Option<MpdrRestrictions>) {
    let names: Vec<&str> = caps
        .supported_interface_capability
        .iter()
        .map(|c| c.if_cap_type.as_str())
        .collect();
    let set = convert(node_id, SchemaVersion::V710, lcp, &names);

    let restrictions = caps
        .supported_interface_capability
        .iter()
        .filter_map(|c| c.otn_capability.as_ref())
        .flat_map(|otn| otn.mpdr_client_restriction.iter())
        .find_map(|r| {
            let first = r.network_ho_odu_opucn_trib_slots.first()?;
            let last = r.network_ho_odu_opucn_trib_slots.last()?;
            Some(MpdrRestrictions {
                min_trib_slot: first.clone(),
                max_trib_slot: last.clone(),
            })
        });

    (set, restrictions)
}

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{MappingError, Result};
use crate::inventory::{DeviceReader, SubtreePath};
use crate::models::openconfig::{component_type, identity_name, optical_port_type};
use crate::models::*;

use super::classify::Classified;
use super::context::{Pass, XponderCounters};
use super::dispatch::SchemaVersion;
use super::naming;
use super::xponder::apply_connection_maps;

const DEFAULT_POOL_TYPE: &str = "non-blocking";

/// OpenConfig terminal-device walk. Line cards become xponders 1..N in
/// numeric-aware name order; the metadata catalog decides port roles,
/// capabilities and non-blocking groups.
pub(crate) async fn build(pass: &mut Pass<'_>, catalog: &MetadataCatalog) -> Result<()> {
    let node_id = pass.node_id().to_string();
    let state: OcSystemState = pass.reader.require(&SubtreePath::OcSystemState).await?;
    let components: Vec<Component> = pass.reader.require(&SubtreePath::OcComponents).await?;

    let chassis = components.iter().find(|c| c.is_type(component_type::CHASSIS));
    let node_info = NodeInfo {
        node_type: NodeType::Xpdr,
        openroadm_version: SchemaVersion::Oc190.label().to_string(),
        node_clli: state
            .hostname
            .clone()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| node_defaults::CLLI.to_string()),
        node_vendor: chassis.and_then(|c| c.mfg_name.clone()),
        node_model: chassis.and_then(|c| c.part_no.clone()),
        node_ip_address: state.mgmt_address.clone(),
    };
    pass.persist(NodeDocument::with_node_info(&node_id, node_info)).await?;

    let mut line_cards: Vec<&Component> = components
        .iter()
        .filter(|c| c.is_type(component_type::LINECARD))
        .collect();
    line_cards.sort_by(|a, b| naming::numeric_aware_cmp(&a.name, &b.name));
    tracing::info!("{} : {} line cards found", node_id, line_cards.len());

    // Port component name -> owning line card
    let mut port_owner: HashMap<&str, &str> = HashMap::new();
    let mut pools = BTreeMap::new();

    for (position, line_card) in line_cards.iter().enumerate() {
        let xpdr_number = (position + 1) as u16;
        let profile = line_card
            .part_no
            .as_deref()
            .and_then(|part_no| catalog.line_card(part_no));
        if profile.is_none() {
            tracing::debug!(
                "{} : line card {} ({}) not in the metadata catalog",
                node_id,
                line_card.name,
                line_card.part_no.as_deref().unwrap_or("no part-no")
            );
        }

        let mut ports: Vec<&Component> = components
            .iter()
            .filter(|c| {
                c.is_type(component_type::PORT)
                    && c.parent.as_deref() == Some(line_card.name.as_str())
            })
            .collect();
        ports.sort_by(|a, b| naming::numeric_aware_cmp(&a.name, &b.name));

        let mut counters = XponderCounters::default();
        for port in ports {
            port_owner.insert(port.name.as_str(), line_card.name.as_str());
            let qual = match port_role(&node_id, line_card, port, profile) {
                Ok(qual) => qual,
                Err(e) => {
                    tracing::warn!("{}", e);
                    continue;
                }
            };
            let lcp = if qual.is_network() {
                naming::network(xpdr_number, counters.next_network())
            } else {
                naming::client(xpdr_number, counters.next_client())
            };

            let class = Classified {
                qual,
                direction: Direction::Bidirectional,
            };
            let mut record = pass.ctx.new_record(&lcp, &line_card.name, &as_port(port), class);
            record.xpdr_type = profile.and_then(|p| p.xpdr_type);
            record.supported_interface_capability =
                port_capabilities(&node_id, &components, port, qual, catalog);
            pass.ctx.insert(record);
        }

        if let Some(profile) = profile.filter(|p| !p.non_blocking_groups.is_empty()) {
            pools.insert(
                xpdr_number,
                group_pool(pass, xpdr_number, &line_card.name, profile),
            );
        }
    }

    let assignments: Vec<LogicalChannelAssignment> =
        pass.reader.list(&SubtreePath::OcLogicalChannels).await;
    let maps: Vec<ConnectionMap> = assignments
        .iter()
        .map(|a| ConnectionMap {
            connection_map_number: a.index,
            source: component_ref(&port_owner, &a.client_port),
            destination: vec![component_ref(&port_owner, &a.line_port)],
        })
        .collect();
    apply_connection_maps(&mut pass.ctx, &maps);

    if pass.ctx.is_empty() {
        tracing::warn!("{} : no logical connection point found on this terminal device", node_id);
    }
    pass.persist_mapping().await?;

    if !pools.is_empty() {
        let mut partial = NodeDocument::new(&node_id);
        partial.switching_pool_lcp = pools;
        pass.persist(partial).await?;
    }
    Ok(())
}

/// OpenConfig ports carry no transport interfaces here; only the states move
pub(crate) fn update(record: &LcpRecord, port: &Port) -> LcpRecord {
    let mut updated = record.clone();
    updated.port_admin_state = port.administrative_state.clone();
    updated.port_oper_state = port.operational_state.clone();
    updated
}

/// Read the port component behind `record` as a fresh port
pub(crate) async fn fresh_port(reader: &DeviceReader<'_>, record: &LcpRecord) -> Option<Port> {
    reader
        .optional::<Component>(&SubtreePath::OcComponent(record.supporting_port.clone()))
        .await
        .map(|c| as_port(&c))
}

fn as_port(component: &Component) -> Port {
    Port {
        port_name: component.name.clone(),
        port_type: component.component_type.as_deref().map(|t| identity_name(t).to_string()),
        administrative_state: component.port.as_ref().and_then(|p| p.admin_state.clone()),
        operational_state: component.oper_status.as_deref().map(|s| identity_name(s).to_string()),
        ..Default::default()
    }
}

fn port_role(
    node_id: &str,
    line_card: &Component,
    port: &Component,
    profile: Option<&LineCardProfile>,
) -> Result<PortQual> {
    if let Some(profile) = profile {
        if profile.line_ports.iter().any(|p| p == &port.name) {
            return Ok(PortQual::XpdrNetwork);
        }
        if profile.client_ports.iter().any(|p| p == &port.name) {
            return Ok(PortQual::XpdrClient);
        }
    }

    let declared = port
        .port
        .as_ref()
        .and_then(|p| p.optical_port_type.as_deref())
        .map(identity_name);
    match declared {
        Some(optical_port_type::TERMINAL_LINE) => Ok(PortQual::XpdrNetwork),
        Some(optical_port_type::TERMINAL_CLIENT) => Ok(PortQual::XpdrClient),
        other => Err(MappingError::PortQualUnresolved {
            node_id: node_id.to_string(),
            circuit_pack: line_card.name.clone(),
            port: port.name.clone(),
            detail: match other {
                Some(t) => format!("optical-port-type {} and no catalog role", t),
                None => "no catalog role and no optical-port-type".to_string(),
            },
        }),
    }
}

fn port_capabilities(
    node_id: &str,
    components: &[Component],
    port: &Component,
    qual: PortQual,
    catalog: &MetadataCatalog,
) -> BTreeSet<InterfaceCapability> {
    let transceiver = components
        .iter()
        .find(|c| {
            c.is_type(component_type::TRANSCEIVER)
                && c.parent.as_deref() == Some(port.name.as_str())
        });

    let profile = transceiver.and_then(|t| {
        let state = t.transceiver.as_ref();
        state
            .and_then(|s| s.ethernet_pmd.as_deref())
            .and_then(|pmd| catalog.transceiver(pmd))
            .or_else(|| {
                state
                    .and_then(|s| s.part_no.as_deref())
                    .or(t.part_no.as_deref())
                    .and_then(|part_no| catalog.transceiver(part_no))
            })
    });

    match profile {
        Some(profile) => profile.supported_interface_capability.iter().copied().collect(),
        None if qual.is_network() => BTreeSet::from([InterfaceCapability::IfOtsiOtsigroup]),
        None => {
            tracing::debug!(
                "{} : no transceiver profile for client port {}",
                node_id,
                port.name
            );
            BTreeSet::new()
        }
    }
}

/// One switching pool per line card, numbered after its xponder
fn group_pool(
    pass: &Pass<'_>,
    xpdr_number: u16,
    line_card: &str,
    profile: &LineCardProfile,
) -> SwitchingPoolLcp {
    let non_blocking_list = profile
        .non_blocking_groups
        .iter()
        .map(|group| {
            let lcp_list = group
                .ports
                .iter()
                .filter_map(|port| {
                    let lcp = pass.ctx.lcp_for(line_card, port);
                    if lcp.is_none() {
                        tracing::warn!(
                            "{} : line card {} nbl {}: no logical connection point for port {}",
                            pass.node_id(),
                            line_card,
                            group.nbl_number,
                            port
                        );
                    }
                    lcp.map(str::to_string)
                })
                .collect();
            (
                group.nbl_number,
                NonBlockingList {
                    nbl_number: group.nbl_number,
                    interconnect_bandwidth: group.interconnect_bandwidth,
                    interconnect_bandwidth_unit: group.interconnect_bandwidth_unit,
                    lcp_list,
                },
            )
        })
        .collect();

    SwitchingPoolLcp {
        switching_pool_number: xpdr_number,
        switching_pool_type: Some(DEFAULT_POOL_TYPE.to_string()),
        non_blocking_list,
    }
}

fn component_ref(port_owner: &HashMap<&str, &str>, port: &str) -> PortRef {
    PortRef {
        circuit_pack_name: port_owner.get(port).map(|lc| lc.to_string()).unwrap_or_default(),
        port_name: port.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::MemoryInventory;
    use crate::testing::engine;
    use serde_json::{json, Value};

    const OC: &str = "OC-XPDR-1";

    fn component(name: &str, kind: &str, parent: Option<&str>) -> Value {
        json!({
            "name": name,
            "type": format!("openconfig-platform-types:{}", kind),
            "parent": parent,
            "oper-status": "openconfig-platform-types:ACTIVE"
        })
    }

    fn catalog() -> MetadataCatalog {
        serde_json::from_value(json!({
            "line-cards": [{
                "part-no": "LC-A",
                "xpdr-type": "mpdr",
                "line-ports": ["port-2-1"],
                "client-ports": ["port-2-2", "port-2-3"],
                "non-blocking-groups": [{
                    "nbl-number": 1,
                    "interconnect-bandwidth": 100,
                    "ports": ["port-2-1", "port-2-2", "port-2-9"]
                }]
            }],
            "transceivers": [{"id": "ETH_100GBASE_LR4", "supported-interface-capability": ["if-100GE"]}]
        }))
        .unwrap()
    }

    fn terminal_device() -> MemoryInventory {
        let mut chassis = component("chassis", "CHASSIS", None);
        chassis["mfg-name"] = json!("vendorOC");
        chassis["part-no"] = json!("OC-CHASSIS-1");
        let mut lc2 = component("linecard-2", "LINECARD", Some("chassis"));
        lc2["part-no"] = json!("LC-A");
        let mut lc10 = component("linecard-10", "LINECARD", Some("chassis"));
        lc10["part-no"] = json!("LC-UNKNOWN");
        let mut xcvr = component("xcvr-2-2", "TRANSCEIVER", Some("port-2-2"));
        xcvr["transceiver"] = json!({"ethernet-pmd": "openconfig-transport-types:ETH_100GBASE_LR4"});
        let mut line10 = component("port-10-1", "PORT", Some("linecard-10"));
        line10["port"] = json!({"optical-port-type": "openconfig-transport-types:TERMINAL_LINE"});

        MemoryInventory::new()
            .with(
                OC,
                SubtreePath::OcSystemState,
                json!({"hostname": "oc-node-a", "mgmt-address": "10.0.0.5"}),
            )
            .with(
                OC,
                SubtreePath::OcComponents,
                json!([
                    chassis,
                    lc10,
                    lc2,
                    component("port-2-3", "PORT", Some("linecard-2")),
                    component("port-2-1", "PORT", Some("linecard-2")),
                    component("port-2-2", "PORT", Some("linecard-2")),
                    xcvr,
                    line10,
                    component("port-10-2", "PORT", Some("linecard-10"))
                ]),
            )
            .with(
                OC,
                SubtreePath::OcLogicalChannels,
                json!([{"index": 1, "client-port": "port-2-2", "line-port": "port-2-1"}]),
            )
    }

    #[tokio::test]
    async fn test_line_cards_become_xponders() {
        let (engine, _) = engine(terminal_device());
        let engine = engine.with_catalog(catalog());
        let doc = engine
            .create_mapping_data(OC, SchemaVersion::Oc190.revision())
            .await
            .unwrap();

        let info = doc.node_info.as_ref().unwrap();
        assert_eq!(info.node_type, NodeType::Xpdr);
        assert_eq!(info.openroadm_version, "oc-1.9.0");
        assert_eq!(info.node_clli, "oc-node-a");
        assert_eq!(info.node_vendor.as_deref(), Some("vendorOC"));
        assert_eq!(info.node_ip_address.as_deref(), Some("10.0.0.5"));

        let names: Vec<&str> = doc.mapping.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["XPDR1-CLIENT1", "XPDR1-CLIENT2", "XPDR1-NETWORK1", "XPDR2-NETWORK1"]
        );

        let net = &doc.mapping["XPDR1-NETWORK1"];
        assert_eq!(net.supporting_circuit_pack_name, "linecard-2");
        assert_eq!(net.supporting_port, "port-2-1");
        assert_eq!(net.xpdr_type, Some(XpdrType::Mpdr));
        assert_eq!(
            net.supported_interface_capability,
            BTreeSet::from([InterfaceCapability::IfOtsiOtsigroup])
        );
        assert_eq!(net.port_oper_state.as_deref(), Some("ACTIVE"));

        let client = &doc.mapping["XPDR1-CLIENT1"];
        assert_eq!(client.supporting_port, "port-2-2");
        assert_eq!(
            client.supported_interface_capability,
            BTreeSet::from([InterfaceCapability::If100GE])
        );
        assert_eq!(client.connection_map_lcp.as_deref(), Some("XPDR1-NETWORK1"));
        assert!(doc.mapping["XPDR1-CLIENT2"].supported_interface_capability.is_empty());

        let other = &doc.mapping["XPDR2-NETWORK1"];
        assert_eq!(other.supporting_port, "port-10-1");
        assert!(other.xpdr_type.is_none());

        let pool = &doc.switching_pool_lcp[&1];
        assert_eq!(pool.switching_pool_type.as_deref(), Some("non-blocking"));
        assert_eq!(
            pool.non_blocking_list[&1].lcp_list,
            vec!["XPDR1-NETWORK1", "XPDR1-CLIENT1"]
        );
        assert!(!doc.switching_pool_lcp.contains_key(&2));
    }

    #[tokio::test]
    async fn test_without_catalog_only_typed_ports_are_mapped() {
        let (engine, _) = engine(terminal_device());
        let doc = engine.create_mapping_data(OC, "oc-1.9.0").await.unwrap();

        let names: Vec<&str> = doc.mapping.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["XPDR2-NETWORK1"]);
        assert!(doc.switching_pool_lcp.is_empty());
    }

    #[tokio::test]
    async fn test_missing_components_is_fatal() {
        let inventory = MemoryInventory::new().with(OC, SubtreePath::OcSystemState, json!({}));
        let (engine, _) = engine(inventory);
        let err = engine.create_mapping_data(OC, "oc-1.9.0").await.unwrap_err();
        assert!(matches!(err, MappingError::SubtreeAbsent { .. }));
    }

    #[test]
    fn test_update_moves_states_only() {
        let record = crate::testing::sample_record("XPDR1-NETWORK1", "linecard-2", "port-2-1");
        let fresh = Port {
            port_name: "port-2-1".into(),
            administrative_state: Some("DISABLED".into()),
            operational_state: Some("INACTIVE".into()),
            ..Default::default()
        };
        let updated = update(&record, &fresh);
        assert_eq!(updated.port_admin_state.as_deref(), Some("DISABLED"));
        assert_eq!(updated.port_oper_state.as_deref(), Some("INACTIVE"));
        assert_eq!(updated.supported_interface_capability, record.supported_interface_capability);
        assert_eq!(updated.lcp_hash_val, record.lcp_hash_val);
    }
}

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::Result;
use crate::inventory::{Datastore, DeviceReader, SubtreePath};
use crate::models::*;

use super::classify::{classify, Classified};
use super::context::Pass;
use super::interfaces::resolve_supporting_interfaces;
use super::naming;
use super::partner::{resolve_partner, validate_partner};
use super::strategy::OpenRoadmRules;

/// Granularity used when a degree or SRG declares no media-channel profile
pub(crate) const DEFAULT_GRANULARITY_GHZ: f64 = 50.0;

/// Default media-channel capabilities, with a warning
pub(crate) fn default_mc(node_id: &str, mc_node: &str) -> McCapabilityEntry {
    tracing::warn!(
        "{} : no media-channel capabilities declared for {}, using {} GHz granularity",
        node_id,
        mc_node,
        DEFAULT_GRANULARITY_GHZ
    );
    McCapabilityEntry {
        mc_node_name: mc_node.to_string(),
        center_freq_granularity: DEFAULT_GRANULARITY_GHZ,
        slot_width_granularity: DEFAULT_GRANULARITY_GHZ,
        min_slots: None,
        max_slots: None,
    }
}

/// Media-channel capabilities declared inline on a degree or SRG
pub(crate) fn inline_mc(node_id: &str, mc_node: &str, caps: Option<&McCapabilities>) -> McCapabilityEntry {
    match caps {
        Some(McCapabilities {
            center_freq_granularity: Some(center),
            slot_width_granularity: Some(slot),
        }) => McCapabilityEntry {
            mc_node_name: mc_node.to_string(),
            center_freq_granularity: *center,
            slot_width_granularity: *slot,
            min_slots: None,
            max_slots: None,
        },
        _ => default_mc(node_id, mc_node),
    }
}

/// ROADM walk: degree associations, TTPs, PPs, then media-channel
/// capabilities, each persisted in that order.
pub(crate) async fn build<R: OpenRoadmRules>(pass: &mut Pass<'_>, rules: &R, info: &Info) -> Result<()> {
    let node_id = pass.node_id().to_string();
    let max_degrees = info.max_degrees.unwrap_or(node_defaults::MAX_DEGREES);
    let max_srgs = info.max_srgs.unwrap_or(node_defaults::MAX_SRGS);

    let degrees = read_degrees(&pass.reader, max_degrees).await;
    let srgs = read_srgs(&pass.reader, max_srgs).await;
    tracing::info!(
        "{} : {} degrees and {} shared-risk-groups found",
        node_id,
        degrees.len(),
        srgs.len()
    );

    let lldp = lldp_interfaces(&pass.reader).await;
    let mut associations = NodeDocument::new(&node_id);
    for degree in &degrees {
        for cp in &degree.circuit_packs {
            associations.cp_to_degree.insert(
                cp.circuit_pack_name.clone(),
                CpToDegree {
                    circuit_pack_name: cp.circuit_pack_name.clone(),
                    degree_number: degree.degree_number,
                    interface_name: lldp.get(&cp.circuit_pack_name).cloned(),
                },
            );
        }
    }
    pass.persist(associations).await?;

    let mut mc_capabilities = BTreeMap::new();
    for degree in &degrees {
        let outcome = rules.degree_mc(&pass.reader, degree).await;
        map_degree(pass, rules, degree, &outcome.profile_names).await;
        for entry in outcome.entries {
            mc_capabilities.insert(entry.mc_node_name.clone(), entry);
        }
    }
    for srg in &srgs {
        let outcome = rules.srg_mc(&pass.reader, srg).await;
        map_srg(pass, rules, srg, &outcome.profile_names).await;
        for entry in outcome.entries {
            mc_capabilities.insert(entry.mc_node_name.clone(), entry);
        }
    }

    if pass.ctx.is_empty() {
        tracing::warn!("{} : no logical connection point found on this ROADM", node_id);
    }
    pass.persist_mapping().await?;

    let mut caps = NodeDocument::new(&node_id);
    caps.mc_capabilities = mc_capabilities;
    pass.persist(caps).await
}

async fn read_degrees(reader: &DeviceReader<'_>, max_degrees: u16) -> Vec<Degree> {
    let mut degrees = Vec::new();
    for number in 1..=max_degrees {
        match reader.optional::<Degree>(&SubtreePath::Degree(number)).await {
            Some(degree) => degrees.push(degree),
            None => tracing::debug!("{} : no degree {}", reader.node_id(), number),
        }
    }
    degrees
}

async fn read_srgs(reader: &DeviceReader<'_>, max_srgs: u16) -> Vec<SharedRiskGroup> {
    let mut srgs = Vec::new();
    for number in 1..=max_srgs {
        match reader.optional::<SharedRiskGroup>(&SubtreePath::SharedRiskGroup(number)).await {
            Some(srg) => srgs.push(srg),
            None => tracing::debug!("{} : no shared-risk-group {}", reader.node_id(), number),
        }
    }
    srgs
}

/// Circuit pack -> LLDP-enabled ethernet interface
async fn lldp_interfaces(reader: &DeviceReader<'_>) -> HashMap<String, String> {
    let configs: Vec<LldpPortConfig> = reader
        .list_from(Datastore::Configuration, &SubtreePath::LldpPortConfigs)
        .await;

    let mut by_pack = HashMap::new();
    for config in configs {
        let enabled = config
            .admin_status
            .as_deref()
            .map(|s| s.eq_ignore_ascii_case(lldp_admin_status::TX_AND_RX))
            .unwrap_or(false);
        if !enabled {
            continue;
        }
        match reader.interface(&config.ifname).await {
            Some(Interface {
                supporting_circuit_pack_name: Some(cp),
                ..
            }) => {
                by_pack.entry(cp).or_insert(config.ifname);
            }
            _ => tracing::debug!(
                "{} : lldp interface {} has no supporting circuit pack",
                reader.node_id(),
                config.ifname
            ),
        }
    }
    by_pack
}

async fn add_record<R: OpenRoadmRules>(
    pass: &mut Pass<'_>,
    rules: &R,
    lcp: &str,
    circuit_pack: &str,
    port: &Port,
    class: Classified,
    profiles: &[String],
) -> bool {
    let mut record = pass.ctx.new_record(lcp, circuit_pack, port, class);
    record.mc_capability_profile_name = profiles.to_vec();
    resolve_supporting_interfaces(&pass.reader, &mut record, port, |iface| {
        rules.supporting_layer(iface)
    })
    .await;
    pass.ctx.insert(record)
}

/// TTPs of one degree: one bidirectional connection port, or a validated
/// Tx/Rx pair
async fn map_degree<R: OpenRoadmRules>(
    pass: &mut Pass<'_>,
    rules: &R,
    degree: &Degree,
    profiles: &[String],
) {
    let node_id = pass.node_id().to_string();
    let number = degree.degree_number;

    match degree.connection_ports.as_slice() {
        [] => tracing::warn!("{} : degree {} has no connection ports", node_id, number),
        [single] => {
            let Some(port) = read_connection_port(&pass.reader, number, single).await else {
                return;
            };
            let class = match classify(&node_id, &single.circuit_pack_name, &port, false) {
                Ok(class) => class,
                Err(e) => {
                    tracing::warn!("{}", e);
                    return;
                }
            };
            if class.qual != PortQual::RoadmExternal || class.direction != Direction::Bidirectional {
                tracing::warn!(
                    "{} : degree {} port {}/{} is {} {}, expected a bidirectional roadm-external port",
                    node_id,
                    number,
                    single.circuit_pack_name,
                    single.port_name,
                    class.direction,
                    class.qual
                );
                return;
            }
            let lcp = naming::ttp(number, Direction::Bidirectional);
            add_record(pass, rules, &lcp, &single.circuit_pack_name, &port, class, profiles).await;
        }
        [first, second] => {
            let Some(p1) = read_connection_port(&pass.reader, number, first).await else {
                return;
            };
            let Some(p2) = read_connection_port(&pass.reader, number, second).await else {
                return;
            };
            let class = match classify(&node_id, &first.circuit_pack_name, &p1, false) {
                Ok(class) if class.qual == PortQual::RoadmExternal => class,
                Ok(class) => {
                    tracing::warn!(
                        "{} : degree {} port {}/{} is {}, expected roadm-external",
                        node_id,
                        number,
                        first.circuit_pack_name,
                        first.port_name,
                        class.qual
                    );
                    return;
                }
                Err(e) => {
                    tracing::warn!("{}", e);
                    return;
                }
            };
            let partner = match validate_partner(
                &node_id,
                &first.circuit_pack_name,
                &p1,
                class,
                &second.circuit_pack_name,
                Some(&p2),
                false,
            ) {
                Ok(partner) => partner,
                Err(e) => {
                    tracing::warn!("{}", e);
                    return;
                }
            };

            let lcp1 = naming::ttp(number, class.direction);
            let lcp2 = naming::ttp(number, partner.class.direction);
            let added1 = add_record(pass, rules, &lcp1, &first.circuit_pack_name, &p1, class, profiles).await;
            let added2 = add_record(
                pass,
                rules,
                &lcp2,
                &partner.circuit_pack,
                &partner.port,
                partner.class,
                profiles,
            )
            .await;
            if added1 && added2 {
                pass.ctx.link_partners(&lcp1, &lcp2);
            }
        }
        more => tracing::warn!(
            "{} : degree {} declares {} connection ports, expected 1 or 2",
            node_id,
            number,
            more.len()
        ),
    }
}

async fn read_connection_port(
    reader: &DeviceReader<'_>,
    degree_number: u16,
    cp: &ConnectionPorts,
) -> Option<Port> {
    let port = reader.port(&cp.circuit_pack_name, &cp.port_name).await;
    if port.is_none() {
        tracing::warn!(
            "{} : degree {} connection port {}/{} could not be read",
            reader.node_id(),
            degree_number,
            cp.circuit_pack_name,
            cp.port_name
        );
    }
    port
}

/// PPs of one shared-risk-group. Ports are walked in numeric-aware order;
/// a Tx/Rx pair shares one PP index.
async fn map_srg<R: OpenRoadmRules>(
    pass: &mut Pass<'_>,
    rules: &R,
    srg: &SharedRiskGroup,
    profiles: &[String],
) {
    let node_id = pass.node_id().to_string();
    let number = srg.srg_number;

    let mut refs: Vec<&CircuitPackRef> = srg.circuit_packs.iter().collect();
    refs.sort_by_key(|r| r.index);
    let mut packs = Vec::with_capacity(refs.len());
    for cp_ref in refs {
        match pass
            .reader
            .optional::<CircuitPack>(&SubtreePath::CircuitPack(cp_ref.circuit_pack_name.clone()))
            .await
        {
            Some(cp) => packs.push(cp),
            None => tracing::warn!(
                "{} : srg {} circuit pack {} could not be read",
                node_id,
                number,
                cp_ref.circuit_pack_name
            ),
        }
    }

    let mut index = 0u32;
    let mut handled: HashSet<String> = HashSet::new();
    for cp in &packs {
        let mut ports: Vec<&Port> = cp.ports.iter().collect();
        ports.sort_by(|a, b| naming::numeric_aware_cmp(&a.port_name, &b.port_name));

        for port in ports {
            let cp_name = cp.circuit_pack_name.as_str();
            let key = port_key(cp_name, &port.port_name);
            if handled.contains(&key) || pass.ctx.is_mapped(cp_name, &port.port_name) {
                continue;
            }
            let class = match classify(&node_id, cp_name, port, false) {
                Ok(class) => class,
                Err(e) => {
                    tracing::warn!("{}", e);
                    continue;
                }
            };
            if class.qual != PortQual::RoadmExternal {
                tracing::debug!(
                    "{} : srg {} skipping {} port {}/{}",
                    node_id,
                    number,
                    class.qual,
                    cp_name,
                    port.port_name
                );
                continue;
            }

            if !class.direction.is_unidirectional() {
                index += 1;
                let lcp = naming::pp(number, index, Direction::Bidirectional);
                add_record(pass, rules, &lcp, cp_name, port, class, profiles).await;
                handled.insert(key);
                continue;
            }

            let partner = match resolve_partner(&pass.reader, &packs, cp_name, port, class, false).await {
                Ok(partner) => partner,
                Err(e) => {
                    tracing::warn!("{}", e);
                    continue;
                }
            };
            let partner_key = port_key(&partner.circuit_pack, &partner.port.port_name);
            if handled.contains(&partner_key)
                || pass.ctx.is_mapped(&partner.circuit_pack, &partner.port.port_name)
            {
                tracing::warn!(
                    "{} : srg {} partner {}/{} of {}/{} is already mapped",
                    node_id,
                    number,
                    partner.circuit_pack,
                    partner.port.port_name,
                    cp_name,
                    port.port_name
                );
                continue;
            }

            index += 1;
            let lcp1 = naming::pp(number, index, class.direction);
            let lcp2 = naming::pp(number, index, partner.class.direction);
            let added1 = add_record(pass, rules, &lcp1, cp_name, port, class, profiles).await;
            let added2 = add_record(
                pass,
                rules,
                &lcp2,
                &partner.circuit_pack,
                &partner.port,
                partner.class,
                profiles,
            )
            .await;
            if added1 && added2 {
                pass.ctx.link_partners(&lcp1, &lcp2);
            }
            handled.insert(key);
            handled.insert(partner_key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MappingStore;
    use crate::error::MappingError;
    use crate::inventory::MemoryInventory;
    use crate::mapping::dispatch::SchemaVersion;
    use crate::testing::*;
    use serde_json::json;

    fn roadm_221() -> MemoryInventory {
        let inventory = MemoryInventory::new()
            .with(ROADM, SubtreePath::Info, info("rdm", 2, 2))
            .with(
                ROADM,
                SubtreePath::Degree(1),
                json!({
                    "degree-number": 1,
                    "circuit-packs": [{"index": 1, "circuit-pack-name": "1/0"}],
                    "connection-ports": [
                        {"index": 1, "circuit-pack-name": "1/0", "port-name": "L1"},
                        {"index": 2, "circuit-pack-name": "1/0", "port-name": "L2"}
                    ],
                    "mc-capabilities": {
                        "center-freq-granularity": 6.25,
                        "slot-width-granularity": 12.5
                    }
                }),
            )
            .with(
                ROADM,
                SubtreePath::SharedRiskGroup(1),
                json!({
                    "srg-number": 1,
                    "circuit-packs": [{"index": 1, "circuit-pack-name": "3/0"}]
                }),
            )
            .with(
                ROADM,
                SubtreePath::CircuitPack("3/0".into()),
                circuit_pack(
                    "3/0",
                    vec![
                        port("C10", "roadm-external", "bidirectional"),
                        uni_port("C4", "roadm-external", "rx", "3/0", "C3"),
                        port("C2", "roadm-internal", "bidirectional"),
                        uni_port("C3", "roadm-external", "tx", "3/0", "C4"),
                        port("C1", "roadm-external", "bidirectional"),
                    ],
                ),
            )
            .with_in(
                ROADM,
                Datastore::Configuration,
                SubtreePath::LldpPortConfigs,
                json!([
                    {"ifname": "1GE-interface-1", "admin-status": "txandrx"},
                    {"ifname": "1GE-interface-2", "admin-status": "disable"}
                ]),
            )
            .with(
                ROADM,
                SubtreePath::Interface("1GE-interface-1".into()),
                json!({
                    "name": "1GE-interface-1",
                    "type": "iana-if-type:ethernetCsmacd",
                    "supporting-circuit-pack-name": "1/0",
                    "supporting-port": "ETH1"
                }),
            )
            .with(
                ROADM,
                SubtreePath::Interface("OTS-DEG1-TTP-TX".into()),
                json!({"name": "OTS-DEG1-TTP-TX", "type": "org-openroadm-interfaces:opticalTransport"}),
            );

        let mut l1 = uni_port("L1", "roadm-external", "tx", "1/0", "L2");
        l1["interfaces"] = json!([{"interface-name": "OTS-DEG1-TTP-TX"}]);
        let inventory = with_port(inventory, ROADM, "1/0", l1);
        with_port(inventory, ROADM, "1/0", uni_port("L2", "roadm-external", "rx", "1/0", "L1"))
    }

    #[tokio::test]
    async fn test_unidirectional_degree_and_srg() {
        let (engine, store) = engine(roadm_221());
        let doc = engine
            .create_mapping_data(ROADM, SchemaVersion::V221.revision())
            .await
            .unwrap();

        let names: Vec<&str> = doc.mapping.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec![
                "DEG1-TTP-RX",
                "DEG1-TTP-TX",
                "SRG1-PP1-TXRX",
                "SRG1-PP2-RX",
                "SRG1-PP2-TX",
                "SRG1-PP3-TXRX"
            ]
        );

        let tx = &doc.mapping["DEG1-TTP-TX"];
        let rx = &doc.mapping["DEG1-TTP-RX"];
        assert_eq!((tx.supporting_circuit_pack_name.as_str(), tx.supporting_port.as_str()), ("1/0", "L1"));
        assert_eq!(rx.supporting_port, "L2");
        assert_eq!(tx.partner_lcp.as_deref(), Some("DEG1-TTP-RX"));
        assert_eq!(rx.partner_lcp.as_deref(), Some("DEG1-TTP-TX"));
        assert_eq!(tx.supporting_ots.as_deref(), Some("OTS-DEG1-TTP-TX"));

        assert_eq!(doc.mapping["SRG1-PP1-TXRX"].supporting_port, "C1");
        assert_eq!(doc.mapping["SRG1-PP2-TX"].supporting_port, "C3");
        assert_eq!(doc.mapping["SRG1-PP2-RX"].partner_lcp.as_deref(), Some("SRG1-PP2-TX"));
        assert_eq!(doc.mapping["SRG1-PP3-TXRX"].supporting_port, "C10");

        let cp = &doc.cp_to_degree["1/0"];
        assert_eq!(cp.degree_number, 1);
        assert_eq!(cp.interface_name.as_deref(), Some("1GE-interface-1"));

        assert_eq!(doc.mc_capabilities["DEG1-TTP"].center_freq_granularity, 6.25);
        assert_eq!(doc.mc_capabilities["SRG1-PP"].slot_width_granularity, DEFAULT_GRANULARITY_GHZ);

        let info = doc.node_info.as_ref().unwrap();
        assert_eq!(info.node_type, NodeType::Rdm);
        assert_eq!(info.openroadm_version, "2.2.1");
        assert_eq!(info.node_clli, "NodeA");

        // node info, degree associations, LCP table, capabilities
        let log = store.merge_log().await;
        assert_eq!(log.len(), 4);
        assert!(log[0].node_info.is_some() && log[0].mapping.is_empty());
        assert!(!log[1].cp_to_degree.is_empty() && log[1].mapping.is_empty());
        assert_eq!(log[2].mapping.len(), 6);
        assert!(!log[3].mc_capabilities.is_empty());
    }

    #[tokio::test]
    async fn test_bidirectional_ttp_and_single_pp() {
        let inventory = MemoryInventory::new()
            .with(ROADM, SubtreePath::Info, info("rdm", 3, 3))
            .with(
                ROADM,
                SubtreePath::Degree(2),
                json!({
                    "degree-number": 2,
                    "connection-ports": [{"index": 1, "circuit-pack-name": "2/0", "port-name": "L1"}]
                }),
            )
            .with(
                ROADM,
                SubtreePath::SharedRiskGroup(3),
                json!({"srg-number": 3, "circuit-packs": [{"index": 1, "circuit-pack-name": "4/0"}]}),
            )
            .with(
                ROADM,
                SubtreePath::CircuitPack("4/0".into()),
                circuit_pack("4/0", vec![port("AD1", "roadm-external", "bidirectional")]),
            )
            .with_failure(ROADM, SubtreePath::SharedRiskGroup(1));
        let inventory = with_port(inventory, ROADM, "2/0", port("L1", "roadm-external", "bidirectional"));

        let (engine, _) = engine(inventory);
        let doc = engine.create_mapping_data(ROADM, "1.2.1").await.unwrap();

        let names: Vec<&str> = doc.mapping.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["DEG2-TTP-TXRX", "SRG3-PP1-TXRX"]);
        assert!(doc.mapping["DEG2-TTP-TXRX"].partner_lcp.is_none());
        assert_eq!(doc.mc_capabilities["DEG2-TTP"].center_freq_granularity, DEFAULT_GRANULARITY_GHZ);
        assert_eq!(doc.node_info.unwrap().openroadm_version, "1.2.1");
    }

    #[tokio::test]
    async fn test_broken_degree_pair_is_skipped() {
        let inventory = MemoryInventory::new()
            .with(ROADM, SubtreePath::Info, info("rdm", 1, 0))
            .with(
                ROADM,
                SubtreePath::Degree(1),
                json!({
                    "degree-number": 1,
                    "connection-ports": [
                        {"index": 1, "circuit-pack-name": "1/0", "port-name": "L1"},
                        {"index": 2, "circuit-pack-name": "1/0", "port-name": "L2"}
                    ]
                }),
            );
        let inventory = with_port(inventory, ROADM, "1/0", uni_port("L1", "roadm-external", "tx", "1/0", "L2"));
        let inventory = with_port(inventory, ROADM, "1/0", uni_port("L2", "roadm-external", "tx", "1/0", "L1"));

        let (engine, _) = engine(inventory);
        let doc = engine.create_mapping_data(ROADM, "2.2.1").await.unwrap();
        assert!(doc.mapping.is_empty());
    }

    #[tokio::test]
    async fn test_missing_info_or_unknown_node_type_is_fatal() {
        let (engine, store) = engine(MemoryInventory::new());
        let err = engine.create_mapping_data(ROADM, "2.2.1").await.unwrap_err();
        assert!(matches!(err, MappingError::SubtreeAbsent { .. }));
        assert!(store.get(ROADM).await.unwrap().is_none());

        let inventory = MemoryInventory::new().with(ROADM, SubtreePath::Info, info("ila", 1, 1));
        let (ila, ila_store) = crate::testing::engine(inventory);
        let err = ila.create_mapping_data(ROADM, "7.1").await.unwrap_err();
        assert!(matches!(err, MappingError::UnsupportedNodeType { .. }));
        assert!(ila_store.merge_log().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_version_fails_before_reads() {
        let inventory = MemoryInventory::new().with_failure(ROADM, SubtreePath::Info);
        let (engine, store) = engine(inventory);
        let err = engine.create_mapping_data(ROADM, "3.0").await.unwrap_err();
        assert!(matches!(err, MappingError::UnsupportedSchemaVersion(_)));
        assert!(store.merge_log().await.is_empty());
    }

    #[test]
    fn test_inline_mc_needs_both_granularities() {
        let partial = McCapabilities {
            center_freq_granularity: Some(6.25),
            slot_width_granularity: None,
        };
        let entry = inline_mc(ROADM, "SRG1-PP", Some(&partial));
        assert_eq!(entry.center_freq_granularity, DEFAULT_GRANULARITY_GHZ);
        assert_eq!(entry.mc_node_name, "SRG1-PP");
    }
}

use crate::error::Result;
use crate::inventory::SubtreePath;
use crate::models::*;

use super::classify::{classify, Classified};
use super::context::{Pass, PassContext, XponderCounters};
use super::interfaces::resolve_supporting_interfaces;
use super::naming;
use super::partner::resolve_partner;
use super::strategy::OpenRoadmRules;
use super::switching;

/// State of the xponder instance currently being walked
#[derive(Debug, Default)]
struct XponderWalk {
    number: u16,
    xpdr_type: Option<XpdrType>,
    counters: XponderCounters,
}

impl XponderWalk {
    fn new(number: u16, xpdr_type: Option<XpdrType>) -> Self {
        Self {
            number,
            xpdr_type,
            counters: XponderCounters::default(),
        }
    }
}

/// Xponder walk: network and client LCPs per xponder, connection maps, then
/// switching pools.
pub(crate) async fn build<R: OpenRoadmRules>(pass: &mut Pass<'_>, rules: &R) -> Result<()> {
    let node_id = pass.node_id().to_string();
    let packs: Vec<CircuitPack> = pass.reader.require(&SubtreePath::CircuitPacks).await?;

    let mut xponders: Vec<Xponder> = if rules.models_otn_switching() {
        pass.reader.list(&SubtreePath::Xponders).await
    } else {
        Vec::new()
    };

    if xponders.is_empty() {
        tracing::info!("{} : no xponder subtree, walking circuit packs as xponder 1", node_id);
        let mut sorted: Vec<&CircuitPack> = packs.iter().collect();
        sorted.sort_by(|a, b| a.circuit_pack_name.cmp(&b.circuit_pack_name));

        let mut walk = XponderWalk::new(1, None);
        for cp in sorted {
            let mut ports: Vec<&Port> = cp.ports.iter().collect();
            ports.sort_by(|a, b| naming::numeric_aware_cmp(&a.port_name, &b.port_name));
            for port in ports {
                map_port(pass, rules, &packs, &mut walk, &cp.circuit_pack_name, port).await;
            }
        }
    } else {
        xponders.sort_by_key(|x| x.xpdr_number);
        for xponder in &xponders {
            let xpdr_type = xponder.xpdr_type.as_deref().and_then(XpdrType::parse);
            let mut walk = XponderWalk::new(xponder.xpdr_number, xpdr_type);

            let mut xpdr_ports: Vec<&XpdrPort> = xponder.xpdr_port.iter().collect();
            xpdr_ports.sort_by_key(|p| p.index);
            for xp in xpdr_ports {
                let port = packs
                    .iter()
                    .find(|cp| cp.circuit_pack_name == xp.circuit_pack_name)
                    .and_then(|cp| cp.port(&xp.port_name));
                let Some(port) = port else {
                    tracing::warn!(
                        "{} : xponder {} port {}/{} not found in circuit packs",
                        node_id,
                        xponder.xpdr_number,
                        xp.circuit_pack_name,
                        xp.port_name
                    );
                    continue;
                };
                map_port(pass, rules, &packs, &mut walk, &xp.circuit_pack_name, port).await;
            }
        }
    }

    let maps: Vec<ConnectionMap> = pass.reader.list(&SubtreePath::ConnectionMaps).await;
    apply_connection_maps(&mut pass.ctx, &maps);

    if pass.ctx.is_empty() {
        tracing::warn!("{} : no logical connection point found on this xponder", node_id);
    }
    pass.persist_mapping().await?;

    if rules.models_otn_switching() {
        let pools: Vec<OduSwitchingPool> = pass.reader.list(&SubtreePath::OduSwitchingPools).await;
        if !pools.is_empty() {
            let mut partial = NodeDocument::new(&node_id);
            partial.switching_pool_lcp = switching::build_pools(&pass.ctx, &pools);
            pass.persist(partial).await?;
        }
    }
    Ok(())
}

async fn map_port<R: OpenRoadmRules>(
    pass: &mut Pass<'_>,
    rules: &R,
    packs: &[CircuitPack],
    walk: &mut XponderWalk,
    circuit_pack: &str,
    port: &Port,
) {
    let node_id = pass.node_id().to_string();
    if pass.ctx.is_mapped(circuit_pack, &port.port_name) {
        tracing::debug!(
            "{} : {}/{} already mapped",
            node_id,
            circuit_pack,
            port.port_name
        );
        return;
    }

    let allow_switch = rules.models_otn_switching();
    let class = match classify(&node_id, circuit_pack, port, allow_switch) {
        Ok(class) => class,
        Err(e) => {
            tracing::warn!("{}", e);
            return;
        }
    };

    if class.qual.is_client() {
        let lcp = naming::client(walk.number, walk.counters.next_client());
        add_record(pass, rules, walk, &lcp, circuit_pack, port, class).await;
        return;
    }
    if !class.qual.is_network() {
        tracing::debug!(
            "{} : {}/{} is {}, not an xponder port",
            node_id,
            circuit_pack,
            port.port_name,
            class.qual
        );
        return;
    }

    if !class.direction.is_unidirectional() {
        let lcp = naming::network(walk.number, walk.counters.next_network());
        add_record(pass, rules, walk, &lcp, circuit_pack, port, class).await;
        return;
    }

    let partner =
        match resolve_partner(&pass.reader, packs, circuit_pack, port, class, allow_switch).await {
            Ok(partner) => partner,
            Err(e) => {
                tracing::warn!("{}", e);
                return;
            }
        };
    if pass.ctx.is_mapped(&partner.circuit_pack, &partner.port.port_name) {
        tracing::warn!(
            "{} : partner {}/{} of {}/{} is already mapped",
            node_id,
            partner.circuit_pack,
            partner.port.port_name,
            circuit_pack,
            port.port_name
        );
        return;
    }

    let (first, second) = walk.counters.next_network_pair();
    let lcp1 = naming::network(walk.number, first);
    let lcp2 = naming::network(walk.number, second);
    let added1 = add_record(pass, rules, walk, &lcp1, circuit_pack, port, class).await;
    let added2 = add_record(
        pass,
        rules,
        walk,
        &lcp2,
        &partner.circuit_pack,
        &partner.port,
        partner.class,
    )
    .await;
    if added1 && added2 {
        pass.ctx.link_partners(&lcp1, &lcp2);
    }
}

async fn add_record<R: OpenRoadmRules>(
    pass: &mut Pass<'_>,
    rules: &R,
    walk: &XponderWalk,
    lcp: &str,
    circuit_pack: &str,
    port: &Port,
    class: Classified,
) -> bool {
    let mut record = pass.ctx.new_record(lcp, circuit_pack, port, class);
    record.xpdr_type = walk.xpdr_type;
    let (capabilities, restrictions) = rules.port_capabilities(pass.node_id(), lcp, port);
    record.supported_interface_capability = capabilities;
    record.mpdr_restrictions = restrictions;
    resolve_supporting_interfaces(&pass.reader, &mut record, port, |iface| {
        rules.supporting_layer(iface)
    })
    .await;
    pass.ctx.insert(record)
}

/// Set `connectionMapLcp` from the device connection map. A source without
/// an LCP is an anomaly and is logged; a destination without one leaves the
/// source untouched.
pub(crate) fn apply_connection_maps(ctx: &mut PassContext, maps: &[ConnectionMap]) {
    for map in maps {
        let Some(source) = ctx
            .lcp_for(&map.source.circuit_pack_name, &map.source.port_name)
            .map(str::to_string)
        else {
            tracing::error!(
                "{} : connection-map {} source {}/{} has no logical connection point",
                ctx.node_id(),
                map.connection_map_number,
                map.source.circuit_pack_name,
                map.source.port_name
            );
            continue;
        };

        for destination in &map.destination {
            let Some(target) = ctx
                .lcp_for(&destination.circuit_pack_name, &destination.port_name)
                .map(str::to_string)
            else {
                tracing::debug!(
                    "{} : connection-map {} destination {}/{} not mapped",
                    ctx.node_id(),
                    map.connection_map_number,
                    destination.circuit_pack_name,
                    destination.port_name
                );
                continue;
            };
            if let Some(record) = ctx.record_mut(&source) {
                record.connection_map_lcp = Some(target);
            }
        }
    }
}

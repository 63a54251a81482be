use std::collections::BTreeMap;

use crate::models::{NonBlockingList, OduSwitchingPool, SwitchingPoolLcp};

use super::context::PassContext;

/// Translate declared ODU switching pools into pools of LCP names.
///
/// A port without a logical connection point is dropped from its list with
/// a warning; the rest of the list and the pool itself are kept.
pub fn build_pools(ctx: &PassContext, pools: &[OduSwitchingPool]) -> BTreeMap<u16, SwitchingPoolLcp> {
    pools
        .iter()
        .map(|pool| {
            let non_blocking_list = pool
                .non_blocking_list
                .iter()
                .map(|nbl| {
                    let lcp_list = nbl
                        .port_list
                        .iter()
                        .filter_map(|port| {
                            let lcp = ctx.lcp_for(&port.circuit_pack_name, &port.port_name);
                            if lcp.is_none() {
                                tracing::warn!(
                                    "{} : switching pool {} nbl {}: no logical connection point for {}/{}",
                                    ctx.node_id(),
                                    pool.switching_pool_number,
                                    nbl.nbl_number,
                                    port.circuit_pack_name,
                                    port.port_name
                                );
                            }
                            lcp.map(str::to_string)
                        })
                        .collect();
                    (
                        nbl.nbl_number,
                        NonBlockingList {
                            nbl_number: nbl.nbl_number,
                            interconnect_bandwidth: nbl.interconnect_bandwidth,
                            interconnect_bandwidth_unit: nbl.interconnect_bandwidth_unit,
                            lcp_list,
                        },
                    )
                })
                .collect();
            (
                pool.switching_pool_number,
                SwitchingPoolLcp {
                    switching_pool_number: pool.switching_pool_number,
                    switching_pool_type: pool.switching_pool_type.clone(),
                    non_blocking_list,
                },
            )
        })
        .collect()
}

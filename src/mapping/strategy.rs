use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::error::{MappingError, Result};
use crate::inventory::{DeviceReader, SubtreePath};
use crate::models::*;

use super::context::Pass;
use super::dispatch::SchemaVersion;
use super::interfaces::{resolve_supporting_interfaces, SupportingLayer};
use super::naming::LcpKind;
use super::{roadm, xponder};

/// Media-channel capabilities of one degree or shared-risk-group, and the
/// profile names its LCPs list
#[derive(Debug, Default)]
pub(crate) struct McOutcome {
    pub entries: Vec<McCapabilityEntry>,
    pub profile_names: Vec<String>,
}

/// What differs between the OpenROADM device schema versions. The walk
/// itself lives in [`roadm`] and [`xponder`] and is shared by all of them.
#[async_trait]
pub(crate) trait OpenRoadmRules: Send + Sync {
    fn version(&self) -> SchemaVersion;

    /// Explicit xponder subtree, ODU switching pools and switch-* qualifiers
    fn models_otn_switching(&self) -> bool;

    fn port_capabilities(
        &self,
        node_id: &str,
        lcp: &str,
        port: &Port,
    ) -> (BTreeSet<InterfaceCapability>, Option<MpdrRestrictions>);

    fn supporting_layer(&self, iface: &Interface) -> Option<SupportingLayer> {
        SupportingLayer::of_type(iface)
    }

    async fn degree_mc(&self, reader: &DeviceReader<'_>, degree: &Degree) -> McOutcome;

    async fn srg_mc(&self, reader: &DeviceReader<'_>, srg: &SharedRiskGroup) -> McOutcome;
}

/// Full walk of an OpenROADM device: node info first, then the ROADM or
/// xponder specific parts.
pub(crate) async fn build<R: OpenRoadmRules>(pass: &mut Pass<'_>, rules: &R) -> Result<()> {
    let info: Info = pass.reader.require(&SubtreePath::Info).await?;

    let raw_type = info.node_type.clone().unwrap_or_default();
    let node_type = NodeType::parse(&raw_type).ok_or_else(|| MappingError::UnsupportedNodeType {
        node_id: pass.node_id().to_string(),
        node_type: raw_type.clone(),
    })?;

    let node_info = NodeInfo {
        node_type,
        openroadm_version: rules.version().label().to_string(),
        node_clli: info
            .clli
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| node_defaults::CLLI.to_string()),
        node_vendor: info.vendor.clone(),
        node_model: info.model.clone(),
        node_ip_address: info.ip_address.clone(),
    };
    tracing::info!(
        "{} : {} node, schema {}",
        pass.node_id(),
        raw_type,
        rules.version()
    );
    let partial = NodeDocument::with_node_info(pass.node_id(), node_info);
    pass.persist(partial).await?;

    match node_type {
        NodeType::Rdm => roadm::build(pass, rules, &info).await,
        NodeType::Xpdr => xponder::build(pass, rules).await,
    }
}

/// Refresh the volatile fields of `record` from a freshly read port: admin
/// and oper state always, supporting interfaces for TTP and network LCPs
/// when the port carries interfaces. Everything else is kept as is.
pub(crate) async fn update<R: OpenRoadmRules>(
    reader: &DeviceReader<'_>,
    rules: &R,
    record: &LcpRecord,
    port: &Port,
) -> Result<LcpRecord> {
    let mut updated = record.clone();
    updated.port_admin_state = port.administrative_state.clone();
    updated.port_oper_state = port.operational_state.clone();

    let kind = LcpKind::of(&updated.logical_connection_point);
    if kind.has_supporting_interfaces() && !port.interfaces.is_empty() {
        updated.clear_supporting_interfaces();
        resolve_supporting_interfaces(reader, &mut updated, port, |iface| {
            rules.supporting_layer(iface)
        })
        .await;
    }
    Ok(updated)
}

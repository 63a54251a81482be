use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::inventory::{DeviceReader, SubtreePath};
use crate::models::openconfig::identity_name;
use crate::models::*;

use super::capabilities;
use super::dispatch::SchemaVersion;
use super::interfaces::SupportingLayer;
use super::naming;
use super::roadm::{default_mc, DEFAULT_GRANULARITY_GHZ};
use super::strategy::{McOutcome, OpenRoadmRules};

/// OpenROADM 7.1: named media-channel capability profiles, port
/// capabilities with muxponder restrictions, and OTUCn/ODUCn interfaces.
pub(crate) struct Rules;

#[async_trait]
impl OpenRoadmRules for Rules {
    fn version(&self) -> SchemaVersion {
        SchemaVersion::V710
    }

    fn models_otn_switching(&self) -> bool {
        true
    }

    fn port_capabilities(
        &self,
        node_id: &str,
        lcp: &str,
        port: &Port,
    ) -> (BTreeSet<InterfaceCapability>, Option<MpdrRestrictions>) {
        match &port.port_capabilities {
            Some(caps) => capabilities::from_port_capabilities(node_id, lcp, caps),
            None => (
                capabilities::convert(
                    node_id,
                    SchemaVersion::V710,
                    lcp,
                    &port.supported_interface_capability,
                ),
                None,
            ),
        }
    }

    fn supporting_layer(&self, iface: &Interface) -> Option<SupportingLayer> {
        let rate = iface.rate.as_deref().map(identity_name).unwrap_or_default();
        match SupportingLayer::of_type(iface) {
            Some(SupportingLayer::Otu4) if rate.starts_with("OTUCn") => Some(SupportingLayer::OtuCn),
            Some(SupportingLayer::Odu4) if rate.starts_with("ODUCn") => Some(SupportingLayer::OduCn),
            other => other,
        }
    }

    async fn degree_mc(&self, reader: &DeviceReader<'_>, degree: &Degree) -> McOutcome {
        profile_mc(
            reader,
            &naming::degree_mc_node(degree.degree_number),
            &degree.mc_capability_profile_name,
        )
        .await
    }

    async fn srg_mc(&self, reader: &DeviceReader<'_>, srg: &SharedRiskGroup) -> McOutcome {
        profile_mc(
            reader,
            &naming::srg_mc_node(srg.srg_number),
            &srg.mc_capability_profile_name,
        )
        .await
    }
}

/// One entry per referenced profile, keyed `<base>-<profile>`
async fn profile_mc(reader: &DeviceReader<'_>, base: &str, names: &[String]) -> McOutcome {
    if names.is_empty() {
        return McOutcome {
            entries: vec![default_mc(reader.node_id(), base)],
            profile_names: Vec::new(),
        };
    }

    let mut entries = Vec::with_capacity(names.len());
    for name in names {
        let mc_node = format!("{}-{}", base, name);
        let profile: Option<McCapabilityProfile> = reader
            .optional(&SubtreePath::McCapabilityProfile(name.clone()))
            .await;
        let entry = match profile {
            Some(p) => McCapabilityEntry {
                mc_node_name: mc_node,
                center_freq_granularity: p.center_freq_granularity.unwrap_or(DEFAULT_GRANULARITY_GHZ),
                slot_width_granularity: p.slot_width_granularity.unwrap_or(DEFAULT_GRANULARITY_GHZ),
                min_slots: p.min_slots,
                max_slots: p.max_slots,
            },
            None => default_mc(reader.node_id(), &mc_node),
        };
        entries.push(entry);
    }

    McOutcome {
        entries,
        profile_names: names.to_vec(),
    }
}

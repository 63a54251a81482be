use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::inventory::DeviceReader;
use crate::models::{Degree, InterfaceCapability, MpdrRestrictions, Port, SharedRiskGroup};

use super::capabilities;
use super::dispatch::SchemaVersion;
use super::naming;
use super::roadm::inline_mc;
use super::strategy::{McOutcome, OpenRoadmRules};

/// OpenROADM 2.2.1: xponder subtree, ODU switching pools and inline
/// media-channel capabilities.
pub(crate) struct Rules;

#[async_trait]
impl OpenRoadmRules for Rules {
    fn version(&self) -> SchemaVersion {
        SchemaVersion::V221
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
        let set = capabilities::convert(
            node_id,
            SchemaVersion::V221,
            lcp,
            &port.supported_interface_capability,
        );
        (set, None)
    }

    async fn degree_mc(&self, reader: &DeviceReader<'_>, degree: &Degree) -> McOutcome {
        let name = naming::degree_mc_node(degree.degree_number);
        McOutcome {
            entries: vec![inline_mc(reader.node_id(), &name, degree.mc_capabilities.as_ref())],
            profile_names: Vec::new(),
        }
    }

    async fn srg_mc(&self, reader: &DeviceReader<'_>, srg: &SharedRiskGroup) -> McOutcome {
        let name = naming::srg_mc_node(srg.srg_number);
        McOutcome {
            entries: vec![inline_mc(reader.node_id(), &name, srg.mc_capabilities.as_ref())],
            profile_names: Vec::new(),
        }
    }
}

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::inventory::DeviceReader;
use crate::models::{Degree, InterfaceCapability, MpdrRestrictions, Port, SharedRiskGroup};

use super::capabilities;
use super::dispatch::SchemaVersion;
use super::naming;
use super::roadm::default_mc;
use super::strategy::{McOutcome, OpenRoadmRules};

/// OpenROADM 1.2.1: no xponder subtree, no OTN switching, no media-channel
/// capabilities on degrees or SRGs.
pub(crate) struct Rules;

#[async_trait]
impl OpenRoadmRules for Rules {
    fn version(&self) -> SchemaVersion {
        SchemaVersion::V121
    }

    fn models_otn_switching(&self) -> bool {
        false
    }

    fn port_capabilities(
        &self,
        node_id: &str,
        lcp: &str,
        port: &Port,
    ) -> (BTreeSet<InterfaceCapability>, Option<MpdrRestrictions>) {
        let set = capabilities::convert(
            node_id,
            SchemaVersion::V121,
            lcp,
            &port.supported_interface_capability,
        );
        (set, None)
    }

    async fn degree_mc(&self, reader: &DeviceReader<'_>, degree: &Degree) -> McOutcome {
        McOutcome {
            entries: vec![default_mc(
                reader.node_id(),
                &naming::degree_mc_node(degree.degree_number),
            )],
            profile_names: Vec::new(),
        }
    }

    async fn srg_mc(&self, reader: &DeviceReader<'_>, srg: &SharedRiskGroup) -> McOutcome {
        McOutcome {
            entries: vec![default_mc(reader.node_id(), &naming::srg_mc_node(srg.srg_number))],
            profile_names: Vec::new(),
        }
    }
}

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::db::MappingStore;
use crate::error::Result;
use crate::inventory::DeviceReader;
use crate::models::*;

use super::classify::Classified;
use super::naming::lcp_hash;

/// In-progress state of one mapping pass. Owned by a single pass and never
/// shared across devices.
#[derive(Debug, Default)]
pub struct PassContext {
    node_id: String,
    mapping: BTreeMap<String, LcpRecord>,
    /// `cp+port` -> LCP name
    by_port: HashMap<String, String>,
}

impl PassContext {
    pub fn new(node_id: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            ..Default::default()
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Start a record for a freshly discovered port
    pub fn new_record(&self, lcp: &str, circuit_pack: &str, port: &Port, class: Classified) -> LcpRecord {
        LcpRecord {
            logical_connection_point: lcp.to_string(),
            supporting_circuit_pack_name: circuit_pack.to_string(),
            supporting_port: port.port_name.clone(),
            port_direction: class.direction,
            port_qual: Some(class.qual),
            port_admin_state: port.administrative_state.clone(),
            port_oper_state: port.operational_state.clone(),
            xpdr_type: None,
            partner_lcp: None,
            connection_map_lcp: None,
            supported_interface_capability: BTreeSet::new(),
            lcp_hash_val: lcp_hash(&self.node_id, lcp),
            supporting_ots: None,
            supporting_oms: None,
            supporting_otu4: None,
            supporting_odu4: None,
            supporting_otucn: None,
            supporting_oducn: None,
            mpdr_restrictions: None,
            mc_capability_profile_name: Vec::new(),
        }
    }

    /// Add a record; a name already taken is refused and logged
    pub fn insert(&mut self, record: LcpRecord) -> bool {
        let lcp = record.logical_connection_point.clone();
        if self.mapping.contains_key(&lcp) {
            tracing::warn!(
                "{} : logical connection point {} already mapped, ignoring {}/{}",
                self.node_id,
                lcp,
                record.supporting_circuit_pack_name,
                record.supporting_port
            );
            return false;
        }
        self.by_port.insert(
            port_key(&record.supporting_circuit_pack_name, &record.supporting_port),
            lcp.clone(),
        );
        self.mapping.insert(lcp, record);
        true
    }

    /// Link two records as the halves of one unidirectional pair
    pub fn link_partners(&mut self, a: &str, b: &str) {
        if let Some(rec) = self.mapping.get_mut(a) {
            rec.partner_lcp = Some(b.to_string());
        }
        if let Some(rec) = self.mapping.get_mut(b) {
            rec.partner_lcp = Some(a.to_string());
        }
    }

    pub fn lcp_for(&self, circuit_pack: &str, port: &str) -> Option<&str> {
        self.by_port.get(&port_key(circuit_pack, port)).map(String::as_str)
    }

    pub fn is_mapped(&self, circuit_pack: &str, port: &str) -> bool {
        self.by_port.contains_key(&port_key(circuit_pack, port))
    }

    pub fn record_mut(&mut self, lcp: &str) -> Option<&mut LcpRecord> {
        self.mapping.get_mut(lcp)
    }

    pub fn mapping(&self) -> &BTreeMap<String, LcpRecord> {
        &self.mapping
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

/// Network and client LCP counters of one xponder instance
#[derive(Debug, Default)]
pub struct XponderCounters {
    network: u32,
    client: u32,
}

impl XponderCounters {
    pub fn next_network(&mut self) -> u32 {
        self.network += 1;
        self.network
    }

    /// Reserve two consecutive network indices for a unidirectional pair
    pub fn next_network_pair(&mut self) -> (u32, u32) {
        let first = self.next_network();
        (first, self.next_network())
    }

    pub fn next_client(&mut self) -> u32 {
        self.client += 1;
        self.client
    }
}

/// One mapping pass over one device: the reader, the store the partial
/// documents are merged into, the pass context and everything persisted so
/// far.
pub(crate) struct Pass<'a> {
    pub reader: DeviceReader<'a>,
    pub ctx: PassContext,
    store: &'a dyn MappingStore,
    written: NodeDocument,
}

impl<'a> Pass<'a> {
    pub fn new(reader: DeviceReader<'a>, store: &'a dyn MappingStore) -> Self {
        let node_id = reader.node_id().to_string();
        Self {
            ctx: PassContext::new(&node_id),
            written: NodeDocument::new(node_id),
            reader,
            store,
        }
    }

    pub fn node_id(&self) -> &str {
        self.reader.node_id()
    }

    /// Merge a partial document into the store; once written it is an
    /// observable state of the node
    pub async fn persist(&mut self, partial: NodeDocument) -> Result<()> {
        if partial.is_empty() {
            return Ok(());
        }
        self.store.merge(self.reader.node_id(), &partial).await?;
        self.written.merge(&partial);
        Ok(())
    }

    /// Persist the whole LCP table built so far
    pub async fn persist_mapping(&mut self) -> Result<()> {
        let mut partial = NodeDocument::new(self.reader.node_id());
        partial.mapping = self.ctx.mapping().clone();
        tracing::info!("{} : writing {} logical connection points", self.node_id(), partial.mapping.len());
        self.persist(partial).await
    }

    pub fn into_document(self) -> NodeDocument {
        self.written
    }
}

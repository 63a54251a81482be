mod cp_to_degree;
mod mappings;
mod memory;
mod nodes;
pub(crate) mod row_helpers;
mod switching_pools;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};

use crate::models::*;

use cp_to_degree::CpToDegreeRepo;
use mappings::MappingRepo;
use nodes::NodeRepo;
use switching_pools::{McCapabilityRepo, SwitchingPoolRepo};

pub use memory::MemoryStore;

/// Persistent home of the canonical node documents.
///
/// `merge` is an idempotent upsert by key: only the parts present in the
/// partial document are written, siblings are left untouched.
#[async_trait]
pub trait MappingStore: Send + Sync {
    async fn merge(&self, node_id: &str, partial: &NodeDocument) -> Result<()>;
    async fn get(&self, node_id: &str) -> Result<Option<NodeDocument>>;
    async fn get_entry(&self, node_id: &str, lcp: &str) -> Result<Option<LcpRecord>>;
    async fn get_entry_by_port(
        &self,
        node_id: &str,
        circuit_pack_name: &str,
        port_name: &str,
    ) -> Result<Option<LcpRecord>>;
    async fn delete(&self, node_id: &str) -> Result<()>;
}

/// SQLite-backed mapping store, delegating to per-entity repo modules.
#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    /// Create a new database store with the default pool size
    pub async fn new(db_path: &str) -> Result<Self> {
        Self::with_pool_size(db_path, 5).await
    }

    /// Create a new database store with a specific pool size
    pub async fn with_pool_size(db_path: &str, max_connections: u32) -> Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&db_url)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Private in-memory database, kept alive by a single pinned connection
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Run database migrations
    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }
}

#[async_trait]
impl MappingStore for Store {
    async fn merge(&self, node_id: &str, partial: &NodeDocument) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        NodeRepo::upsert(&mut *tx, node_id, partial.node_info.as_ref()).await?;
        for entry in partial.cp_to_degree.values() {
            CpToDegreeRepo::set(&mut *tx, node_id, entry).await?;
        }
        for record in partial.mapping.values() {
            MappingRepo::set(&mut *tx, node_id, record).await?;
        }
        for spl in partial.switching_pool_lcp.values() {
            SwitchingPoolRepo::set(&mut *tx, node_id, spl).await?;
        }
        for caps in partial.mc_capabilities.values() {
            McCapabilityRepo::set(&mut *tx, node_id, caps).await?;
        }

        tx.commit()
            .await
            .with_context(|| format!("Failed to commit mapping for {}", node_id))?;
        Ok(())
    }

    async fn get(&self, node_id: &str) -> Result<Option<NodeDocument>> {
        let Some(node_info) = NodeRepo::get(&self.pool, node_id).await? else {
            return Ok(None);
        };

        let mut doc = NodeDocument::new(node_id);
        doc.node_info = node_info;
        doc.mapping = MappingRepo::list_for_node(&self.pool, node_id)
            .await?
            .into_iter()
            .map(|m| (m.logical_connection_point.clone(), m))
            .collect();
        doc.cp_to_degree = CpToDegreeRepo::list_for_node(&self.pool, node_id)
            .await?
            .into_iter()
            .map(|c| (c.circuit_pack_name.clone(), c))
            .collect();
        doc.switching_pool_lcp = SwitchingPoolRepo::list_for_node(&self.pool, node_id)
            .await?
            .into_iter()
            .map(|s| (s.switching_pool_number, s))
            .collect();
        doc.mc_capabilities = McCapabilityRepo::list_for_node(&self.pool, node_id)
            .await?
            .into_iter()
            .map(|c| (c.mc_node_name.clone(), c))
            .collect();
        Ok(Some(doc))
    }

    async fn get_entry(&self, node_id: &str, lcp: &str) -> Result<Option<LcpRecord>> {
        MappingRepo::get(&self.pool, node_id, lcp).await
    }

    async fn get_entry_by_port(
        &self,
        node_id: &str,
        circuit_pack_name: &str,
        port_name: &str,
    ) -> Result<Option<LcpRecord>> {
        MappingRepo::get_by_port(&self.pool, node_id, circuit_pack_name, port_name).await
    }

    async fn delete(&self, node_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        NodeRepo::delete(&mut *tx, node_id).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_record;

    fn node_info() -> NodeInfo {
        NodeInfo {
            node_type: NodeType::Xpdr,
            openroadm_version: "2.2.1".into(),
            node_clli: "NodeA".into(),
            node_vendor: Some("vendorA".into()),
            node_model: Some("model2".into()),
            node_ip_address: Some("1.2.3.4".into()),
        }
    }

    async fn check_store_contract(store: &dyn MappingStore) {
        store
            .merge("XPDR-A1", &NodeDocument::with_node_info("XPDR-A1", node_info()))
            .await
            .unwrap();

        let mut lcps = NodeDocument::new("XPDR-A1");
        lcps.mapping.insert("XPDR1-NETWORK1".into(), sample_record("XPDR1-NETWORK1", "CP1", "N1"));
        lcps.mapping.insert("XPDR1-CLIENT1".into(), sample_record("XPDR1-CLIENT1", "CP2", "C1"));
        store.merge("XPDR-A1", &lcps).await.unwrap();
        // Idempotent
        store.merge("XPDR-A1", &lcps).await.unwrap();

        let doc = store.get("XPDR-A1").await.unwrap().unwrap();
        assert_eq!(doc.node_info, Some(node_info()));
        assert_eq!(doc.mapping.len(), 2);

        let by_port = store.get_entry_by_port("XPDR-A1", "CP2", "C1").await.unwrap().unwrap();
        assert_eq!(by_port.logical_connection_point, "XPDR1-CLIENT1");

        // A partial document without node info leaves it in place
        let mut update = NodeDocument::new("XPDR-A1");
        let mut changed = sample_record("XPDR1-CLIENT1", "CP2", "C1");
        changed.port_oper_state = Some("outOfService".into());
        update.mapping.insert("XPDR1-CLIENT1".into(), changed.clone());
        store.merge("XPDR-A1", &update).await.unwrap();

        assert_eq!(store.get_entry("XPDR-A1", "XPDR1-CLIENT1").await.unwrap(), Some(changed));
        let doc = store.get("XPDR-A1").await.unwrap().unwrap();
        assert!(doc.node_info.is_some());
        assert_eq!(doc.mapping.len(), 2);

        store.delete("XPDR-A1").await.unwrap();
        assert!(store.get("XPDR-A1").await.unwrap().is_none());
        assert!(store.get_entry("XPDR-A1", "XPDR1-CLIENT1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_contract() {
        let store = MemoryStore::new();
        check_store_contract(&store).await;
    }

    #[tokio::test]
    async fn test_sqlite_store_contract() {
        let store = Store::in_memory().await.unwrap();
        check_store_contract(&store).await;
    }

    #[tokio::test]
    async fn test_sqlite_store_keeps_pools_and_degrees() {
        let store = Store::in_memory().await.unwrap();
        let mut doc = NodeDocument::new("ROADM-A1");
        doc.cp_to_degree.insert(
            "1/0".into(),
            CpToDegree {
                circuit_pack_name: "1/0".into(),
                degree_number: 1,
                interface_name: Some("1GE-interface-1".into()),
            },
        );
        doc.mc_capabilities.insert(
            "DEG1-TTP".into(),
            McCapabilityEntry {
                mc_node_name: "DEG1-TTP".into(),
                center_freq_granularity: 6.25,
                slot_width_granularity: 12.5,
                min_slots: Some(1),
                max_slots: Some(14),
            },
        );
        doc.switching_pool_lcp.insert(
            1,
            SwitchingPoolLcp {
                switching_pool_number: 1,
                switching_pool_type: Some("non-blocking".into()),
                non_blocking_list: [(
                    1,
                    NonBlockingList {
                        nbl_number: 1,
                        interconnect_bandwidth: Some(0),
                        interconnect_bandwidth_unit: Some(1_000_000_000),
                        lcp_list: vec!["XPDR1-CLIENT1".into(), "XPDR1-NETWORK1".into()],
                    },
                )]
                .into_iter()
                .collect(),
            },
        );
        store.merge("ROADM-A1", &doc).await.unwrap();

        let stored = store.get("ROADM-A1").await.unwrap().unwrap();
        assert_eq!(stored, doc);
    }
}

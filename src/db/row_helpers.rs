use anyhow::{Context, Result};
use sqlx::{sqlite::SqliteRow, Row};

use crate::models::*;

/// Filter empty strings to None; the DB stores empty strings for absent values
pub fn none_if_empty(opt: Option<String>) -> Option<String> {
    opt.filter(|s| !s.is_empty())
}

/// Map a SQLite row to an LCP record (JSON body in `data`)
pub fn map_lcp_row(row: &SqliteRow) -> Result<LcpRecord> {
    let data: String = row.get("data");
    let lcp: String = row.get("logical_connection_point");
    serde_json::from_str(&data).with_context(|| format!("Corrupt mapping row for {}", lcp))
}

/// Map a SQLite row to a circuit-pack to degree association
pub fn map_cp_to_degree_row(row: &SqliteRow) -> CpToDegree {
    let degree_number: i64 = row.get("degree_number");
    CpToDegree {
        circuit_pack_name: row.get("circuit_pack_name"),
        degree_number: degree_number as u16,
        interface_name: none_if_empty(row.get("interface_name")),
    }
}

/// Map a SQLite row to a switching pool (JSON body in `data`)
pub fn map_switching_pool_row(row: &SqliteRow) -> Result<SwitchingPoolLcp> {
    let data: String = row.get("data");
    serde_json::from_str(&data).context("Corrupt switching pool row")
}

/// Map a SQLite row to a media-channel capability entry (JSON body in `data`)
pub fn map_mc_capability_row(row: &SqliteRow) -> Result<McCapabilityEntry> {
    let data: String = row.get("data");
    serde_json::from_str(&data).context("Corrupt mc-capabilities row")
}

/// Map a SQLite row to node info, if the node row carries it
pub fn map_node_info_row(row: &SqliteRow) -> Result<Option<NodeInfo>> {
    match none_if_empty(row.get("node_info")) {
        Some(data) => Ok(Some(
            serde_json::from_str(&data).context("Corrupt node info row")?,
        )),
        None => Ok(None),
    }
}

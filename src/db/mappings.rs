use anyhow::Result;
use chrono::Utc;
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::models::*;

use super::row_helpers::map_lcp_row;

const SELECT_MAPPING: &str = r#"
    SELECT node_id, logical_connection_point, supporting_circuit_pack_name,
           supporting_port, data, updated_at
    FROM lcp_mappings
"#;

/// LCP record operations
pub struct MappingRepo;

impl MappingRepo {
    pub async fn list_for_node(pool: &Pool<Sqlite>, node_id: &str) -> Result<Vec<LcpRecord>> {
        let rows = sqlx::query(&format!(
            "{} WHERE node_id = ? ORDER BY logical_connection_point",
            SELECT_MAPPING
        ))
        .bind(node_id)
        .fetch_all(pool)
        .await?;

        rows.iter().map(map_lcp_row).collect()
    }

    pub async fn get(pool: &Pool<Sqlite>, node_id: &str, lcp: &str) -> Result<Option<LcpRecord>> {
        let row = sqlx::query(&format!(
            "{} WHERE node_id = ? AND logical_connection_point = ?",
            SELECT_MAPPING
        ))
        .bind(node_id)
        .bind(lcp)
        .fetch_optional(pool)
        .await?;

        row.as_ref().map(map_lcp_row).transpose()
    }

    pub async fn get_by_port(
        pool: &Pool<Sqlite>,
        node_id: &str,
        circuit_pack_name: &str,
        port_name: &str,
    ) -> Result<Option<LcpRecord>> {
        let row = sqlx::query(&format!(
            "{} WHERE node_id = ? AND supporting_circuit_pack_name = ? AND supporting_port = ? \
             ORDER BY logical_connection_point LIMIT 1",
            SELECT_MAPPING
        ))
        .bind(node_id)
        .bind(circuit_pack_name)
        .bind(port_name)
        .fetch_optional(pool)
        .await?;

        row.as_ref().map(map_lcp_row).transpose()
    }

    /// Upsert a single LCP record
    pub async fn set(conn: &mut SqliteConnection, node_id: &str, record: &LcpRecord) -> Result<()> {
        let now = Utc::now();
        let data = serde_json::to_string(record)?;
        sqlx::query(
            r#"
            INSERT INTO lcp_mappings (node_id, logical_connection_point, supporting_circuit_pack_name,
                supporting_port, data, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(node_id, logical_connection_point) DO UPDATE SET
                supporting_circuit_pack_name = excluded.supporting_circuit_pack_name,
                supporting_port = excluded.supporting_port,
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(node_id)
        .bind(&record.logical_connection_point)
        .bind(&record.supporting_circuit_pack_name)
        .bind(&record.supporting_port)
        .bind(&data)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(())
    }
}

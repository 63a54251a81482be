use anyhow::Result;
use chrono::Utc;
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::models::*;

use super::row_helpers::map_node_info_row;

/// Node row operations
pub struct NodeRepo;

impl NodeRepo {
    /// Create the node row if needed; replace node info only when provided
    pub async fn upsert(conn: &mut SqliteConnection, node_id: &str, info: Option<&NodeInfo>) -> Result<()> {
        let now = Utc::now();
        let info_json = match info {
            Some(info) => Some(serde_json::to_string(info)?),
            None => None,
        };

        sqlx::query(
            r#"
            INSERT INTO nodes (node_id, node_info, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(node_id) DO UPDATE SET
                node_info = COALESCE(excluded.node_info, nodes.node_info),
                updated_at = excluded.updated_at
            "#,
        )
        .bind(node_id)
        .bind(&info_json)
        .bind(now)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Fetch a node's info; `None` when the node is unknown, `Some(None)` when
    /// the node exists without info yet
    pub async fn get(pool: &Pool<Sqlite>, node_id: &str) -> Result<Option<Option<NodeInfo>>> {
        let row = sqlx::query("SELECT node_id, node_info FROM nodes WHERE node_id = ?")
            .bind(node_id)
            .fetch_optional(pool)
            .await?;

        match row {
            Some(row) => Ok(Some(map_node_info_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Delete a node and everything mapped under it
    pub async fn delete(conn: &mut SqliteConnection, node_id: &str) -> Result<()> {
        for table in ["lcp_mappings", "cp_to_degree", "switching_pools", "mc_capabilities", "nodes"] {
            sqlx::query(&format!("DELETE FROM {} WHERE node_id = ?", table))
                .bind(node_id)
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }
}

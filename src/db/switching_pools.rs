use anyhow::Result;
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::models::*;

use super::row_helpers::{map_mc_capability_row, map_switching_pool_row};

/// Switching pool operations
pub struct SwitchingPoolRepo;

impl SwitchingPoolRepo {
    pub async fn list_for_node(pool: &Pool<Sqlite>, node_id: &str) -> Result<Vec<SwitchingPoolLcp>> {
        let rows = sqlx::query(
            "SELECT data FROM switching_pools WHERE node_id = ? ORDER BY switching_pool_number",
        )
        .bind(node_id)
        .fetch_all(pool)
        .await?;

        rows.iter().map(map_switching_pool_row).collect()
    }

    pub async fn set(conn: &mut SqliteConnection, node_id: &str, spl: &SwitchingPoolLcp) -> Result<()> {
        let data = serde_json::to_string(spl)?;
        sqlx::query(
            r#"
            INSERT INTO switching_pools (node_id, switching_pool_number, data)
            VALUES (?, ?, ?)
            ON CONFLICT(node_id, switching_pool_number) DO UPDATE SET data = excluded.data
            "#,
        )
        .bind(node_id)
        .bind(spl.switching_pool_number as i64)
        .bind(&data)
        .execute(conn)
        .await?;

        Ok(())
    }
}

/// Media-channel capability operations
pub struct McCapabilityRepo;

impl McCapabilityRepo {
    pub async fn list_for_node(pool: &Pool<Sqlite>, node_id: &str) -> Result<Vec<McCapabilityEntry>> {
        let rows = sqlx::query("SELECT data FROM mc_capabilities WHERE node_id = ? ORDER BY mc_node_name")
            .bind(node_id)
            .fetch_all(pool)
            .await?;

        rows.iter().map(map_mc_capability_row).collect()
    }

    pub async fn set(conn: &mut SqliteConnection, node_id: &str, caps: &McCapabilityEntry) -> Result<()> {
        let data = serde_json::to_string(caps)?;
        sqlx::query(
            r#"
            INSERT INTO mc_capabilities (node_id, mc_node_name, data)
            VALUES (?, ?, ?)
            ON CONFLICT(node_id, mc_node_name) DO UPDATE SET data = excluded.data
            "#,
        )
        .bind(node_id)
        .bind(&caps.mc_node_name)
        .bind(&data)
        .execute(conn)
        .await?;

        Ok(())
    }
}

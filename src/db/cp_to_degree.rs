use anyhow::Result;
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::models::*;

use super::row_helpers::map_cp_to_degree_row;

/// Circuit-pack to degree association operations
pub struct CpToDegreeRepo;

impl CpToDegreeRepo {
    pub async fn list_for_node(pool: &Pool<Sqlite>, node_id: &str) -> Result<Vec<CpToDegree>> {
        let rows = sqlx::query(
            "SELECT circuit_pack_name, degree_number, interface_name FROM cp_to_degree \
             WHERE node_id = ? ORDER BY circuit_pack_name",
        )
        .bind(node_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.iter().map(map_cp_to_degree_row).collect())
    }

    pub async fn set(conn: &mut SqliteConnection, node_id: &str, entry: &CpToDegree) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cp_to_degree (node_id, circuit_pack_name, degree_number, interface_name)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(node_id, circuit_pack_name) DO UPDATE SET
                degree_number = excluded.degree_number,
                interface_name = excluded.interface_name
            "#,
        )
        .bind(node_id)
        .bind(&entry.circuit_pack_name)
        .bind(entry.degree_number as i64)
        .bind(entry.interface_name.clone().unwrap_or_default())
        .execute(conn)
        .await?;

        Ok(())
    }
}

use anyhow::Context;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use optical_portmapping::config::Config;
use optical_portmapping::db::Store;
use optical_portmapping::inventory::SnapshotInventory;
use optical_portmapping::models::MetadataCatalog;
use optical_portmapping::PortMapping;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "optical_portmapping=info,portmapping=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let cfg = Config::load();
    tracing::info!("Starting port mapping");
    tracing::info!("Database: {}", cfg.db_path);
    tracing::info!("Inventory: {}", cfg.inventory_dir);

    // Initialize database
    let store = Store::with_pool_size(&cfg.db_path, cfg.db_max_connections).await?;
    tracing::info!("Database initialized (pool_size={})", cfg.db_max_connections);

    let inventory = SnapshotInventory::load_dir(&cfg.inventory_dir).await?;
    let nodes = inventory.nodes();
    tracing::info!("Loaded {} device snapshots", nodes.len());

    let catalog = match &cfg.oc_catalog_path {
        Some(path) => load_catalog(path).await?,
        None => MetadataCatalog::default(),
    };

    let engine = PortMapping::new(Arc::new(inventory), Arc::new(store))
        .with_catalog(catalog)
        .with_read_timeout(cfg.device_read_timeout());

    let outcomes: Vec<bool> = stream::iter(nodes)
        .map(|(node_id, version)| {
            let engine = &engine;
            async move {
                match engine.create_mapping_data(&node_id, &version).await {
                    Ok(doc) => {
                        tracing::info!(
                            "{} : {} logical connection points, {} switching pools",
                            node_id,
                            doc.mapping.len(),
                            doc.switching_pool_lcp.len()
                        );
                        true
                    }
                    Err(e) => {
                        tracing::warn!("{} : mapping not built: {}", node_id, e);
                        false
                    }
                }
            }
        })
        .buffer_unordered(cfg.max_concurrent_nodes)
        .collect()
        .await;

    let failed = outcomes.iter().filter(|ok| !**ok).count();
    tracing::info!(
        "Port mapping finished: {} nodes, {} failed",
        outcomes.len(),
        failed
    );
    Ok(())
}

async fn load_catalog(path: &str) -> anyhow::Result<MetadataCatalog> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read metadata catalog {}", path))?;
    let catalog: MetadataCatalog = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse metadata catalog {}", path))?;
    tracing::info!(
        "Metadata catalog: {} line cards, {} transceivers",
        catalog.line_cards.len(),
        catalog.transceivers.len()
    );
    Ok(catalog)
}

use std::env;
use std::time::Duration;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub db_max_connections: u32,
    pub inventory_dir: String,
    pub oc_catalog_path: Option<String>,
    pub device_read_timeout_secs: u64,
    pub max_concurrent_nodes: usize,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            db_path: get_env("DB_PATH", "/data/portmapping.db"),
            db_max_connections: get_env("DB_MAX_CONNECTIONS", "5")
                .parse()
                .unwrap_or(5),
            inventory_dir: get_env("INVENTORY_DIR", "/data/inventory"),
            oc_catalog_path: env::var("OC_CATALOG_PATH")
                .ok()
                .filter(|p| !p.is_empty()),
            device_read_timeout_secs: get_env("DEVICE_READ_TIMEOUT_SECS", "240")
                .parse()
                .unwrap_or(240),
            max_concurrent_nodes: get_env("MAX_CONCURRENT_NODES", "4")
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .unwrap_or(4),
        }
    }

    pub fn device_read_timeout(&self) -> Duration {
        Duration::from_secs(self.device_read_timeout_secs)
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

//! Port-mapping normalization for optical network elements.
//!
//! Walks the raw inventory of OpenROADM (1.2.1, 2.2.1, 7.1) and OpenConfig
//! terminal devices and produces one canonical table of logical connection
//! points per node.

pub mod config;
pub mod db;
pub mod error;
pub mod inventory;
pub mod mapping;
pub mod models;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{MappingError, Result};
pub use mapping::{PortMapping, SchemaVersion};

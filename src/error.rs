use thiserror::Error;

/// Result type for port-mapping operations
pub type Result<T> = std::result::Result<T, MappingError>;

/// Failures raised while building or updating a node's port mapping.
///
/// Only `UnsupportedSchemaVersion`, `UnsupportedNodeType` and a failed read of
/// the `info` / circuit-pack roots abort a pass. The remaining variants are
/// produced per port or per subtree, logged, and the walk continues.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("{node_id} : device unreachable or timed out reading {path}: {reason}")]
    DeviceUnreachableOrTimeout {
        node_id: String,
        path: String,
        reason: String,
    },

    #[error("{node_id} : subtree {path} is absent")]
    SubtreeAbsent { node_id: String, path: String },

    #[error("{node_id} : subtree {path} could not be decoded: {source}")]
    MalformedSubtree {
        node_id: String,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{node_id} : port {port} on {circuit_pack} has no usable port qualifier ({detail})")]
    PortQualUnresolved {
        node_id: String,
        circuit_pack: String,
        port: String,
        detail: String,
    },

    #[error("{node_id} : port {port} on {circuit_pack} cannot be paired: {reason}")]
    PartnerPortInvalid {
        node_id: String,
        circuit_pack: String,
        port: String,
        reason: String,
    },

    #[error("{node_id} : unsupported node type {node_type}")]
    UnsupportedNodeType { node_id: String, node_type: String },

    #[error("unsupported schema version {0}")]
    UnsupportedSchemaVersion(String),

    #[error("impossible to update mapping: {0}")]
    InvalidUpdate(String),

    #[error("{node_id} : no mapping found for {lcp}")]
    MappingNotFound { node_id: String, lcp: String },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl MappingError {
    /// Whether the walk may continue past this error at the subtree level.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MappingError::DeviceUnreachableOrTimeout { .. }
                | MappingError::SubtreeAbsent { .. }
                | MappingError::MalformedSubtree { .. }
                | MappingError::PortQualUnresolved { .. }
                | MappingError::PartnerPortInvalid { .. }
        )
    }
}

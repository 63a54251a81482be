pub mod device;
pub mod mapping;
pub mod openconfig;

pub use device::*;
pub use mapping::*;
pub use openconfig::{
    Component, LineCardProfile, LogicalChannelAssignment, MetadataCatalog, NonBlockingGroup,
    OcSystemState, TransceiverProfile,
};

/// Canonical LLDP admin-status values
pub mod lldp_admin_status {
    pub const TX_AND_RX: &str = "txandrx";
    pub const RX_ONLY: &str = "rxonly";
    pub const DISABLE: &str = "disable";
}

/// Canonical node-info defaults
pub mod node_defaults {
    pub const CLLI: &str = "defaultCLLI";
    pub const MAX_DEGREES: u16 = 20;
    pub const MAX_SRGS: u16 = 20;
}

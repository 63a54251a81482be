use crate::error::{MappingError, Result};
use crate::models::{Direction, Port, PortQual};

/// Qualifier and direction of a port, as the mapping walk sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    pub qual: PortQual,
    pub direction: Direction,
}

/// Classify a port of `circuit_pack`.
///
/// A missing or unknown qualifier or direction is a `PortQualUnresolved`
/// failure; callers log it and skip the port. Switch qualifiers are only
/// accepted when the schema models OTN switching.
pub fn classify(
    node_id: &str,
    circuit_pack: &str,
    port: &Port,
    allow_switch: bool,
) -> Result<Classified> {
    let unresolved = |detail: String| MappingError::PortQualUnresolved {
        node_id: node_id.to_string(),
        circuit_pack: circuit_pack.to_string(),
        port: port.port_name.clone(),
        detail,
    };

    let raw_qual = port
        .port_qual
        .as_deref()
        .filter(|q| !q.is_empty())
        .ok_or_else(|| unresolved("no port-qual declared".to_string()))?;
    let qual = PortQual::parse(raw_qual)
        .ok_or_else(|| unresolved(format!("unknown port-qual {}", raw_qual)))?;
    if !allow_switch && matches!(qual, PortQual::SwitchNetwork | PortQual::SwitchClient) {
        return Err(unresolved(format!("port-qual {} not modelled by this schema", raw_qual)));
    }

    let direction = match port.port_direction.as_deref() {
        Some(raw) => Direction::parse(raw)
            .ok_or_else(|| unresolved(format!("unknown port-direction {}", raw)))?,
        None => return Err(unresolved("no port-direction declared".to_string())),
    };

    Ok(Classified { qual, direction })
}

/// Whether two qualifiers may form a unidirectional pair
pub fn compatible_quals(a: PortQual, b: PortQual) -> bool {
    a == b || (a.is_network() && b.is_network()) || (a.is_client() && b.is_client())
}

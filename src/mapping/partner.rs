use crate::error::{MappingError, Result};
use crate::inventory::DeviceReader;
use crate::models::{CircuitPack, Direction, Port};

use super::classify::{classify, compatible_quals, Classified};

/// Reciprocal half of a validated unidirectional pair
#[derive(Debug, Clone)]
pub struct Partner {
    pub circuit_pack: String,
    pub port: Port,
    pub class: Classified,
}

/// Locate and validate the partner of a unidirectional port.
///
/// The partner is looked up in `known_packs` first and read from the device
/// otherwise. Any failed check yields `PartnerPortInvalid`; the caller logs
/// it and leaves both ports unmapped.
pub async fn resolve_partner(
    reader: &DeviceReader<'_>,
    known_packs: &[CircuitPack],
    circuit_pack: &str,
    port: &Port,
    class: Classified,
    allow_switch: bool,
) -> Result<Partner> {
    let node_id = reader.node_id();
    let Some((partner_cp, partner_port)) = port.partner_port.as_ref().and_then(|p| p.target())
    else {
        return Err(invalid(node_id, circuit_pack, port, "no partner-port declared".to_string()));
    };

    let found = match known_packs.iter().find(|cp| cp.circuit_pack_name == partner_cp) {
        Some(cp) => cp.port(partner_port).cloned(),
        None => reader.port(partner_cp, partner_port).await,
    };

    validate_partner(node_id, circuit_pack, port, class, partner_cp, found.as_ref(), allow_switch)
}

/// Check that `candidate` (the port found at `partner_cp`) is the reciprocal
/// of `port`: same qualifier family, a partner reference pointing back, and
/// exactly one Tx and one Rx between them.
pub fn validate_partner(
    node_id: &str,
    circuit_pack: &str,
    port: &Port,
    class: Classified,
    partner_cp: &str,
    candidate: Option<&Port>,
    allow_switch: bool,
) -> Result<Partner> {
    let candidate = candidate.ok_or_else(|| {
        let target = port
            .partner_port
            .as_ref()
            .and_then(|p| p.port_name.clone())
            .unwrap_or_default();
        invalid(
            node_id,
            circuit_pack,
            port,
            format!("partner port {}/{} not found", partner_cp, target),
        )
    })?;

    let declared = port.partner_port.as_ref().and_then(|p| p.target());
    if declared != Some((partner_cp, candidate.port_name.as_str())) {
        return Err(invalid(
            node_id,
            circuit_pack,
            port,
            format!(
                "declared partner does not match {}/{}",
                partner_cp, candidate.port_name
            ),
        ));
    }

    let partner_class = classify(node_id, partner_cp, candidate, allow_switch).map_err(|e| {
        invalid(node_id, circuit_pack, port, format!("partner not classifiable: {}", e))
    })?;

    if !compatible_quals(class.qual, partner_class.qual) {
        return Err(invalid(
            node_id,
            circuit_pack,
            port,
            format!(
                "partner {}/{} has qualifier {} instead of {}",
                partner_cp, candidate.port_name, partner_class.qual, class.qual
            ),
        ));
    }

    let points_back = candidate
        .partner_port
        .as_ref()
        .and_then(|p| p.target())
        .map(|(cp, p)| cp == circuit_pack && p == port.port_name)
        .unwrap_or(false);
    if !points_back {
        return Err(invalid(
            node_id,
            circuit_pack,
            port,
            format!(
                "partner {}/{} does not reference this port back",
                partner_cp, candidate.port_name
            ),
        ));
    }

    let opposite = matches!(
        (class.direction, partner_class.direction),
        (Direction::Tx, Direction::Rx) | (Direction::Rx, Direction::Tx)
    );
    if !opposite {
        return Err(invalid(
            node_id,
            circuit_pack,
            port,
            format!(
                "directions {} and {} do not form a tx/rx pair",
                class.direction, partner_class.direction
            ),
        ));
    }

    Ok(Partner {
        circuit_pack: partner_cp.to_string(),
        port: candidate.clone(),
        class: partner_class,
    })
}

fn invalid(node_id: &str, circuit_pack: &str, port: &Port, reason: String) -> MappingError {
    MappingError::PartnerPortInvalid {
        node_id: node_id.to_string(),
        circuit_pack: circuit_pack.to_string(),
        port: port.port_name.clone(),
        reason,
    }
}

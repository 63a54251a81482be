use std::fmt;

use crate::error::{MappingError, Result};
use crate::inventory::DeviceReader;
use crate::models::{LcpRecord, MetadataCatalog, Port};

use super::context::Pass;
use super::{openconfig, strategy, v121, v221, v710};

const REVISION_121: &str = "(http://org/openroadm/device?revision=2017-02-06)org-openroadm-device";
const REVISION_221: &str = "(http://org/openroadm/device?revision=2018-10-19)org-openroadm-device";
const REVISION_710: &str = "(http://org/openroadm/device?revision=2020-05-29)org-openroadm-device";
const REVISION_OC190: &str =
    "(http://openconfig.net/yang/terminal-device?revision=2021-07-29)openconfig-terminal-device";

/// Device schema versions the engine can walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    V121,
    V221,
    V710,
    Oc190,
}

impl SchemaVersion {
    pub const ALL: [SchemaVersion; 4] = [
        SchemaVersion::V121,
        SchemaVersion::V221,
        SchemaVersion::V710,
        SchemaVersion::Oc190,
    ];

    /// Exact-match lookup of a device revision token or short label
    pub fn from_token(token: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.revision() == token || v.label() == token)
            .ok_or_else(|| MappingError::UnsupportedSchemaVersion(token.to_string()))
    }

    /// Short label stored in node metadata
    pub fn label(self) -> &'static str {
        match self {
            SchemaVersion::V121 => "1.2.1",
            SchemaVersion::V221 => "2.2.1",
            SchemaVersion::V710 => "7.1",
            SchemaVersion::Oc190 => "oc-1.9.0",
        }
    }

    /// Revision token advertised by the device
    pub fn revision(self) -> &'static str {
        match self {
            SchemaVersion::V121 => REVISION_121,
            SchemaVersion::V221 => REVISION_221,
            SchemaVersion::V710 => REVISION_710,
            SchemaVersion::Oc190 => REVISION_OC190,
        }
    }

    pub fn is_openconfig(self) -> bool {
        matches!(self, SchemaVersion::Oc190)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Run the full walk of the strategy matching `version`
pub(crate) async fn build(
    version: SchemaVersion,
    pass: &mut Pass<'_>,
    catalog: &MetadataCatalog,
) -> Result<()> {
    match version {
        SchemaVersion::V121 => strategy::build(pass, &v121::Rules).await,
        SchemaVersion::V221 => strategy::build(pass, &v221::Rules).await,
        SchemaVersion::V710 => strategy::build(pass, &v710::Rules).await,
        SchemaVersion::Oc190 => openconfig::build(pass, catalog).await,
    }
}

/// Recompute the volatile fields of one record with the matching strategy
pub(crate) async fn update(
    version: SchemaVersion,
    reader: &DeviceReader<'_>,
    record: &LcpRecord,
    port: &Port,
) -> Result<LcpRecord> {
    match version {
        SchemaVersion::V121 => strategy::update(reader, &v121::Rules, record, port).await,
        SchemaVersion::V221 => strategy::update(reader, &v221::Rules, record, port).await,
        SchemaVersion::V710 => strategy::update(reader, &v710::Rules, record, port).await,
        SchemaVersion::Oc190 => Ok(openconfig::update(record, port)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_match_exactly() {
        assert_eq!(SchemaVersion::from_token(REVISION_221).unwrap(), SchemaVersion::V221);
        assert_eq!(SchemaVersion::from_token("7.1").unwrap(), SchemaVersion::V710);
        assert_eq!(SchemaVersion::from_token("oc-1.9.0").unwrap(), SchemaVersion::Oc190);

        let err = SchemaVersion::from_token("2.2").unwrap_err();
        assert!(matches!(err, MappingError::UnsupportedSchemaVersion(_)));
        assert!(SchemaVersion::from_token(&format!(" {}", REVISION_121)).is_err());
    }

    #[test]
    fn test_labels_round_trip() {
        for version in SchemaVersion::ALL {
            assert_eq!(SchemaVersion::from_token(version.label()).unwrap(), version);
            assert_eq!(SchemaVersion::from_token(version.revision()).unwrap(), version);
        }
        assert!(SchemaVersion::Oc190.is_openconfig());
        assert_eq!(SchemaVersion::V121.to_string(), "1.2.1");
    }
}

//! JSON zone snapshots read by `sync` and written by `dump`
//!
//! ```json
//! {
//!   "name": "unit.tests.",
//!   "records": [
//!     {"name": "www", "ttl": 300, "data": {"type": "A", "values": ["1.2.3.4"]}}
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use zonesync_core::{Record, Zone};

#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl Snapshot {
    pub fn from_zone(zone: &Zone) -> Self {
        Self {
            name: zone.name().to_string(),
            records: zone.records().cloned().collect(),
        }
    }

    pub fn into_zone(self) -> Result<Zone> {
        let name = self.name.clone();
        Zone::with_records(self.name, self.records)
            .with_context(|| format!("Invalid snapshot for zone {}", name))
    }

    /// Read a snapshot from `path`
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_to_zone() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "name": "Unit.Tests.",
            "records": [
                {"name": "www", "ttl": 300, "data": {"type": "A", "values": ["1.2.3.5", "1.2.3.4"]}},
                {"name": "", "ttl": 300, "data": {"type": "ALIAS", "values": "www.unit.tests"}}
            ]
        }))
        .unwrap();

        let zone = snapshot.into_zone().unwrap();
        assert_eq!(zone.name(), "unit.tests.");
        assert_eq!(zone.len(), 2);

        let back = serde_json::to_value(Snapshot::from_zone(&zone)).unwrap();
        assert_eq!(back["records"][1]["data"]["values"], json!(["1.2.3.4", "1.2.3.5"]));
    }

    #[test]
    fn test_duplicate_records_rejected() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "name": "unit.tests.",
            "records": [
                {"name": "www", "ttl": 300, "data": {"type": "A", "values": ["1.2.3.4"]}},
                {"name": "www", "ttl": 600, "data": {"type": "A", "values": ["1.2.3.5"]}}
            ]
        }))
        .unwrap();

        assert!(snapshot.into_zone().is_err());
    }
}

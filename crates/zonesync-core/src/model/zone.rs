//! Zones: a fully-qualified name plus its records, unique per (name, type)

use std::collections::BTreeMap;

use super::record::{Record, RecordType};
use crate::error::{Error, Result};

/// A DNS zone and the records managed in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    name: String,
    records: BTreeMap<(String, RecordType), Record>,
}

impl Zone {
    /// Create an empty zone
    ///
    /// `name` must be fully qualified (end with a dot).
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into().trim().to_ascii_lowercase();
        if !name.ends_with('.') || name.len() < 2 {
            return Err(Error::invalid_input(format!(
                "zone name must be fully qualified: '{}'",
                name
            )));
        }
        Ok(Self {
            name,
            records: BTreeMap::new(),
        })
    }

    /// Create a zone holding `records`
    pub fn with_records(
        name: impl Into<String>,
        records: impl IntoIterator<Item = Record>,
    ) -> Result<Self> {
        let mut zone = Self::new(name)?;
        for record in records {
            zone.add_record(record)?;
        }
        Ok(zone)
    }

    /// Fully-qualified zone name, with trailing dot
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a record; a second record with the same (name, type) is rejected
    pub fn add_record(&mut self, record: Record) -> Result<()> {
        let key = record.key();
        if self.records.contains_key(&key) {
            return Err(Error::invalid_input(format!(
                "duplicate record {} in zone {}",
                record, self.name
            )));
        }
        self.records.insert(key, record);
        Ok(())
    }

    /// Remove and return the record for (name, type)
    pub fn remove_record(&mut self, name: &str, record_type: RecordType) -> Option<Record> {
        self.records.remove(&(name.to_string(), record_type))
    }

    /// Look up the record for (name, type)
    pub fn get(&self, name: &str, record_type: RecordType) -> Option<&Record> {
        self.records.get(&(name.to_string(), record_type))
    }

    /// Records ordered by (name, type)
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A copy of this zone keeping only records accepted by `keep`
    pub fn filtered(&self, mut keep: impl FnMut(&Record) -> bool) -> Self {
        Self {
            name: self.name.clone(),
            records: self
                .records
                .iter()
                .filter(|(_, r)| keep(r))
                .map(|(k, r)| (k.clone(), r.clone()))
                .collect(),
        }
    }
}

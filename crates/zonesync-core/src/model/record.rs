//! Canonical, provider-neutral DNS records
//!
//! A [`Record`] is immutable once built. [`Record::new`] canonicalizes the
//! value list so that two records describing the same RRset compare equal
//! regardless of the order the values were supplied in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Record types understood by the canonical model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Alias,
    Caa,
    Cname,
    Mx,
    Naptr,
    Ns,
    Ptr,
    Spf,
    Srv,
    Txt,
}

impl RecordType {
    /// Every canonical type, in display order
    pub const ALL: [RecordType; 12] = [
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Alias,
        RecordType::Caa,
        RecordType::Cname,
        RecordType::Mx,
        RecordType::Naptr,
        RecordType::Ns,
        RecordType::Ptr,
        RecordType::Spf,
        RecordType::Srv,
        RecordType::Txt,
    ];

    /// Wire name of the type (e.g. `"AAAA"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Alias => "ALIAS",
            RecordType::Caa => "CAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Naptr => "NAPTR",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Spf => "SPF",
            RecordType::Srv => "SRV",
            RecordType::Txt => "TXT",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        RecordType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| Error::invalid_input(format!("Unknown record type: {}", s)))
    }
}

/// MX value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MxValue {
    pub preference: u16,
    pub exchange: String,
}

/// SRV value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SrvValue {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

/// CAA value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaaValue {
    pub flags: u8,
    pub tag: String,
    pub value: String,
}

/// NAPTR value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NaptrValue {
    pub order: u16,
    pub preference: u16,
    pub flags: String,
    pub service: String,
    pub regexp: String,
    pub replacement: String,
}

/// Type-specific record payload
///
/// One variant per [`RecordType`]; the variant *is* the type, so a record
/// can never carry values of the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "UPPERCASE")]
pub enum RecordData {
    A(Vec<Ipv4Addr>),
    Aaaa(Vec<Ipv6Addr>),
    Alias(String),
    Caa(Vec<CaaValue>),
    Cname(String),
    Mx(Vec<MxValue>),
    Naptr(Vec<NaptrValue>),
    Ns(Vec<String>),
    Ptr(String),
    Spf(Vec<String>),
    Srv(Vec<SrvValue>),
    Txt(Vec<String>),
}

impl RecordData {
    /// The record type this payload belongs to
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordData::A(_) => RecordType::A,
            RecordData::Aaaa(_) => RecordType::Aaaa,
            RecordData::Alias(_) => RecordType::Alias,
            RecordData::Caa(_) => RecordType::Caa,
            RecordData::Cname(_) => RecordType::Cname,
            RecordData::Mx(_) => RecordType::Mx,
            RecordData::Naptr(_) => RecordType::Naptr,
            RecordData::Ns(_) => RecordType::Ns,
            RecordData::Ptr(_) => RecordType::Ptr,
            RecordData::Spf(_) => RecordType::Spf,
            RecordData::Srv(_) => RecordType::Srv,
            RecordData::Txt(_) => RecordType::Txt,
        }
    }

    /// Number of values carried
    pub fn len(&self) -> usize {
        match self {
            RecordData::A(v) => v.len(),
            RecordData::Aaaa(v) => v.len(),
            RecordData::Alias(_) | RecordData::Cname(_) | RecordData::Ptr(_) => 1,
            RecordData::Caa(v) => v.len(),
            RecordData::Mx(v) => v.len(),
            RecordData::Naptr(v) => v.len(),
            RecordData::Ns(v) | RecordData::Spf(v) | RecordData::Txt(v) => v.len(),
            RecordData::Srv(v) => v.len(),
        }
    }

    /// Whether no values are carried
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn canonicalize(self) -> Result<Self> {
        Ok(match self {
            RecordData::A(v) => RecordData::A(sorted(v)),
            RecordData::Aaaa(v) => RecordData::Aaaa(sorted(v)),
            RecordData::Alias(host) => RecordData::Alias(absolute(host)?),
            RecordData::Cname(host) => RecordData::Cname(absolute(host)?),
            RecordData::Ptr(host) => RecordData::Ptr(absolute(host)?),
            RecordData::Ns(hosts) => RecordData::Ns(sorted(
                hosts.into_iter().map(absolute).collect::<Result<_>>()?,
            )),
            RecordData::Caa(v) => RecordData::Caa(sorted(v)),
            RecordData::Naptr(v) => RecordData::Naptr(sorted(v)),
            RecordData::Srv(v) => RecordData::Srv(sorted(
                v.into_iter()
                    .map(|s| {
                        Ok(SrvValue {
                            target: absolute(s.target)?,
                            ..s
                        })
                    })
                    .collect::<Result<_>>()?,
            )),
            RecordData::Mx(v) => {
                let mut values = v
                    .into_iter()
                    .map(|mx| {
                        Ok(MxValue {
                            exchange: absolute(mx.exchange)?,
                            ..mx
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                // Stable: equal preferences keep their input order.
                values.sort_by_key(|mx| mx.preference);
                let mut seen = Vec::with_capacity(values.len());
                values.retain(|mx| {
                    if seen.contains(mx) {
                        false
                    } else {
                        seen.push(mx.clone());
                        true
                    }
                });
                RecordData::Mx(values)
            }
            RecordData::Spf(v) => RecordData::Spf(sorted(v.into_iter().map(unquote).collect())),
            RecordData::Txt(v) => RecordData::Txt(sorted(v.into_iter().map(unquote).collect())),
        })
    }
}

fn sorted<T: Ord>(mut values: Vec<T>) -> Vec<T> {
    values.sort();
    values.dedup();
    values
}

fn absolute(host: String) -> Result<String> {
    let host = host.trim().to_string();
    if host.is_empty() {
        return Err(Error::invalid_input("hostname value cannot be empty"));
    }
    if host.ends_with('.') {
        Ok(host)
    } else {
        Ok(format!("{}.", host))
    }
}

/// Strip one pair of enclosing double quotes, if present
pub fn unquote(value: String) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value[1..value.len() - 1].to_string()
    } else {
        value
    }
}

/// A canonical DNS record: one RRset of a zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecordFields")]
pub struct Record {
    name: String,
    ttl: u32,
    data: RecordData,
}

#[derive(Deserialize)]
struct RecordFields {
    name: String,
    ttl: u32,
    data: RecordData,
}

impl TryFrom<RecordFields> for Record {
    type Error = Error;

    fn try_from(fields: RecordFields) -> Result<Self> {
        Record::new(fields.name, fields.ttl, fields.data)
    }
}

impl Record {
    /// Build a record
    ///
    /// # Parameters
    ///
    /// - `name`: Name relative to the zone, `""` for the apex
    /// - `ttl`: Time-to-live in seconds
    /// - `data`: Type-specific values
    ///
    /// # Returns
    ///
    /// - `Ok(Record)`: The canonicalized record
    /// - `Err(Error::InvalidInput)`: Empty value list, empty hostname, or a
    ///   name that is fully qualified
    pub fn new(name: impl Into<String>, ttl: u32, data: RecordData) -> Result<Self> {
        let name = name.into().trim().to_ascii_lowercase();
        if name.ends_with('.') {
            return Err(Error::invalid_input(format!(
                "record name must be relative to its zone: {}",
                name
            )));
        }
        if data.is_empty() {
            return Err(Error::invalid_input(format!(
                "{} record '{}' has no values",
                data.record_type(),
                name
            )));
        }

        Ok(Self {
            name,
            ttl,
            data: data.canonicalize()?,
        })
    }

    /// Name relative to the zone (`""` = apex)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// TTL in seconds
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Type-specific values
    pub fn data(&self) -> &RecordData {
        &self.data
    }

    /// The record's type
    pub fn record_type(&self) -> RecordType {
        self.data.record_type()
    }

    /// Identity of the record within its zone
    pub fn key(&self) -> (String, RecordType) {
        (self.name.clone(), self.record_type())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.name.is_empty() { "@" } else { &self.name };
        write!(f, "{} {} (ttl {})", name, self.record_type(), self.ttl)
    }
}

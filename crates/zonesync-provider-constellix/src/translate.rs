//! Canonical ↔ Constellix record translation
//!
//! [`to_native`] builds the creation payload for one canonical record.
//! [`from_native`] folds every native record sharing a (name, type) into one
//! canonical record: partial applies can leave several native records
//! behind for what is logically a single RRset.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::warn;
use zonesync_core::{
    CaaValue, Error, MxValue, NaptrValue, Record, RecordData, Result, SrvValue,
};

use crate::native::{NativePayload, NativeRecord, NativeType, RoundRobinEntry};

#[derive(Deserialize)]
struct ValueEntry {
    value: String,
}

#[derive(Deserialize)]
struct MxEntry {
    value: String,
    level: u16,
}

#[derive(Deserialize)]
struct SrvEntry {
    value: String,
    priority: u16,
    weight: u16,
    port: u16,
}

#[derive(Deserialize)]
struct CaaEntry {
    flag: u8,
    tag: String,
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NaptrEntry {
    order: u16,
    preference: u16,
    flags: String,
    service: String,
    regular_expression: String,
    replacement: String,
}

/// Build the creation payload for `record`
///
/// # Returns
///
/// - `Ok((NativeType, NativePayload))`: Type tag for the path, and the body
/// - `Err(Error::Translation)`: The record can't be expressed natively
pub fn to_native(record: &Record) -> Result<(NativeType, NativePayload)> {
    let native_type = NativeType::from(record.record_type());
    let mut payload = NativePayload {
        name: record.name().to_string(),
        ttl: record.ttl(),
        host: None,
        value: None,
        round_robin: Vec::new(),
    };

    match record.data() {
        RecordData::A(ips) => {
            payload.round_robin = values(ips.iter().map(Ipv4Addr::to_string));
        }
        RecordData::Aaaa(ips) => {
            payload.round_robin = values(ips.iter().map(Ipv6Addr::to_string));
        }
        RecordData::Ns(hosts) => {
            payload.round_robin = values(hosts.iter().cloned());
        }
        RecordData::Txt(texts) | RecordData::Spf(texts) => {
            payload.round_robin = values(texts.iter().map(|t| quote(t)));
        }
        RecordData::Alias(host) => {
            payload.round_robin = vec![RoundRobinEntry::Aname {
                value: host.clone(),
                disable_flag: false,
            }];
        }
        RecordData::Cname(host) => {
            if record.name().is_empty() {
                return Err(Error::translation(format!(
                    "CNAME is not allowed at the zone apex ({})",
                    record
                )));
            }
            payload.host = Some(host.clone());
        }
        RecordData::Ptr(host) => {
            payload.host = Some(host.clone());
        }
        RecordData::Mx(mxs) => {
            payload.round_robin = mxs
                .iter()
                .map(|mx| RoundRobinEntry::Mx {
                    value: mx.exchange.clone(),
                    level: mx.preference,
                })
                .collect();
            payload.value = mxs.last().map(|mx| mx.exchange.clone());
        }
        RecordData::Srv(srvs) => {
            payload.round_robin = srvs
                .iter()
                .map(|srv| RoundRobinEntry::Srv {
                    priority: srv.priority,
                    weight: srv.weight,
                    value: srv.target.clone(),
                    port: srv.port,
                })
                .collect();
        }
        RecordData::Caa(caas) => {
            payload.round_robin = caas
                .iter()
                .map(|caa| RoundRobinEntry::Caa {
                    flag: caa.flags,
                    tag: caa.tag.clone(),
                    data: caa.value.clone(),
                })
                .collect();
        }
        RecordData::Naptr(naptrs) => {
            payload.round_robin = naptrs
                .iter()
                .map(|n| RoundRobinEntry::Naptr {
                    order: n.order,
                    preference: n.preference,
                    flags: n.flags.clone(),
                    service: n.service.clone(),
                    regular_expression: n.regexp.clone(),
                    replacement: n.replacement.clone(),
                })
                .collect();
        }
    }

    Ok((native_type, payload))
}

/// Fold native records sharing a (name, type) into one canonical record
///
/// # Parameters
///
/// - `zone_name`: Fully-qualified zone name, used to absolutize relative
///   hostnames the API may return
/// - `natives`: Non-empty; all entries must share name and type
pub fn from_native(zone_name: &str, natives: &[NativeRecord]) -> Result<Record> {
    let first = natives
        .first()
        .ok_or_else(|| Error::translation("no native records to fold"))?;
    let native_type = first.native_type().ok_or_else(|| {
        Error::translation(format!("unsupported native type '{}'", first.record_type))
    })?;

    if let Some(stray) = natives
        .iter()
        .find(|n| n.native_type() != Some(native_type) || !n.name.eq_ignore_ascii_case(&first.name))
    {
        return Err(Error::translation(format!(
            "native record {} ({} {}) does not belong with {} {}",
            stray.id, stray.name, stray.record_type, first.name, native_type
        )));
    }

    let entries: Vec<Value> = natives.iter().flat_map(NativeRecord::entries).collect();
    let absolute = |host: String| absolutize(&host, zone_name);

    let data = match native_type {
        NativeType::A => RecordData::A(
            decode::<ValueEntry>(entries)?
                .into_iter()
                .map(|e| parse_ip::<Ipv4Addr>(&e.value))
                .collect::<Result<_>>()?,
        ),
        NativeType::Aaaa => RecordData::Aaaa(
            decode::<ValueEntry>(entries)?
                .into_iter()
                .map(|e| parse_ip::<Ipv6Addr>(&e.value))
                .collect::<Result<_>>()?,
        ),
        NativeType::Ns => RecordData::Ns(
            decode::<ValueEntry>(entries)?
                .into_iter()
                .map(|e| absolute(e.value))
                .collect(),
        ),
        NativeType::Txt => RecordData::Txt(
            decode::<ValueEntry>(entries)?
                .into_iter()
                .map(|e| e.value)
                .collect(),
        ),
        NativeType::Spf => RecordData::Spf(
            decode::<ValueEntry>(entries)?
                .into_iter()
                .map(|e| e.value)
                .collect(),
        ),
        NativeType::Aname => RecordData::Alias(absolute(single(natives, native_type)?)),
        NativeType::Cname => RecordData::Cname(absolute(single(natives, native_type)?)),
        NativeType::Ptr => RecordData::Ptr(absolute(single(natives, native_type)?)),
        NativeType::Mx => RecordData::Mx(
            decode::<MxEntry>(entries)?
                .into_iter()
                .map(|e| MxValue {
                    preference: e.level,
                    exchange: absolute(e.value),
                })
                .collect(),
        ),
        NativeType::Srv => RecordData::Srv(
            decode::<SrvEntry>(entries)?
                .into_iter()
                .map(|e| SrvValue {
                    priority: e.priority,
                    weight: e.weight,
                    port: e.port,
                    target: absolute(e.value),
                })
                .collect(),
        ),
        NativeType::Caa => RecordData::Caa(
            decode::<CaaEntry>(entries)?
                .into_iter()
                .map(|e| CaaValue {
                    flags: e.flag,
                    tag: e.tag,
                    value: e.data,
                })
                .collect(),
        ),
        NativeType::Naptr => RecordData::Naptr(
            decode::<NaptrEntry>(entries)?
                .into_iter()
                .map(|e| NaptrValue {
                    order: e.order,
                    preference: e.preference,
                    flags: e.flags,
                    service: e.service,
                    regexp: e.regular_expression,
                    replacement: e.replacement,
                })
                .collect(),
        ),
    };

    Record::new(first.name.as_str(), first.ttl, data)
}

/// Make a hostname returned by the API absolute within `zone_name`
pub fn absolutize(value: &str, zone_name: &str) -> String {
    if value.is_empty() {
        zone_name.to_string()
    } else if value.ends_with('.') {
        value.to_string()
    } else {
        format!("{}.{}", value, zone_name)
    }
}

fn values(items: impl Iterator<Item = String>) -> Vec<RoundRobinEntry> {
    items.map(|value| RoundRobinEntry::Value { value }).collect()
}

fn quote(text: &str) -> String {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        text.to_string()
    } else {
        format!("\"{}\"", text)
    }
}

fn decode<T: DeserializeOwned>(entries: Vec<Value>) -> Result<Vec<T>> {
    entries
        .into_iter()
        .map(|entry| serde_json::from_value(entry).map_err(Error::from))
        .collect()
}

fn parse_ip<T: std::str::FromStr>(value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::translation(format!("invalid address from provider: '{}'", value)))
}

fn single(natives: &[NativeRecord], native_type: NativeType) -> Result<String> {
    let mut found = natives.iter().filter_map(NativeRecord::single_value);
    let value = found.next().ok_or_else(|| {
        Error::translation(format!("{} record {} carries no value", native_type, natives[0].id))
    })?;
    if found.any(|other| other != value) {
        warn!(
            "Several {} records named '{}' disagree, keeping {}",
            native_type, natives[0].name, value
        );
    }
    Ok(value)
}

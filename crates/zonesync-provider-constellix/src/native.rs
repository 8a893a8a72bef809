//! Constellix wire types
//!
//! Shapes as the v1 API sends and accepts them. Decoding is lenient: the
//! API has shipped values both as a top-level `value` and as a `roundRobin`
//! list, and either may carry strings or objects.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use zonesync_core::RecordType;

/// Record type tags used in Constellix paths and payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NativeType {
    A,
    Aaaa,
    Aname,
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

impl NativeType {
    /// Tag as used in `/records/{TYPE}` paths
    pub fn as_str(&self) -> &'static str {
        match self {
            NativeType::A => "A",
            NativeType::Aaaa => "AAAA",
            NativeType::Aname => "ANAME",
            NativeType::Caa => "CAA",
            NativeType::Cname => "CNAME",
            NativeType::Mx => "MX",
            NativeType::Naptr => "NAPTR",
            NativeType::Ns => "NS",
            NativeType::Ptr => "PTR",
            NativeType::Spf => "SPF",
            NativeType::Srv => "SRV",
            NativeType::Txt => "TXT",
        }
    }

    /// Parse a type tag; `None` for types the canonical model can't hold
    /// (SOA, HTTP redirection, pools, ...)
    pub fn parse(tag: &str) -> Option<Self> {
        Some(match tag.to_ascii_uppercase().as_str() {
            "A" => NativeType::A,
            "AAAA" => NativeType::Aaaa,
            "ANAME" | "ALIAS" => NativeType::Aname,
            "CAA" => NativeType::Caa,
            "CNAME" => NativeType::Cname,
            "MX" => NativeType::Mx,
            "NAPTR" => NativeType::Naptr,
            "NS" => NativeType::Ns,
            "PTR" => NativeType::Ptr,
            "SPF" => NativeType::Spf,
            "SRV" => NativeType::Srv,
            "TXT" => NativeType::Txt,
            _ => return None,
        })
    }

    /// Canonical type this tag decodes to
    pub fn record_type(&self) -> RecordType {
        match self {
            NativeType::A => RecordType::A,
            NativeType::Aaaa => RecordType::Aaaa,
            NativeType::Aname => RecordType::Alias,
            NativeType::Caa => RecordType::Caa,
            NativeType::Cname => RecordType::Cname,
            NativeType::Mx => RecordType::Mx,
            NativeType::Naptr => RecordType::Naptr,
            NativeType::Ns => RecordType::Ns,
            NativeType::Ptr => RecordType::Ptr,
            NativeType::Spf => RecordType::Spf,
            NativeType::Srv => RecordType::Srv,
            NativeType::Txt => RecordType::Txt,
        }
    }
}

impl From<RecordType> for NativeType {
    fn from(record_type: RecordType) -> Self {
        match record_type {
            RecordType::A => NativeType::A,
            RecordType::Aaaa => NativeType::Aaaa,
            RecordType::Alias => NativeType::Aname,
            RecordType::Caa => NativeType::Caa,
            RecordType::Cname => NativeType::Cname,
            RecordType::Mx => NativeType::Mx,
            RecordType::Naptr => NativeType::Naptr,
            RecordType::Ns => NativeType::Ns,
            RecordType::Ptr => NativeType::Ptr,
            RecordType::Spf => NativeType::Spf,
            RecordType::Srv => NativeType::Srv,
            RecordType::Txt => NativeType::Txt,
        }
    }
}

impl std::fmt::Display for NativeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry of `GET /domains`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NativeDomain {
    pub id: u64,
    /// Domain name without trailing dot
    pub name: String,
}

/// Entry of `GET /domains/{id}/records`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NativeRecord {
    pub id: u64,
    #[serde(rename = "type", default)]
    pub record_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ttl: u32,
    #[serde(default)]
    pub value: Value,
    #[serde(rename = "roundRobin", default)]
    pub round_robin: Vec<Value>,
    #[serde(default)]
    pub host: Option<String>,
}

impl NativeRecord {
    /// Parsed type tag, `None` when unsupported
    pub fn native_type(&self) -> Option<NativeType> {
        NativeType::parse(&self.record_type)
    }

    /// Value entries as objects, whichever field the API used
    ///
    /// Bare strings become `{"value": <string>}`.
    pub fn entries(&self) -> Vec<Value> {
        fn wrap(item: &Value) -> Value {
            match item {
                Value::String(s) => json!({ "value": s }),
                other => other.clone(),
            }
        }

        if !self.round_robin.is_empty() {
            return self.round_robin.iter().map(wrap).collect();
        }
        match &self.value {
            Value::Array(items) => items.iter().map(wrap).collect(),
            Value::String(s) => vec![json!({ "value": s })],
            _ => self
                .host
                .iter()
                .map(|h| json!({ "value": h }))
                .collect(),
        }
    }

    /// Value of a single-value record (CNAME/PTR carry it in `host`)
    pub fn single_value(&self) -> Option<String> {
        if let Some(host) = &self.host {
            return Some(host.clone());
        }
        if let Value::String(s) = &self.value {
            return Some(s.clone());
        }
        self.entries()
            .first()
            .and_then(|e| e.get("value"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// Body of `POST /domains/{id}/records/{TYPE}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativePayload {
    pub name: String,
    pub ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Mirrors one MX exchange; the provider's UI reads it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub round_robin: Vec<RoundRobinEntry>,
}

/// One element of a `roundRobin` list, shaped per type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RoundRobinEntry {
    Value {
        value: String,
    },
    Aname {
        value: String,
        #[serde(rename = "disableFlag")]
        disable_flag: bool,
    },
    Mx {
        value: String,
        level: u16,
    },
    Srv {
        priority: u16,
        weight: u16,
        value: String,
        port: u16,
    },
    Caa {
        flag: u8,
        tag: String,
        data: String,
    },
    Naptr {
        order: u16,
        preference: u16,
        flags: String,
        service: String,
        #[serde(rename = "regularExpression")]
        regular_expression: String,
        replacement: String,
    },
}

/// SOA fields sent when creating a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoaTemplate {
    pub primary_nameserver: String,
    pub email: String,
    pub ttl: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub neg_cache: u32,
}

impl Default for SoaTemplate {
    fn default() -> Self {
        Self {
            primary_nameserver: "ns11.constellix.com.".to_string(),
            email: "dns.constellix.com.".to_string(),
            ttl: 86400,
            refresh: 43200,
            retry: 3600,
            expire: 1209600,
            neg_cache: 180,
        }
    }
}

/// Defaults for domains created on first apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainTemplate {
    pub nameserver_group: u32,
    pub soa: SoaTemplate,
}

impl Default for DomainTemplate {
    fn default() -> Self {
        Self {
            nameserver_group: 1,
            soa: SoaTemplate::default(),
        }
    }
}

impl DomainTemplate {
    /// Body of `POST /domains` for `name` (no trailing dot)
    pub fn body(&self, name: &str) -> Value {
        json!({
            "names": [name],
            "nameserverGroup": self.nameserver_group,
            "soa": self.soa,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags() {
        assert_eq!(NativeType::parse("ANAME"), Some(NativeType::Aname));
        assert_eq!(NativeType::parse("alias"), Some(NativeType::Aname));
        assert_eq!(NativeType::parse("SOA"), None);
        assert_eq!(NativeType::parse("HTTPRedirection"), None);
        assert_eq!(NativeType::from(RecordType::Alias).as_str(), "ANAME");
        for record_type in RecordType::ALL {
            assert_eq!(NativeType::from(record_type).record_type(), record_type);
        }
    }

    #[test]
    fn test_entries_from_value_strings() {
        let native: NativeRecord = serde_json::from_value(json!({
            "id": 1, "type": "A", "name": "www", "ttl": 300,
            "value": ["1.2.3.4", "1.2.3.5"]
        }))
        .unwrap();
        assert_eq!(
            native.entries(),
            vec![json!({"value": "1.2.3.4"}), json!({"value": "1.2.3.5"})]
        );
    }

    #[test]
    fn test_entries_prefer_round_robin() {
        let native: NativeRecord = serde_json::from_value(json!({
            "id": 1, "type": "MX", "name": "mx", "ttl": 300,
            "value": "ignored.",
            "roundRobin": [{"value": "smtp.unit.tests.", "level": 10, "disableFlag": false}]
        }))
        .unwrap();
        assert_eq!(native.entries().len(), 1);
        assert_eq!(native.entries()[0]["level"], 10);
    }

    #[test]
    fn test_single_value_prefers_host() {
        let native: NativeRecord = serde_json::from_value(json!({
            "id": 1, "type": "CNAME", "name": "cname", "ttl": 300,
            "host": "unit.tests.", "value": "other."
        }))
        .unwrap();
        assert_eq!(native.single_value().as_deref(), Some("unit.tests."));
    }

    #[test]
    fn test_payload_omits_absent_fields() {
        let payload = NativePayload {
            name: "cname".into(),
            ttl: 300,
            host: Some("unit.tests.".into()),
            value: None,
            round_robin: Vec::new(),
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"name": "cname", "ttl": 300, "host": "unit.tests."})
        );
    }

    #[test]
    fn test_domain_template_body() {
        let body = DomainTemplate::default().body("unit.tests");
        assert_eq!(body["names"], json!(["unit.tests"]));
        assert_eq!(body["nameserverGroup"], 1);
        assert_eq!(body["soa"]["primaryNameserver"], "ns11.constellix.com.");
        assert_eq!(body["soa"]["negCache"], 180);
    }
}

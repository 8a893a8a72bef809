// Shared helpers for the Constellix wiremock suites

#![allow(dead_code)]

use serde_json::{Value, json};
use std::net::Ipv4Addr;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zonesync_core::{ProviderConfig, Record, RecordData, RecordPolicy};
use zonesync_provider_constellix::ConstellixProvider;

pub const ZONE: &str = "unit.tests.";
pub const DOMAIN_ID: u64 = 123;

/// Mock server plus a provider pointed at it
pub async fn setup() -> (MockServer, ConstellixProvider) {
    setup_with(ProviderConfig::constellix("api-key", "secret-key")).await
}

pub async fn setup_with(config: ProviderConfig) -> (MockServer, ConstellixProvider) {
    let server = MockServer::start().await;
    let uri = server.uri();
    let provider = ConstellixProvider::from_config_with_base_url(&config, Some(uri.as_str())).unwrap();
    (server, provider)
}

/// Constellix config with in-place updates and a small rate-limit delay
pub fn config(in_place_updates: bool, ratelimit_delay_ms: u64) -> ProviderConfig {
    ProviderConfig::Constellix {
        api_key: "api-key".into(),
        secret_key: "secret-key".into(),
        sandbox: false,
        ratelimit_delay_ms,
        max_attempts: 2,
        in_place_updates,
        nameserver_group: 1,
        policy: RecordPolicy::default(),
    }
}

pub fn records_path() -> String {
    format!("/domains/{}/records", DOMAIN_ID)
}

pub fn record_path(native_type: &str) -> String {
    format!("/domains/{}/records/{}", DOMAIN_ID, native_type)
}

/// `GET /domains` listing our zone, and `GET /domains/{id}` confirming it
pub async fn mount_domain(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/domains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": DOMAIN_ID, "name": "unit.tests"},
            {"id": 999, "name": "other.tests"}
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/domains/{}", DOMAIN_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": DOMAIN_ID, "name": "unit.tests"})))
        .mount(server)
        .await;
}

/// `GET /domains/{id}/records` returning `records`
pub async fn mount_records(server: &MockServer, records: Value) {
    Mock::given(method("GET"))
        .and(path(records_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(records))
        .mount(server)
        .await;
}

pub fn native_a(id: u64, name: &str, ttl: u32, ips: &[&str]) -> Value {
    json!({
        "id": id,
        "type": "A",
        "name": name,
        "ttl": ttl,
        "roundRobin": ips.iter().map(|ip| json!({"value": ip, "disableFlag": false})).collect::<Vec<_>>()
    })
}

pub fn a_record(name: &str, ttl: u32, ips: &[[u8; 4]]) -> Record {
    let ips = ips.iter().map(|o| Ipv4Addr::from(*o)).collect();
    Record::new(name, ttl, RecordData::A(ips)).unwrap()
}

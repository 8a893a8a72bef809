//! Test doubles and common utilities for sync contract tests
//!
//! [`MockZoneProvider`] keeps a zone in memory, applies plans to it and
//! counts every call, so tests can check what the engine asked for.

#![allow(dead_code)]

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use zonesync_core::error::Result;
use zonesync_core::{
    Change, Plan, Record, RecordData, RecordPolicy, RecordType, Zone, ZoneProvider,
};

pub const ZONE: &str = "unit.tests.";

/// In-memory provider that records the calls it receives
pub struct MockZoneProvider {
    /// Zone as "stored" on the provider; `None` = domain absent
    stored: Arc<Mutex<Option<Zone>>>,
    /// Call counter for populate()
    populate_call_count: Arc<AtomicUsize>,
    /// Call counter for apply()
    apply_call_count: Arc<AtomicUsize>,
    /// Change kinds seen by apply(), in order
    applied_kinds: Arc<Mutex<Vec<&'static str>>>,
    /// Types this provider can hold
    supported: Vec<RecordType>,
    policy: RecordPolicy,
}

impl MockZoneProvider {
    /// Provider without the domain
    pub fn new() -> Self {
        Self {
            stored: Arc::new(Mutex::new(None)),
            populate_call_count: Arc::new(AtomicUsize::new(0)),
            apply_call_count: Arc::new(AtomicUsize::new(0)),
            applied_kinds: Arc::new(Mutex::new(Vec::new())),
            supported: RecordType::ALL.to_vec(),
            policy: RecordPolicy::default(),
        }
    }

    /// Provider already holding `zone`
    pub fn holding(zone: Zone) -> Self {
        let provider = Self::new();
        *provider.stored.lock().unwrap() = Some(zone);
        provider
    }

    pub fn with_supported(mut self, supported: Vec<RecordType>) -> Self {
        self.supported = supported;
        self
    }

    pub fn with_policy(mut self, policy: RecordPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Create a handle that shares state and counters with `other`
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            stored: Arc::clone(&other.stored),
            populate_call_count: Arc::clone(&other.populate_call_count),
            apply_call_count: Arc::clone(&other.apply_call_count),
            applied_kinds: Arc::clone(&other.applied_kinds),
            supported: other.supported.clone(),
            policy: other.policy.clone(),
        }
    }

    pub fn populate_call_count(&self) -> usize {
        self.populate_call_count.load(Ordering::SeqCst)
    }

    pub fn apply_call_count(&self) -> usize {
        self.apply_call_count.load(Ordering::SeqCst)
    }

    pub fn applied_kinds(&self) -> Vec<&'static str> {
        self.applied_kinds.lock().unwrap().clone()
    }

    pub fn stored(&self) -> Option<Zone> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ZoneProvider for MockZoneProvider {
    async fn populate(&self, zone: &mut Zone, _target: bool) -> Result<bool> {
        self.populate_call_count.fetch_add(1, Ordering::SeqCst);

        let stored = self.stored.lock().unwrap().clone();
        let Some(stored) = stored else {
            return Ok(false);
        };
        let mut added = false;
        for record in stored.records() {
            zone.add_record(record.clone())?;
            added = true;
        }
        Ok(added)
    }

    async fn apply(&self, plan: &Plan) -> Result<usize> {
        self.apply_call_count.fetch_add(1, Ordering::SeqCst);

        let mut stored = self.stored.lock().unwrap();
        let zone = stored.get_or_insert(Zone::new(plan.zone_name())?);
        for change in plan.changes() {
            self.applied_kinds.lock().unwrap().push(change.kind());
            match change {
                Change::Create(new) | Change::Update { new, .. } => {
                    zone.remove_record(new.name(), new.record_type());
                    zone.add_record(new.clone())?;
                }
                Change::Delete(existing) => {
                    zone.remove_record(existing.name(), existing.record_type());
                }
            }
        }
        Ok(plan.len())
    }

    fn supports(&self, record_type: RecordType) -> bool {
        self.supported.contains(&record_type)
    }

    fn policy(&self) -> &RecordPolicy {
        &self.policy
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

pub fn a_record(name: &str, ttl: u32, ips: &[[u8; 4]]) -> Record {
    let ips = ips.iter().map(|o| Ipv4Addr::from(*o)).collect();
    Record::new(name, ttl, RecordData::A(ips)).unwrap()
}

pub fn txt_record(name: &str, ttl: u32, values: &[&str]) -> Record {
    let values = values.iter().map(|v| v.to_string()).collect();
    Record::new(name, ttl, RecordData::Txt(values)).unwrap()
}

pub fn ns_record(name: &str, hosts: &[&str]) -> Record {
    let hosts = hosts.iter().map(|h| h.to_string()).collect();
    Record::new(name, 3600, RecordData::Ns(hosts)).unwrap()
}

/// Zone used by most scenarios
pub fn desired_zone() -> Zone {
    Zone::with_records(
        ZONE,
        [
            a_record("", 300, &[[1, 2, 3, 4], [1, 2, 3, 5]]),
            a_record("www", 300, &[[2, 2, 3, 6]]),
            txt_record("txt", 600, &["v=spf1 -all"]),
        ],
    )
    .unwrap()
}

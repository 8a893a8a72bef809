//! Per-provider lookup cache
//!
//! Remembers domain IDs and raw record listings so a plan/apply cycle does
//! not list the same zone twice. Entries for a zone are dropped after every
//! apply touching it. Misses are never cached: an unknown domain is looked
//! up again on the next call.

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use zonesync_core::{Lookup, Result};

use crate::client::ConstellixClient;
use crate::native::NativeRecord;

/// Domain ID and record listing cache, keyed by zone name with trailing dot
#[derive(Debug, Default)]
pub struct ZoneCache {
    domains: RwLock<HashMap<String, u64>>,
    records: RwLock<HashMap<String, Vec<NativeRecord>>>,
}

impl ZoneCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Domain ID of `zone_name`, listing domains when it isn't known yet
    ///
    /// # Returns
    ///
    /// - `Lookup::Found(id)`: The domain exists on the account
    /// - `Lookup::NotFound`: No such domain (or the listing itself was a 404)
    pub async fn domain_id(&self, client: &ConstellixClient, zone_name: &str) -> Result<Lookup<u64>> {
        if let Some(id) = self.domains.read().await.get(zone_name) {
            return Ok(Lookup::Found(*id));
        }

        let domains = match client.list_domains().await? {
            Lookup::Found(domains) => domains,
            Lookup::NotFound => return Ok(Lookup::NotFound),
        };
        debug!("Listed {} domain(s)", domains.len());

        let mut cached = self.domains.write().await;
        for domain in domains {
            cached.insert(format!("{}.", domain.name.to_ascii_lowercase()), domain.id);
        }
        Ok(match cached.get(zone_name) {
            Some(id) => Lookup::Found(*id),
            None => Lookup::NotFound,
        })
    }

    /// Native records of `zone_name`
    ///
    /// `Lookup::NotFound` when the domain does not exist.
    pub async fn records(
        &self,
        client: &ConstellixClient,
        zone_name: &str,
    ) -> Result<Lookup<Vec<NativeRecord>>> {
        if let Some(records) = self.records.read().await.get(zone_name) {
            return Ok(Lookup::Found(records.clone()));
        }

        let domain_id = match self.domain_id(client, zone_name).await? {
            Lookup::Found(id) => id,
            Lookup::NotFound => return Ok(Lookup::NotFound),
        };
        let records = match client.list_records(domain_id).await? {
            Lookup::Found(records) => records,
            Lookup::NotFound => return Ok(Lookup::NotFound),
        };

        self.records
            .write()
            .await
            .insert(zone_name.to_string(), records.clone());
        Ok(Lookup::Found(records))
    }

    /// Record a freshly created domain
    pub async fn remember_domain(&self, zone_name: &str, domain_id: u64) {
        self.domains
            .write()
            .await
            .insert(zone_name.to_string(), domain_id);
    }

    /// Forget the record listing of `zone_name`, and its ID
    pub async fn invalidate(&self, zone_name: &str) {
        self.records.write().await.remove(zone_name);
        self.domains.write().await.remove(zone_name);
    }
}

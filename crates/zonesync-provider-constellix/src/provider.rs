//! Constellix [`ZoneProvider`] implementation
//!
//! ## Populate
//!
//! Native records are grouped by (name, type) and each group is folded into
//! one canonical record. Types the canonical model can't hold and records
//! the [`RecordPolicy`] keeps out of reach are skipped.
//!
//! ## Apply
//!
//! Every create/update payload is translated before the first API call, so
//! an untranslatable record fails the plan without touching the provider.
//! Changes then run in plan order:
//!
//! - **Create**: one `POST` per record, creating the domain first if needed
//! - **Update**: `DELETE` every native record behind the existing record,
//!   then `POST` the new one (or a single `PUT` with in-place updates)
//! - **Delete**: one `DELETE` per native record
//!
//! The zone's cache entries are dropped once the plan has run, whether it
//! succeeded or not.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use zonesync_core::{
    Change, Error, Lookup, Plan, ProviderConfig, Record, RecordPolicy, RecordType, Result, Zone,
    ZoneProvider,
};

use crate::cache::ZoneCache;
use crate::client::{ConstellixClient, PRODUCTION_API_ROOT, RetryPolicy, SANDBOX_API_ROOT};
use crate::native::{DomainTemplate, NativePayload, NativeRecord, NativeType};
use crate::translate::{from_native, to_native};

const PROVIDER_NAME: &str = "constellix";

/// Constellix DNS provider
#[derive(Debug)]
pub struct ConstellixProvider {
    client: ConstellixClient,
    cache: ZoneCache,
    policy: RecordPolicy,
    in_place_updates: bool,
    domain_template: DomainTemplate,
}

impl ConstellixProvider {
    /// Create a provider around an existing client
    pub fn new(client: ConstellixClient, policy: RecordPolicy) -> Self {
        Self {
            client,
            cache: ZoneCache::new(),
            policy,
            in_place_updates: false,
            domain_template: DomainTemplate::default(),
        }
    }

    /// Build a provider from a `ProviderConfig::Constellix`
    ///
    /// # Errors
    ///
    /// `Error::Config` for any other variant or for empty credentials
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        Self::from_config_with_base_url(config, None)
    }

    /// [`ConstellixProvider::from_config`] against an explicit API root
    pub fn from_config_with_base_url(config: &ProviderConfig, base_url: Option<&str>) -> Result<Self> {
        config.validate()?;
        match config {
            ProviderConfig::Constellix {
                api_key,
                secret_key,
                sandbox,
                ratelimit_delay_ms,
                max_attempts,
                in_place_updates,
                nameserver_group,
                policy,
            } => {
                let root = base_url.unwrap_or(if *sandbox {
                    SANDBOX_API_ROOT
                } else {
                    PRODUCTION_API_ROOT
                });
                let retry = RetryPolicy {
                    max_attempts: *max_attempts,
                    delay: Duration::from_millis(*ratelimit_delay_ms),
                };
                let client = ConstellixClient::new(api_key.clone(), secret_key.clone(), root, retry)?;
                let template = DomainTemplate {
                    nameserver_group: *nameserver_group,
                    ..DomainTemplate::default()
                };
                Ok(Self::new(client, policy.clone())
                    .with_in_place_updates(*in_place_updates)
                    .with_domain_template(template))
            }
            other => Err(Error::config(format!(
                "Invalid config type for Constellix provider: {}",
                other.type_name()
            ))),
        }
    }

    /// Issue `PUT` for updates backed by exactly one native record
    pub fn with_in_place_updates(mut self, enabled: bool) -> Self {
        self.in_place_updates = enabled;
        self
    }

    /// Override the nameserver group / SOA used for new domains
    pub fn with_domain_template(mut self, template: DomainTemplate) -> Self {
        self.domain_template = template;
        self
    }

    /// The provider's lookup cache
    pub fn cache(&self) -> &ZoneCache {
        &self.cache
    }

    /// The underlying API client
    pub fn client(&self) -> &ConstellixClient {
        &self.client
    }

    /// Domain ID for `zone_name`, creating the domain when it doesn't exist
    async fn ensure_domain(&self, zone_name: &str) -> Result<u64> {
        if let Lookup::Found(id) = self.cache.domain_id(&self.client, zone_name).await? {
            if self.client.get_domain(id).await?.is_found() {
                return Ok(id);
            }
            warn!("Cached domain ID {} for {} is stale", id, zone_name);
            // Record listings of the old domain must not resolve IDs on the new one
            self.cache.invalidate(zone_name).await;
        }

        let name = zone_name.trim_end_matches('.');
        info!("Creating domain {}", name);
        let id = self.client.create_domain(name, &self.domain_template).await?;
        self.cache.remember_domain(zone_name, id).await;
        Ok(id)
    }

    /// IDs of the native records currently behind `record`
    async fn native_ids(&self, zone_name: &str, record: &Record) -> Result<Vec<u64>> {
        let natives = match self.cache.records(&self.client, zone_name).await? {
            Lookup::Found(natives) => natives,
            Lookup::NotFound => return Ok(Vec::new()),
        };
        let native_type = NativeType::from(record.record_type());
        Ok(natives
            .iter()
            .filter(|n| n.native_type() == Some(native_type) && n.name.eq_ignore_ascii_case(record.name()))
            .map(|n| n.id)
            .collect())
    }

    async fn delete_natives(&self, domain_id: u64, zone_name: &str, record: &Record) -> Result<()> {
        let native_type = NativeType::from(record.record_type());
        let ids = self.native_ids(zone_name, record).await?;
        if ids.is_empty() {
            warn!("No native records found for {}, nothing to delete", record);
        }
        for id in ids {
            self.client.delete_record(domain_id, native_type, id).await?;
        }
        Ok(())
    }

    async fn apply_changes(&self, plan: &Plan, payloads: &[Option<(NativeType, NativePayload)>]) -> Result<()> {
        let zone_name = plan.zone_name();
        let domain_id = self.ensure_domain(zone_name).await?;

        for (change, payload) in plan.changes().iter().zip(payloads) {
            match (change, payload) {
                (Change::Create(_), Some((native_type, payload))) => {
                    self.client.create_record(domain_id, *native_type, payload).await?;
                }
                (Change::Update { existing, .. }, Some((native_type, payload))) => {
                    let ids = self.native_ids(zone_name, existing).await?;
                    match ids.as_slice() {
                        [id] if self.in_place_updates => {
                            self.client
                                .update_record(domain_id, *native_type, *id, payload)
                                .await?;
                        }
                        _ => {
                            self.delete_natives(domain_id, zone_name, existing).await?;
                            self.client.create_record(domain_id, *native_type, payload).await?;
                        }
                    }
                }
                (Change::Delete(existing), _) => {
                    self.delete_natives(domain_id, zone_name, existing).await?;
                }
                (change, None) => {
                    return Err(Error::translation(format!("no payload for {}", change)));
                }
            }
            info!("{}", change);
        }
        Ok(())
    }
}

#[async_trait]
impl ZoneProvider for ConstellixProvider {
    async fn populate(&self, zone: &mut Zone, target: bool) -> Result<bool> {
        debug!("populate: name={}, target={}", zone.name(), target);

        let natives = match self.cache.records(&self.client, zone.name()).await? {
            Lookup::Found(natives) => natives,
            Lookup::NotFound => {
                debug!("Domain {} does not exist yet", zone.name());
                return Ok(false);
            }
        };

        let mut groups: BTreeMap<(String, NativeType), Vec<NativeRecord>> = BTreeMap::new();
        for native in natives {
            let Some(native_type) = native.native_type() else {
                warn!(
                    "Skipping unsupported {} record '{}' in {}",
                    native.record_type,
                    native.name,
                    zone.name()
                );
                continue;
            };
            let name = native.name.to_ascii_lowercase();
            if !self.policy.allows(&name, native_type.record_type()) {
                debug!("Policy skips {} {}", name, native_type);
                continue;
            }
            groups.entry((name, native_type)).or_default().push(native);
        }

        let mut added = 0;
        for natives in groups.values() {
            zone.add_record(from_native(zone.name(), natives)?)?;
            added += 1;
        }

        info!("Populated {} record(s) for {}", added, zone.name());
        Ok(added > 0)
    }

    async fn apply(&self, plan: &Plan) -> Result<usize> {
        if plan.is_empty() {
            return Ok(0);
        }

        let payloads = plan
            .changes()
            .iter()
            .map(|change| match change {
                Change::Delete(_) => Ok(None),
                other => to_native(other.record()).map(Some),
            })
            .collect::<Result<Vec<_>>>()?;

        let result = self.apply_changes(plan, &payloads).await;
        self.cache.invalidate(plan.zone_name()).await;
        result?;

        Ok(plan.len())
    }

    fn supports(&self, record_type: RecordType) -> bool {
        RecordType::ALL.contains(&record_type)
    }

    fn policy(&self) -> &RecordPolicy {
        &self.policy
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

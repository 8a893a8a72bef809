//! Sync engine
//!
//! The SyncEngine is responsible for:
//! - Populating the current state of a zone from the provider
//! - Dropping records the provider cannot or must not manage
//! - Diffing current against desired into a [`Plan`]
//! - Applying the plan (unless running dry)
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐  populate   ┌──────────────┐
//! │ ZoneProvider │────────────▶│ current Zone │──┐
//! └──────────────┘             └──────────────┘  │  diff  ┌──────┐  apply
//!        ▲                     ┌──────────────┐  ├───────▶│ Plan │────────┐
//!        │                     │ desired Zone │──┘        └──────┘        │
//!        │                     └──────────────┘                           │
//!        └────────────────────────────────────────────────────────────────┘
//! ```

use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::{Record, Zone};
use crate::plan::Plan;
use crate::traits::ZoneProvider;
use tracing::{debug, info, warn};

/// Outcome of one [`SyncEngine::sync`] pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// Changes in the computed plan
    pub planned: usize,
    /// Changes the provider applied (0 on dry runs)
    pub applied: usize,
}

/// Orchestrates populate → diff → apply against one provider
pub struct SyncEngine {
    provider: Box<dyn ZoneProvider>,
    dry_run: bool,
}

impl SyncEngine {
    /// Create a new engine around `provider`
    pub fn new(provider: Box<dyn ZoneProvider>, config: EngineConfig) -> Self {
        Self {
            provider,
            dry_run: config.dry_run,
        }
    }

    /// Compute the plan that converges the provider onto `desired`
    ///
    /// Records of unsupported types, and records the provider's policy
    /// keeps out of reach, are left out of both sides before diffing.
    pub async fn plan(&self, desired: &Zone) -> Result<Plan> {
        let mut existing = Zone::new(desired.name())?;
        let exists = self.provider.populate(&mut existing, true).await?;
        debug!(
            "Populated {} record(s) for {} from {} (exists: {})",
            existing.len(),
            existing.name(),
            self.provider.provider_name(),
            exists
        );

        let desired = desired.filtered(|record| self.manageable(record, true));
        let existing = existing.filtered(|record| self.manageable(record, false));

        let plan = Plan::between(existing, desired, exists);
        debug!(
            "Planning {}: {} existing and {} desired record(s) in scope",
            plan.zone_name(),
            plan.existing().len(),
            plan.desired().len()
        );
        for change in plan.changes() {
            debug!("Planned: {}", change);
        }
        Ok(plan)
    }

    /// Plan and, unless dry-running, apply
    pub async fn sync(&self, desired: &Zone) -> Result<SyncReport> {
        let plan = self.plan(desired).await?;
        let planned = plan.len();

        if plan.is_empty() {
            info!("{} is up to date on {}", plan.zone_name(), self.provider.provider_name());
            return Ok(SyncReport { planned, applied: 0 });
        }

        if self.dry_run {
            info!(
                "[DRY-RUN] {} change(s) planned for {}, not applying",
                planned,
                plan.zone_name()
            );
            return Ok(SyncReport { planned, applied: 0 });
        }

        info!("Applying {} change(s) to {}", planned, plan.zone_name());
        let applied = self.provider.apply(&plan).await?;
        info!("Applied {} change(s) to {}", applied, plan.zone_name());

        Ok(SyncReport { planned, applied })
    }

    fn manageable(&self, record: &Record, warn_on_skip: bool) -> bool {
        if !self.provider.supports(record.record_type()) {
            if warn_on_skip {
                warn!(
                    "{} does not support {} records, skipping {}",
                    self.provider.provider_name(),
                    record.record_type(),
                    record
                );
            }
            return false;
        }
        if !self.provider.policy().allows_record(record) {
            debug!("Policy excludes {}", record);
            return false;
        }
        true
    }
}

// # Zone Provider Trait
//
// Defines the interface a DNS hosting provider implements to take part in
// zone synchronization.
//
// ## Implementations
//
// - Constellix: `zonesync-provider-constellix` crate
//
// ## Usage
//
// ```rust,ignore
// use zonesync_core::{Plan, Zone, ZoneProvider};
//
// async fn converge(provider: &dyn ZoneProvider, desired: Zone) -> zonesync_core::Result<usize> {
//     let mut existing = Zone::new(desired.name())?;
//     let exists = provider.populate(&mut existing, true).await?;
//     let plan = Plan::between(existing, desired, exists);
//     provider.apply(&plan).await
// }
// ```

use async_trait::async_trait;

use crate::config::RecordPolicy;
use crate::model::{RecordType, Zone};
use crate::plan::Plan;

/// Trait for DNS provider implementations
///
/// Implementations translate between the canonical model and the
/// provider's API. They own their caches; nothing here is process-global.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`, but a single provider instance
/// assumes one logical populate/apply pass at a time.
#[async_trait]
pub trait ZoneProvider: Send + Sync {
    /// Add the provider's current records for `zone` to `zone`
    ///
    /// A zone the provider doesn't know is not an error: nothing is added.
    ///
    /// # Parameters
    ///
    /// - `zone`: Zone to fill; its name selects the provider-side domain
    /// - `target`: Whether the provider is being read as a sync target
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: At least one record was added
    /// - `Ok(false)`: Zone absent or holds nothing manageable
    /// - `Err(Error)`: Authentication, HTTP, or decoding failures
    async fn populate(&self, zone: &mut Zone, target: bool) -> Result<bool, crate::Error>;

    /// Apply every change of `plan`, in order
    ///
    /// Fails fast: the first failing call aborts the rest of the plan and
    /// nothing already applied is rolled back.
    ///
    /// # Returns
    ///
    /// The number of canonical changes applied (not the number of API calls)
    async fn apply(&self, plan: &Plan) -> Result<usize, crate::Error>;

    /// Whether the provider can represent records of this type
    fn supports(&self, record_type: RecordType) -> bool;

    /// Administrative policy applied when planning against this provider
    fn policy(&self) -> &RecordPolicy;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing zone providers from configuration
pub trait ZoneProviderFactory: Send + Sync {
    /// Create a ZoneProvider instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn ZoneProvider>, crate::Error>;
}

// # Constellix DNS Provider
//
// This crate provides the Constellix DNS provider for zonesync.
//
// ## Components
//
// - `client`: Signed, paced HTTP transport with a single retry on locked resources
// - `cache`: Domain ID and record listing cache owned by the provider instance
// - `native`: Constellix v1 wire shapes
// - `translate`: Canonical record ↔ native record translation
// - `provider`: Populate (native → Zone) and apply (Plan → API calls)
//
// ## Security Requirements
//
// - API key and secret NEVER appear in logs or `Debug` output
// - Provider MUST fail fast if either credential is empty
//
// ## API Reference
//
// - Constellix DNS API v1: https://api-docs.constellix.com/
// - List domains: GET `/domains`
// - List records: GET `/domains/:id/records`
// - Create record: POST `/domains/:id/records/:type`
// - Delete record: DELETE `/domains/:id/records/:type/:record_id`

pub mod cache;
pub mod client;
pub mod native;
pub mod provider;
pub mod translate;

pub use cache::ZoneCache;
pub use client::{ConstellixClient, PRODUCTION_API_ROOT, RetryPolicy, SANDBOX_API_ROOT};
pub use native::{DomainTemplate, NativeType, SoaTemplate};
pub use provider::ConstellixProvider;

use zonesync_core::config::ProviderConfig;
use zonesync_core::traits::{ZoneProvider, ZoneProviderFactory};
use zonesync_core::{Error, Result};

/// Factory for creating Constellix providers
pub struct ConstellixFactory;

impl ZoneProviderFactory for ConstellixFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn ZoneProvider>> {
        match config {
            ProviderConfig::Constellix { .. } => {
                Ok(Box::new(ConstellixProvider::from_config(config)?))
            }
            _ => Err(Error::config("Invalid config type for Constellix provider")),
        }
    }
}

/// Register the Constellix provider with a registry
///
/// # Example
///
/// ```rust,ignore
/// use zonesync_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// zonesync_provider_constellix::register(&registry);
/// ```
pub fn register(registry: &zonesync_core::ProviderRegistry) {
    registry.register_provider("constellix", Box::new(ConstellixFactory));
}

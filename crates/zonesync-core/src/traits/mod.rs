//! Core traits for zone synchronization
//!
//! - [`ZoneProvider`]: Read and write a zone on a DNS hosting provider
//! - [`ZoneProviderFactory`]: Build providers from configuration

pub mod zone_provider;

pub use zone_provider::{ZoneProvider, ZoneProviderFactory};

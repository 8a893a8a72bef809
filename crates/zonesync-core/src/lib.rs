// # zonesync-core
//
// Core library for converging DNS zones onto hosting providers.
//
// ## Architecture Overview
//
// This library provides the provider-neutral half of zone synchronization:
// - **Zone / Record**: Canonical model, unique per (name, type)
// - **Plan / Change**: Diff engine producing Creates → Updates → Deletes
// - **ZoneProvider**: Trait for reading and writing a zone on a provider
// - **SyncEngine**: Orchestrates populate → diff → apply
// - **ProviderRegistry**: Plugin-based registry for providers
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Provider wire formats live in provider crates
// 2. **Closed Types**: Record types are an enum; adding one is a compile error
//    everywhere it is not handled
// 3. **Plugin-Based**: Providers are registered dynamically, no hard-coded if-else
// 4. **Library-First**: All core functionality can be used as a library
// 5. **Idempotency**: Diffing a zone against itself yields an empty plan

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod plan;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use config::{EngineConfig, ProviderConfig, RecordPolicy, SyncConfig};
pub use engine::{SyncEngine, SyncReport};
pub use error::{Error, Lookup, Result};
pub use model::{CaaValue, MxValue, NaptrValue, Record, RecordData, RecordType, SrvValue, Zone};
pub use plan::{Change, Plan, diff};
pub use registry::ProviderRegistry;
pub use traits::{ZoneProvider, ZoneProviderFactory};

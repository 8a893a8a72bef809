//! Configuration types for zone synchronization
//!
//! This module defines all configuration structures used throughout the workspace.

use serde::{Deserialize, Serialize};

use crate::model::{Record, RecordType};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl SyncConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Constellix DNS (REST API v1)
    Constellix {
        /// API key, sent with every request
        api_key: String,
        /// Secret used to sign the request timestamp
        secret_key: String,
        /// Use the sandbox API root instead of production
        #[serde(default)]
        sandbox: bool,
        /// Minimum spacing between requests and delay before a lock retry
        #[serde(default)]
        ratelimit_delay_ms: u64,
        /// Attempts per request when the provider reports a locked resource
        #[serde(default = "default_max_attempts")]
        max_attempts: u32,
        /// Issue PUT for single-record updates instead of delete + create
        #[serde(default)]
        in_place_updates: bool,
        /// Nameserver group assigned to domains created on first apply
        #[serde(default = "default_nameserver_group")]
        nameserver_group: u32,
        /// Administrative record policy
        #[serde(default)]
        policy: RecordPolicy,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

// Secrets never reach logs
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Constellix {
                sandbox,
                ratelimit_delay_ms,
                max_attempts,
                in_place_updates,
                nameserver_group,
                policy,
                ..
            } => f
                .debug_struct("Constellix")
                .field("api_key", &"<REDACTED>")
                .field("secret_key", &"<REDACTED>")
                .field("sandbox", sandbox)
                .field("ratelimit_delay_ms", ratelimit_delay_ms)
                .field("max_attempts", max_attempts)
                .field("in_place_updates", in_place_updates)
                .field("nameserver_group", nameserver_group)
                .field("policy", policy)
                .finish(),
            ProviderConfig::Custom { factory, config } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", config)
                .finish(),
        }
    }
}

impl ProviderConfig {
    /// Constellix configuration with defaults for everything but credentials
    pub fn constellix(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        ProviderConfig::Constellix {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            sandbox: false,
            ratelimit_delay_ms: 0,
            max_attempts: default_max_attempts(),
            in_place_updates: false,
            nameserver_group: default_nameserver_group(),
            policy: RecordPolicy::default(),
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Constellix {
                api_key,
                secret_key,
                max_attempts,
                nameserver_group,
                ..
            } => {
                if api_key.is_empty() {
                    return Err(crate::Error::config("Constellix API key cannot be empty"));
                }
                if secret_key.is_empty() {
                    return Err(crate::Error::config("Constellix secret key cannot be empty"));
                }
                if *max_attempts == 0 {
                    return Err(crate::Error::config("max_attempts must be at least 1"));
                }
                if *nameserver_group == 0 {
                    return Err(crate::Error::config("nameserver_group must be at least 1"));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Constellix { .. } => "constellix",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::constellix(String::new(), String::new())
    }
}

/// Which records are administratively out of reach
///
/// The apex NS set is owned by the provider unless `manage_root_ns` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPolicy {
    /// Treat the apex NS record as user-manageable
    #[serde(default)]
    pub manage_root_ns: bool,

    /// Types never populated nor planned
    #[serde(default)]
    pub excluded_types: Vec<RecordType>,
}

impl RecordPolicy {
    /// Whether a record with this name and type may be managed
    pub fn allows(&self, name: &str, record_type: RecordType) -> bool {
        if self.excluded_types.contains(&record_type) {
            return false;
        }
        !(name.is_empty() && record_type == RecordType::Ns && !self.manage_root_ns)
    }

    /// [`RecordPolicy::allows`] for an existing record
    pub fn allows_record(&self, record: &Record) -> bool {
        self.allows(record.name(), record.record_type())
    }
}

/// Engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Compute and log plans without applying them
    #[serde(default)]
    pub dry_run: bool,
}

fn default_max_attempts() -> u32 {
    2
}

fn default_nameserver_group() -> u32 {
    1
}

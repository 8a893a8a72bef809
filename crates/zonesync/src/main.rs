// # zonesync - Zone Synchronization CLI
//
// Thin integration layer: all DNS logic lives in zonesync-core and the
// provider crates. This binary is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering providers
// 4. Running one `dump` or `sync` pass
//
// ## Usage
//
// ```bash
// zonesync dump unit.tests. > unit.tests.json
// zonesync sync unit.tests.json
// ```
//
// ## Configuration
//
// Every setting is a flag placed before the subcommand, and falls back to
// its environment variable.
//
// ### DNS Provider
// - `--provider-type` / `ZONESYNC_PROVIDER_TYPE`: Provider type (constellix)
// - `--api-key` / `ZONESYNC_API_KEY`: API key
// - `--secret-key` / `ZONESYNC_SECRET_KEY`: Secret key
// - `--sandbox` / `ZONESYNC_SANDBOX`: Use the provider's sandbox API
// - `--ratelimit-delay-ms` / `ZONESYNC_RATELIMIT_DELAY_MS`: Spacing between requests, and lock retry delay
// - `--in-place-updates` / `ZONESYNC_IN_PLACE_UPDATES`: Update single records with PUT
// - `--nameserver-group` / `ZONESYNC_NAMESERVER_GROUP`: Nameserver group for new domains
//
// ### Records
// - `--manage-root-ns` / `ZONESYNC_MANAGE_ROOT_NS`: Manage the apex NS record
// - `--excluded-types` / `ZONESYNC_EXCLUDED_TYPES`: Comma-separated record types to leave alone
//
// ### Engine
// - `--dry-run` / `ZONESYNC_DRY_RUN`: Plan without applying
// - `--log-level` / `ZONESYNC_LOG_LEVEL`: trace, debug, info, warn, error

mod snapshot;

use anyhow::Result;
use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;
use zonesync_core::{
    EngineConfig, ProviderConfig, ProviderRegistry, RecordPolicy, RecordType, SyncConfig,
    SyncEngine, Zone,
};

use snapshot::Snapshot;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum ZonesyncExitCode {
    /// Pass completed
    Success = 0,
    /// Configuration or usage error
    ConfigError = 1,
    /// Provider or runtime failure
    RuntimeError = 2,
}

impl From<ZonesyncExitCode> for ExitCode {
    fn from(code: ZonesyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Synchronize DNS zones between snapshot files and a provider
#[derive(Parser)]
#[command(name = "zonesync", version, about)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

/// What to do this run
#[derive(Subcommand, Debug)]
enum Command {
    /// Populate a zone and print it as a snapshot
    Dump {
        /// Zone name; a trailing dot is added when missing
        #[arg(value_parser = parse_zone)]
        zone: String,
    },
    /// Converge the provider onto a snapshot file
    Sync {
        /// Snapshot written by `dump`
        snapshot: PathBuf,
    },
}

/// Application configuration
#[derive(Args)]
struct Config {
    /// Provider type
    #[arg(long, env = "ZONESYNC_PROVIDER_TYPE", default_value = "constellix")]
    provider_type: String,

    /// API key
    #[arg(long, env = "ZONESYNC_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Secret key
    #[arg(long, env = "ZONESYNC_SECRET_KEY", hide_env_values = true)]
    secret_key: String,

    /// Use the provider's sandbox API
    #[arg(long, env = "ZONESYNC_SANDBOX", value_parser = BoolishValueParser::new())]
    sandbox: bool,

    /// Spacing between requests, and lock retry delay
    #[arg(
        long,
        env = "ZONESYNC_RATELIMIT_DELAY_MS",
        default_value_t = 0,
        value_parser = clap::value_parser!(u64).range(0..=60_000)
    )]
    ratelimit_delay_ms: u64,

    /// Update records backed by a single native record with PUT
    #[arg(long, env = "ZONESYNC_IN_PLACE_UPDATES", value_parser = BoolishValueParser::new())]
    in_place_updates: bool,

    /// Nameserver group assigned to domains created on first sync
    #[arg(
        long,
        env = "ZONESYNC_NAMESERVER_GROUP",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    nameserver_group: u32,

    /// Manage the apex NS record
    #[arg(long, env = "ZONESYNC_MANAGE_ROOT_NS", value_parser = BoolishValueParser::new())]
    manage_root_ns: bool,

    /// Record types to leave alone
    #[arg(
        long,
        env = "ZONESYNC_EXCLUDED_TYPES",
        value_delimiter = ',',
        value_parser = parse_record_type
    )]
    excluded_types: Vec<RecordType>,

    /// Plan without applying
    #[arg(long, env = "ZONESYNC_DRY_RUN", value_parser = BoolishValueParser::new())]
    dry_run: bool,

    /// trace, debug, info, warn, error
    #[arg(long, env = "ZONESYNC_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Config {
    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.provider_type.as_str() {
            "constellix" => {}
            _ => anyhow::bail!(
                "provider type '{}' is not supported. \
                Supported providers: constellix",
                self.provider_type
            ),
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "log level '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        self.sync_config().validate()?;
        Ok(())
    }

    fn sync_config(&self) -> SyncConfig {
        let provider = ProviderConfig::Constellix {
            api_key: self.api_key.clone(),
            secret_key: self.secret_key.clone(),
            sandbox: self.sandbox,
            ratelimit_delay_ms: self.ratelimit_delay_ms,
            max_attempts: 2,
            in_place_updates: self.in_place_updates,
            nameserver_group: self.nameserver_group,
            policy: RecordPolicy {
                manage_root_ns: self.manage_root_ns,
                excluded_types: self.excluded_types.clone(),
            },
        };
        SyncConfig {
            provider,
            engine: EngineConfig {
                dry_run: self.dry_run,
            },
        }
    }
}

fn parse_zone(raw: &str) -> Result<String, String> {
    let zone = raw.trim();
    if zone.is_empty() || zone == "." {
        return Err("zone name is empty".to_string());
    }
    Ok(if zone.ends_with('.') {
        zone.to_string()
    } else {
        format!("{}.", zone)
    })
}

fn parse_record_type(raw: &str) -> zonesync_core::Result<RecordType> {
    raw.trim().parse()
}

fn main() -> ExitCode {
    let Cli { config, command } = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ZonesyncExitCode::ConfigError
            } else {
                ZonesyncExitCode::Success
            }
            .into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return ZonesyncExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so `dump` output stays clean
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ZonesyncExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ZonesyncExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run(config, command).await {
            error!("{:#}", e);
            ZonesyncExitCode::RuntimeError
        } else {
            ZonesyncExitCode::Success
        }
    });

    result.into()
}

async fn run(config: Config, command: Command) -> Result<()> {
    let registry = ProviderRegistry::new();

    #[cfg(feature = "constellix")]
    {
        info!("Registering Constellix provider");
        zonesync_provider_constellix::register(&registry);
    }

    let sync_config = config.sync_config();
    info!("Provider: {:?}", sync_config.provider);
    let provider = registry.create_provider(&sync_config.provider)?;

    match command {
        Command::Dump { zone } => {
            let mut current = Zone::new(zone)?;
            let exists = provider.populate(&mut current, false).await?;
            if !exists {
                info!("{} has no records on the provider", current.name());
            }
            let out = serde_json::to_string_pretty(&Snapshot::from_zone(&current))?;
            println!("{}", out);
        }
        Command::Sync { snapshot } => {
            let desired = Snapshot::load(&snapshot)?.into_zone()?;
            let engine = SyncEngine::new(provider, sync_config.engine);
            let report = engine.sync(&desired).await?;
            info!(
                "{}: {} change(s) planned, {} applied",
                desired.name(),
                report.planned,
                report.applied
            );
        }
    }

    Ok(())
}

mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{ApiSettings, LogSettings, Settings, StorageSettings, SyncSettings};

/// Prefix for environment overrides, e.g. `EXPENSE__API__BASE_URL`.
pub const ENV_PREFIX: &str = "EXPENSE";

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct covering api, storage, sync and log sections
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    let api = partial.api.as_ref();
    let storage = partial.storage.as_ref();
    let sync = partial.sync.as_ref();
    let log = partial.log.as_ref();

    Ok(Settings {
        api: ApiSettings {
            base_url: api
                .and_then(|a| a.base_url.clone())
                .unwrap_or(default.api.base_url),
            timeout_secs: api
                .and_then(|a| a.timeout_secs)
                .unwrap_or(default.api.timeout_secs),
        },
        storage: StorageSettings {
            path: storage
                .and_then(|s| s.path.clone())
                .unwrap_or(default.storage.path),
            queue_key: storage
                .and_then(|s| s.queue_key.clone())
                .unwrap_or(default.storage.queue_key),
        },
        sync: SyncSettings {
            probe_interval_secs: sync
                .and_then(|s| s.probe_interval_secs)
                .unwrap_or(default.sync.probe_interval_secs),
            probe_timeout_ms: sync
                .and_then(|s| s.probe_timeout_ms)
                .unwrap_or(default.sync.probe_timeout_ms),
        },
        log: LogSettings {
            level: log
                .and_then(|l| l.level.clone())
                .unwrap_or(default.log.level),
        },
    })
}

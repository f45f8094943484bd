use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Groups the remote API, local storage, connectivity probing and logging.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub storage: StorageSettings,
    pub sync: SyncSettings,
    pub log: LogSettings,
}

/// Remote expense API.
///
/// Records are posted to `{base_url}/expense`.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Location of the local queue store and the key the queue lives under.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub path: String,
    pub queue_key: String,
}

/// Connectivity probing used to trigger flushes.
#[derive(Debug, Deserialize, Clone)]
pub struct SyncSettings {
    pub probe_interval_secs: u64,
    pub probe_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub api: Option<PartialApiSettings>,
    pub storage: Option<PartialStorageSettings>,
    pub sync: Option<PartialSyncSettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialApiSettings {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialStorageSettings {
    pub path: Option<String>,
    pub queue_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialSyncSettings {
    pub probe_interval_secs: Option<u64>,
    pub probe_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings {
                base_url: "http://localhost:8081/api".to_string(),
                timeout_secs: 30,
            },
            storage: StorageSettings {
                path: "expense_queue_db".to_string(),
                queue_key: "offlineQueue".to_string(),
            },
            sync: SyncSettings {
                probe_interval_secs: 5,
                probe_timeout_ms: 2000,
            },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}

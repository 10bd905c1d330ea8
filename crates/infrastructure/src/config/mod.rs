//! Application configuration
//!
//! Loaded from built-in defaults, then an optional `config.toml`, then
//! `METAR_`-prefixed environment variables. Nested keys use `__`, e.g.
//! `METAR_SERVER__PORT=8080` or `METAR_METAR__TIMEOUT_SECS=10`;
//! `METAR_STATIONS=KJFK,EGLL` seeds stations.

mod server;

use std::{path::PathBuf, time::Duration};

use application::{ApplicationError, ManagerSettings};
use domain::{StationCode, UpdateInterval};
use integration_metar::MetarConfig;
use serde::{Deserialize, Serialize};

pub use server::ServerConfig;

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Environment variable prefix
pub const ENV_PREFIX: &str = "METAR";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub metar: MetarAppConfig,

    /// Stations to create config entries for at start-up
    #[serde(default)]
    pub stations: Vec<String>,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    #[serde(default)]
    pub telemetry: TelemetryAppConfig,
}

/// METAR source and polling settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetarAppConfig {
    /// Station bulletin directory
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Polling interval for entries without an override (5-120)
    #[serde(default = "default_update_interval")]
    pub update_interval_minutes: u32,
}

fn default_base_url() -> String {
    MetarConfig::default().base_url
}

fn default_timeout() -> u64 {
    MetarConfig::default().timeout_secs
}

const fn default_update_interval() -> u32 {
    UpdateInterval::DEFAULT_MINUTES
}

impl Default for MetarAppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            update_interval_minutes: default_update_interval(),
        }
    }
}

impl MetarAppConfig {
    /// HTTP client settings
    #[must_use]
    pub fn client_config(&self) -> MetarConfig {
        MetarConfig {
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    /// Station manager settings
    ///
    /// # Errors
    ///
    /// Returns `Domain` if the interval is out of range.
    pub fn manager_settings(&self) -> Result<ManagerSettings, ApplicationError> {
        Ok(ManagerSettings {
            default_interval: UpdateInterval::new(self.update_interval_minutes)?,
            fetch_timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

/// Config entry persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// JSON file holding the config entries
    #[serde(default = "default_entries_path")]
    pub entries_path: PathBuf,
}

fn default_entries_path() -> PathBuf {
    PathBuf::from("entries.json")
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            entries_path: default_entries_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryAppConfig {
    /// Log level filter, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "info,tower_http=info".to_string()
}

impl Default for TelemetryAppConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and optional `config.toml`
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(config::File::with_name("config").required(false))
    }

    /// Load configuration from a given file source plus environment
    pub fn load_from<S>(file: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let builder = config::Config::builder()
            // Start with defaults
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .add_source(file)
            // Override with environment variables (e.g., METAR_SERVER__PORT)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("stations")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Check values serde cannot validate
    ///
    /// # Errors
    ///
    /// Returns `Configuration` naming the first invalid setting.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.metar.timeout_secs == 0 {
            return Err(ApplicationError::Configuration(
                "metar.timeout_secs must be positive".to_string(),
            ));
        }
        UpdateInterval::new(self.metar.update_interval_minutes).map_err(|e| {
            ApplicationError::Configuration(format!("metar.update_interval_minutes: {e}"))
        })?;
        self.seed_stations()?;
        Ok(())
    }

    /// Parsed `stations` list
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for the first invalid station code.
    pub fn seed_stations(&self) -> Result<Vec<StationCode>, ApplicationError> {
        self.stations
            .iter()
            .map(|s| {
                StationCode::new(s.as_str())
                    .map_err(|e| ApplicationError::Configuration(format!("stations: {e}")))
            })
            .collect()
    }
}

//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `scenehub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Where scenarios and logs are kept.
    pub storage: StorageConfig,
    /// Periodic sweep settings.
    pub scheduler: SchedulerConfig,
    /// How commands reach devices.
    pub device_control: DeviceControlConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Json,
    Sqlite,
}

/// Persistent store configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory holding `scenarios.json` and `scenario-logs.json`.
    pub data_dir: PathBuf,
    /// `SQLite` connection URL, used by the `sqlite` backend.
    pub database_url: String,
}

/// Sweep loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between two due-scenario sweeps.
    pub check_interval_secs: u64,
    /// Abort a scenario's pending delayed actions when it is deleted.
    pub cancel_pending_on_delete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceControlBackend {
    Cloud,
    Virtual,
}

/// Device control configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeviceControlConfig {
    pub backend: DeviceControlBackend,
    /// IoT cloud endpoint, used by the `cloud` backend.
    pub base_url: String,
    /// Bearer token for the cloud; empty means none.
    pub access_token: String,
    pub timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `scenehub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if an
    /// override or the resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("scenehub.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("SCENEHUB_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("SCENEHUB_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Some(val) = lookup("SCENEHUB_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("SCENEHUB_STORAGE") {
            self.storage.backend = match val.as_str() {
                "json" => StorageBackend::Json,
                "sqlite" => StorageBackend::Sqlite,
                other => {
                    return Err(ConfigError::Validation(format!(
                        "unknown storage backend `{other}`"
                    )));
                }
            };
        }
        if let Some(val) = lookup("SCENEHUB_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(val);
        }
        if let Some(val) = lookup("SCENEHUB_DATABASE_URL") {
            self.storage.database_url = val;
        }
        if let Some(val) = lookup("SCENEHUB_CHECK_INTERVAL")
            && let Ok(secs) = val.parse()
        {
            self.scheduler.check_interval_secs = secs;
        }
        if let Some(val) = lookup("SCENEHUB_DEVICE_CONTROL") {
            self.device_control.backend = match val.as_str() {
                "cloud" => DeviceControlBackend::Cloud,
                "virtual" => DeviceControlBackend::Virtual,
                other => {
                    return Err(ConfigError::Validation(format!(
                        "unknown device control backend `{other}`"
                    )));
                }
            };
        }
        if let Some(val) = lookup("SCENEHUB_CLOUD_BASE_URL") {
            self.device_control.base_url = val;
        }
        if let Some(val) = lookup("SCENEHUB_CLOUD_ACCESS_TOKEN") {
            self.device_control.access_token = val;
        }
        if let Some(val) = lookup("SCENEHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.scheduler.check_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "check interval must be non-zero".to_string(),
            ));
        }
        if self.device_control.backend == DeviceControlBackend::Cloud
            && self.device_control.base_url.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "cloud device control requires a base url".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler.check_interval_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            data_dir: PathBuf::from("data"),
            database_url: "sqlite:scenehub.db?mode=rwc".to_string(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 30,
            cancel_pending_on_delete: false,
        }
    }
}

impl Default for DeviceControlConfig {
    fn default() -> Self {
        Self {
            backend: DeviceControlBackend::Virtual,
            base_url: "https://openapi.tuyaus.com".to_string(),
            access_token: String::new(),
            timeout_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "scenehubd=info,scenehub=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

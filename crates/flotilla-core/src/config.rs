//! Configuration loading and typed config structures for the fleet server.
//!
//! The canonical configuration lives in `flotilla-config.yaml` in the
//! working directory. This module defines strongly-typed structs that
//! mirror the YAML structure and provides a loader with full-default
//! fallback, so the server runs with no config file at all.

use std::path::Path;

use chrono::TimeDelta;
use serde::Deserialize;
use tracing::warn;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level fleet server configuration.
///
/// Mirrors the structure of `flotilla-config.yaml`. Every field has a
/// default, so a missing file or an empty document yields a fully usable
/// configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FleetConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Bus connection settings.
    #[serde(default)]
    pub bus: BusConfig,

    /// Liveness monitor settings.
    #[serde(default)]
    pub liveness: LivenessConfig,

    /// Command dispatch policy.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Live update feed settings.
    #[serde(default)]
    pub feed: FeedConfig,
}

impl FleetConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values afterwards:
    /// - `NATS_URL` overrides `bus.url`
    /// - `FLOTILLA_HTTP_PORT` overrides `http.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override connection settings with environment variables when set.
    ///
    /// This lets Docker Compose (or any deployment) point the server at
    /// its bus and port without editing the YAML file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("NATS_URL") {
            self.bus.url = val;
        }
        if let Ok(val) = std::env::var("FLOTILLA_HTTP_PORT") {
            match val.parse::<u16>() {
                Ok(port) => self.http.port = port,
                Err(_) => warn!(value = %val, "ignoring non-numeric FLOTILLA_HTTP_PORT"),
            }
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Address to bind to.
    #[serde(default = "default_http_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_http_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
        }
    }
}

/// Bus connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BusConfig {
    /// NATS server URL.
    #[serde(default = "default_bus_url")]
    pub url: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            url: default_bus_url(),
        }
    }
}

/// Liveness monitor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LivenessConfig {
    /// Seconds of silence after which a robot is marked offline.
    #[serde(default = "default_offline_threshold_secs")]
    pub offline_threshold_secs: u64,

    /// Seconds between sweeps over the registry.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl LivenessConfig {
    /// The offline threshold as a signed duration for timestamp math.
    pub fn offline_threshold(&self) -> TimeDelta {
        TimeDelta::seconds(i64::try_from(self.offline_threshold_secs).unwrap_or(i64::MAX))
    }

    /// The sweep interval for the monitor's timer.
    pub const fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            offline_threshold_secs: default_offline_threshold_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// Command dispatch policy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DispatchConfig {
    /// Battery percentage a robot must exceed to accept a task.
    #[serde(default = "default_min_battery_percent")]
    pub min_battery_percent: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            min_battery_percent: default_min_battery_percent(),
        }
    }
}

/// Live update feed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedConfig {
    /// Seconds between keep-alive heartbeats on each feed connection.
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
}

impl FeedConfig {
    /// The heartbeat interval for each feed connection's timer.
    pub const fn heartbeat_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.heartbeat_interval_secs)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_http_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_http_port() -> u16 {
    8080
}

fn default_bus_url() -> String {
    "nats://localhost:4222".to_owned()
}

const fn default_offline_threshold_secs() -> u64 {
    5
}

const fn default_sweep_interval_secs() -> u64 {
    1
}

const fn default_min_battery_percent() -> f64 {
    20.0
}

const fn default_heartbeat_interval_secs() -> u64 {
    30
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = FleetConfig::default();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.bus.url, "nats://localhost:4222");
        assert_eq!(config.liveness.offline_threshold_secs, 5);
        assert_eq!(config.liveness.sweep_interval_secs, 1);
        assert_eq!(config.dispatch.min_battery_percent, 20.0);
        assert_eq!(config.feed.heartbeat_interval_secs, 30);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let yaml = r"
liveness:
  offline_threshold_secs: 12
http:
  port: 9090
";
        let config = FleetConfig::parse(yaml).unwrap();
        assert_eq!(config.liveness.offline_threshold_secs, 12);
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.liveness.sweep_interval_secs, 1);
        assert_eq!(config.http.host, "0.0.0.0");
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let result = FleetConfig::parse("liveness: [not, a, map");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn threshold_converts_to_signed_duration() {
        let liveness = LivenessConfig {
            offline_threshold_secs: 5,
            sweep_interval_secs: 1,
        };
        assert_eq!(liveness.offline_threshold(), TimeDelta::seconds(5));
        assert_eq!(liveness.sweep_interval(), std::time::Duration::from_secs(1));
    }
}

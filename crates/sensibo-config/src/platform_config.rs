//! Sensibo platform configuration
//!
//! Parses the `sensibo:` section from configuration.yaml

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::path::Path;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};
use crate::loader::load_yaml;

/// Main configuration file inside the config directory
pub const CONFIG_FILE: &str = "configuration.yaml";

/// Top-level key holding the platform section
pub const PLATFORM_SECTION: &str = "sensibo";

/// Feature flags gating the optional accessory kinds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessoryFlags {
    pub external_humidity_sensor: bool,
    pub enable_sync_button: bool,
    pub enable_climate_react_switch: bool,
    pub enable_occupancy_sensor: bool,
}

/// Platform configuration from the `sensibo:` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    /// Platform name shown in logs
    #[serde(default = "default_name")]
    pub name: String,

    /// Sensibo API key, usually given as `!secret`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Seconds between device refreshes
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,

    /// Enable debug logging
    #[serde(default)]
    pub debug: bool,

    /// Expose a separate humidity sensor per air conditioner
    #[serde(default)]
    pub external_humidity_sensor: bool,

    /// Expose a "sync state" button per air conditioner
    #[serde(default)]
    pub enable_sync_button: bool,

    /// Expose a Climate React switch per air conditioner
    #[serde(default)]
    pub enable_climate_react_switch: bool,

    /// Expose one occupancy sensor per location
    #[serde(default)]
    pub enable_occupancy_sensor: bool,
}

fn default_name() -> String {
    "Sensibo".to_string()
}

fn default_refresh_interval() -> u64 {
    30
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            api_key: None,
            refresh_interval: default_refresh_interval(),
            debug: false,
            external_humidity_sensor: false,
            enable_sync_button: false,
            enable_climate_react_switch: false,
            enable_occupancy_sensor: false,
        }
    }
}

impl PlatformConfig {
    /// Load platform configuration from a config directory
    pub fn load(config_dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let yaml = load_yaml(config_dir.as_ref(), CONFIG_FILE)?;
        Self::from_yaml(&yaml)
    }

    /// Parse platform configuration from a YAML document
    ///
    /// A missing `sensibo:` section yields the defaults.
    pub fn from_yaml(yaml: &Value) -> ConfigResult<Self> {
        let mapping = yaml.as_mapping().ok_or_else(|| ConfigError::InvalidValue {
            key: "root".to_string(),
            reason: "configuration must be a mapping".to_string(),
        })?;

        let section = match mapping.get(PLATFORM_SECTION) {
            None | Some(Value::Null) => Value::Mapping(serde_yaml::Mapping::new()),
            Some(section) => section.clone(),
        };

        let config: PlatformConfig =
            serde_yaml::from_value(section).map_err(|e| ConfigError::InvalidValue {
                key: PLATFORM_SECTION.to_string(),
                reason: e.to_string(),
            })?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.refresh_interval == 0 {
            return Err(ConfigError::InvalidValue {
                key: "refreshInterval".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }
        Ok(())
    }

    /// Interval between device refreshes
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }

    /// The accessory feature flags
    pub fn flags(&self) -> AccessoryFlags {
        AccessoryFlags {
            external_humidity_sensor: self.external_humidity_sensor,
            enable_sync_button: self.enable_sync_button,
            enable_climate_react_switch: self.enable_climate_react_switch,
            enable_occupancy_sensor: self.enable_occupancy_sensor,
        }
    }
}

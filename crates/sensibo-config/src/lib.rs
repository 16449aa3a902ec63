//! YAML configuration loading for the Sensibo platform
//!
//! The platform reads the `sensibo:` section of `configuration.yaml` in the
//! config directory. The loader understands a small set of custom tags:
//!
//! - `!include path` - Include another YAML file
//! - `!secret key` - Substitute from secrets.yaml
//! - `!env_var VAR` - Environment variable substitution
//!
//! # Example
//!
//! ```ignore
//! use sensibo_config::PlatformConfig;
//!
//! let config = PlatformConfig::load("/config")?;
//! let flags = config.flags();
//! ```

mod error;
mod loader;
mod platform_config;
mod secrets;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_yaml, YamlLoader};
pub use platform_config::{AccessoryFlags, PlatformConfig, CONFIG_FILE, PLATFORM_SECTION};
pub use secrets::Secrets;

// Re-export serde_yaml::Value for convenience
pub use serde_yaml::Value;

//! `secrets.yaml` lookup for `!secret` tags
//!
//! Keeps credentials such as the Sensibo API key out of the main
//! configuration file.

use crate::error::{ConfigError, ConfigResult};
use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// File name of the secrets store inside the config directory
const SECRETS_FILE: &str = "secrets.yaml";

/// Secrets store loaded from secrets.yaml
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    values: HashMap<String, String>,
}

impl Secrets {
    /// Load secrets from `<config_dir>/secrets.yaml`
    ///
    /// A missing file yields an empty store.
    pub fn load(config_dir: &Path) -> ConfigResult<Self> {
        let path = config_dir.join(SECRETS_FILE);
        if !path.exists() {
            debug!("No {} at {:?}", SECRETS_FILE, path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile {
            path: path.clone(),
            source: e,
        })?;
        let raw: HashMap<String, Value> =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseYaml {
                path: path.clone(),
                source: e,
            })?;

        let values: HashMap<String, String> = raw
            .into_iter()
            .map(|(k, v)| (k, scalar_to_string(v)))
            .collect();
        debug!("Loaded {} secrets from {:?}", values.len(), path);

        Ok(Self { values })
    }

    /// Get a secret by key
    pub fn get(&self, key: &str) -> ConfigResult<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::SecretNotFound {
                key: key.to_string(),
            })
    }
}

fn scalar_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(&other)
            .unwrap_or_default()
            .trim()
            .to_string(),
    }
}

//! Device inventory sources

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sensibo_core::Device;
use serde::Deserialize;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Device snapshot file inside the config directory
pub const DEVICES_FILE: &str = "sensibo-devices.json";

/// Errors fetching the device inventory
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read device inventory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode device inventory: {0}")]
    Json(#[from] serde_json::Error),
}

/// Provider of the current device inventory
///
/// A fetch must return a complete snapshot. Partial inventories would make
/// the remove phase purge accessories of devices that simply went missing
/// from the response.
#[async_trait]
pub trait DeviceSource: Send + Sync {
    async fn fetch_devices(&self) -> Result<Vec<Device>, SourceError>;
}

/// Response body of the Sensibo pods endpoint, or a bare device list
#[derive(Deserialize)]
#[serde(untagged)]
enum Inventory {
    Envelope { result: Vec<Device> },
    List(Vec<Device>),
}

impl Inventory {
    fn into_devices(self) -> Vec<Device> {
        match self {
            Inventory::Envelope { result } => result,
            Inventory::List(devices) => devices,
        }
    }
}

/// Decode a device inventory from JSON text
pub fn parse_devices(content: &str) -> Result<Vec<Device>, SourceError> {
    let inventory: Inventory = serde_json::from_str(content)?;
    Ok(inventory.into_devices())
}

/// Reads the inventory from a JSON snapshot on disk
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Source reading [`DEVICES_FILE`] from a config directory
    pub fn in_config_dir(config_dir: impl AsRef<Path>) -> Self {
        Self::new(config_dir.as_ref().join(DEVICES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DeviceSource for JsonFileSource {
    async fn fetch_devices(&self) -> Result<Vec<Device>, SourceError> {
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        let devices = parse_devices(&content)?;
        debug!("Read {} devices from {}", devices.len(), self.path.display());
        Ok(devices)
    }
}

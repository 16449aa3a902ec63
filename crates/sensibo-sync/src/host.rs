//! Host registry seam
//!
//! The platform only needs bulk register/unregister from the host. Failures
//! are reported back but never undo the platform's own bookkeeping.

use sensibo_core::Accessory;
use sensibo_registries::{AccessoryRegistry, AccessoryRegistryError};
use thiserror::Error;

/// Errors reported by a host registry
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Registry(#[from] AccessoryRegistryError),

    #[error("host rejected request: {0}")]
    Rejected(String),
}

/// Bulk accessory registration on the host platform
pub trait HostRegistry: Send + Sync {
    fn register_accessories(&self, accessories: &[Accessory]) -> Result<(), HostError>;

    fn unregister_accessories(&self, accessories: &[Accessory]) -> Result<(), HostError>;
}

impl HostRegistry for AccessoryRegistry {
    fn register_accessories(&self, accessories: &[Accessory]) -> Result<(), HostError> {
        self.register(accessories).map_err(HostError::from)
    }

    fn unregister_accessories(&self, accessories: &[Accessory]) -> Result<(), HostError> {
        self.unregister(accessories).map_err(HostError::from)
    }
}

//! Host-side persistence for Sensibo accessories
//!
//! The host keeps every accessory the platform registered in
//! `.storage/sensibo.accessories`. On startup those entries become the
//! platform's cached accessories; each sync pass registers new accessories
//! and unregisters stale ones here.

pub mod accessory_registry;
pub mod storage;

pub use accessory_registry::{
    AccessoryRegistry, AccessoryRegistryData, AccessoryRegistryError, STORAGE_KEY,
    STORAGE_MINOR_VERSION, STORAGE_VERSION,
};
pub use storage::{Storable, Storage, StorageError, StorageFile, StorageResult};

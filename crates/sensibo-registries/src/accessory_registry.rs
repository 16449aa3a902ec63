//! Accessory Registry
//!
//! Host-side record of every accessory the platform registered, keyed by
//! identity token.

use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use sensibo_core::Accessory;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::storage::{Storable, Storage, StorageResult};

/// Storage key for the accessory registry
pub const STORAGE_KEY: &str = "sensibo.accessories";
/// Current storage version
pub const STORAGE_VERSION: u32 = 1;
/// Current minor version
pub const STORAGE_MINOR_VERSION: u32 = 1;

/// Errors returned by bulk registry operations
///
/// Bulk operations apply every entry they can; the error lists the ones
/// that were skipped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessoryRegistryError {
    #[error("{} accessories already registered: {0:?}", .0.len())]
    AlreadyRegistered(Vec<Uuid>),

    #[error("{} accessories not registered: {0:?}", .0.len())]
    NotRegistered(Vec<Uuid>),
}

/// Accessory registry data for storage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessoryRegistryData {
    pub accessories: Vec<Accessory>,
}

impl Storable for AccessoryRegistryData {
    const KEY: &'static str = STORAGE_KEY;
    const VERSION: u32 = STORAGE_VERSION;
    const MINOR_VERSION: u32 = STORAGE_MINOR_VERSION;
}

/// Registry of host-registered accessories
///
/// Entries are `Arc<Accessory>` so reads never clone the accessory itself.
/// The primary index preserves registration order, which is the order the
/// platform sees its cached accessories in after a restart.
pub struct AccessoryRegistry {
    storage: Arc<Storage>,

    /// UUID -> accessory, in registration order
    by_uuid: RwLock<IndexMap<Uuid, Arc<Accessory>>>,
}

impl AccessoryRegistry {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            by_uuid: RwLock::new(IndexMap::new()),
        }
    }

    /// Load from storage, replacing nothing already registered
    pub async fn load(&self) -> StorageResult<()> {
        if let Some(storage_file) = self.storage.load::<AccessoryRegistryData>().await? {
            info!(
                "Loading {} cached accessories from storage (v{}.{})",
                storage_file.data.accessories.len(),
                storage_file.version,
                storage_file.minor_version
            );

            for accessory in storage_file.data.accessories {
                if !self.contains(&accessory.uuid) {
                    self.index_entry(Arc::new(accessory));
                }
            }
        }
        Ok(())
    }

    /// Save to storage
    pub async fn save(&self) -> StorageResult<()> {
        let accessories: Vec<Accessory> = self
            .by_uuid
            .read()
            .map(|idx| idx.values().map(|a| (**a).clone()).collect())
            .unwrap_or_default();
        let count = accessories.len();

        let storage_file = AccessoryRegistryData { accessories }.into_storage_file();
        self.storage.save(&storage_file).await?;

        debug!("Saved {} accessories to storage", count);
        Ok(())
    }

    fn index_entry(&self, accessory: Arc<Accessory>) {
        if let Ok(mut idx) = self.by_uuid.write() {
            idx.insert(accessory.uuid, accessory);
        }
    }

    fn unindex_entry(&self, uuid: &Uuid) -> Option<Arc<Accessory>> {
        self.by_uuid
            .write()
            .ok()
            .and_then(|mut idx| idx.shift_remove(uuid))
    }

    /// Register a batch of accessories
    ///
    /// Already-registered UUIDs are skipped and reported in the error.
    pub fn register(&self, accessories: &[Accessory]) -> Result<(), AccessoryRegistryError> {
        let mut duplicates = Vec::new();
        for accessory in accessories {
            if self.contains(&accessory.uuid) {
                duplicates.push(accessory.uuid);
                continue;
            }
            self.index_entry(Arc::new(accessory.clone()));
            info!(
                kind = %accessory.kind(),
                uuid = %accessory.uuid,
                "Registered accessory: {}",
                accessory.display_name
            );
        }

        if duplicates.is_empty() {
            Ok(())
        } else {
            Err(AccessoryRegistryError::AlreadyRegistered(duplicates))
        }
    }

    /// Unregister a batch of accessories by identity token
    ///
    /// Unknown UUIDs are skipped and reported in the error.
    pub fn unregister(&self, accessories: &[Accessory]) -> Result<(), AccessoryRegistryError> {
        let mut unknown = Vec::new();
        for accessory in accessories {
            match self.unindex_entry(&accessory.uuid) {
                Some(removed) => info!(
                    kind = %removed.kind(),
                    uuid = %removed.uuid,
                    "Unregistered accessory: {}",
                    removed.display_name
                ),
                None => unknown.push(accessory.uuid),
            }
        }

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(AccessoryRegistryError::NotRegistered(unknown))
        }
    }

    pub fn contains(&self, uuid: &Uuid) -> bool {
        self.by_uuid
            .read()
            .map(|idx| idx.contains_key(uuid))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.by_uuid.read().map(|idx| idx.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All registered accessories in registration order
    ///
    /// Returns a Vec to avoid holding the lock during iteration.
    pub fn iter(&self) -> Vec<Arc<Accessory>> {
        self.by_uuid
            .read()
            .map(|idx| idx.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Owned copies of every accessory, used to seed the platform cache
    pub fn cached_accessories(&self) -> Vec<Accessory> {
        self.iter().into_iter().map(|a| (*a).clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensibo_core::{Device, Location, Sensor};
    use tempfile::TempDir;

    fn create_registry() -> (TempDir, AccessoryRegistry) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(Storage::new(temp_dir.path()));
        (temp_dir, AccessoryRegistry::new(storage))
    }

    fn accessories() -> Vec<Accessory> {
        let device = Device::new("pod1")
            .with_remote_capabilities(true)
            .with_location(Location::new("home1"));
        vec![
            Accessory::air_conditioner(&device).unwrap(),
            Accessory::room_sensor(&device, &Sensor::new("ms1")).unwrap(),
            Accessory::occupancy_sensor(&device).unwrap(),
        ]
    }

    #[test]
    fn test_register_and_lookup() {
        let (_dir, registry) = create_registry();
        let batch = accessories();

        registry.register(&batch).unwrap();
        assert_eq!(registry.len(), 3);
        assert!(registry.contains(&batch[0].uuid));
        assert_eq!(registry.iter()[2].display_name, "home1 Occupancy");
    }

    #[test]
    fn test_register_duplicate_reported() {
        let (_dir, registry) = create_registry();
        let batch = accessories();
        registry.register(&batch[..1]).unwrap();

        let result = registry.register(&batch);
        assert_eq!(
            result,
            Err(AccessoryRegistryError::AlreadyRegistered(vec![batch[0].uuid]))
        );
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_unregister_removes_entries() {
        let (_dir, registry) = create_registry();
        let batch = accessories();
        registry.register(&batch).unwrap();

        registry.unregister(&batch[..2]).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains(&batch[0].uuid));
        assert!(registry.contains(&batch[2].uuid));
    }

    #[test]
    fn test_unregister_unknown_reported() {
        let (_dir, registry) = create_registry();
        let batch = accessories();
        registry.register(&batch[..1]).unwrap();

        let result = registry.unregister(&batch[..2]);
        assert_eq!(
            result,
            Err(AccessoryRegistryError::NotRegistered(vec![batch[1].uuid]))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_iter_preserves_registration_order() {
        let (_dir, registry) = create_registry();
        let mut batch = accessories();
        batch.reverse();
        registry.register(&batch).unwrap();

        let order: Vec<Uuid> = registry.iter().iter().map(|a| a.uuid).collect();
        let expected: Vec<Uuid> = batch.iter().map(|a| a.uuid).collect();
        assert_eq!(order, expected);
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let (dir, registry) = create_registry();
        let batch = accessories();
        registry.register(&batch).unwrap();
        registry.save().await.unwrap();

        let reloaded = AccessoryRegistry::new(Arc::new(Storage::new(dir.path())));
        reloaded.load().await.unwrap();
        assert_eq!(reloaded.cached_accessories(), batch);
    }

    #[tokio::test]
    async fn test_load_without_file_is_empty() {
        let (_dir, registry) = create_registry();
        registry.load().await.unwrap();
        assert!(registry.is_empty());
    }
}

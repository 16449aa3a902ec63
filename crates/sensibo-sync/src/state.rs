//! Tracked accessory collections owned by the platform

use indexmap::{IndexMap, IndexSet};
use sensibo_core::{Accessory, AccessoryContext};
use tracing::warn;
use uuid::Uuid;

/// Platform-owned state mutated by each sync pass
///
/// - `active`: accessories currently exposed, keyed by context so each
///   (kind, context-key) appears at most once
/// - `cached`: accessories known to the host cache, keyed by identity token
/// - `locations`: location ids that already have an occupancy sensor
///
/// All three preserve insertion order.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    pub(crate) active: IndexMap<AccessoryContext, Accessory>,
    pub(crate) cached: IndexMap<Uuid, Accessory>,
    pub(crate) locations: IndexSet<String>,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State after a restart: nothing active, the host cache restored
    ///
    /// Entries repeating an identity token are dropped, first one wins.
    pub fn from_cached(accessories: impl IntoIterator<Item = Accessory>) -> Self {
        let mut cached = IndexMap::new();
        for accessory in accessories {
            if cached.contains_key(&accessory.uuid) {
                warn!(uuid = %accessory.uuid, "Dropping duplicate cached accessory");
                continue;
            }
            cached.insert(accessory.uuid, accessory);
        }
        Self {
            cached,
            ..Self::default()
        }
    }

    pub fn is_active(&self, context: &AccessoryContext) -> bool {
        self.active.contains_key(context)
    }

    pub fn active(&self) -> impl Iterator<Item = &Accessory> {
        self.active.values()
    }

    pub fn cached(&self) -> impl Iterator<Item = &Accessory> {
        self.cached.values()
    }

    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.locations.iter().map(String::as_str)
    }

    pub fn has_location(&self, location_id: &str) -> bool {
        self.locations.contains(location_id)
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn cached_len(&self) -> usize {
        self.cached.len()
    }

    /// Look up an active accessory by context
    pub fn get_active(&self, context: &AccessoryContext) -> Option<&Accessory> {
        self.active.get(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensibo_core::Device;

    #[test]
    fn test_from_cached_drops_duplicates() {
        let ac = Accessory::air_conditioner(&Device::new("pod1")).unwrap();
        let mut renamed = ac.clone();
        renamed.display_name = "Renamed".to_string();

        let state = SyncState::from_cached(vec![ac.clone(), renamed]);
        assert_eq!(state.cached_len(), 1);
        assert_eq!(state.cached().next(), Some(&ac));
        assert_eq!(state.active_len(), 0);
        assert_eq!(state.locations().count(), 0);
    }
}

//! The sync pass: add phase then remove phase
//!
//! Both phases derive validity from the device inventory and the flags on
//! their own. The remove phase never looks at what the add phase just did.

use std::collections::{HashMap, HashSet};

use sensibo_config::AccessoryFlags;
use sensibo_core::{Accessory, AccessoryContext, AccessoryError, Device};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::SyncState;

/// Outcome of one sync pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// New accessories the host must register
    pub registered: Vec<Accessory>,
    /// Accessories adopted from the host cache
    pub restored: Vec<Accessory>,
    /// Stale accessories the host must unregister
    pub unregistered: Vec<Accessory>,
    /// Accessories that could not be built
    pub failures: Vec<AccessoryError>,
}

impl SyncReport {
    /// True when the pass changed none of the tracked collections
    pub fn is_noop(&self) -> bool {
        self.registered.is_empty() && self.restored.is_empty() && self.unregistered.is_empty()
    }

    /// True when the host registry has to be updated
    pub fn host_changed(&self) -> bool {
        !self.registered.is_empty() || !self.unregistered.is_empty()
    }
}

/// Lookup view over one inventory snapshot
struct Inventory<'a> {
    /// First device per id
    by_id: HashMap<&'a str, &'a Device>,
    /// Ids reported by at least one capable device
    capable_ids: HashSet<&'a str>,
    location_ids: HashSet<&'a str>,
}

impl<'a> Inventory<'a> {
    fn new(devices: &'a [Device]) -> Self {
        let mut by_id = HashMap::with_capacity(devices.len());
        for device in devices {
            by_id.entry(device.id.as_str()).or_insert(device);
        }
        let capable_ids = devices
            .iter()
            .filter(|d| d.remote_capabilities)
            .map(|d| d.id.as_str())
            .collect();
        let location_ids = devices.iter().filter_map(Device::location_id).collect();
        Self {
            by_id,
            capable_ids,
            location_ids,
        }
    }

    fn capable(&self, device_id: &str) -> bool {
        self.capable_ids.contains(device_id)
    }
}

/// Computes sync passes for one set of accessory flags
#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    flags: AccessoryFlags,
}

impl Reconciler {
    pub fn new(flags: AccessoryFlags) -> Self {
        Self { flags }
    }

    /// Run one pass over `devices`, mutating `state` in place
    ///
    /// Host calls are left to the caller: the report lists what has to be
    /// registered and unregistered.
    pub fn reconcile(&self, devices: &[Device], state: &mut SyncState) -> SyncReport {
        let mut report = SyncReport::default();
        self.add_phase(devices, state, &mut report);
        self.remove_phase(devices, state, &mut report);

        debug!(
            registered = report.registered.len(),
            restored = report.restored.len(),
            unregistered = report.unregistered.len(),
            failures = report.failures.len(),
            active = state.active.len(),
            cached = state.cached.len(),
            "Sync pass complete"
        );
        report
    }

    fn add_phase(&self, devices: &[Device], state: &mut SyncState, report: &mut SyncReport) {
        for device in devices {
            if !device.remote_capabilities {
                continue;
            }

            let ac_context = AccessoryContext::AirConditioner {
                device_id: device.id.clone(),
            };
            // Auxiliary accessories follow the air conditioner's lifecycle:
            // they are only built when the air conditioner itself is.
            let created = !state.is_active(&ac_context)
                && add(state, report, Accessory::air_conditioner(device));
            if created {
                if self.flags.external_humidity_sensor {
                    add(state, report, Accessory::humidity_sensor(device));
                }
                if self.flags.enable_sync_button {
                    add(state, report, Accessory::sync_button(device));
                }
                if self.flags.enable_climate_react_switch {
                    add(state, report, Accessory::climate_react(device));
                }
            }

            for sensor in device.motion_sensors.iter().flatten() {
                let context = AccessoryContext::RoomSensor {
                    device_id: device.id.clone(),
                    sensor_id: sensor.id.clone(),
                };
                if !state.is_active(&context) {
                    add(state, report, Accessory::room_sensor(device, sensor));
                }
            }

            if self.flags.enable_occupancy_sensor {
                let known = device
                    .location_id()
                    .is_some_and(|id| state.locations.contains(id));
                if !known && add(state, report, Accessory::occupancy_sensor(device)) {
                    if let Some(id) = device.location_id() {
                        state.locations.insert(id.to_string());
                    }
                }
            }
        }
    }

    fn remove_phase(&self, devices: &[Device], state: &mut SyncState, report: &mut SyncReport) {
        let inventory = Inventory::new(devices);

        let mut batch: Vec<Accessory> = Vec::new();
        for accessory in state.cached.values() {
            if self.qualifies(&accessory.context, &inventory) {
                continue;
            }
            if let AccessoryContext::OccupancySensor { location_id } = &accessory.context {
                state.locations.shift_remove(location_id);
            }
            batch.push(accessory.clone());
        }

        if batch.is_empty() {
            return;
        }

        let removed: HashSet<Uuid> = batch.iter().map(|a| a.uuid).collect();
        state.cached.retain(|uuid, _| !removed.contains(uuid));
        state.active.retain(|_, a| !removed.contains(&a.uuid));
        report.unregistered = batch;
    }

    /// Whether an accessory's backing entity and enabling flag still hold
    fn qualifies(&self, context: &AccessoryContext, inventory: &Inventory<'_>) -> bool {
        match context {
            AccessoryContext::AirConditioner { device_id } => inventory.capable(device_id),
            // Room sensors only need the device and the sensor to still be
            // reported, remote capabilities are not required
            AccessoryContext::RoomSensor {
                device_id,
                sensor_id,
            } => inventory
                .by_id
                .get(device_id.as_str())
                .and_then(|d| d.has_sensor(sensor_id))
                .unwrap_or(false),
            AccessoryContext::HumiditySensor { device_id } => {
                self.flags.external_humidity_sensor && inventory.capable(device_id)
            }
            AccessoryContext::SyncButton { device_id } => {
                self.flags.enable_sync_button && inventory.capable(device_id)
            }
            AccessoryContext::ClimateReact { device_id } => {
                self.flags.enable_climate_react_switch && inventory.capable(device_id)
            }
            AccessoryContext::OccupancySensor { location_id } => {
                self.flags.enable_occupancy_sensor
                    && inventory.location_ids.contains(location_id.as_str())
            }
        }
    }
}

/// Make a built accessory active, adopting the cached copy if there is one
///
/// Returns whether an accessory was added. Construction failures are
/// recorded and skipped.
fn add(
    state: &mut SyncState,
    report: &mut SyncReport,
    built: Result<Accessory, AccessoryError>,
) -> bool {
    let accessory = match built {
        Ok(accessory) => accessory,
        Err(e) => {
            warn!(error = %e, "Skipping accessory that could not be built");
            report.failures.push(e);
            return false;
        }
    };

    if state.active.contains_key(&accessory.context) {
        return false;
    }

    match state.cached.get(&accessory.uuid) {
        Some(cached) => {
            debug!(kind = %cached.kind(), uuid = %cached.uuid, "Restoring cached accessory");
            state.active.insert(accessory.context, cached.clone());
            report.restored.push(cached.clone());
        }
        None => {
            debug!(kind = %accessory.kind(), uuid = %accessory.uuid, "Adding new accessory");
            state.cached.insert(accessory.uuid, accessory.clone());
            state.active.insert(accessory.context.clone(), accessory.clone());
            report.registered.push(accessory);
        }
    }
    true
}

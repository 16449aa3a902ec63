//! Device and config fixtures

use std::sync::Arc;

use sensibo_config::PlatformConfig;
use sensibo_core::{Accessory, AccessoryKind, Device, Location, Sensor};
use sensibo_sync::Platform;

use crate::common::RecordingHost;

/// A remotely controllable device in `location`
pub fn pod(id: &str, location: &str) -> Device {
    Device::new(id)
        .with_remote_capabilities(true)
        .with_room(format!("Room {id}"))
        .with_location(Location::new(location).with_name(format!("Home {location}")))
}

/// `pod` with the given motion sensors attached
pub fn pod_with_sensors(id: &str, location: &str, sensors: &[&str]) -> Device {
    pod(id, location).with_motion_sensors(sensors.iter().map(|s| Sensor::new(*s)).collect())
}

/// Config with every optional accessory kind enabled
pub fn all_enabled() -> PlatformConfig {
    PlatformConfig {
        external_humidity_sensor: true,
        enable_sync_button: true,
        enable_climate_react_switch: true,
        enable_occupancy_sensor: true,
        ..PlatformConfig::default()
    }
}

/// Platform with an empty cache and a recording host
pub fn new_platform(config: &PlatformConfig) -> (Platform<RecordingHost>, Arc<RecordingHost>) {
    platform_with_host(config, RecordingHost::new(), Vec::new())
}

pub fn platform_with_host(
    config: &PlatformConfig,
    host: RecordingHost,
    cached: Vec<Accessory>,
) -> (Platform<RecordingHost>, Arc<RecordingHost>) {
    let host = Arc::new(host);
    (Platform::new(config, host.clone(), cached), host)
}

/// Number of active accessories of a kind
pub fn count_active(platform: &Platform<RecordingHost>, kind: AccessoryKind) -> usize {
    platform
        .state()
        .active()
        .filter(|a| a.kind() == kind)
        .count()
}

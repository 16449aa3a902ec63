//! Device inventory types as reported by the Sensibo service
//!
//! The field names follow the JSON shape of the Sensibo `users/me/pods`
//! endpoint so a device list can be decoded directly with serde.

use serde::{Deserialize, Deserializer, Serialize};

/// A physical climate unit (a Sensibo "pod")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Unique device identifier
    pub id: String,

    /// Whether the device can be controlled remotely
    ///
    /// The service reports an object describing the capabilities, or
    /// `null` for devices that cannot be controlled. Anything other than
    /// `null`/`false` counts as capable.
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub remote_capabilities: bool,

    /// Location (home) the device belongs to
    #[serde(default)]
    pub location: Option<Location>,

    /// Attached motion/room sensors, in the order reported
    #[serde(default)]
    pub motion_sensors: Option<Vec<Sensor>>,

    /// Room the device is installed in
    #[serde(default)]
    pub room: Option<Room>,
}

impl Device {
    /// Create a device with only an id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            remote_capabilities: false,
            location: None,
            motion_sensors: None,
            room: None,
        }
    }

    /// Mark the device as remotely controllable
    pub fn with_remote_capabilities(mut self, capable: bool) -> Self {
        self.remote_capabilities = capable;
        self
    }

    /// Set the location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the motion sensor list
    pub fn with_motion_sensors(mut self, sensors: Vec<Sensor>) -> Self {
        self.motion_sensors = Some(sensors);
        self
    }

    /// Set the room name
    pub fn with_room(mut self, name: impl Into<String>) -> Self {
        self.room = Some(Room { name: name.into() });
        self
    }

    /// Location identifier, if the device reports one
    pub fn location_id(&self) -> Option<&str> {
        self.location.as_ref().map(|l| l.id.as_str())
    }

    /// Whether the device reports a sensor with the given id
    ///
    /// Returns `None` when the device has no sensor list at all.
    pub fn has_sensor(&self, sensor_id: &str) -> Option<bool> {
        self.motion_sensors
            .as_ref()
            .map(|sensors| sensors.iter().any(|s| s.id == sensor_id))
    }

    /// Name used for the accessories of this device
    pub fn display_name(&self) -> &str {
        self.room
            .as_ref()
            .map(|r| r.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.id)
    }
}

/// A motion/room sensor attached to a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sensor {
    /// Identifier, unique within the owning device
    pub id: String,
}

impl Sensor {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A location (home) grouping devices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Location {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Set the location name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name used for the occupancy accessory of this location
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.id)
    }
}

/// Room a device is installed in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
}

fn deserialize_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(!matches!(
        value,
        serde_json::Value::Null | serde_json::Value::Bool(false)
    ))
}

//! Accessories exposed to the host platform
//!
//! Every accessory represents exactly one device, sensor or location. The
//! [`AccessoryContext`] is both the persisted context record and the lookup
//! key: two accessories with equal contexts represent the same thing.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::device::{Device, Sensor};
use crate::UUID_PREFIX;

/// Errors raised while constructing an accessory
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessoryError {
    #[error("{kind} accessory requires a non-empty {field}")]
    MissingIdentifier {
        kind: AccessoryKind,
        field: &'static str,
    },

    #[error("device {device_id} reports no location")]
    MissingLocation { device_id: String },
}

/// The six accessory kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessoryKind {
    AirConditioner,
    RoomSensor,
    HumiditySensor,
    SyncButton,
    ClimateReact,
    OccupancySensor,
}

impl AccessoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessoryKind::AirConditioner => "AirConditioner",
            AccessoryKind::RoomSensor => "RoomSensor",
            AccessoryKind::HumiditySensor => "HumiditySensor",
            AccessoryKind::SyncButton => "SyncButton",
            AccessoryKind::ClimateReact => "ClimateReact",
            AccessoryKind::OccupancySensor => "OccupancySensor",
        }
    }
}

impl fmt::Display for AccessoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifying record linking an accessory to its backing entity
///
/// JSON format matches the context stored by the host:
/// ```json
/// { "type": "RoomSensor", "deviceId": "pod1", "sensorId": "ms1" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AccessoryContext {
    #[serde(rename_all = "camelCase")]
    AirConditioner { device_id: String },
    #[serde(rename_all = "camelCase")]
    RoomSensor { device_id: String, sensor_id: String },
    #[serde(rename_all = "camelCase")]
    HumiditySensor { device_id: String },
    #[serde(rename_all = "camelCase")]
    SyncButton { device_id: String },
    #[serde(rename_all = "camelCase")]
    ClimateReact { device_id: String },
    #[serde(rename_all = "camelCase")]
    OccupancySensor { location_id: String },
}

impl AccessoryContext {
    /// Kind of accessory this context belongs to
    pub fn kind(&self) -> AccessoryKind {
        match self {
            AccessoryContext::AirConditioner { .. } => AccessoryKind::AirConditioner,
            AccessoryContext::RoomSensor { .. } => AccessoryKind::RoomSensor,
            AccessoryContext::HumiditySensor { .. } => AccessoryKind::HumiditySensor,
            AccessoryContext::SyncButton { .. } => AccessoryKind::SyncButton,
            AccessoryContext::ClimateReact { .. } => AccessoryKind::ClimateReact,
            AccessoryContext::OccupancySensor { .. } => AccessoryKind::OccupancySensor,
        }
    }

    /// Owning device id, for every kind except OccupancySensor
    pub fn device_id(&self) -> Option<&str> {
        match self {
            AccessoryContext::AirConditioner { device_id }
            | AccessoryContext::RoomSensor { device_id, .. }
            | AccessoryContext::HumiditySensor { device_id }
            | AccessoryContext::SyncButton { device_id }
            | AccessoryContext::ClimateReact { device_id } => Some(device_id.as_str()),
            AccessoryContext::OccupancySensor { .. } => None,
        }
    }

    /// Deterministic identity token for this context
    ///
    /// Rebuilding an accessory for the same entity yields the same token, so
    /// a freshly constructed accessory can be matched against the cache.
    pub fn uuid(&self) -> Uuid {
        let name = match self {
            AccessoryContext::AirConditioner { device_id } => device_id.clone(),
            AccessoryContext::RoomSensor {
                device_id,
                sensor_id,
            } => format!("sensor-{device_id}-{sensor_id}"),
            AccessoryContext::HumiditySensor { device_id } => format!("humidity-{device_id}"),
            AccessoryContext::SyncButton { device_id } => format!("sync-{device_id}"),
            AccessoryContext::ClimateReact { device_id } => format!("climate-react-{device_id}"),
            AccessoryContext::OccupancySensor { location_id } => {
                format!("occupancy-{location_id}")
            }
        };
        Uuid::new_v5(
            &Uuid::NAMESPACE_OID,
            format!("{UUID_PREFIX}{name}").as_bytes(),
        )
    }

    fn validate(&self) -> Result<(), AccessoryError> {
        let missing = |field| AccessoryError::MissingIdentifier {
            kind: self.kind(),
            field,
        };
        if let Some(device_id) = self.device_id() {
            if device_id.is_empty() {
                return Err(missing("deviceId"));
            }
        }
        match self {
            AccessoryContext::RoomSensor { sensor_id, .. } if sensor_id.is_empty() => {
                Err(missing("sensorId"))
            }
            AccessoryContext::OccupancySensor { location_id } if location_id.is_empty() => {
                Err(missing("locationId"))
            }
            _ => Ok(()),
        }
    }
}

/// An accessory registered with the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessory {
    /// Identity token
    #[serde(rename = "UUID")]
    pub uuid: Uuid,
    /// Name shown by the host
    pub display_name: String,
    /// Backing entity
    pub context: AccessoryContext,
}

impl Accessory {
    /// Build an accessory for a context, deriving its identity token
    pub fn new(
        context: AccessoryContext,
        display_name: impl Into<String>,
    ) -> Result<Self, AccessoryError> {
        context.validate()?;
        Ok(Self {
            uuid: context.uuid(),
            display_name: display_name.into(),
            context,
        })
    }

    pub fn kind(&self) -> AccessoryKind {
        self.context.kind()
    }

    pub fn air_conditioner(device: &Device) -> Result<Self, AccessoryError> {
        Self::new(
            AccessoryContext::AirConditioner {
                device_id: device.id.clone(),
            },
            format!("{} AC", device.display_name()),
        )
    }

    pub fn room_sensor(device: &Device, sensor: &Sensor) -> Result<Self, AccessoryError> {
        Self::new(
            AccessoryContext::RoomSensor {
                device_id: device.id.clone(),
                sensor_id: sensor.id.clone(),
            },
            format!("{} Sensor", device.display_name()),
        )
    }

    pub fn humidity_sensor(device: &Device) -> Result<Self, AccessoryError> {
        Self::new(
            AccessoryContext::HumiditySensor {
                device_id: device.id.clone(),
            },
            format!("{} Humidity", device.display_name()),
        )
    }

    pub fn sync_button(device: &Device) -> Result<Self, AccessoryError> {
        Self::new(
            AccessoryContext::SyncButton {
                device_id: device.id.clone(),
            },
            format!("{} AC Sync", device.display_name()),
        )
    }

    pub fn climate_react(device: &Device) -> Result<Self, AccessoryError> {
        Self::new(
            AccessoryContext::ClimateReact {
                device_id: device.id.clone(),
            },
            format!("{} Climate React", device.display_name()),
        )
    }

    /// Occupancy sensor for the location of `device`
    pub fn occupancy_sensor(device: &Device) -> Result<Self, AccessoryError> {
        let location = device
            .location
            .as_ref()
            .ok_or_else(|| AccessoryError::MissingLocation {
                device_id: device.id.clone(),
            })?;
        Self::new(
            AccessoryContext::OccupancySensor {
                location_id: location.id.clone(),
            },
            format!("{} Occupancy", location.display_name()),
        )
    }
}

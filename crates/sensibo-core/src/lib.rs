//! Core types for the Sensibo platform
//!
//! This crate provides the types shared by every other crate in the
//! workspace: the device inventory reported by the Sensibo service
//! (Device, Sensor, Location) and the accessories exposed to the host
//! (Accessory, AccessoryContext, AccessoryKind).

mod accessory;
mod device;

pub use accessory::{Accessory, AccessoryContext, AccessoryError, AccessoryKind};
pub use device::{Device, Location, Room, Sensor};

/// Prefix mixed into every accessory identity token
pub const UUID_PREFIX: &str = "hbsai-";

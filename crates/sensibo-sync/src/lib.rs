//! Accessory cache synchronization
//!
//! One sync pass brings the accessories exposed to the host in line with
//! the current device inventory and configuration:
//!
//! - **Add phase**: every qualifying device, sensor and location gets exactly
//!   one accessory. Accessories already known to the host cache are adopted
//!   instead of being registered again.
//! - **Remove phase**: every cached accessory whose device, sensor, location
//!   or enabling flag is gone is collected into one batch, unregistered from
//!   the host and purged from the platform's collections.
//!
//! [`Reconciler`] computes a pass against a [`SyncState`] and returns a
//! [`SyncReport`]; [`Platform`] owns the state and performs the host calls.

pub mod host;
pub mod platform;
pub mod reconcile;
pub mod source;
pub mod state;

pub use host::{HostError, HostRegistry};
pub use platform::Platform;
pub use reconcile::{Reconciler, SyncReport};
pub use source::{parse_devices, DeviceSource, JsonFileSource, SourceError, DEVICES_FILE};
pub use state::SyncState;

//! Platform runner
//!
//! Owns the sync state and performs the host calls for each pass.

use std::sync::Arc;

use sensibo_config::PlatformConfig;
use sensibo_core::{Accessory, Device};
use tracing::{debug, info, warn};

use crate::host::HostRegistry;
use crate::reconcile::{Reconciler, SyncReport};
use crate::source::{DeviceSource, SourceError};
use crate::state::SyncState;

/// A running Sensibo platform
///
/// Passes take `&mut self`, so at most one can run at a time.
pub struct Platform<H: HostRegistry> {
    name: String,
    reconciler: Reconciler,
    state: SyncState,
    host: Arc<H>,
}

impl<H: HostRegistry> Platform<H> {
    /// Create a platform seeded with the accessories the host restored
    pub fn new(config: &PlatformConfig, host: Arc<H>, cached: Vec<Accessory>) -> Self {
        info!(
            "Starting platform {} with {} cached accessories",
            config.name,
            cached.len()
        );
        Self {
            name: config.name.clone(),
            reconciler: Reconciler::new(config.flags()),
            state: SyncState::from_cached(cached),
            host,
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Run one pass against a device inventory
    ///
    /// Host failures are logged and do not roll back the local state.
    pub fn sync(&mut self, devices: &[Device]) -> SyncReport {
        let report = self.reconciler.reconcile(devices, &mut self.state);

        if !report.registered.is_empty() {
            if let Err(e) = self.host.register_accessories(&report.registered) {
                warn!(error = %e, "Failed to register accessories with host");
            }
        }

        if !report.unregistered.is_empty() {
            debug!(
                batch = ?report.unregistered,
                "Unregistering unnecessary cached accessories"
            );
            if let Err(e) = self.host.unregister_accessories(&report.unregistered) {
                warn!(error = %e, "Failed to unregister accessories from host");
            }
        }

        if report.is_noop() {
            debug!("{}: accessories up to date", self.name);
        } else {
            info!(
                "{}: {} added, {} restored, {} removed ({} active)",
                self.name,
                report.registered.len(),
                report.restored.len(),
                report.unregistered.len(),
                self.state.active_len()
            );
        }
        report
    }

    /// Fetch a fresh inventory and run a pass over it
    ///
    /// A failed fetch skips the pass entirely.
    pub async fn refresh<S: DeviceSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<SyncReport, SourceError> {
        let devices = source.fetch_devices().await?;
        Ok(self.sync(&devices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensibo_core::{AccessoryKind, Location};
    use sensibo_registries::{AccessoryRegistry, Storage};
    use tempfile::TempDir;

    fn platform(dir: &TempDir) -> Platform<AccessoryRegistry> {
        let registry = Arc::new(AccessoryRegistry::new(Arc::new(Storage::new(dir.path()))));
        let config = PlatformConfig {
            enable_occupancy_sensor: true,
            ..PlatformConfig::default()
        };
        Platform::new(&config, registry, Vec::new())
    }

    fn pod(id: &str) -> Device {
        Device::new(id)
            .with_remote_capabilities(true)
            .with_location(Location::new("home1"))
    }

    #[test]
    fn test_sync_registers_with_host() {
        let dir = TempDir::new().unwrap();
        let mut platform = platform(&dir);

        let report = platform.sync(&[pod("pod1")]);

        assert_eq!(report.registered.len(), 2);
        assert_eq!(platform.host().len(), 2);
        assert_eq!(platform.state().active_len(), 2);
    }

    #[test]
    fn test_sync_unregisters_from_host() {
        let dir = TempDir::new().unwrap();
        let mut platform = platform(&dir);
        platform.sync(&[pod("pod1")]);

        let report = platform.sync(&[]);

        assert_eq!(report.unregistered.len(), 2);
        assert!(platform.host().is_empty());
        assert_eq!(platform.state().cached_len(), 0);
        assert!(!platform.state().has_location("home1"));
    }

    #[tokio::test]
    async fn test_refresh_reads_source() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(crate::DEVICES_FILE),
            r#"{"status": "success", "result": [{"id": "pod1", "remoteCapabilities": {}}]}"#,
        )
        .unwrap();
        let mut platform = platform(&dir);
        let source = crate::JsonFileSource::in_config_dir(dir.path());

        let report = platform.refresh(&source).await.unwrap();

        // No location reported, so only the air conditioner is built
        assert_eq!(report.registered[0].kind(), AccessoryKind::AirConditioner);
        assert_eq!(report.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_leaves_state() {
        let dir = TempDir::new().unwrap();
        let mut platform = platform(&dir);
        platform.sync(&[pod("pod1")]);
        let source = crate::JsonFileSource::in_config_dir(dir.path());

        assert!(platform.refresh(&source).await.is_err());
        assert_eq!(platform.state().active_len(), 2);
    }
}

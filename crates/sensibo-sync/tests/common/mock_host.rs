//! Recording host registry mock
//!
//! Records every bulk call so tests can assert on exactly what the platform
//! asked the host to do.

use std::sync::Mutex;

use sensibo_core::Accessory;
use sensibo_sync::{HostError, HostRegistry};
use uuid::Uuid;

/// One call made against the host
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Register(Vec<Uuid>),
    Unregister(Vec<Uuid>),
}

/// Host registry mock recording calls in order
#[derive(Default)]
pub struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
    fail_unregister: bool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host whose unregister calls always fail
    pub fn failing_unregister() -> Self {
        Self {
            fail_unregister: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn unregister_calls(&self) -> Vec<Vec<Uuid>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Unregister(uuids) => Some(uuids),
                HostCall::Register(_) => None,
            })
            .collect()
    }

    /// Assert the host received no calls since the last clear
    pub fn assert_untouched(&self) {
        let calls = self.calls();
        assert!(calls.is_empty(), "expected no host calls, got {:?}", calls);
    }
}

fn uuids(accessories: &[Accessory]) -> Vec<Uuid> {
    accessories.iter().map(|a| a.uuid).collect()
}

impl HostRegistry for RecordingHost {
    fn register_accessories(&self, accessories: &[Accessory]) -> Result<(), HostError> {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::Register(uuids(accessories)));
        Ok(())
    }

    fn unregister_accessories(&self, accessories: &[Accessory]) -> Result<(), HostError> {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::Unregister(uuids(accessories)));
        if self.fail_unregister {
            return Err(HostError::Rejected("bridge offline".to_string()));
        }
        Ok(())
    }
}

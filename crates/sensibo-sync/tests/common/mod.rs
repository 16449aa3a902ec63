//! Common test utilities for the sync integration tests

#![allow(dead_code)]

mod fixtures;
mod mock_host;

pub use fixtures::*;
pub use mock_host::*;

//! The MIG device client trait and its mock
//!
//! [`MigClient`] is the boundary between planning and hardware: the driver
//! layer implements it on top of NVML (or similar), and everything above it
//! stays testable through [`MockMigClient`].

use crate::{AgentError, Result};
use async_trait::async_trait;
use mig_core::types::ProfileName;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Device-level MIG operations
#[async_trait]
pub trait MigClient: Send + Sync {
    /// Create one MIG device of the given profile on a GPU
    async fn create_mig_device(&self, gpu_index: usize, profile: &ProfileName) -> Result<()>;

    /// Delete a MIG device by its hardware handle
    async fn delete_mig_device(&self, device_id: &str) -> Result<()>;

    /// Look up which GPU a MIG device sits on
    async fn gpu_index_of(&self, device_id: &str) -> Result<usize>;
}

/// One recorded call against a [`MockMigClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCall {
    /// A create call with its GPU index and profile
    Create {
        gpu_index: usize,
        profile: ProfileName,
    },
    /// A delete call with its device id
    Delete { device_id: String },
}

/// In-memory MIG client for tests.
///
/// Tracks a device-id → GPU-index map, records every call, and can be
/// configured to fail all calls with a fixed error.
#[derive(Debug, Clone, Default)]
pub struct MockMigClient {
    devices: Arc<RwLock<HashMap<String, usize>>>,
    calls: Arc<RwLock<Vec<ClientCall>>>,
    fail_with: Option<String>,
}

impl MockMigClient {
    /// Create a mock client with no devices
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock client seeded with known devices
    pub fn with_devices(devices: impl IntoIterator<Item = (String, usize)>) -> Self {
        Self {
            devices: Arc::new(RwLock::new(devices.into_iter().collect())),
            ..Self::default()
        }
    }

    /// Create a mock client whose every call fails with the given message
    pub fn failing_with(msg: impl Into<String>) -> Self {
        Self {
            fail_with: Some(msg.into()),
            ..Self::default()
        }
    }

    /// The calls recorded so far, in order
    pub async fn calls(&self) -> Vec<ClientCall> {
        self.calls.read().await.clone()
    }

    /// Number of devices currently known to the mock
    pub async fn device_count(&self) -> usize {
        self.devices.read().await.len()
    }

    fn check_failure(&self) -> Result<()> {
        match &self.fail_with {
            Some(msg) => Err(AgentError::client(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MigClient for MockMigClient {
    async fn create_mig_device(&self, gpu_index: usize, profile: &ProfileName) -> Result<()> {
        self.check_failure()?;

        let mut calls = self.calls.write().await;
        calls.push(ClientCall::Create {
            gpu_index,
            profile: profile.clone(),
        });

        let mut devices = self.devices.write().await;
        let device_id = format!("mock-gpu{}-{}-{}", gpu_index, profile, devices.len());
        devices.insert(device_id, gpu_index);
        Ok(())
    }

    async fn delete_mig_device(&self, device_id: &str) -> Result<()> {
        self.check_failure()?;

        let mut calls = self.calls.write().await;
        calls.push(ClientCall::Delete {
            device_id: device_id.to_string(),
        });

        let mut devices = self.devices.write().await;
        devices.remove(device_id);
        Ok(())
    }

    async fn gpu_index_of(&self, device_id: &str) -> Result<usize> {
        self.check_failure()?;

        let devices = self.devices.read().await;
        devices
            .get(device_id)
            .copied()
            .ok_or_else(|| AgentError::client(format!("unknown MIG device {}", device_id)))
    }
}

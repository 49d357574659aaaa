//! Observed MIG device resources
//!
//! A [`MigResource`] is one concrete partition instance reported by the
//! device layer: which GPU it sits on, its shape, the device id used for
//! delete calls, and whether a workload currently consumes it. [`MigState`]
//! is the full observed collection for a node, with the grouped views the
//! planner works on.

use crate::{Result, StateError};
use mig_core::labels;
use mig_core::types::{MigProfile, ProfileName, SliceStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One observed MIG slice on a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigResource {
    /// Opaque hardware handle, used for delete calls
    pub device_id: String,

    /// Index of the GPU exposing this slice
    pub gpu_index: usize,

    /// Shape of the slice
    pub profile: ProfileName,

    /// Whether a workload currently consumes the slice
    pub status: SliceStatus,
}

impl MigResource {
    /// Create a new resource record
    pub fn new(
        device_id: impl Into<String>,
        gpu_index: usize,
        profile: impl Into<ProfileName>,
        status: SliceStatus,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            gpu_index,
            profile: profile.into(),
            status,
        }
    }

    /// The externally-exposed resource name of this slice
    /// (e.g. "nvidia.com/mig-1g.5gb")
    pub fn resource_name(&self) -> String {
        format!("{}{}", labels::MIG_RESOURCE_PREFIX, self.profile)
    }

    /// The GPU-scoped profile of this slice
    pub fn mig_profile(&self) -> MigProfile {
        MigProfile::new(self.gpu_index, self.profile.clone())
    }

    /// Check if a workload currently consumes this slice
    pub fn is_used(&self) -> bool {
        self.status == SliceStatus::Used
    }

    /// Check if this slice is idle
    pub fn is_free(&self) -> bool {
        self.status == SliceStatus::Free
    }
}

/// Parse the profile out of an externally-exposed resource name.
///
/// Fails with [`StateError::InvalidResourceName`] if the name does not carry
/// the MIG resource prefix.
pub fn parse_resource_name(name: &str) -> Result<ProfileName> {
    name.strip_prefix(labels::MIG_RESOURCE_PREFIX)
        .filter(|profile| !profile.is_empty())
        .map(ProfileName::new)
        .ok_or_else(|| StateError::InvalidResourceName(name.to_string()))
}

/// The full observed collection of MIG slices on a node.
///
/// Rebuilt fresh from device reports every reconciliation pass; the planner
/// only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigState {
    resources: Vec<MigResource>,
}

impl MigState {
    /// Create a state from observed resources
    pub fn new(resources: Vec<MigResource>) -> Self {
        Self { resources }
    }

    /// The flat resource list
    pub fn resources(&self) -> &[MigResource] {
        &self.resources
    }

    /// Check if no resources were observed
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Number of observed resources
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Group resources by GPU-scoped profile
    pub fn group_by_mig_profile(&self) -> BTreeMap<MigProfile, Vec<MigResource>> {
        let mut result: BTreeMap<MigProfile, Vec<MigResource>> = BTreeMap::new();
        for resource in &self.resources {
            result
                .entry(resource.mig_profile())
                .or_default()
                .push(resource.clone());
        }
        result
    }

    /// Group resources by GPU index
    pub fn group_by_gpu_index(&self) -> BTreeMap<usize, Vec<MigResource>> {
        let mut result: BTreeMap<usize, Vec<MigResource>> = BTreeMap::new();
        for resource in &self.resources {
            result
                .entry(resource.gpu_index)
                .or_default()
                .push(resource.clone());
        }
        result
    }
}

impl FromIterator<MigResource> for MigState {
    fn from_iter<I: IntoIterator<Item = MigResource>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

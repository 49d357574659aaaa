//! Identifier types for MIG partitioning

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a MIG partition shape (e.g. "1g.5gb", "3g.20gb").
///
/// A profile identifies the compute/memory fraction of a single slice.
/// Value type, equality by identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProfileName(String);

impl ProfileName {
    /// Create a new ProfileName from a string
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the string representation of the profile name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProfileName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&str> for ProfileName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Hardware model of a GPU (e.g. "NVIDIA-A100-SXM4-40GB").
///
/// The model selects the allowed-geometry table; nothing else depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GpuModel(String);

impl GpuModel {
    /// Create a new GpuModel from a string
    pub fn new(model: impl Into<String>) -> Self {
        Self(model.into())
    }

    /// Get the string representation of the model
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GpuModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for GpuModel {
    fn from(model: String) -> Self {
        Self(model)
    }
}

impl From<&str> for GpuModel {
    fn from(model: &str) -> Self {
        Self(model.to_string())
    }
}

/// A profile pinned to a specific GPU on the node.
///
/// Plans and quantity reconciliation are keyed by this pair: the same shape
/// on two different GPUs is two different things to create or delete.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MigProfile {
    /// Index of the GPU on the node
    pub gpu_index: usize,

    /// Shape of the slice
    pub name: ProfileName,
}

impl MigProfile {
    /// Create a new MigProfile
    pub fn new(gpu_index: usize, name: impl Into<ProfileName>) -> Self {
        Self {
            gpu_index,
            name: name.into(),
        }
    }
}

impl fmt::Display for MigProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.gpu_index, self.name)
    }
}

/// Whether a slice is consumed by a running workload or idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceStatus {
    /// The slice is consumed by a running workload
    Used,
    /// The slice is idle and available
    Free,
}

impl SliceStatus {
    /// Get the string representation used in status annotation keys
    pub fn as_str(&self) -> &'static str {
        match self {
            SliceStatus::Used => "used",
            SliceStatus::Free => "free",
        }
    }
}

impl std::str::FromStr for SliceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "used" => Ok(SliceStatus::Used),
            "free" => Ok(SliceStatus::Free),
            _ => Err(format!("Unknown slice status: {}", s)),
        }
    }
}

impl fmt::Display for SliceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_name_creation() {
        let profile = ProfileName::new("1g.5gb");
        assert_eq!(profile.as_str(), "1g.5gb");
        assert_eq!(profile.to_string(), "1g.5gb");
        assert_eq!(profile, ProfileName::from("1g.5gb"));
        assert_ne!(profile, ProfileName::new("2g.10gb"));
    }

    #[test]
    fn test_mig_profile_display() {
        let profile = MigProfile::new(2, "3g.20gb");
        assert_eq!(profile.to_string(), "2-3g.20gb");
    }

    #[test]
    fn test_mig_profile_ordering() {
        let mut profiles = vec![
            MigProfile::new(1, "1g.5gb"),
            MigProfile::new(0, "2g.10gb"),
            MigProfile::new(0, "1g.5gb"),
        ];
        profiles.sort();

        assert_eq!(profiles[0], MigProfile::new(0, "1g.5gb"));
        assert_eq!(profiles[1], MigProfile::new(0, "2g.10gb"));
        assert_eq!(profiles[2], MigProfile::new(1, "1g.5gb"));
    }

    #[test]
    fn test_slice_status_parsing() {
        assert_eq!("used".parse::<SliceStatus>().unwrap(), SliceStatus::Used);
        assert_eq!("free".parse::<SliceStatus>().unwrap(), SliceStatus::Free);
        assert!("busy".parse::<SliceStatus>().is_err());

        assert_eq!(SliceStatus::Used.to_string(), "used");
        assert_eq!(SliceStatus::Free.to_string(), "free");
    }
}

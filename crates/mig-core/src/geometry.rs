//! Geometries and the per-model allowed-geometry tables
//!
//! A geometry is one complete simultaneous partition layout of a GPU, given
//! as slice counts per profile. MIG hardware supports only a small
//! vendor-defined set of simultaneous layouts per physical GPU model, so the
//! legal geometries are a finite, statically-known table keyed by model.

use crate::types::{GpuModel, ProfileName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Slice counts per profile.
///
/// Used both for complete layouts (entries sum to a legal hardware
/// configuration) and for the used/free views a GPU keeps per profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Geometry(BTreeMap<ProfileName, usize>);

impl Geometry {
    /// Create an empty geometry
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build a geometry from (profile, count) pairs
    pub fn from_pairs(pairs: &[(&str, usize)]) -> Self {
        pairs
            .iter()
            .map(|(profile, count)| (ProfileName::new(*profile), *count))
            .collect()
    }

    /// Get the slice count for a profile (zero if absent)
    pub fn count(&self, profile: &ProfileName) -> usize {
        self.0.get(profile).copied().unwrap_or(0)
    }

    /// Set the slice count for a profile
    pub fn set(&mut self, profile: ProfileName, count: usize) {
        self.0.insert(profile, count);
    }

    /// Iterate over (profile, count) entries in profile order
    pub fn iter(&self) -> impl Iterator<Item = (&ProfileName, usize)> {
        self.0.iter().map(|(profile, count)| (profile, *count))
    }

    /// Iterate over the profiles present in this geometry
    pub fn profiles(&self) -> impl Iterator<Item = &ProfileName> {
        self.0.keys()
    }

    /// Check if the geometry has no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries (including zero-count ones)
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if any profile has a strictly positive count
    pub fn any_positive(&self) -> bool {
        self.0.values().any(|count| *count > 0)
    }

    /// Total slice count across all profiles
    pub fn total_slices(&self) -> usize {
        self.0.values().sum()
    }

    /// Add another geometry's counts into this one, per profile
    pub fn merge(&mut self, other: &Geometry) {
        for (profile, count) in other.iter() {
            let current = self.count(profile);
            self.0.insert(profile.clone(), current + count);
        }
    }

    /// Drop entries whose count is zero
    pub fn retain_positive(&mut self) {
        self.0.retain(|_, count| *count > 0);
    }
}

/// Equality contract: two geometries are equal iff they have identical
/// profile sets and identical per-profile counts. An explicit zero entry is
/// not the same as an absent one.
impl PartialEq for Geometry {
    fn eq(&self, other: &Self) -> bool {
        if self.0.len() != other.0.len() {
            return false;
        }
        self.0
            .iter()
            .all(|(profile, count)| other.0.get(profile) == Some(count))
    }
}

impl Eq for Geometry {}

impl FromIterator<(ProfileName, usize)> for Geometry {
    fn from_iter<I: IntoIterator<Item = (ProfileName, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self
            .0
            .iter()
            .map(|(profile, count)| format!("{}:{}", profile, count))
            .collect();
        write!(f, "{}", entries.join(", "))
    }
}

/// NVIDIA A30 (24GB, 4 memory slices)
pub const GPU_MODEL_A30: &str = "NVIDIA-A30";

/// NVIDIA A100 SXM4 40GB (7 compute slices)
pub const GPU_MODEL_A100_SXM4_40GB: &str = "NVIDIA-A100-SXM4-40GB";

/// NVIDIA A100 SXM4 80GB (7 compute slices)
pub const GPU_MODEL_A100_SXM4_80GB: &str = "NVIDIA-A100-SXM4-80GB";

const A30_GEOMETRIES: &[&[(&str, usize)]] = &[
    &[("1g.6gb", 4)],
    &[("1g.6gb", 2), ("2g.12gb", 1)],
    &[("2g.12gb", 2)],
    &[("4g.24gb", 1)],
];

const A100_SXM4_40GB_GEOMETRIES: &[&[(&str, usize)]] = &[
    &[("1g.5gb", 7)],
    &[("1g.5gb", 5), ("2g.10gb", 1)],
    &[("1g.5gb", 3), ("2g.10gb", 2)],
    &[("1g.5gb", 1), ("2g.10gb", 3)],
    &[("1g.5gb", 4), ("3g.20gb", 1)],
    &[("1g.5gb", 2), ("2g.10gb", 1), ("3g.20gb", 1)],
    &[("2g.10gb", 2), ("3g.20gb", 1)],
    &[("1g.5gb", 1), ("3g.20gb", 2)],
    &[("3g.20gb", 2)],
    &[("1g.5gb", 3), ("4g.20gb", 1)],
    &[("3g.20gb", 1), ("4g.20gb", 1)],
    &[("7g.40gb", 1)],
];

const A100_SXM4_80GB_GEOMETRIES: &[&[(&str, usize)]] = &[
    &[("1g.10gb", 7)],
    &[("1g.10gb", 5), ("2g.20gb", 1)],
    &[("1g.10gb", 3), ("2g.20gb", 2)],
    &[("1g.10gb", 1), ("2g.20gb", 3)],
    &[("1g.10gb", 4), ("3g.40gb", 1)],
    &[("2g.20gb", 2), ("3g.40gb", 1)],
    &[("1g.10gb", 1), ("3g.40gb", 2)],
    &[("3g.40gb", 2)],
    &[("3g.40gb", 1), ("4g.40gb", 1)],
    &[("7g.80gb", 1)],
];

/// The legal simultaneous partition layouts for a GPU model, in stable
/// table order.
///
/// Unknown models get an empty list: such a GPU admits no geometry change
/// but does not fail the node.
pub fn allowed_geometries(model: &GpuModel) -> Vec<Geometry> {
    let table = match model.as_str() {
        GPU_MODEL_A30 => A30_GEOMETRIES,
        GPU_MODEL_A100_SXM4_40GB => A100_SXM4_40GB_GEOMETRIES,
        GPU_MODEL_A100_SXM4_80GB => A100_SXM4_80GB_GEOMETRIES,
        _ => return Vec::new(),
    };
    table.iter().map(|pairs| Geometry::from_pairs(pairs)).collect()
}

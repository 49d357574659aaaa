//! Typed spec and status annotation records
//!
//! Desired and observed allocation travel between passes as node annotations
//! with a fixed key format embedding the GPU index and profile. This module
//! provides the typed records and the key codec: strict single-record
//! parsing for callers that must reject malformed input, and lenient bulk
//! extraction that skips keys belonging to other systems.

use crate::error::{Error, Result};
use crate::labels;
use crate::types::{MigProfile, ProfileName, SliceStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Desired allocation of one profile on one GPU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuSpecAnnotation {
    /// Index of the GPU on the node
    pub gpu_index: usize,

    /// Requested slice shape
    pub profile: ProfileName,

    /// Requested number of slices
    pub quantity: usize,
}

impl GpuSpecAnnotation {
    /// Create a new spec annotation
    pub fn new(gpu_index: usize, profile: impl Into<ProfileName>, quantity: usize) -> Self {
        Self {
            gpu_index,
            profile: profile.into(),
            quantity,
        }
    }

    /// Parse a spec annotation from a key/value pair.
    ///
    /// Expects `mig.migmesh.io/spec-gpu-<index>-<profile>` with a decimal
    /// quantity value.
    pub fn parse(key: &str, value: &str) -> Result<Self> {
        let rest = key
            .strip_prefix(labels::SPEC_ANNOTATION_PREFIX)
            .ok_or_else(|| {
                Error::invalid_annotation(format!("{} is not a MIG spec annotation key", key))
            })?;
        let (gpu_index, profile) = split_gpu_index(key, rest)?;
        let quantity = parse_quantity(key, value)?;

        Ok(Self {
            gpu_index,
            profile: ProfileName::new(profile),
            quantity,
        })
    }

    /// Render the annotation key for this record
    pub fn key(&self) -> String {
        format!(
            "{}{}-{}",
            labels::SPEC_ANNOTATION_PREFIX,
            self.gpu_index,
            self.profile
        )
    }

    /// The GPU-scoped profile this annotation requests
    pub fn mig_profile(&self) -> MigProfile {
        MigProfile::new(self.gpu_index, self.profile.clone())
    }
}

/// Observed allocation of one profile on one GPU, split by used/free
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuStatusAnnotation {
    /// Index of the GPU on the node
    pub gpu_index: usize,

    /// Observed slice shape
    pub profile: ProfileName,

    /// Whether the counted slices are in use or idle
    pub status: SliceStatus,

    /// Observed number of slices
    pub quantity: usize,
}

impl GpuStatusAnnotation {
    /// Create a new status annotation
    pub fn new(
        gpu_index: usize,
        profile: impl Into<ProfileName>,
        status: SliceStatus,
        quantity: usize,
    ) -> Self {
        Self {
            gpu_index,
            profile: profile.into(),
            status,
            quantity,
        }
    }

    /// Parse a status annotation from a key/value pair.
    ///
    /// Expects `mig.migmesh.io/status-gpu-<index>-<profile>-<used|free>` with
    /// a decimal quantity value.
    pub fn parse(key: &str, value: &str) -> Result<Self> {
        let rest = key
            .strip_prefix(labels::STATUS_ANNOTATION_PREFIX)
            .ok_or_else(|| {
                Error::invalid_annotation(format!("{} is not a MIG status annotation key", key))
            })?;
        let (rest, status) = rest.rsplit_once('-').ok_or_else(|| {
            Error::invalid_annotation(format!("{} does not end in a used/free marker", key))
        })?;
        let status: SliceStatus = status.parse().map_err(Error::InvalidAnnotation)?;
        let (gpu_index, profile) = split_gpu_index(key, rest)?;
        let quantity = parse_quantity(key, value)?;

        Ok(Self {
            gpu_index,
            profile: ProfileName::new(profile),
            status,
            quantity,
        })
    }

    /// Render the annotation key for this record
    pub fn key(&self) -> String {
        format!(
            "{}{}-{}-{}",
            labels::STATUS_ANNOTATION_PREFIX,
            self.gpu_index,
            self.profile,
            self.status
        )
    }

    /// The GPU-scoped profile this annotation reports on
    pub fn mig_profile(&self) -> MigProfile {
        MigProfile::new(self.gpu_index, self.profile.clone())
    }

    /// Check if this annotation counts in-use slices
    pub fn is_used(&self) -> bool {
        self.status == SliceStatus::Used
    }

    /// Check if this annotation counts idle slices
    pub fn is_free(&self) -> bool {
        self.status == SliceStatus::Free
    }
}

/// Extract all spec annotations from a node's annotation map.
///
/// Lenient: keys that do not carry the spec prefix or do not parse are
/// skipped. The result is sorted by (GPU index, profile) so downstream
/// processing does not depend on map iteration order.
pub fn spec_annotations_from(annotations: &HashMap<String, String>) -> Vec<GpuSpecAnnotation> {
    let mut result: Vec<GpuSpecAnnotation> = annotations
        .iter()
        .filter_map(|(key, value)| GpuSpecAnnotation::parse(key, value).ok())
        .collect();
    result.sort_by(|a, b| (a.gpu_index, &a.profile).cmp(&(b.gpu_index, &b.profile)));
    result
}

/// Extract all status annotations from a node's annotation map.
///
/// Lenient, like [`spec_annotations_from`]; sorted by (GPU index, profile,
/// status).
pub fn status_annotations_from(annotations: &HashMap<String, String>) -> Vec<GpuStatusAnnotation> {
    let mut result: Vec<GpuStatusAnnotation> = annotations
        .iter()
        .filter_map(|(key, value)| GpuStatusAnnotation::parse(key, value).ok())
        .collect();
    result.sort_by(|a, b| {
        (a.gpu_index, &a.profile, a.status).cmp(&(b.gpu_index, &b.profile, b.status))
    });
    result
}

/// Group status annotations by GPU index
pub fn group_status_by_gpu(
    annotations: &[GpuStatusAnnotation],
) -> BTreeMap<usize, Vec<&GpuStatusAnnotation>> {
    let mut result: BTreeMap<usize, Vec<&GpuStatusAnnotation>> = BTreeMap::new();
    for annotation in annotations {
        result.entry(annotation.gpu_index).or_default().push(annotation);
    }
    result
}

/// Group spec annotations by GPU index
pub fn group_spec_by_gpu(
    annotations: &[GpuSpecAnnotation],
) -> BTreeMap<usize, Vec<&GpuSpecAnnotation>> {
    let mut result: BTreeMap<usize, Vec<&GpuSpecAnnotation>> = BTreeMap::new();
    for annotation in annotations {
        result.entry(annotation.gpu_index).or_default().push(annotation);
    }
    result
}

fn split_gpu_index<'a>(key: &str, rest: &'a str) -> Result<(usize, &'a str)> {
    let (index, profile) = rest.split_once('-').ok_or_else(|| {
        Error::invalid_annotation(format!("{} does not embed a GPU index and profile", key))
    })?;
    let index = index.parse::<usize>().map_err(|_| {
        Error::invalid_annotation(format!("{} has a non-numeric GPU index", key))
    })?;
    if profile.is_empty() {
        return Err(Error::invalid_annotation(format!(
            "{} has an empty profile name",
            key
        )));
    }
    Ok((index, profile))
}

fn parse_quantity(key: &str, value: &str) -> Result<usize> {
    value.parse::<usize>().map_err(|_| {
        Error::invalid_annotation(format!("{} has a non-numeric quantity {:?}", key, value))
    })
}

//! Status-annotation computation and spec-vs-status matching
//!
//! After the hardware adapter has applied a plan, the controller re-derives
//! status annotations from the observed resources — one record per
//! (GPU index, profile, used|free) triple — and republishes them for the
//! next pass. Matching spec against status decides whether a pass has
//! anything left to do.

use crate::resource::MigResource;
use mig_core::annotation::{GpuSpecAnnotation, GpuStatusAnnotation};
use mig_core::types::{MigProfile, ProfileName, SliceStatus};
use std::collections::BTreeMap;

/// Derive status annotations from observed resources.
///
/// Resources are counted per (GPU index, profile, status); the result is
/// sorted by that triple.
pub fn compute_status_annotations(resources: &[MigResource]) -> Vec<GpuStatusAnnotation> {
    let mut counts: BTreeMap<(usize, &ProfileName, SliceStatus), usize> = BTreeMap::new();
    for resource in resources {
        *counts
            .entry((resource.gpu_index, &resource.profile, resource.status))
            .or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((gpu_index, profile, status), quantity)| {
            GpuStatusAnnotation::new(gpu_index, profile.clone(), status, quantity)
        })
        .collect()
}

/// Check whether the desired annotations are already satisfied by the
/// observed status annotations.
///
/// Quantities are summed per GPU-scoped profile on both sides (a status
/// slice counts whether used or free) and compared key set against key set.
pub fn spec_matches_status(spec: &[GpuSpecAnnotation], status: &[GpuStatusAnnotation]) -> bool {
    let mut desired: BTreeMap<MigProfile, usize> = BTreeMap::new();
    for annotation in spec {
        *desired.entry(annotation.mig_profile()).or_default() += annotation.quantity;
    }

    let mut observed: BTreeMap<MigProfile, usize> = BTreeMap::new();
    for annotation in status {
        *observed.entry(annotation.mig_profile()).or_default() += annotation.quantity;
    }

    counts_equal(&desired, &observed)
}

// Equality of derived count mappings is an explicit contract: identical key
// sets and identical per-key values.
fn counts_equal(a: &BTreeMap<MigProfile, usize>, b: &BTreeMap<MigProfile, usize>) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|(key, count)| b.get(key) == Some(count))
}

//! Plan generation: diffing observed state against desired annotations
//!
//! A [`MigConfigPlan`] is the minimal set of hardware mutations needed to
//! make the observed MIG slices of a node match its desired annotations.
//! Operations are keyed by GPU-scoped profile, so the same shape on two
//! different GPUs reconciles independently; for any one key the diff is net
//! and single-signed, so a plan never carries both a create and a delete
//! for the same key.

use crate::resource::{MigResource, MigState};
use mig_core::annotation::GpuSpecAnnotation;
use mig_core::types::{MigProfile, ProfileName};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Create `quantity` new slices of a profile on its GPU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOperation {
    /// GPU-scoped profile to create
    pub profile: MigProfile,

    /// Number of slices to create
    pub quantity: usize,
}

/// Delete `quantity` slices of a profile on its GPU.
///
/// `resources` carries every observed slice of the key; any `quantity` of
/// them may be chosen for deletion — the choice is left to the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOperation {
    /// GPU-scoped profile to delete
    pub profile: MigProfile,

    /// Observed slices of this profile the executor may delete from
    pub resources: Vec<MigResource>,

    /// Number of slices to delete
    pub quantity: usize,
}

/// Ordered hardware mutations reconciling observed state with desired
/// annotations. Deletes are applied before creates so freed capacity is
/// available for the new slices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigConfigPlan {
    /// Slices to delete, in (GPU index, profile) order
    pub delete_operations: Vec<DeleteOperation>,

    /// Slices to create, in (GPU index, profile) order
    pub create_operations: Vec<CreateOperation>,
}

impl MigConfigPlan {
    /// Diff observed state against desired annotations.
    ///
    /// 1. Orphan detection: every observed resource whose profile is not
    ///    requested for its GPU index is deleted, one operation per
    ///    GPU-scoped profile.
    /// 2. Quantity reconciliation: for each requested GPU-scoped profile,
    ///    the summed desired quantity is compared against the observed
    ///    count; a positive difference becomes a create, a negative one a
    ///    delete carrying the observed resources, zero produces nothing.
    ///
    /// Profiles absent from both sides produce no operation, and the plan
    /// is empty iff observed state already matches the desired annotations
    /// per (GPU index, profile).
    pub fn new(state: &MigState, desired: &[GpuSpecAnnotation]) -> Self {
        let mut plan = Self::default();

        // Resources present in the current state whose profile is no longer
        // requested on their GPU
        let orphaned: MigState = orphaned_resources(state, desired).into_iter().collect();
        for (profile, resources) in orphaned.group_by_mig_profile() {
            let quantity = resources.len();
            plan.add_delete_op(DeleteOperation {
                profile,
                resources,
                quantity,
            });
        }

        // Reconcile quantities for the requested profiles
        let state_resources = state.group_by_mig_profile();
        for (profile, total_desired) in desired_quantities(desired) {
            let actual = state_resources.get(&profile).cloned().unwrap_or_default();

            if total_desired > actual.len() {
                plan.add_create_op(CreateOperation {
                    profile,
                    quantity: total_desired - actual.len(),
                });
            } else if total_desired < actual.len() {
                plan.add_delete_op(DeleteOperation {
                    profile,
                    quantity: actual.len() - total_desired,
                    resources: actual,
                });
            }
        }

        plan
    }

    /// Check if the plan carries no operations.
    ///
    /// Used by the controller to short-circuit hardware calls.
    pub fn is_empty(&self) -> bool {
        self.delete_operations.is_empty() && self.create_operations.is_empty()
    }

    fn add_delete_op(&mut self, op: DeleteOperation) {
        self.delete_operations.push(op);
    }

    fn add_create_op(&mut self, op: CreateOperation) {
        self.create_operations.push(op);
    }
}

/// Observed resources whose profile is not requested for their GPU index.
///
/// A GPU absent from the desired annotations orphans all of its resources.
fn orphaned_resources(state: &MigState, desired: &[GpuSpecAnnotation]) -> Vec<MigResource> {
    let mut requested: BTreeMap<usize, BTreeSet<&ProfileName>> = BTreeMap::new();
    for annotation in desired {
        requested
            .entry(annotation.gpu_index)
            .or_default()
            .insert(&annotation.profile);
    }

    state
        .resources()
        .iter()
        .filter(|resource| {
            !requested
                .get(&resource.gpu_index)
                .is_some_and(|profiles| profiles.contains(&resource.profile))
        })
        .cloned()
        .collect()
}

/// Desired quantities summed per GPU-scoped profile
fn desired_quantities(desired: &[GpuSpecAnnotation]) -> BTreeMap<MigProfile, usize> {
    let mut result: BTreeMap<MigProfile, usize> = BTreeMap::new();
    for annotation in desired {
        *result.entry(annotation.mig_profile()).or_default() += annotation.quantity;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use mig_core::types::SliceStatus;

    #[test]
    fn test_create_when_desired_exceeds_observed() {
        // GPU 0 exposes two used 1g.5gb slices; three are desired.
        let state = MigState::new(vec![
            MigResource::new("mig-0-0", 0, "1g.5gb", SliceStatus::Used),
            MigResource::new("mig-0-1", 0, "1g.5gb", SliceStatus::Used),
        ]);
        let desired = vec![GpuSpecAnnotation::new(0, "1g.5gb", 3)];

        let plan = MigConfigPlan::new(&state, &desired);
        assert!(plan.delete_operations.is_empty());
        assert_eq!(
            plan.create_operations,
            vec![CreateOperation {
                profile: MigProfile::new(0, "1g.5gb"),
                quantity: 1,
            }]
        );
    }

    #[test]
    fn test_delete_orphaned_resource() {
        // A 2g.10gb slice on GPU 0 with no matching desired annotation.
        let resource = MigResource::new("mig-0-0", 0, "2g.10gb", SliceStatus::Used);
        let state = MigState::new(vec![resource.clone()]);

        let plan = MigConfigPlan::new(&state, &[]);
        assert!(plan.create_operations.is_empty());
        assert_eq!(
            plan.delete_operations,
            vec![DeleteOperation {
                profile: MigProfile::new(0, "2g.10gb"),
                resources: vec![resource],
                quantity: 1,
            }]
        );
    }

    #[test]
    fn test_delete_excess_resources() {
        let state = MigState::new(vec![
            MigResource::new("a", 0, "1g.5gb", SliceStatus::Free),
            MigResource::new("b", 0, "1g.5gb", SliceStatus::Free),
            MigResource::new("c", 0, "1g.5gb", SliceStatus::Used),
        ]);
        let desired = vec![GpuSpecAnnotation::new(0, "1g.5gb", 1)];

        let plan = MigConfigPlan::new(&state, &desired);
        assert!(plan.create_operations.is_empty());
        assert_eq!(plan.delete_operations.len(), 1);

        let op = &plan.delete_operations[0];
        assert_eq!(op.quantity, 2);
        // All observed slices of the key are offered for selection.
        assert_eq!(op.resources.len(), 3);
    }

    #[test]
    fn test_empty_plan_when_state_matches_desired() {
        let state = MigState::new(vec![
            MigResource::new("a", 0, "1g.5gb", SliceStatus::Used),
            MigResource::new("b", 1, "3g.20gb", SliceStatus::Free),
        ]);
        let desired = vec![
            GpuSpecAnnotation::new(0, "1g.5gb", 1),
            GpuSpecAnnotation::new(1, "3g.20gb", 1),
        ];

        let plan = MigConfigPlan::new(&state, &desired);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_empty_state_and_desired() {
        let plan = MigConfigPlan::new(&MigState::default(), &[]);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_profile_moving_between_gpus() {
        // The slice exists on GPU 0 but is desired on GPU 1: one delete on
        // GPU 0 and one create on GPU 1, never both for the same key.
        let state = MigState::new(vec![MigResource::new(
            "mig-0-0",
            0,
            "1g.5gb",
            SliceStatus::Free,
        )]);
        let desired = vec![GpuSpecAnnotation::new(1, "1g.5gb", 1)];

        let plan = MigConfigPlan::new(&state, &desired);
        assert_eq!(plan.delete_operations.len(), 1);
        assert_eq!(plan.delete_operations[0].profile, MigProfile::new(0, "1g.5gb"));
        assert_eq!(plan.create_operations.len(), 1);
        assert_eq!(plan.create_operations[0].profile, MigProfile::new(1, "1g.5gb"));
    }

    #[test]
    fn test_never_create_and_delete_for_same_profile() {
        // A mixed state: excess on GPU 0, shortage on GPU 1, an orphan on
        // GPU 2. No key may appear in both operation lists.
        let state = MigState::new(vec![
            MigResource::new("a", 0, "1g.5gb", SliceStatus::Free),
            MigResource::new("b", 0, "1g.5gb", SliceStatus::Free),
            MigResource::new("c", 1, "1g.5gb", SliceStatus::Used),
            MigResource::new("d", 2, "3g.20gb", SliceStatus::Free),
        ]);
        let desired = vec![
            GpuSpecAnnotation::new(0, "1g.5gb", 1),
            GpuSpecAnnotation::new(1, "1g.5gb", 2),
        ];

        let plan = MigConfigPlan::new(&state, &desired);

        let created: BTreeSet<&MigProfile> =
            plan.create_operations.iter().map(|op| &op.profile).collect();
        let deleted: BTreeSet<&MigProfile> =
            plan.delete_operations.iter().map(|op| &op.profile).collect();
        assert!(created.is_disjoint(&deleted));

        assert_eq!(created.len(), 1);
        assert!(created.contains(&MigProfile::new(1, "1g.5gb")));
        assert_eq!(deleted.len(), 2);
        assert!(deleted.contains(&MigProfile::new(0, "1g.5gb")));
        assert!(deleted.contains(&MigProfile::new(2, "3g.20gb")));
    }

    #[test]
    fn test_desired_quantities_sum_per_key() {
        let desired = vec![
            GpuSpecAnnotation::new(0, "1g.5gb", 2),
            GpuSpecAnnotation::new(0, "1g.5gb", 1),
            GpuSpecAnnotation::new(1, "1g.5gb", 4),
        ];

        let quantities = desired_quantities(&desired);
        assert_eq!(quantities[&MigProfile::new(0, "1g.5gb")], 3);
        assert_eq!(quantities[&MigProfile::new(1, "1g.5gb")], 4);
    }

    #[test]
    fn test_plan_order_is_deterministic() {
        let state = MigState::new(vec![
            MigResource::new("a", 1, "3g.20gb", SliceStatus::Free),
            MigResource::new("b", 0, "2g.10gb", SliceStatus::Free),
        ]);
        let desired = vec![
            GpuSpecAnnotation::new(2, "1g.5gb", 1),
            GpuSpecAnnotation::new(0, "7g.40gb", 1),
        ];

        let plan = MigConfigPlan::new(&state, &desired);

        // Orphan deletes sorted by (GPU index, profile)
        assert_eq!(plan.delete_operations[0].profile, MigProfile::new(0, "2g.10gb"));
        assert_eq!(plan.delete_operations[1].profile, MigProfile::new(1, "3g.20gb"));
        // Creates sorted by (GPU index, profile)
        assert_eq!(plan.create_operations[0].profile, MigProfile::new(0, "7g.40gb"));
        assert_eq!(plan.create_operations[1].profile, MigProfile::new(2, "1g.5gb"));
    }
}

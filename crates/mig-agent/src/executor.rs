//! Plan execution against a MIG device client
//!
//! [`PlanExecutor`] turns a computed [`MigConfigPlan`] into device calls:
//! deletes first so freed capacity is available for the creates that
//! follow. Individual failures never abort the rest of the plan — they are
//! collected into the returned [`ExecutionSummary`] and the controller
//! decides what to do on the next pass.

use crate::client::MigClient;
use crate::Result;
use mig_state::plan::{CreateOperation, DeleteOperation, MigConfigPlan};
use tracing::{debug, info, warn};

/// Outcome of applying a plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// Number of devices created
    pub created: usize,

    /// Number of devices deleted
    pub deleted: usize,

    /// Per-operation failure messages, in execution order
    pub failures: Vec<String>,
}

impl ExecutionSummary {
    /// Check if every operation applied cleanly
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Applies plans through a [`MigClient`]
pub struct PlanExecutor<C> {
    client: C,
}

impl<C: MigClient> PlanExecutor<C> {
    /// Create an executor over a device client
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Apply a plan: every delete operation, then every create operation.
    ///
    /// Deletion only ever touches free devices — an in-use slice reported in
    /// a delete operation is left alone and counted as a shortfall. Failures
    /// are collected into the summary; execution continues with the
    /// remaining operations.
    pub async fn apply(&self, plan: &MigConfigPlan) -> Result<ExecutionSummary> {
        let mut summary = ExecutionSummary::default();

        if plan.is_empty() {
            debug!("plan is empty, nothing to apply");
            return Ok(summary);
        }

        for op in &plan.delete_operations {
            self.apply_delete(op, &mut summary).await;
        }
        for op in &plan.create_operations {
            self.apply_create(op, &mut summary).await;
        }

        info!(
            created = summary.created,
            deleted = summary.deleted,
            failures = summary.failures.len(),
            "plan applied"
        );
        Ok(summary)
    }

    async fn apply_delete(&self, op: &DeleteOperation, summary: &mut ExecutionSummary) {
        let candidates: Vec<_> = op
            .resources
            .iter()
            .filter(|resource| resource.is_free())
            .take(op.quantity)
            .collect();

        if candidates.len() < op.quantity {
            let msg = format!(
                "profile {}: only {} of {} devices are free to delete",
                op.profile,
                candidates.len(),
                op.quantity
            );
            warn!("{}", msg);
            summary.failures.push(msg);
        }

        for resource in candidates {
            match self.client.delete_mig_device(&resource.device_id).await {
                Ok(()) => {
                    debug!(
                        device_id = %resource.device_id,
                        profile = %op.profile,
                        "deleted MIG device"
                    );
                    summary.deleted += 1;
                }
                Err(e) => {
                    let msg = format!("delete {} failed: {}", resource.device_id, e);
                    warn!("{}", msg);
                    summary.failures.push(msg);
                }
            }
        }
    }

    async fn apply_create(&self, op: &CreateOperation, summary: &mut ExecutionSummary) {
        for _ in 0..op.quantity {
            match self
                .client
                .create_mig_device(op.profile.gpu_index, &op.profile.name)
                .await
            {
                Ok(()) => {
                    debug!(profile = %op.profile, "created MIG device");
                    summary.created += 1;
                }
                Err(e) => {
                    let msg = format!("create {} failed: {}", op.profile, e);
                    warn!("{}", msg);
                    summary.failures.push(msg);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientCall, MockMigClient};
    use mig_core::types::{MigProfile, ProfileName, SliceStatus};
    use mig_state::{MigConfigPlan, MigResource, MigState};
    use mig_core::annotation::GpuSpecAnnotation;

    #[tokio::test]
    async fn test_empty_plan_is_a_noop() {
        let client = MockMigClient::new();
        let executor = PlanExecutor::new(client.clone());

        let summary = executor.apply(&MigConfigPlan::default()).await.unwrap();
        assert_eq!(summary, ExecutionSummary::default());
        assert!(client.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_deletes_run_before_creates() {
        // One free orphan on GPU 0 and a new slice desired on GPU 1.
        let state = MigState::new(vec![MigResource::new(
            "mig-0-0",
            0,
            "1g.5gb",
            SliceStatus::Free,
        )]);
        let desired = vec![GpuSpecAnnotation::new(1, "1g.5gb", 1)];
        let plan = MigConfigPlan::new(&state, &desired);

        let client = MockMigClient::with_devices([("mig-0-0".to_string(), 0)]);
        let executor = PlanExecutor::new(client.clone());
        let summary = executor.apply(&plan).await.unwrap();

        assert!(summary.is_complete());
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.created, 1);

        let calls = client.calls().await;
        assert_eq!(
            calls,
            vec![
                ClientCall::Delete {
                    device_id: "mig-0-0".to_string(),
                },
                ClientCall::Create {
                    gpu_index: 1,
                    profile: ProfileName::new("1g.5gb"),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_skips_in_use_devices() {
        let plan = MigConfigPlan {
            delete_operations: vec![mig_state::DeleteOperation {
                profile: MigProfile::new(0, "1g.5gb"),
                resources: vec![
                    MigResource::new("busy", 0, "1g.5gb", SliceStatus::Used),
                    MigResource::new("idle", 0, "1g.5gb", SliceStatus::Free),
                ],
                quantity: 1,
            }],
            create_operations: Vec::new(),
        };

        let client = MockMigClient::with_devices([
            ("busy".to_string(), 0),
            ("idle".to_string(), 0),
        ]);
        let executor = PlanExecutor::new(client.clone());
        let summary = executor.apply(&plan).await.unwrap();

        assert!(summary.is_complete());
        assert_eq!(summary.deleted, 1);
        assert_eq!(
            client.calls().await,
            vec![ClientCall::Delete {
                device_id: "idle".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_delete_shortfall_is_reported() {
        // Two deletions requested but only one device is free.
        let plan = MigConfigPlan {
            delete_operations: vec![mig_state::DeleteOperation {
                profile: MigProfile::new(0, "1g.5gb"),
                resources: vec![
                    MigResource::new("busy", 0, "1g.5gb", SliceStatus::Used),
                    MigResource::new("idle", 0, "1g.5gb", SliceStatus::Free),
                ],
                quantity: 2,
            }],
            create_operations: Vec::new(),
        };

        let executor = PlanExecutor::new(MockMigClient::new());
        let summary = executor.apply(&plan).await.unwrap();

        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.failures.len(), 1);
        assert!(summary.failures[0].contains("only 1 of 2"));
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_remaining_operations() {
        let plan = MigConfigPlan {
            delete_operations: Vec::new(),
            create_operations: vec![
                mig_state::CreateOperation {
                    profile: MigProfile::new(0, "1g.5gb"),
                    quantity: 2,
                },
                mig_state::CreateOperation {
                    profile: MigProfile::new(1, "3g.20gb"),
                    quantity: 1,
                },
            ],
        };

        let executor = PlanExecutor::new(MockMigClient::failing_with("driver unreachable"));
        let summary = executor.apply(&plan).await.unwrap();

        assert_eq!(summary.created, 0);
        assert_eq!(summary.failures.len(), 3);
        assert!(!summary.is_complete());
    }
}

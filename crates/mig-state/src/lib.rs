//! # mig-state
//!
//! Observed-state views and plan generation for migmesh.
//!
//! This crate provides:
//! - [`MigResource`] and [`MigState`]: the observed collection of MIG slices
//!   on a node, with grouped views
//! - [`MigConfigPlan`]: the minimal set of create/delete operations needed
//!   to make observed state match desired annotations
//! - Status-annotation computation and spec-vs-status matching
//!
//! Everything here is a pure computation over value snapshots: no I/O, no
//! logging, no retries. The surrounding controller feeds in fresh state
//! every reconciliation pass and hands the resulting plan to a hardware
//! adapter.
//!
//! ## Example
//!
//! ```rust
//! use mig_core::{GpuSpecAnnotation, SliceStatus};
//! use mig_state::{MigConfigPlan, MigResource, MigState};
//!
//! // GPU 0 exposes two 1g.5gb slices; three are desired.
//! let state = MigState::new(vec![
//!     MigResource::new("mig-0-0", 0, "1g.5gb", SliceStatus::Used),
//!     MigResource::new("mig-0-1", 0, "1g.5gb", SliceStatus::Used),
//! ]);
//! let desired = vec![GpuSpecAnnotation::new(0, "1g.5gb", 3)];
//!
//! let plan = MigConfigPlan::new(&state, &desired);
//! assert!(plan.delete_operations.is_empty());
//! assert_eq!(plan.create_operations.len(), 1);
//! assert_eq!(plan.create_operations[0].quantity, 1);
//! ```

use thiserror::Error;

pub mod plan;
pub mod resource;
pub mod status;

// Re-export commonly used types
pub use plan::{CreateOperation, DeleteOperation, MigConfigPlan};
pub use resource::{MigResource, MigState};
pub use status::{compute_status_annotations, spec_matches_status};

/// Result type for state operations
pub type Result<T> = std::result::Result<T, StateError>;

/// Errors that can occur while decoding observed state
#[derive(Error, Debug)]
pub enum StateError {
    #[error("invalid MIG resource name: {0}")]
    InvalidResourceName(String),

    #[error("core error: {0}")]
    Core(#[from] mig_core::Error),
}

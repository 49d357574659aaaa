//! # mig-core
//!
//! Core data model for migmesh — MIG partition planning on a cluster node.
//!
//! This crate provides the foundational types shared across all migmesh
//! components. It includes:
//!
//! - Profile and GPU-model identifiers
//! - Geometries (complete simultaneous partition layouts) and the per-model
//!   allowed-geometry tables
//! - Per-GPU used/free accounting with legal geometry transitions
//! - The node aggregate with capacity queries, speculative workload
//!   admission, and the geometry search
//! - Typed spec/status annotation records and their key codec
//! - Label constants and error handling types
//!
//! Everything here is pure and synchronous: nodes are rebuilt fresh from
//! annotations every reconciliation pass and never talk to hardware.
//!
//! ## Example
//!
//! ```rust
//! use mig_core::geometry::GPU_MODEL_A100_SXM4_40GB;
//! use mig_core::{Geometry, GpuModel, MigGpu, MigNode, ProfileName};
//!
//! // One A100 with a 3g.20gb slice in use and nothing free.
//! let model = GpuModel::new(GPU_MODEL_A100_SXM4_40GB);
//! let used = Geometry::from_pairs(&[("3g.20gb", 1)]);
//! let gpu = MigGpu::new(model, 0, used, Geometry::new());
//! let mut node = MigNode::new("gpu-node-1", vec![gpu]);
//!
//! // Find a legal layout that frees up a 1g.5gb slice.
//! let profile = ProfileName::new("1g.5gb");
//! node.update_geometry_for(&profile).unwrap();
//! assert!(node.has_free_capacity());
//! ```

pub mod annotation;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod labels;
pub mod node;
pub mod types;

// Re-export commonly used types at the crate root
pub use annotation::{GpuSpecAnnotation, GpuStatusAnnotation};
pub use error::{Error, Result};
pub use geometry::Geometry;
pub use gpu::MigGpu;
pub use node::MigNode;
pub use types::{GpuModel, MigProfile, ProfileName, SliceStatus};

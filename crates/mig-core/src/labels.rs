//! Label and annotation key vocabulary
//!
//! Constants for the node labels and annotation key prefixes migmesh reads
//! and writes, plus lookup helpers over a node's label map.

use crate::error::{Error, Result};
use crate::types::GpuModel;
use std::collections::HashMap;

/// Node label carrying the GPU hardware model, as published by the NVIDIA
/// GPU feature discovery stack.
pub const NVIDIA_PRODUCT_LABEL: &str = "nvidia.com/gpu.product";

/// Prefix of the externally-exposed resource name of a MIG slice
/// (e.g. "nvidia.com/mig-1g.5gb").
pub const MIG_RESOURCE_PREFIX: &str = "nvidia.com/mig-";

/// Prefix of desired-allocation annotation keys:
/// `mig.migmesh.io/spec-gpu-<index>-<profile>` with a decimal quantity value.
pub const SPEC_ANNOTATION_PREFIX: &str = "mig.migmesh.io/spec-gpu-";

/// Prefix of observed-allocation annotation keys:
/// `mig.migmesh.io/status-gpu-<index>-<profile>-<used|free>` with a decimal
/// quantity value.
pub const STATUS_ANNOTATION_PREFIX: &str = "mig.migmesh.io/status-gpu-";

/// Look up the GPU model of a node from its label map.
///
/// Fails with [`Error::MissingHardwareLabel`] if the label is absent; callers
/// treat that node as having zero MIG GPUs rather than blocking the pass.
pub fn gpu_model(labels: &HashMap<String, String>) -> Result<GpuModel> {
    labels
        .get(NVIDIA_PRODUCT_LABEL)
        .map(|model| GpuModel::new(model.as_str()))
        .ok_or_else(|| Error::MissingHardwareLabel(NVIDIA_PRODUCT_LABEL.to_string()))
}

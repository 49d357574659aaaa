//! Node aggregate and the geometry search
//!
//! A [`MigNode`] composes the MIG GPUs of one cluster node. It is rebuilt
//! fresh from labels and status annotations every reconciliation pass —
//! never incrementally mutated across passes — and cloned for speculative
//! exploration within a pass.

use crate::annotation::{self, GpuStatusAnnotation};
use crate::error::{Error, Result};
use crate::geometry::Geometry;
use crate::gpu::MigGpu;
use crate::labels;
use crate::types::ProfileName;
use std::collections::HashMap;

/// The MIG GPUs of one cluster node, in index order
#[derive(Debug, Clone, PartialEq)]
pub struct MigNode {
    name: String,
    gpus: Vec<MigGpu>,
}

impl MigNode {
    /// Create a node from already-built GPUs
    pub fn new(name: impl Into<String>, gpus: Vec<MigGpu>) -> Self {
        Self {
            name: name.into(),
            gpus,
        }
    }

    /// Build a node from its label map and observed status annotations.
    ///
    /// A node without the GPU model label is returned with zero GPUs rather
    /// than failing: it simply offers no MIG capacity this pass. Status
    /// annotations are grouped per GPU index into used/free counts.
    pub fn from_annotations(
        name: impl Into<String>,
        node_labels: &HashMap<String, String>,
        status: &[GpuStatusAnnotation],
    ) -> Result<Self> {
        let name = name.into();
        let model = match labels::gpu_model(node_labels) {
            Ok(model) => model,
            Err(_) => return Ok(Self::new(name, Vec::new())),
        };

        let mut gpus = Vec::new();
        for (gpu_index, annotations) in annotation::group_status_by_gpu(status) {
            let mut used = Geometry::new();
            let mut free = Geometry::new();
            for a in annotations {
                if a.is_used() {
                    used.set(a.profile.clone(), a.quantity);
                }
                if a.is_free() {
                    free.set(a.profile.clone(), a.quantity);
                }
            }
            gpus.push(MigGpu::new(model.clone(), gpu_index, used, free));
        }

        Ok(Self::new(name, gpus))
    }

    /// Name of the node
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node's GPUs, in index order
    pub fn gpus(&self) -> &[MigGpu] {
        &self.gpus
    }

    /// Make some GPU offer a free slice of the given profile.
    ///
    /// For each GPU in node order: if the GPU already has a free slice of
    /// the profile, nothing is done. Otherwise every candidate geometry in
    /// the GPU's allowed set is tried in table order; a candidate is
    /// attempted only if it would leave at least one slice of the profile
    /// over what is already in use, and [`MigGpu::apply_geometry`]
    /// independently re-verifies that no other profile's in-use count is
    /// violated. The first successful application ends the search.
    ///
    /// Fails with [`Error::GeometryUpdateInfeasible`] if no GPU admits any
    /// candidate (or the node has zero GPUs). Failure guarantees that no
    /// GPU was mutated: applications are all-or-nothing and at most one
    /// ever succeeds.
    pub fn update_geometry_for(&mut self, profile: &ProfileName) -> Result<()> {
        if self.gpus.is_empty() {
            return Err(Error::GeometryUpdateInfeasible(profile.clone()));
        }

        for gpu in &mut self.gpus {
            if gpu.free_count(profile) > 0 {
                return Ok(());
            }
            let candidates = gpu.allowed_geometries().to_vec();
            for candidate in candidates {
                if candidate.count(profile) > gpu.used_count(profile)
                    && gpu.apply_geometry(&candidate).is_ok()
                {
                    return Ok(());
                }
            }
        }

        Err(Error::GeometryUpdateInfeasible(profile.clone()))
    }

    /// The overall layout of the node: the elementwise sum of every GPU's
    /// current geometry
    pub fn current_geometry(&self) -> Geometry {
        let mut result = Geometry::new();
        for gpu in &self.gpus {
            result.merge(&gpu.current_geometry());
        }
        result
    }

    /// Check if any GPU has an idle slice
    pub fn has_free_capacity(&self) -> bool {
        self.gpus.iter().any(|gpu| gpu.has_free_devices())
    }

    /// Admit a workload speculatively: first-fit across GPUs in list order.
    ///
    /// The first GPU whose free capacity covers every profile/quantity of
    /// the combined request is debited. Fails with
    /// [`Error::InsufficientCapacity`] if no GPU qualifies; this is an
    /// in-memory admission check, not a final binding.
    pub fn add_workload(&mut self, request: &Geometry) -> Result<()> {
        for gpu in &mut self.gpus {
            if gpu.fits(request) {
                return gpu.allocate(request);
            }
        }
        Err(Error::insufficient_capacity(format!(
            "no GPU on node {} can satisfy request [{}]",
            self.name, request
        )))
    }
}

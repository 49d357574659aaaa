//! Per-GPU MIG partition accounting
//!
//! A [`MigGpu`] tracks which slices are consumed by running workloads and
//! which are idle, per profile, and owns the only operation that changes a
//! GPU's partition layout: [`MigGpu::apply_geometry`]. Layout changes are
//! all-or-nothing and never destroy in-use slices.

use crate::error::{Error, Result};
use crate::geometry::{allowed_geometries, Geometry};
use crate::types::{GpuModel, ProfileName};

/// One MIG-capable GPU on a node.
///
/// Invariant: `used + free`, per profile, equals some geometry in the
/// model's allowed set. Construction trusts hardware-reported counts
/// (observed layouts are definitionally legal); every later mutation goes
/// through [`apply_geometry`](Self::apply_geometry) or
/// [`allocate`](Self::allocate), which preserve it.
#[derive(Debug, Clone, PartialEq)]
pub struct MigGpu {
    index: usize,
    model: GpuModel,
    used: Geometry,
    free: Geometry,
    allowed: Vec<Geometry>,
}

impl MigGpu {
    /// Create a GPU from hardware-reported used/free counts.
    ///
    /// The model's allowed-geometry table is captured at construction; an
    /// unknown model yields an empty table, so the GPU admits no geometry
    /// change.
    pub fn new(model: GpuModel, index: usize, used: Geometry, free: Geometry) -> Self {
        let allowed = allowed_geometries(&model);
        let mut used = used;
        used.retain_positive();
        Self {
            index,
            model,
            used,
            free,
            allowed,
        }
    }

    /// Index of this GPU on the node
    pub fn index(&self) -> usize {
        self.index
    }

    /// Hardware model of this GPU
    pub fn model(&self) -> &GpuModel {
        &self.model
    }

    /// Slice counts consumed by running workloads
    pub fn used(&self) -> &Geometry {
        &self.used
    }

    /// Idle slice counts
    pub fn free(&self) -> &Geometry {
        &self.free
    }

    /// The legal layouts for this GPU, in stable table order
    pub fn allowed_geometries(&self) -> &[Geometry] {
        &self.allowed
    }

    /// Number of in-use slices of a profile
    pub fn used_count(&self, profile: &ProfileName) -> usize {
        self.used.count(profile)
    }

    /// Number of idle slices of a profile
    pub fn free_count(&self, profile: &ProfileName) -> usize {
        self.free.count(profile)
    }

    /// Check if this GPU has any idle slice
    pub fn has_free_devices(&self) -> bool {
        self.free.any_positive()
    }

    /// The currently-configured layout: used + free, merged per profile
    pub fn current_geometry(&self) -> Geometry {
        let mut geometry = self.used.clone();
        geometry.merge(&self.free);
        geometry
    }

    /// Switch this GPU to a different layout.
    ///
    /// Fails with [`Error::UnsupportedGeometry`] if the target is not in the
    /// model's allowed set, and with [`Error::InvalidGeometryTransition`] if
    /// any profile's in-use count exceeds what the target provides — a
    /// transition may discard idle slices, never in-use ones.
    ///
    /// On success, free counts are recomputed as `target - used` for every
    /// profile in the target; profiles absent from the target end up with
    /// zero used and free slices. On failure the GPU is left untouched.
    pub fn apply_geometry(&mut self, target: &Geometry) -> Result<()> {
        if !self.allowed.iter().any(|geometry| geometry == target) {
            return Err(Error::unsupported_geometry(format!(
                "geometry [{}] is not allowed for GPU model {}",
                target, self.model
            )));
        }

        for (profile, used) in self.used.iter() {
            if target.count(profile) < used {
                return Err(Error::invalid_transition(format!(
                    "profile {} has {} devices in use but the target geometry provides {}",
                    profile,
                    used,
                    target.count(profile)
                )));
            }
        }

        let mut free = Geometry::new();
        for (profile, total) in target.iter() {
            free.set(profile.clone(), total - self.used.count(profile));
        }
        self.free = free;
        Ok(())
    }

    /// Check if the GPU's free capacity covers every entry of a request
    pub fn fits(&self, request: &Geometry) -> bool {
        request
            .iter()
            .all(|(profile, quantity)| self.free_count(profile) >= quantity)
    }

    /// Debit a request from this GPU's free slices.
    ///
    /// Every requested profile/quantity is moved from free to used; fails
    /// with [`Error::InsufficientCapacity`] (leaving the GPU untouched) if
    /// any entry is not covered.
    pub fn allocate(&mut self, request: &Geometry) -> Result<()> {
        if !self.fits(request) {
            return Err(Error::insufficient_capacity(format!(
                "GPU {} cannot satisfy request [{}]",
                self.index, request
            )));
        }

        for (profile, quantity) in request.iter() {
            if quantity == 0 {
                continue;
            }
            let free = self.free.count(profile) - quantity;
            let used = self.used.count(profile) + quantity;
            self.free.set(profile.clone(), free);
            self.used.set(profile.clone(), used);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GPU_MODEL_A100_SXM4_40GB;

    fn a100(index: usize, used: &[(&str, usize)], free: &[(&str, usize)]) -> MigGpu {
        MigGpu::new(
            GpuModel::new(GPU_MODEL_A100_SXM4_40GB),
            index,
            Geometry::from_pairs(used),
            Geometry::from_pairs(free),
        )
    }

    #[test]
    fn test_current_geometry_merges_used_and_free() {
        let gpu = a100(0, &[("1g.5gb", 2)], &[("1g.5gb", 2), ("3g.20gb", 1)]);
        assert_eq!(
            gpu.current_geometry(),
            Geometry::from_pairs(&[("1g.5gb", 4), ("3g.20gb", 1)])
        );
    }

    #[test]
    fn test_apply_geometry_recomputes_free() {
        let mut gpu = a100(0, &[("1g.5gb", 2)], &[]);
        let target = Geometry::from_pairs(&[("1g.5gb", 7)]);

        gpu.apply_geometry(&target).unwrap();
        assert_eq!(gpu.used_count(&ProfileName::new("1g.5gb")), 2);
        assert_eq!(gpu.free_count(&ProfileName::new("1g.5gb")), 5);
        assert_eq!(gpu.current_geometry(), target);
    }

    #[test]
    fn test_apply_geometry_rejects_in_use_shrinkage() {
        // Scenario: a 3g.20gb slice is busy; the all-1g layout would destroy it.
        let mut gpu = a100(0, &[("3g.20gb", 1)], &[]);
        let before = gpu.clone();

        let err = gpu
            .apply_geometry(&Geometry::from_pairs(&[("1g.5gb", 7)]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidGeometryTransition(_)));
        assert_eq!(gpu, before);
    }

    #[test]
    fn test_apply_geometry_rejects_unknown_layout() {
        let mut gpu = a100(0, &[], &[("1g.5gb", 7)]);
        let before = gpu.clone();

        let err = gpu
            .apply_geometry(&Geometry::from_pairs(&[("1g.5gb", 6)]))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedGeometry(_)));
        assert_eq!(gpu, before);
    }

    #[test]
    fn test_apply_geometry_zeroes_profiles_absent_from_target() {
        let mut gpu = a100(0, &[], &[("3g.20gb", 2)]);
        gpu.apply_geometry(&Geometry::from_pairs(&[("7g.40gb", 1)]))
            .unwrap();

        assert_eq!(gpu.free_count(&ProfileName::new("3g.20gb")), 0);
        assert_eq!(gpu.free_count(&ProfileName::new("7g.40gb")), 1);
        assert_eq!(gpu.used_count(&ProfileName::new("3g.20gb")), 0);
    }

    #[test]
    fn test_allocate_first_fit_bookkeeping() {
        let mut gpu = a100(0, &[("1g.5gb", 1)], &[("1g.5gb", 3), ("3g.20gb", 1)]);
        let request = Geometry::from_pairs(&[("1g.5gb", 2), ("3g.20gb", 1)]);

        assert!(gpu.fits(&request));
        gpu.allocate(&request).unwrap();

        assert_eq!(gpu.used_count(&ProfileName::new("1g.5gb")), 3);
        assert_eq!(gpu.free_count(&ProfileName::new("1g.5gb")), 1);
        assert_eq!(gpu.used_count(&ProfileName::new("3g.20gb")), 1);
        assert_eq!(gpu.free_count(&ProfileName::new("3g.20gb")), 0);
    }

    #[test]
    fn test_allocate_insufficient_capacity() {
        let mut gpu = a100(0, &[], &[("1g.5gb", 1)]);
        let before = gpu.clone();

        let err = gpu
            .allocate(&Geometry::from_pairs(&[("1g.5gb", 2)]))
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientCapacity(_)));
        assert!(err.is_capacity_exhaustion());
        assert_eq!(gpu, before);
    }

    #[test]
    fn test_unknown_model_admits_no_geometry() {
        let mut gpu = MigGpu::new(
            GpuModel::new("NVIDIA-T4"),
            0,
            Geometry::new(),
            Geometry::new(),
        );
        assert!(gpu.allowed_geometries().is_empty());
        assert!(gpu
            .apply_geometry(&Geometry::from_pairs(&[("1g.5gb", 7)]))
            .is_err());
    }
}

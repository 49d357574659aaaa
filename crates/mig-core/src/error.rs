//! Error handling for migmesh core operations
//!
//! All errors here are local and recoverable: the surrounding controller
//! decides retry/pending/event-surfacing policy. The core itself never
//! retries and never logs.

use crate::types::ProfileName;

/// Result type alias for core MIG operations
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the core data model
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The node lacks the GPU model label; callers degrade the node to
    /// "zero GPUs" rather than failing the whole pass.
    #[error("cannot determine GPU model: node does not have label {0}")]
    MissingHardwareLabel(String),

    /// No candidate geometry on any GPU accommodates the requested profile
    /// without evicting in-use slices.
    #[error("no allowed MIG geometry can make room for profile {0}")]
    GeometryUpdateInfeasible(ProfileName),

    /// Speculative admission failed; no GPU has enough free capacity.
    #[error("not enough free MIG capacity: {0}")]
    InsufficientCapacity(String),

    /// A geometry change would shrink some profile below its in-use count.
    #[error("invalid MIG geometry transition: {0}")]
    InvalidGeometryTransition(String),

    /// The target geometry is not in the GPU model's allowed set.
    #[error("unsupported MIG geometry: {0}")]
    UnsupportedGeometry(String),

    /// An annotation key or value does not match the expected format.
    #[error("invalid MIG annotation: {0}")]
    InvalidAnnotation(String),
}

impl Error {
    /// Create an insufficient capacity error
    pub fn insufficient_capacity(msg: impl Into<String>) -> Self {
        Self::InsufficientCapacity(msg.into())
    }

    /// Create an invalid geometry transition error
    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidGeometryTransition(msg.into())
    }

    /// Create an unsupported geometry error
    pub fn unsupported_geometry(msg: impl Into<String>) -> Self {
        Self::UnsupportedGeometry(msg.into())
    }

    /// Create an invalid annotation error
    pub fn invalid_annotation(msg: impl Into<String>) -> Self {
        Self::InvalidAnnotation(msg.into())
    }

    /// Check if this error means the node is out of room for a request.
    ///
    /// Controllers typically mark the workload pending and retry on the next
    /// pass instead of surfacing these as hard failures.
    pub fn is_capacity_exhaustion(&self) -> bool {
        matches!(
            self,
            Error::GeometryUpdateInfeasible(_) | Error::InsufficientCapacity(_)
        )
    }

    /// Check if this error indicates a rejected geometry change
    pub fn is_geometry_violation(&self) -> bool {
        matches!(
            self,
            Error::InvalidGeometryTransition(_) | Error::UnsupportedGeometry(_)
        )
    }
}

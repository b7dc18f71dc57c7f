//! Error types for reconstruction setup.

use depth_types::DepthError;
use thiserror::Error;
use voxel_spatial::SpatialError;

/// Errors reported when configuring a reconstruction session.
///
/// Runtime conditions (missing frames, invalid samples, out-of-volume
/// voxels) are not errors; operations turn them into no-ops or empty
/// results.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReconError {
    /// Voxel size or volume dimensions are unusable.
    #[error(transparent)]
    Spatial(#[from] SpatialError),

    /// A depth frame violates the contract.
    #[error(transparent)]
    Depth(#[from] DepthError),

    /// A tuning parameter is outside its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl ReconError {
    /// Creates an invalid parameter error.
    #[must_use]
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result type for reconstruction setup.
pub type ReconResult<T> = std::result::Result<T, ReconError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReconError::invalid("step_count", "must be at least 2");
        assert_eq!(
            format!("{err}"),
            "invalid parameter `step_count`: must be at least 2"
        );
    }

    #[test]
    fn test_from_spatial() {
        let err: ReconError = SpatialError::InvalidVoxelSize(0.0).into();
        assert!(matches!(err, ReconError::Spatial(_)));
        assert!(format!("{err}").contains("voxel size"));
    }
}

//! Error types for spatial operations.

/// Errors that can occur when building lattices and volumes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SpatialError {
    /// The voxel size must be positive and finite.
    #[error("voxel size must be positive, got {0}")]
    InvalidVoxelSize(f64),

    /// The volume dimensions are zero or not addressable.
    #[error("invalid volume dimensions: {x}x{y}x{z}")]
    InvalidDimensions {
        /// Voxels along X.
        x: u32,
        /// Voxels along Y.
        y: u32,
        /// Voxels along Z.
        z: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SpatialError::InvalidVoxelSize(-0.5);
        assert!(format!("{err}").contains("-0.5"));

        let err = SpatialError::InvalidDimensions { x: 0, y: 4, z: 4 };
        assert_eq!(format!("{err}"), "invalid volume dimensions: 0x4x4");
    }
}

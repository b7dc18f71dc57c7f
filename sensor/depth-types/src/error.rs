//! Error types for depth frame construction.

use thiserror::Error;

/// Errors raised when a depth frame or its calibration violates the contract.
///
/// Only construction reports errors. Per-pixel conditions (invalid depth,
/// out-of-bounds lookups) are expressed as `None` instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DepthError {
    /// Depth buffer length does not match `width * height`.
    #[error("depth buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch {
        /// Expected buffer size.
        expected: usize,
        /// Actual buffer size.
        actual: usize,
    },

    /// Image has zero width or height.
    #[error("invalid frame size: {width}x{height}")]
    EmptyFrame {
        /// Frame width in pixels.
        width: u32,
        /// Frame height in pixels.
        height: u32,
    },

    /// A focal length is zero, negative or not finite.
    #[error("invalid focal length: fx={fx}, fy={fy}")]
    InvalidFocalLength {
        /// Horizontal focal length.
        fx: f64,
        /// Vertical focal length.
        fy: f64,
    },
}

impl DepthError {
    /// Creates a buffer size mismatch error.
    #[must_use]
    pub const fn buffer_mismatch(expected: usize, actual: usize) -> Self {
        Self::BufferSizeMismatch { expected, actual }
    }
}

/// Result type for depth frame operations.
pub type DepthResult<T> = std::result::Result<T, DepthError>;

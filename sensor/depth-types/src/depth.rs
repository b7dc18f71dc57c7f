//! The per-tick depth frame delivered by the external sensor pipeline.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use nalgebra::{Matrix4, Point3, Vector3};

use crate::camera::{CameraIntrinsics, PixelCoord};
use crate::error::{DepthError, DepthResult};

/// Depth at or below this value (meters) marks an absent sample.
pub const MIN_VALID_DEPTH: f32 = 0.2;

/// A depth image with its calibration and pose for one update tick.
///
/// # Depth Values
///
/// - Depth is stored in meters as `f32`, row-major: `depths[y * width + x]`
/// - Values `<= MIN_VALID_DEPTH`, `NaN` and infinities are invalid samples
/// - An upper bound is supplied per query, since it is a tuning choice
///
/// # Example
///
/// ```
/// use depth_types::{CameraIntrinsics, DepthFrame, PixelCoord};
/// use nalgebra::Matrix4;
///
/// let frame = DepthFrame::try_new(
///     4,
///     4,
///     vec![1.0; 16],
///     CameraIntrinsics::ideal(2.0, 4, 4),
///     Matrix4::identity(),
/// )
/// .unwrap();
///
/// assert_eq!(frame.valid_depth_at(PixelCoord::new(1, 1), 6.0), Some(1.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DepthFrame {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Per-pixel depth in meters, row-major.
    pub depths: Vec<f32>,
    /// Pinhole intrinsics at this resolution.
    pub intrinsics: CameraIntrinsics,
    /// Camera-to-world transform.
    pub camera_to_world: Matrix4<f64>,
}

impl DepthFrame {
    /// Creates a frame after checking the buffer and calibration.
    ///
    /// # Errors
    ///
    /// - [`DepthError::EmptyFrame`] if either dimension is zero
    /// - [`DepthError::BufferSizeMismatch`] if `depths.len() != width * height`
    /// - [`DepthError::InvalidFocalLength`] for unusable intrinsics
    pub fn try_new(
        width: u32,
        height: u32,
        depths: Vec<f32>,
        intrinsics: CameraIntrinsics,
        camera_to_world: Matrix4<f64>,
    ) -> DepthResult<Self> {
        if width == 0 || height == 0 {
            return Err(DepthError::EmptyFrame { width, height });
        }
        let frame = Self {
            width,
            height,
            depths,
            intrinsics,
            camera_to_world,
        };
        if !frame.has_valid_buffer_size() {
            return Err(DepthError::buffer_mismatch(
                frame.expected_buffer_size(),
                frame.depths.len(),
            ));
        }
        intrinsics.validate()?;
        Ok(frame)
    }

    /// Returns the expected buffer size (width × height).
    #[must_use]
    pub const fn expected_buffer_size(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Checks if the depth buffer has the expected size.
    #[must_use]
    pub fn has_valid_buffer_size(&self) -> bool {
        self.depths.len() == self.expected_buffer_size()
    }

    /// Re-checks everything [`try_new`](Self::try_new) checks.
    ///
    /// Frames arrive with public fields, so consumers call this per tick.
    ///
    /// # Errors
    ///
    /// Same conditions as [`try_new`](Self::try_new).
    pub fn validate(&self) -> DepthResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(DepthError::EmptyFrame {
                width: self.width,
                height: self.height,
            });
        }
        if !self.has_valid_buffer_size() {
            return Err(DepthError::buffer_mismatch(
                self.expected_buffer_size(),
                self.depths.len(),
            ));
        }
        self.intrinsics.validate()
    }

    /// Returns `(width, height)`.
    #[must_use]
    pub const fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Checks whether a signed pixel position lies inside the image.
    #[must_use]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    /// Raw depth at a pixel, `None` if out of bounds.
    #[must_use]
    pub fn depth_at(&self, pixel: PixelCoord) -> Option<f32> {
        if pixel.x >= self.width || pixel.y >= self.height {
            return None;
        }
        self.depths.get(pixel.index(self.width)).copied()
    }

    /// Checks a sample against the invalid sentinel and an upper range.
    #[must_use]
    pub fn is_valid_depth(depth: f32, max_depth: f32) -> bool {
        depth.is_finite() && depth > MIN_VALID_DEPTH && depth <= max_depth
    }

    /// Depth at a pixel if it is a valid sample no farther than `max_depth`.
    #[must_use]
    pub fn valid_depth_at(&self, pixel: PixelCoord, max_depth: f32) -> Option<f32> {
        self.depth_at(pixel)
            .filter(|&d| Self::is_valid_depth(d, max_depth))
    }

    /// World-to-camera transform, `None` if the pose is singular.
    #[must_use]
    pub fn world_to_camera(&self) -> Option<Matrix4<f64>> {
        self.camera_to_world.try_inverse()
    }

    /// Camera position and orientation in world space.
    #[must_use]
    pub fn camera_basis(&self) -> CameraBasis {
        CameraBasis::from_pose(&self.camera_to_world)
    }

    /// Back-projects a valid sample into world space.
    #[must_use]
    pub fn unproject_to_world(&self, pixel: PixelCoord, max_depth: f32) -> Option<Point3<f64>> {
        let depth = self.valid_depth_at(pixel, max_depth)?;
        let camera = self.intrinsics.unproject(pixel, f64::from(depth));
        Some(self.camera_to_world.transform_point(&camera))
    }
}

/// Camera position and normalised right/up/forward axes of a pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    /// Camera origin in world space.
    pub position: Point3<f64>,
    /// Camera `+x` in world space.
    pub right: Vector3<f64>,
    /// Camera `+y` in world space.
    pub up: Vector3<f64>,
    /// Camera `+z` (viewing direction) in world space.
    pub forward: Vector3<f64>,
}

impl CameraBasis {
    /// Extracts the basis from a camera-to-world transform.
    ///
    /// Degenerate axes come back as zero vectors.
    #[must_use]
    pub fn from_pose(camera_to_world: &Matrix4<f64>) -> Self {
        let axis = |v: Vector3<f64>| {
            camera_to_world
                .transform_vector(&v)
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros)
        };
        Self {
            position: camera_to_world.transform_point(&Point3::origin()),
            right: axis(Vector3::x()),
            up: axis(Vector3::y()),
            forward: axis(Vector3::z()),
        }
    }

    /// World point at an offset given in right/up/forward components.
    #[must_use]
    pub fn offset_point(&self, offset: &Vector3<f64>) -> Point3<f64> {
        self.position + self.right * offset.x + self.up * offset.y + self.forward * offset.z
    }
}

//! Pinhole calibration and pixel addressing.
//!
//! Camera space is `+x` right, `+y` up, `+z` forward. Image rows grow
//! downward, so the vertical axis flips between the two:
//!
//! ```text
//! u = x * fx / z + cx
//! v = -y * fy / z + cy
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use nalgebra::Point3;

use crate::error::{DepthError, DepthResult};

/// An integer pixel address inside a depth image.
///
/// # Example
///
/// ```
/// use depth_types::PixelCoord;
///
/// let p = PixelCoord::new(3, 4);
/// assert_eq!(p.distance_squared(PixelCoord::new(0, 0)), 25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PixelCoord {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl PixelCoord {
    /// Creates a pixel coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance in pixels.
    #[must_use]
    pub const fn distance_squared(self, other: Self) -> u64 {
        let dx = self.x.abs_diff(other.x) as u64;
        let dy = self.y.abs_diff(other.y) as u64;
        dx * dx + dy * dy
    }

    /// Row-major buffer index for an image of the given width.
    #[must_use]
    pub const fn index(self, width: u32) -> usize {
        self.y as usize * width as usize + self.x as usize
    }
}

/// Per-frame pinhole intrinsics at the depth image's resolution.
///
/// Lens distortion is assumed to be removed upstream.
///
/// # Example
///
/// ```
/// use depth_types::CameraIntrinsics;
/// use nalgebra::Point3;
///
/// let k = CameraIntrinsics::new(100.0, 100.0, 32.0, 24.0);
/// let uv = k.project(&Point3::new(0.0, 0.0, 2.0)).unwrap();
/// assert_eq!(uv, [32.0, 24.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CameraIntrinsics {
    /// Focal length in pixels (x direction).
    pub fx: f64,
    /// Focal length in pixels (y direction).
    pub fy: f64,
    /// Principal point x-coordinate in pixels.
    pub cx: f64,
    /// Principal point y-coordinate in pixels.
    pub cy: f64,
}

impl CameraIntrinsics {
    /// Creates intrinsics from focal lengths and principal point.
    #[must_use]
    pub const fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self { fx, fy, cx, cy }
    }

    /// Creates intrinsics for an ideal pinhole centered in a `width x height` image.
    #[must_use]
    pub fn ideal(focal_length: f64, width: u32, height: u32) -> Self {
        Self {
            fx: focal_length,
            fy: focal_length,
            cx: f64::from(width) / 2.0,
            cy: f64::from(height) / 2.0,
        }
    }

    /// Checks that both focal lengths are positive and finite.
    ///
    /// # Errors
    ///
    /// Returns [`DepthError::InvalidFocalLength`] otherwise.
    pub fn validate(&self) -> DepthResult<()> {
        let ok = |f: f64| f.is_finite() && f > 0.0;
        if ok(self.fx) && ok(self.fy) {
            Ok(())
        } else {
            Err(DepthError::InvalidFocalLength {
                fx: self.fx,
                fy: self.fy,
            })
        }
    }

    /// Projects a camera-space point to continuous pixel coordinates.
    ///
    /// Returns `None` for points at or behind the image plane.
    #[must_use]
    pub fn project(&self, point: &Point3<f64>) -> Option<[f64; 2]> {
        if point.z <= 0.0 {
            return None;
        }
        let u = point.x * self.fx / point.z + self.cx;
        let v = -point.y * self.fy / point.z + self.cy;
        Some([u, v])
    }

    /// Projects a camera-space point and rounds it to the nearest pixel.
    ///
    /// Returns `None` if the point is behind the camera or the pixel falls
    /// outside a `width x height` image.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn project_to_pixel(
        &self,
        point: &Point3<f64>,
        width: u32,
        height: u32,
    ) -> Option<PixelCoord> {
        let [u, v] = self.project(point)?;
        let (u, v) = (u.round(), v.round());
        if !(u >= 0.0 && v >= 0.0 && u < f64::from(width) && v < f64::from(height)) {
            return None;
        }
        Some(PixelCoord::new(u as u32, v as u32))
    }

    /// Back-projects a pixel with metric depth into camera space.
    ///
    /// Inverse of [`project`](Self::project), including the vertical flip.
    #[must_use]
    pub fn unproject(&self, pixel: PixelCoord, depth: f64) -> Point3<f64> {
        let x = (f64::from(pixel.x) - self.cx) * depth / self.fx;
        let y = (f64::from(pixel.y) - self.cy) * depth / self.fy;
        Point3::new(x, -y, depth)
    }
}

impl Default for CameraIntrinsics {
    fn default() -> Self {
        Self::ideal(1.0, 1, 1)
    }
}

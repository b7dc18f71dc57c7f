//! World-space rays.

use nalgebra::{Point3, Vector3};

/// A ray defined by an origin point and a direction vector.
///
/// The direction does not need to be normalized.
///
/// # Example
///
/// ```
/// use voxel_spatial::Ray;
/// use nalgebra::{Point3, Vector3};
///
/// let ray = Ray::new(Point3::origin(), Vector3::new(2.0, 0.0, 0.0));
/// let p = ray.point_at(3.0);
/// assert!((p.x - 6.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ray {
    /// The origin of the ray.
    pub origin: Point3<f64>,
    /// The direction of the ray (not necessarily normalized).
    pub direction: Vector3<f64>,
}

impl Ray {
    /// Creates a new ray with the given origin and direction.
    #[must_use]
    pub const fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self { origin, direction }
    }

    /// Returns `origin + t * direction`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }

    /// Returns this ray with a unit-length direction.
    ///
    /// `None` if the direction is zero or not finite.
    #[must_use]
    pub fn normalized(&self) -> Option<Self> {
        let direction = self.direction.try_normalize(f64::EPSILON)?;
        direction.iter().all(|c| c.is_finite()).then_some(Self {
            origin: self.origin,
            direction,
        })
    }
}

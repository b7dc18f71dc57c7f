//! World-space primitives used to select voxels.

use nalgebra::{Point3, Vector3};

/// An axis-aligned bounding box in world coordinates.
///
/// # Example
///
/// ```
/// use voxel_spatial::Aabb;
/// use nalgebra::Point3;
///
/// let aabb = Aabb::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(10.0, 10.0, 10.0),
/// );
///
/// assert!(aabb.contains(&Point3::new(5.0, 5.0, 5.0)));
/// assert!(!aabb.contains(&Point3::new(15.0, 5.0, 5.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3<f64>,
    /// Maximum corner of the bounding box.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Creates a new AABB, reordering the corners per axis if necessary.
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Returns the center of the box.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns the overlap of two boxes, `None` if they do not touch.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let min = Point3::new(
            self.min.x.max(other.min.x),
            self.min.y.max(other.min.y),
            self.min.z.max(other.min.z),
        );
        let max = Point3::new(
            self.max.x.min(other.max.x),
            self.max.y.min(other.max.y),
            self.max.z.min(other.max.z),
        );
        (min.x <= max.x && min.y <= max.y && min.z <= max.z).then_some(Self { min, max })
    }

    /// Checks if a point is inside or on the box.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

/// A sphere in world coordinates, the shape of a paint brush.
///
/// # Example
///
/// ```
/// use voxel_spatial::Sphere;
/// use nalgebra::Point3;
///
/// let sphere = Sphere::new(Point3::new(5.0, 5.0, 5.0), 2.0);
///
/// assert!(sphere.contains(&Point3::new(6.0, 5.0, 5.0)));
/// assert!(!sphere.contains(&Point3::new(8.0, 5.0, 5.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sphere {
    /// The center of the sphere.
    pub center: Point3<f64>,
    /// The radius of the sphere.
    pub radius: f64,
}

impl Sphere {
    /// Creates a new sphere. Negative radii are made positive.
    #[must_use]
    pub const fn new(center: Point3<f64>, radius: f64) -> Self {
        Self {
            center,
            radius: if radius < 0.0 { -radius } else { radius },
        }
    }

    /// Checks if a point is inside or on the sphere.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        nalgebra::distance_squared(point, &self.center) <= self.radius * self.radius
    }

    /// Returns the bounding AABB of this sphere.
    #[must_use]
    pub fn bounding_aabb(&self) -> Aabb {
        let r = Vector3::repeat(self.radius);
        Aabb {
            min: self.center - r,
            max: self.center + r,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_aabb_reorders_corners() {
        let aabb = Aabb::new(Point3::new(2.0, 0.0, 5.0), Point3::new(0.0, 3.0, 1.0));
        assert_eq!(aabb.min, Point3::new(0.0, 0.0, 1.0));
        assert_eq!(aabb.max, Point3::new(2.0, 3.0, 5.0));
        assert_relative_eq!(aabb.center(), Point3::new(1.0, 1.5, 3.0));
    }

    #[test]
    fn test_aabb_intersection() {
        let a = Aabb::new(Point3::origin(), Point3::new(2.0, 2.0, 2.0));
        let huge = Aabb::new(Point3::new(-1e12, -1e12, 1.0), Point3::new(1e12, 1e12, 1e12));
        let i = a.intersection(&huge).unwrap();
        assert_eq!(i.min, Point3::new(0.0, 0.0, 1.0));
        assert_eq!(i.max, Point3::new(2.0, 2.0, 2.0));

        let apart = Aabb::new(Point3::new(3.0, 0.0, 0.0), Point3::new(4.0, 1.0, 1.0));
        assert!(a.intersection(&apart).is_none());
    }

    #[test]
    fn test_aabb_contains_boundary() {
        let aabb = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert!(aabb.contains(&Point3::new(1.0, 1.0, 1.0)));
        assert!(!aabb.contains(&Point3::new(1.0, 1.0, 1.0001)));
    }

    #[test]
    fn test_sphere_negative_radius() {
        let s = Sphere::new(Point3::origin(), -2.0);
        assert_eq!(s.radius, 2.0);
    }

    #[test]
    fn test_sphere_contains_surface() {
        let s = Sphere::new(Point3::origin(), 1.0);
        assert!(s.contains(&Point3::new(1.0, 0.0, 0.0)));
        assert!(!s.contains(&Point3::new(0.8, 0.8, 0.0)));
    }

    #[test]
    fn test_sphere_bounding_box() {
        let s = Sphere::new(Point3::new(1.0, 2.0, 3.0), 0.5);
        let b = s.bounding_aabb();
        assert_relative_eq!(b.min, Point3::new(0.5, 1.5, 2.5));
        assert_relative_eq!(b.max, Point3::new(1.5, 2.5, 3.5));
    }
}

//! Lattice addressing and index-space bounds.

use nalgebra::{Point3, Vector3};

use crate::error::SpatialError;
use crate::overlap::Aabb;
use crate::voxel::VoxelCoord;

/// Axis-aligned bounds in grid (voxel) space. Both corners are inclusive.
///
/// # Example
///
/// ```
/// use voxel_spatial::{GridBounds, VoxelCoord};
///
/// let bounds = GridBounds::new(
///     VoxelCoord::new(0, 0, 0),
///     VoxelCoord::new(10, 10, 10),
/// );
///
/// assert!(bounds.contains(VoxelCoord::new(5, 5, 5)));
/// assert!(!bounds.contains(VoxelCoord::new(15, 5, 5)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridBounds {
    /// Minimum corner (inclusive).
    pub min: VoxelCoord,
    /// Maximum corner (inclusive).
    pub max: VoxelCoord,
}

impl GridBounds {
    /// Creates bounds from two corners, ordering them per axis.
    #[must_use]
    pub fn new(a: VoxelCoord, b: VoxelCoord) -> Self {
        Self {
            min: VoxelCoord::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: VoxelCoord::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates the bounds of a `dims`-sized block starting at `min`.
    ///
    /// Returns `None` if the far corner overflows `i32`.
    ///
    /// # Example
    ///
    /// ```
    /// use voxel_spatial::{GridBounds, VolumeDims, VoxelCoord};
    ///
    /// let b = GridBounds::from_min_dims(VoxelCoord::new(-2, 0, 0), VolumeDims::new(4, 1, 1)).unwrap();
    /// assert_eq!(b.max, VoxelCoord::new(1, 0, 0));
    /// ```
    #[must_use]
    pub fn from_min_dims(min: VoxelCoord, dims: VolumeDims) -> Option<Self> {
        let extent = |d: u32| i32::try_from(d).ok()?.checked_sub(1);
        let max = min.checked_add(VoxelCoord::new(
            extent(dims.x)?,
            extent(dims.y)?,
            extent(dims.z)?,
        ))?;
        Some(Self { min, max })
    }

    /// Returns the size of the bounds as `(x, y, z)` voxel counts.
    #[must_use]
    pub const fn size(&self) -> (u32, u32, u32) {
        (
            self.max.x.abs_diff(self.min.x).saturating_add(1),
            self.max.y.abs_diff(self.min.y).saturating_add(1),
            self.max.z.abs_diff(self.min.z).saturating_add(1),
        )
    }

    /// Returns the total number of voxels in these bounds.
    #[must_use]
    pub fn volume(&self) -> u64 {
        let (w, h, d) = self.size();
        u64::from(w)
            .saturating_mul(u64::from(h))
            .saturating_mul(u64::from(d))
    }

    /// Checks if the bounds contain a coordinate.
    #[must_use]
    pub const fn contains(&self, coord: VoxelCoord) -> bool {
        coord.x >= self.min.x
            && coord.x <= self.max.x
            && coord.y >= self.min.y
            && coord.y <= self.max.y
            && coord.z >= self.min.z
            && coord.z <= self.max.z
    }

    /// Returns the intersection of two bounds, or `None` if they don't overlap.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let min = VoxelCoord::new(
            self.min.x.max(other.min.x),
            self.min.y.max(other.min.y),
            self.min.z.max(other.min.z),
        );
        let max = VoxelCoord::new(
            self.max.x.min(other.max.x),
            self.max.y.min(other.max.y),
            self.max.z.min(other.max.z),
        );

        if min.x <= max.x && min.y <= max.y && min.z <= max.z {
            Some(Self { min, max })
        } else {
            None
        }
    }

    /// Offset of `coord` from the minimum corner, if it lies inside.
    #[must_use]
    pub fn local_index(&self, coord: VoxelCoord) -> Option<[u32; 3]> {
        if !self.contains(coord) {
            return None;
        }
        Some([
            self.min.x.abs_diff(coord.x),
            self.min.y.abs_diff(coord.y),
            self.min.z.abs_diff(coord.z),
        ])
    }

    /// Iterates all coordinates in Z-Y-X order (X varies fastest).
    #[must_use]
    pub const fn iter(&self) -> GridBoundsIter {
        GridBoundsIter {
            bounds: *self,
            current: Some(self.min),
        }
    }
}

impl IntoIterator for GridBounds {
    type Item = VoxelCoord;
    type IntoIter = GridBoundsIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over all coordinates in a [`GridBounds`].
#[derive(Debug, Clone)]
pub struct GridBoundsIter {
    bounds: GridBounds,
    current: Option<VoxelCoord>,
}

impl Iterator for GridBoundsIter {
    type Item = VoxelCoord;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;

        let mut next = current;
        if next.x < self.bounds.max.x {
            next.x += 1;
        } else if next.y < self.bounds.max.y {
            next.x = self.bounds.min.x;
            next.y += 1;
        } else if next.z < self.bounds.max.z {
            next.x = self.bounds.min.x;
            next.y = self.bounds.min.y;
            next.z += 1;
        } else {
            self.current = None;
            return Some(current);
        }
        self.current = Some(next);

        Some(current)
    }
}

/// Extent of a camera-anchored volume in voxels per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VolumeDims {
    /// Voxels along X.
    pub x: u32,
    /// Voxels along Y.
    pub y: u32,
    /// Voxels along Z.
    pub z: u32,
}

impl VolumeDims {
    /// Creates volume dimensions.
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Dimensions as a floating-point vector.
    #[must_use]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }

    /// Checks that every axis is non-zero and the block can be addressed.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidDimensions`] otherwise.
    pub fn validate(&self) -> Result<(), SpatialError> {
        let addressable = |d: u32| d > 0 && i32::try_from(d).is_ok();
        if addressable(self.x) && addressable(self.y) && addressable(self.z) {
            Ok(())
        } else {
            Err(SpatialError::InvalidDimensions {
                x: self.x,
                y: self.y,
                z: self.z,
            })
        }
    }
}

/// Conversion between world space and the world-snapped voxel lattice.
///
/// Cell `c` spans `[c * size, (c + 1) * size)` on each axis.
///
/// # Example
///
/// ```
/// use voxel_spatial::{VoxelCoord, VoxelLattice};
/// use nalgebra::Point3;
///
/// let lattice = VoxelLattice::new(0.1).unwrap();
/// assert_eq!(
///     lattice.world_to_grid(&Point3::new(0.55, -0.05, 0.0)),
///     Some(VoxelCoord::new(5, -1, 0)),
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelLattice {
    voxel_size: f64,
    inv_voxel_size: f64,
}

impl VoxelLattice {
    /// Creates a lattice with the given cell edge length.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidVoxelSize`] if `voxel_size` is not
    /// positive and finite.
    pub fn new(voxel_size: f64) -> Result<Self, SpatialError> {
        if voxel_size <= 0.0 || !voxel_size.is_finite() {
            return Err(SpatialError::InvalidVoxelSize(voxel_size));
        }
        Ok(Self {
            voxel_size,
            inv_voxel_size: 1.0 / voxel_size,
        })
    }

    /// Returns the voxel size.
    #[must_use]
    pub const fn voxel_size(&self) -> f64 {
        self.voxel_size
    }

    /// Maps a world point to the cell containing it.
    ///
    /// Returns `None` for non-finite points or cells outside `i32` range.
    #[must_use]
    pub fn world_to_grid(&self, point: &Point3<f64>) -> Option<VoxelCoord> {
        Some(VoxelCoord::new(
            self.snap(point.x)?,
            self.snap(point.y)?,
            self.snap(point.z)?,
        ))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn snap(&self, value: f64) -> Option<i32> {
        let cell = (value * self.inv_voxel_size).floor();
        if cell.is_finite() && cell >= f64::from(i32::MIN) && cell <= f64::from(i32::MAX) {
            Some(cell as i32)
        } else {
            None
        }
    }

    /// World-space minimum corner of a cell.
    #[must_use]
    pub fn cell_min(&self, coord: VoxelCoord) -> Point3<f64> {
        coord.to_point() * self.voxel_size
    }

    /// World-space center of a cell.
    #[must_use]
    pub fn cell_center(&self, coord: VoxelCoord) -> Point3<f64> {
        let half = self.voxel_size * 0.5;
        self.cell_min(coord) + Vector3::repeat(half)
    }

    /// Grid bounds of every cell touched by a world-space box.
    #[must_use]
    pub fn bounds_of(&self, aabb: &Aabb) -> Option<GridBounds> {
        Some(GridBounds::new(
            self.world_to_grid(&aabb.min)?,
            self.world_to_grid(&aabb.max)?,
        ))
    }

    /// World-space box covered by a block of cells.
    #[must_use]
    pub fn aabb_of(&self, bounds: &GridBounds) -> Aabb {
        let max = bounds.max.to_point() + Vector3::repeat(1.0);
        Aabb::new(self.cell_min(bounds.min), max * self.voxel_size)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounds_ordering_and_size() {
        let b = GridBounds::new(VoxelCoord::new(9, 19, 29), VoxelCoord::new(0, 0, 0));
        assert_eq!(b.min, VoxelCoord::origin());
        assert_eq!(b.size(), (10, 20, 30));
        assert_eq!(b.volume(), 6000);
    }

    #[test]
    fn test_from_min_dims() {
        let b = GridBounds::from_min_dims(VoxelCoord::new(10, -5, 0), VolumeDims::new(4, 3, 2))
            .unwrap();
        assert_eq!(b.max, VoxelCoord::new(13, -3, 1));
        assert_eq!(b.size(), (4, 3, 2));
        assert!(GridBounds::from_min_dims(VoxelCoord::origin(), VolumeDims::new(0, 1, 1)).is_none());
        assert!(
            GridBounds::from_min_dims(VoxelCoord::new(i32::MAX, 0, 0), VolumeDims::new(2, 1, 1))
                .is_none()
        );
    }

    #[test]
    fn test_intersection() {
        let a = GridBounds::new(VoxelCoord::new(0, 0, 0), VoxelCoord::new(10, 10, 10));
        let b = GridBounds::new(VoxelCoord::new(5, 5, 5), VoxelCoord::new(15, 15, 15));
        let c = GridBounds::new(VoxelCoord::new(20, 20, 20), VoxelCoord::new(30, 30, 30));
        let i = a.intersection(&b).unwrap();
        assert_eq!(i.min, VoxelCoord::new(5, 5, 5));
        assert_eq!(i.max, VoxelCoord::new(10, 10, 10));
        assert!(a.intersection(&c).is_none());
    }

    #[test]
    fn test_local_index() {
        let b = GridBounds::from_min_dims(VoxelCoord::new(-4, 2, 7), VolumeDims::new(8, 8, 8))
            .unwrap();
        assert_eq!(b.local_index(VoxelCoord::new(-4, 2, 7)), Some([0, 0, 0]));
        assert_eq!(b.local_index(VoxelCoord::new(3, 9, 14)), Some([7, 7, 7]));
        assert_eq!(b.local_index(VoxelCoord::new(4, 9, 14)), None);
    }

    #[test]
    fn test_iter_visits_every_cell_once() {
        let b = GridBounds::new(VoxelCoord::new(-1, 0, 0), VoxelCoord::new(1, 1, 1));
        let coords: Vec<_> = b.iter().collect();
        assert_eq!(coords.len(), 12);
        assert_eq!(coords[0], VoxelCoord::new(-1, 0, 0));
        assert_eq!(coords[1], VoxelCoord::new(0, 0, 0));
        assert_eq!(coords[11], VoxelCoord::new(1, 1, 1));
        let unique: std::collections::HashSet<_> = coords.iter().collect();
        assert_eq!(unique.len(), 12);
    }

    #[test]
    fn test_iter_at_i32_max() {
        let corner = VoxelCoord::new(i32::MAX, i32::MAX, i32::MAX);
        let b = GridBounds::new(corner, corner);
        assert_eq!(b.iter().count(), 1);
    }

    #[test]
    fn test_dims_validate() {
        assert!(VolumeDims::new(128, 96, 128).validate().is_ok());
        assert!(VolumeDims::new(0, 96, 128).validate().is_err());
        assert!(VolumeDims::new(u32::MAX, 1, 1).validate().is_err());
    }

    #[test]
    fn test_lattice_rejects_bad_size() {
        assert!(matches!(
            VoxelLattice::new(0.0),
            Err(SpatialError::InvalidVoxelSize(_))
        ));
        assert!(VoxelLattice::new(f64::NAN).is_err());
    }

    #[test]
    fn test_world_to_grid_floors_negative() {
        let lattice = VoxelLattice::new(0.5).unwrap();
        assert_eq!(
            lattice.world_to_grid(&Point3::new(-0.1, 0.49, 1.0)),
            Some(VoxelCoord::new(-1, 0, 2))
        );
        assert_eq!(lattice.world_to_grid(&Point3::new(f64::NAN, 0.0, 0.0)), None);
        assert_eq!(lattice.world_to_grid(&Point3::new(1e300, 0.0, 0.0)), None);
    }

    #[test]
    fn test_cell_center_round_trip() {
        let lattice = VoxelLattice::new(0.03).unwrap();
        let coord = VoxelCoord::new(-7, 12, 40);
        let center = lattice.cell_center(coord);
        assert_eq!(lattice.world_to_grid(&center), Some(coord));
        assert_relative_eq!(center.x, -7.0 * 0.03 + 0.015, epsilon = 1e-12);
    }

    #[test]
    fn test_aabb_of_bounds() {
        let lattice = VoxelLattice::new(0.5).unwrap();
        let b = GridBounds::new(VoxelCoord::new(0, 0, 0), VoxelCoord::new(1, 3, 0));
        let aabb = lattice.aabb_of(&b);
        assert_relative_eq!(aabb.min, Point3::origin());
        assert_relative_eq!(aabb.max, Point3::new(1.0, 2.0, 0.5));
        assert_eq!(lattice.bounds_of(&aabb).unwrap().min, b.min);
    }
}

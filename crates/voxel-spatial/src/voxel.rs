//! Voxel coordinate types.

use nalgebra::Point3;

/// Bias added to each axis before packing, so negative coordinates fit.
const PACK_BIAS: i64 = 1 << 20;

/// Bits per axis in a packed key.
const PACK_BITS: u32 = 21;

/// Mask for one packed axis.
const PACK_MASK: u64 = (1 << PACK_BITS) - 1;

/// A discrete 3D coordinate on the world-snapped voxel lattice.
///
/// Cell `(x, y, z)` covers `[x, x+1) * voxel_size` on each axis, independent
/// of any moving volume, so a coordinate keeps its world meaning over time.
///
/// # Example
///
/// ```
/// use voxel_spatial::VoxelCoord;
///
/// let coord = VoxelCoord::new(-3, 0, 7);
/// let key = coord.pack().unwrap();
/// assert_eq!(VoxelCoord::unpack(key), coord);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelCoord {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl VoxelCoord {
    /// Smallest coordinate value that can be packed.
    pub const PACK_MIN: i32 = -(1 << 20);

    /// Largest coordinate value that can be packed.
    pub const PACK_MAX: i32 = (1 << 20) - 1;

    /// Creates a new voxel coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Creates a coordinate at the origin (0, 0, 0).
    #[must_use]
    pub const fn origin() -> Self {
        Self::new(0, 0, 0)
    }

    /// Returns the coordinate as an array.
    #[must_use]
    pub const fn as_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }

    /// Converts to a floating-point point.
    #[must_use]
    pub fn to_point(self) -> Point3<f64> {
        Point3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }

    /// Returns the 6 face-adjacent neighbors in `+X, -X, +Y, -Y, +Z, -Z` order.
    ///
    /// # Example
    ///
    /// ```
    /// use voxel_spatial::VoxelCoord;
    ///
    /// let n = VoxelCoord::new(0, 0, 0).face_neighbors();
    /// assert_eq!(n[0], VoxelCoord::new(1, 0, 0));
    /// assert_eq!(n[5], VoxelCoord::new(0, 0, -1));
    /// ```
    #[must_use]
    pub const fn face_neighbors(self) -> [Self; 6] {
        [
            Self::new(self.x.wrapping_add(1), self.y, self.z),
            Self::new(self.x.wrapping_sub(1), self.y, self.z),
            Self::new(self.x, self.y.wrapping_add(1), self.z),
            Self::new(self.x, self.y.wrapping_sub(1), self.z),
            Self::new(self.x, self.y, self.z.wrapping_add(1)),
            Self::new(self.x, self.y, self.z.wrapping_sub(1)),
        ]
    }

    /// Offsets this coordinate, returning `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add(other.x)?,
            self.y.checked_add(other.y)?,
            self.z.checked_add(other.z)?,
        ))
    }

    /// Packs the coordinate into a single `u64` key, 21 bits per axis.
    ///
    /// Returns `None` if any axis lies outside `[PACK_MIN, PACK_MAX]`.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn pack(self) -> Option<u64> {
        let mut key = 0u64;
        for (axis, value) in self.as_array().into_iter().enumerate() {
            if !(Self::PACK_MIN..=Self::PACK_MAX).contains(&value) {
                return None;
            }
            let biased = (i64::from(value) + PACK_BIAS) as u64;
            key |= biased << (PACK_BITS * axis as u32);
        }
        Some(key)
    }

    /// Inverse of [`pack`](Self::pack).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn unpack(key: u64) -> Self {
        let axis = |shift: u32| ((key >> shift) & PACK_MASK) as i64 - PACK_BIAS;
        Self::new(
            axis(0) as i32,
            axis(PACK_BITS) as i32,
            axis(2 * PACK_BITS) as i32,
        )
    }
}

impl From<(i32, i32, i32)> for VoxelCoord {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

impl From<[i32; 3]> for VoxelCoord {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

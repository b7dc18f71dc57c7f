//! Sparse voxel membership sets.

use hashbrown::HashSet;

use crate::voxel::VoxelCoord;

/// A sparse set of voxels keyed by packed coordinates.
///
/// Membership tests are O(1), so meshing and integration cost scales with
/// the number of members rather than the volume extent. Coordinates that
/// cannot be packed (see [`VoxelCoord::pack`]) are never members.
///
/// # Example
///
/// ```
/// use voxel_spatial::{VoxelCoord, VoxelSet};
///
/// let mut set = VoxelSet::new();
/// assert!(set.insert(VoxelCoord::new(1, 2, 3)));
/// assert!(!set.insert(VoxelCoord::new(1, 2, 3)));
/// assert!(set.contains(VoxelCoord::new(1, 2, 3)));
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoxelSet {
    keys: HashSet<u64>,
}

impl VoxelSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a voxel. Returns `true` if it was not already present.
    pub fn insert(&mut self, coord: VoxelCoord) -> bool {
        coord.pack().is_some_and(|key| self.keys.insert(key))
    }

    /// Removes a voxel. Returns `true` if it was present.
    pub fn remove(&mut self, coord: VoxelCoord) -> bool {
        coord.pack().is_some_and(|key| self.keys.remove(&key))
    }

    /// Checks membership.
    #[must_use]
    pub fn contains(&self, coord: VoxelCoord) -> bool {
        coord.pack().is_some_and(|key| self.keys.contains(&key))
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Removes every member.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Iterates members in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = VoxelCoord> + '_ {
        self.keys.iter().map(|&key| VoxelCoord::unpack(key))
    }

    /// Members sorted by `(x, y, z)`, for deterministic output.
    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<VoxelCoord> {
        let mut coords: Vec<_> = self.iter().collect();
        coords.sort_unstable();
        coords
    }
}

impl Extend<VoxelCoord> for VoxelSet {
    fn extend<I: IntoIterator<Item = VoxelCoord>>(&mut self, iter: I) {
        for coord in iter {
            self.insert(coord);
        }
    }
}

impl FromIterator<VoxelCoord> for VoxelSet {
    fn from_iter<I: IntoIterator<Item = VoxelCoord>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

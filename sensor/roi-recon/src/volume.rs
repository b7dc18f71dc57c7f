//! Camera-anchored ROI and occupancy volume.
//!
//! Voxels live on a world-snapped lattice, so a stored coordinate keeps its
//! world meaning for the whole session. The volume itself is a window of
//! `dims` cells over that lattice which follows the camera; painting and
//! integration only ever touch cells inside the current window.
//!
//! Two sparse sets are kept:
//!
//! - `roi`: cells eligible for integration, edited by paint calls
//! - `solid`: cells confirmed by depth samples while they were in `roi`
//!
//! Erasing ROI leaves `solid` untouched unless the erase cascade is enabled.

use depth_types::{CameraBasis, DepthFrame, PixelCoord};
use nalgebra::{Matrix4, Point3, Vector3};
use tracing::{debug, info};
use voxel_spatial::{Aabb, GridBounds, Sphere, VolumeDims, VoxelCoord, VoxelLattice, VoxelSet};

use crate::config::ReconConfig;
use crate::error::{ReconError, ReconResult};
use crate::mesh::ReconstructedMesh;
use crate::mesher::extract_boundary_mesh;

/// Default window center: 2 m ahead of the camera.
const DEFAULT_CENTER_OFFSET: Vector3<f64> = Vector3::new(0.0, 0.0, 2.0);

/// ROI and solid voxel sets inside a window that follows the camera.
///
/// # Example
///
/// ```
/// use nalgebra::{Matrix4, Point3};
/// use roi_recon::RoiVolume;
/// use voxel_spatial::VolumeDims;
///
/// let mut volume = RoiVolume::new(0.1, VolumeDims::new(20, 20, 20)).unwrap();
/// volume.reposition(&Matrix4::identity());
///
/// let painted = volume.paint_region(&Point3::new(0.0, 0.0, 2.0), 0.2, true);
/// assert_eq!(painted, volume.roi().len());
/// assert!(volume.solid().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct RoiVolume {
    lattice: VoxelLattice,
    dims: VolumeDims,
    center_offset: Vector3<f64>,
    window: GridBounds,
    roi: VoxelSet,
    solid: VoxelSet,
    erase_cascades_to_solid: bool,
}

impl RoiVolume {
    /// Creates an empty volume with the center offset 2 m ahead of the camera.
    ///
    /// The window starts where an identity camera pose would put it.
    ///
    /// # Errors
    ///
    /// Returns an error if the voxel size or dimensions are unusable, or if
    /// the window does not fit the packed key range.
    pub fn new(voxel_size: f64, dims: VolumeDims) -> ReconResult<Self> {
        Self::build(voxel_size, dims, DEFAULT_CENTER_OFFSET)
    }

    /// Creates a volume from the volume section of a session config.
    ///
    /// # Errors
    ///
    /// Returns an error if the config does not validate.
    pub fn from_config(config: &ReconConfig) -> ReconResult<Self> {
        config.validate()?;
        let mut volume = Self::build(
            config.voxel_size,
            config.volume_dims,
            config.volume_center_offset,
        )?;
        volume.erase_cascades_to_solid = config.erase_cascades_to_solid;
        Ok(volume)
    }

    fn build(
        voxel_size: f64,
        dims: VolumeDims,
        center_offset: Vector3<f64>,
    ) -> ReconResult<Self> {
        let lattice = VoxelLattice::new(voxel_size)?;
        dims.validate()?;
        // Identity pose: the offset is already in world axes.
        let window =
            window_around(&lattice, dims, &Point3::from(center_offset)).ok_or_else(|| {
                ReconError::invalid("volume_dims", "window does not fit the voxel key range")
            })?;
        Ok(Self {
            lattice,
            dims,
            center_offset,
            window,
            roi: VoxelSet::new(),
            solid: VoxelSet::new(),
            erase_cascades_to_solid: false,
        })
    }

    /// Sets the window center offset in the camera's right/up/forward basis.
    ///
    /// Takes effect at the next reposition.
    pub fn set_center_offset(&mut self, offset: Vector3<f64>) {
        self.center_offset = offset;
    }

    /// Sets whether erasing ROI also erases solid voxels.
    pub fn set_erase_cascade(&mut self, cascade: bool) {
        self.erase_cascades_to_solid = cascade;
    }

    /// Returns the lattice the sets are keyed on.
    #[must_use]
    pub const fn lattice(&self) -> &VoxelLattice {
        &self.lattice
    }

    /// Returns the window extent in voxels.
    #[must_use]
    pub const fn dims(&self) -> VolumeDims {
        self.dims
    }

    /// Returns the window center offset.
    #[must_use]
    pub const fn center_offset(&self) -> Vector3<f64> {
        self.center_offset
    }

    /// Returns the current window in lattice coordinates.
    #[must_use]
    pub const fn window(&self) -> GridBounds {
        self.window
    }

    /// Returns the world-space box covered by the current window.
    #[must_use]
    pub fn window_aabb(&self) -> Aabb {
        self.lattice.aabb_of(&self.window)
    }

    /// Returns the ROI set.
    #[must_use]
    pub const fn roi(&self) -> &VoxelSet {
        &self.roi
    }

    /// Returns the solid set.
    #[must_use]
    pub const fn solid(&self) -> &VoxelSet {
        &self.solid
    }

    /// Returns `true` if the cell is in the ROI set.
    #[must_use]
    pub fn is_roi(&self, coord: VoxelCoord) -> bool {
        self.roi.contains(coord)
    }

    /// Returns `true` if the cell is in the solid set.
    #[must_use]
    pub fn is_solid(&self, coord: VoxelCoord) -> bool {
        self.solid.contains(coord)
    }

    /// Returns the cell's index relative to the window's minimum corner.
    ///
    /// Every component is in `[0, dims)`; cells outside the window give
    /// `None`.
    #[must_use]
    pub fn local_index(&self, coord: VoxelCoord) -> Option<[u32; 3]> {
        self.window.local_index(coord)
    }

    /// Maps a world point to its cell if that cell is inside the window.
    #[must_use]
    pub fn world_to_voxel(&self, point: &Point3<f64>) -> Option<VoxelCoord> {
        self.lattice
            .world_to_grid(point)
            .filter(|coord| self.window.contains(*coord))
    }

    /// Recenters the window for a camera pose.
    ///
    /// The window center is the camera position plus the center offset
    /// expressed in the camera's right/up/forward basis. Returns `true` if
    /// the window moved.
    ///
    /// The window stays where it is if the center is not finite or if any
    /// window cell would fall outside the packed key range of
    /// ±2^20 cells per axis around the world origin.
    pub fn reposition(&mut self, camera_to_world: &Matrix4<f64>) -> bool {
        self.recenter(&CameraBasis::from_pose(camera_to_world))
    }

    /// Recenters the window for the pose a frame was captured at.
    pub fn reposition_from_frame(&mut self, frame: &DepthFrame) -> bool {
        self.recenter(&frame.camera_basis())
    }

    fn recenter(&mut self, basis: &CameraBasis) -> bool {
        let center = basis.offset_point(&self.center_offset);
        let Some(window) = window_around(&self.lattice, self.dims, &center) else {
            debug!(
                x = center.x,
                y = center.y,
                z = center.z,
                "Window cannot be placed, keeping previous"
            );
            return false;
        };
        let moved = window != self.window;
        self.window = window;
        moved
    }

    /// Adds or removes ROI cells whose centers lie within `radius` of `center`.
    ///
    /// Only cells inside the current window are touched. Returns how many
    /// cells changed ROI membership.
    pub fn paint_region(&mut self, center: &Point3<f64>, radius: f64, add: bool) -> usize {
        if !(radius.is_finite() && radius >= 0.0) {
            return 0;
        }
        let brush = Sphere::new(*center, radius);
        // Clip in world space before snapping to cells.
        let Some(bounds) = brush
            .bounding_aabb()
            .intersection(&self.window_aabb())
            .and_then(|clipped| self.lattice.bounds_of(&clipped))
            .and_then(|b| b.intersection(&self.window))
        else {
            return 0;
        };

        let mut changed = 0;
        for coord in bounds {
            if !brush.contains(&self.lattice.cell_center(coord)) {
                continue;
            }
            let hit = if add {
                self.roi.insert(coord)
            } else {
                if self.erase_cascades_to_solid {
                    self.solid.remove(coord);
                }
                self.roi.remove(coord)
            };
            changed += usize::from(hit);
        }
        changed
    }

    /// Confirms ROI cells hit by the frame's depth samples.
    ///
    /// Every `stride`-th pixel on both axes is back-projected; samples that
    /// are invalid, farther than `max_depth`, outside the window or outside
    /// ROI are skipped. Skipped entirely while ROI is empty. Returns the
    /// number of newly solid cells.
    pub fn integrate(&mut self, frame: &DepthFrame, stride: u32, max_depth: f32) -> usize {
        if self.roi.is_empty() || !frame.has_valid_buffer_size() {
            return 0;
        }
        let stride = stride.max(1) as usize;
        let mut samples = 0_usize;
        let mut confirmed = 0_usize;

        for y in (0..frame.height).step_by(stride) {
            for x in (0..frame.width).step_by(stride) {
                let Some(world) = frame.unproject_to_world(PixelCoord::new(x, y), max_depth)
                else {
                    continue;
                };
                samples += 1;
                let Some(coord) = self.world_to_voxel(&world) else {
                    continue;
                };
                if self.roi.contains(coord) && self.solid.insert(coord) {
                    confirmed += 1;
                }
            }
        }

        debug!(
            samples,
            confirmed,
            solid = self.solid.len(),
            roi = self.roi.len(),
            "Integrated depth frame"
        );
        confirmed
    }

    /// Empties both sets.
    pub fn clear_all(&mut self) {
        info!(
            roi = self.roi.len(),
            solid = self.solid.len(),
            "Clearing reconstruction volume"
        );
        self.roi.clear();
        self.solid.clear();
    }

    /// Builds the boundary mesh of the solid set.
    #[must_use]
    pub fn extract_mesh(&self) -> ReconstructedMesh {
        extract_boundary_mesh(&self.solid, &self.lattice)
    }

    /// Builds the boundary mesh of the ROI set, for previewing paint.
    #[must_use]
    pub fn roi_preview_mesh(&self) -> ReconstructedMesh {
        extract_boundary_mesh(&self.roi, &self.lattice)
    }
}

fn window_around(lattice: &VoxelLattice, dims: VolumeDims, center: &Point3<f64>) -> Option<GridBounds> {
    let half_extent = dims.to_vector() * (lattice.voxel_size() * 0.5);
    let min = lattice.world_to_grid(&(center - half_extent))?;
    let window = GridBounds::from_min_dims(min, dims)?;
    // Every window cell needs a packed set key.
    (window.min.pack().is_some() && window.max.pack().is_some()).then_some(window)
}

//! Configuration for a reconstruction session.
//!
//! Every struct has field-level defaults, so a host can override only what
//! it needs:
//!
//! ```
//! use roi_recon::{GrowParams, ReconConfig};
//!
//! let config = ReconConfig::default()
//!     .with_voxel_size(0.02)
//!     .with_cadence(2, 4)
//!     .with_grow(GrowParams::strict());
//! assert!(config.validate().is_ok());
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use depth_types::MIN_VALID_DEPTH;
use nalgebra::Vector3;
use voxel_spatial::{VolumeDims, VoxelLattice};

use crate::error::{ReconError, ReconResult};

/// Tuning for the ray–depth intersector.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IntersectParams {
    /// Number of fixed samples along the ray. Default: 64
    pub step_count: u32,

    /// Maximum |sampled depth − sample depth| for a hit, in meters. Default: 0.03
    pub tolerance_meters: f64,

    /// Samples this close to the camera plane or behind it are skipped. Default: 0.05
    pub min_camera_depth: f64,
}

impl Default for IntersectParams {
    fn default() -> Self {
        Self {
            step_count: 64,
            tolerance_meters: 0.03,
            min_camera_depth: 0.05,
        }
    }
}

impl IntersectParams {
    /// Checks the ranges of every field.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> ReconResult<()> {
        if self.step_count < 2 {
            return Err(ReconError::invalid("step_count", "must be at least 2"));
        }
        if !(self.tolerance_meters.is_finite() && self.tolerance_meters > 0.0) {
            return Err(ReconError::invalid(
                "tolerance_meters",
                format!("must be positive, got {}", self.tolerance_meters),
            ));
        }
        if !self.min_camera_depth.is_finite() {
            return Err(ReconError::invalid("min_camera_depth", "must be finite"));
        }
        Ok(())
    }
}

/// Tuning for depth-image region growing.
///
/// The normal-angle and delta-z defaults are hand-tuned for head-mounted
/// sensors at roughly 320×240; re-tune them for other resolutions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GrowParams {
    /// Largest depth step between neighboring pixels, in meters. Default: 0.02
    pub max_delta_z: f32,

    /// Largest angle between neighboring surface normals, in degrees. Default: 30
    pub max_normal_angle_degrees: f64,

    /// Euclidean pixel distance from the seed that bounds growth. Default: 80
    pub max_pixel_radius: u32,

    /// Samples farther than this are treated as invalid, in meters. Default: 6.0
    pub max_depth: f32,
}

impl Default for GrowParams {
    fn default() -> Self {
        Self {
            max_delta_z: 0.02,
            max_normal_angle_degrees: 30.0,
            max_pixel_radius: 80,
            max_depth: 6.0,
        }
    }
}

impl GrowParams {
    /// Tight thresholds that stop at small creases.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_delta_z: 0.01,
            max_normal_angle_degrees: 15.0,
            max_pixel_radius: 40,
            ..Default::default()
        }
    }

    /// Loose thresholds that follow curved surfaces further.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            max_delta_z: 0.05,
            max_normal_angle_degrees: 45.0,
            max_pixel_radius: 160,
            ..Default::default()
        }
    }

    /// Cosine of the normal-angle threshold.
    #[must_use]
    pub fn min_normal_cosine(&self) -> f64 {
        self.max_normal_angle_degrees.to_radians().cos()
    }

    /// Checks the ranges of every field.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> ReconResult<()> {
        if !(self.max_delta_z.is_finite() && self.max_delta_z >= 0.0) {
            return Err(ReconError::invalid(
                "max_delta_z",
                format!("must be non-negative, got {}", self.max_delta_z),
            ));
        }
        if !(0.0..=180.0).contains(&self.max_normal_angle_degrees) {
            return Err(ReconError::invalid(
                "max_normal_angle_degrees",
                format!("must be in [0, 180], got {}", self.max_normal_angle_degrees),
            ));
        }
        if !(self.max_depth.is_finite() && self.max_depth > MIN_VALID_DEPTH) {
            return Err(ReconError::invalid(
                "max_depth",
                format!("must exceed {MIN_VALID_DEPTH}, got {}", self.max_depth),
            ));
        }
        Ok(())
    }
}

/// Full configuration of a reconstruction session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReconConfig {
    /// Edge length of a voxel in world units. Default: 0.03
    ///
    /// Voxels are keyed within ±2^20 cells per axis of the world origin, so
    /// the volume can follow the camera up to about `1_048_576 * voxel_size`
    /// from the origin on each axis (31 km at 3 cm). Past that the window
    /// stays at its last valid placement.
    pub voxel_size: f64,

    /// Extent of the camera-anchored volume in voxels. Default: 128×96×128
    pub volume_dims: VolumeDims,

    /// Volume center in the camera's right/up/forward basis. Default: (0, 0, 2)
    pub volume_center_offset: Vector3<f64>,

    /// Integrate depth every N ticks. Default: 3
    pub integrate_every_n_ticks: u32,

    /// Rebuild the mesh every M integrations. Default: 2
    pub remesh_every_m_integrations: u32,

    /// Samples farther than this are ignored by integration and picking. Default: 6.0
    pub max_depth_meters: f32,

    /// Pixel stride used when integrating a frame. Default: 2
    pub integrate_stride: u32,

    /// Region growing tuning.
    pub grow: GrowParams,

    /// Ray intersection tuning.
    pub intersect: IntersectParams,

    /// Brush radius used when painting a segmentation mask, in world units. Default: 0.03
    pub mask_brush_radius: f64,

    /// Paint every k-th pixel of a segmentation mask. Default: 2
    pub mask_paint_stride: u32,

    /// Whether erasing ROI also removes the erased voxels from the solid set.
    /// Default: false (ROI only gates new confirmations)
    pub erase_cascades_to_solid: bool,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            voxel_size: 0.03,
            volume_dims: VolumeDims::new(128, 96, 128),
            volume_center_offset: Vector3::new(0.0, 0.0, 2.0),
            integrate_every_n_ticks: 3,
            remesh_every_m_integrations: 2,
            max_depth_meters: 6.0,
            integrate_stride: 2,
            grow: GrowParams::default(),
            intersect: IntersectParams::default(),
            mask_brush_radius: 0.03,
            mask_paint_stride: 2,
            erase_cascades_to_solid: false,
        }
    }
}

impl ReconConfig {
    /// Small voxels over a smaller space, for tabletop objects.
    #[must_use]
    pub fn fine() -> Self {
        Self {
            voxel_size: 0.015,
            volume_dims: VolumeDims::new(160, 128, 160),
            volume_center_offset: Vector3::new(0.0, 0.0, 1.2),
            mask_brush_radius: 0.015,
            ..Default::default()
        }
    }

    /// Large voxels over a room-sized space.
    #[must_use]
    pub fn coarse() -> Self {
        Self {
            voxel_size: 0.05,
            volume_dims: VolumeDims::new(96, 64, 96),
            integrate_stride: 4,
            mask_brush_radius: 0.05,
            ..Default::default()
        }
    }

    /// Sets the voxel size.
    #[must_use]
    pub const fn with_voxel_size(mut self, voxel_size: f64) -> Self {
        self.voxel_size = voxel_size;
        self
    }

    /// Sets the volume dimensions.
    #[must_use]
    pub const fn with_volume_dims(mut self, dims: VolumeDims) -> Self {
        self.volume_dims = dims;
        self
    }

    /// Sets the volume center offset in camera basis.
    #[must_use]
    pub const fn with_center_offset(mut self, offset: Vector3<f64>) -> Self {
        self.volume_center_offset = offset;
        self
    }

    /// Sets integration and remesh cadence.
    #[must_use]
    pub const fn with_cadence(mut self, every_n_ticks: u32, every_m_integrations: u32) -> Self {
        self.integrate_every_n_ticks = every_n_ticks;
        self.remesh_every_m_integrations = every_m_integrations;
        self
    }

    /// Sets region growing tuning.
    #[must_use]
    pub const fn with_grow(mut self, grow: GrowParams) -> Self {
        self.grow = grow;
        self
    }

    /// Sets ray intersection tuning.
    #[must_use]
    pub const fn with_intersect(mut self, intersect: IntersectParams) -> Self {
        self.intersect = intersect;
        self
    }

    /// Sets whether ROI erasure also erases solid voxels.
    #[must_use]
    pub const fn with_erase_cascade(mut self, cascade: bool) -> Self {
        self.erase_cascades_to_solid = cascade;
        self
    }

    /// Checks every field, including the nested params.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> ReconResult<()> {
        VoxelLattice::new(self.voxel_size)?;
        self.volume_dims.validate()?;
        if self.volume_center_offset.iter().any(|c| !c.is_finite()) {
            return Err(ReconError::invalid("volume_center_offset", "must be finite"));
        }
        if self.integrate_every_n_ticks == 0 {
            return Err(ReconError::invalid("integrate_every_n_ticks", "must be at least 1"));
        }
        if self.remesh_every_m_integrations == 0 {
            return Err(ReconError::invalid(
                "remesh_every_m_integrations",
                "must be at least 1",
            ));
        }
        if !(self.max_depth_meters.is_finite() && self.max_depth_meters > MIN_VALID_DEPTH) {
            return Err(ReconError::invalid(
                "max_depth_meters",
                format!("must exceed {MIN_VALID_DEPTH}, got {}", self.max_depth_meters),
            ));
        }
        if self.integrate_stride == 0 {
            return Err(ReconError::invalid("integrate_stride", "must be at least 1"));
        }
        if self.mask_paint_stride == 0 {
            return Err(ReconError::invalid("mask_paint_stride", "must be at least 1"));
        }
        if !(self.mask_brush_radius.is_finite() && self.mask_brush_radius >= 0.0) {
            return Err(ReconError::invalid(
                "mask_brush_radius",
                format!("must be non-negative, got {}", self.mask_brush_radius),
            ));
        }
        self.grow.validate()?;
        self.intersect.validate()
    }
}

//! Tick-driven reconstruction session.
//!
//! [`Reconstructor`] owns the volume, the region grower scratch and the last
//! published mesh. Each [`tick`](Reconstructor::tick) recenters the volume on
//! the frame's camera, integrates every N usable ticks and remeshes every M
//! integrations.

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use depth_types::{DepthFrame, PixelCoord};
use nalgebra::Point3;
use tracing::{debug, info, warn};
use voxel_spatial::Ray;

use crate::config::{GrowParams, ReconConfig};
use crate::error::ReconResult;
use crate::intersect::intersect_ray;
use crate::mesh::ReconstructedMesh;
use crate::segment::{RegionGrower, SegmentationMask};
use crate::volume::RoiVolume;

/// Why a tick did no work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SkipReason {
    /// No frame has been delivered yet.
    NoFrame,
    /// The frame's buffer or intrinsics violate the frame contract.
    InvalidFrame,
    /// The camera-to-world transform cannot be inverted.
    SingularPose,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickReport {
    /// Set when the tick was skipped.
    pub skipped: Option<SkipReason>,
    /// Whether the volume window moved this tick.
    pub window_moved: bool,
    /// Newly solid voxels, when an integration ran.
    pub integrated: Option<usize>,
    /// Whether a new mesh was published.
    pub remeshed: bool,
}

impl TickReport {
    const fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            window_moved: false,
            integrated: None,
            remeshed: false,
        }
    }
}

/// A reconstruction session.
///
/// # Example
///
/// ```
/// use depth_types::{CameraIntrinsics, DepthFrame};
/// use nalgebra::{Matrix4, Point3};
/// use roi_recon::{ReconConfig, Reconstructor};
///
/// let config = ReconConfig::default().with_cadence(1, 1);
/// let mut recon = Reconstructor::new(config).unwrap();
///
/// let frame = DepthFrame::try_new(
///     64,
///     48,
///     vec![2.0; 64 * 48],
///     CameraIntrinsics::ideal(60.0, 64, 48),
///     Matrix4::identity(),
/// )
/// .unwrap();
///
/// recon.tick(Some(&frame));
/// recon.paint_region(&Point3::new(0.0, 0.0, 2.0), 0.15, true);
/// let report = recon.tick(Some(&frame));
///
/// assert!(report.remeshed);
/// assert!(!recon.mesh().unwrap().is_empty());
/// ```
#[derive(Debug)]
pub struct Reconstructor {
    config: ReconConfig,
    volume: RoiVolume,
    grower: RegionGrower,
    ticks: u64,
    integrations: u64,
    mesh: Option<Arc<ReconstructedMesh>>,
    mesh_generation: u64,
}

impl Reconstructor {
    /// Starts a session.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not validate.
    pub fn new(config: ReconConfig) -> ReconResult<Self> {
        let volume = RoiVolume::from_config(&config)?;
        info!(
            voxel_size = config.voxel_size,
            dims_x = config.volume_dims.x,
            dims_y = config.volume_dims.y,
            dims_z = config.volume_dims.z,
            window_voxels = volume.window().volume(),
            "Created reconstruction volume"
        );
        Ok(Self {
            config,
            volume,
            grower: RegionGrower::new(),
            ticks: 0,
            integrations: 0,
            mesh: None,
            mesh_generation: 0,
        })
    }

    /// Returns the session config.
    #[must_use]
    pub const fn config(&self) -> &ReconConfig {
        &self.config
    }

    /// Returns the volume.
    #[must_use]
    pub const fn volume(&self) -> &RoiVolume {
        &self.volume
    }

    /// Returns the volume for direct edits.
    pub fn volume_mut(&mut self) -> &mut RoiVolume {
        &mut self.volume
    }

    /// Returns the last published mesh, if any.
    #[must_use]
    pub fn mesh(&self) -> Option<Arc<ReconstructedMesh>> {
        self.mesh.clone()
    }

    /// Incremented every time the published mesh changes or is cleared.
    #[must_use]
    pub const fn mesh_generation(&self) -> u64 {
        self.mesh_generation
    }

    /// Number of usable ticks so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Number of integrations run by [`tick`](Self::tick) so far.
    #[must_use]
    pub const fn integrations(&self) -> u64 {
        self.integrations
    }

    /// Advances the session by one tick.
    ///
    /// Missing or unusable frames skip the tick without advancing the
    /// cadence. Integration that would find an empty ROI does not count
    /// toward the remesh cadence.
    pub fn tick(&mut self, frame: Option<&DepthFrame>) -> TickReport {
        let Some(frame) = frame else {
            return TickReport::skipped(SkipReason::NoFrame);
        };
        if let Err(reason) = check_frame(frame) {
            return TickReport::skipped(reason);
        }

        self.ticks += 1;
        let mut report = TickReport {
            window_moved: self.volume.reposition_from_frame(frame),
            ..TickReport::default()
        };

        let n = u64::from(self.config.integrate_every_n_ticks.max(1));
        if self.ticks % n != 0 || self.volume.roi().is_empty() {
            return report;
        }
        report.integrated = Some(self.volume.integrate(
            frame,
            self.config.integrate_stride,
            self.config.max_depth_meters,
        ));
        self.integrations += 1;

        let m = u64::from(self.config.remesh_every_m_integrations.max(1));
        if self.integrations % m == 0 {
            self.remesh();
            report.remeshed = true;
        }
        report
    }

    /// Adds or removes ROI voxels within `radius` of `center`.
    ///
    /// Returns how many voxels changed membership.
    pub fn paint_region(&mut self, center: &Point3<f64>, radius: f64, add: bool) -> usize {
        self.volume.paint_region(center, radius, add)
    }

    /// Paints a segmentation mask into the ROI.
    ///
    /// Every `mask_paint_stride`-th masked pixel is back-projected and
    /// painted with `mask_brush_radius`. A mask whose size differs from the
    /// frame paints nothing.
    pub fn paint_mask(&mut self, frame: &DepthFrame, mask: &SegmentationMask, add: bool) -> usize {
        if check_frame(frame).is_err() || (mask.width(), mask.height()) != frame.resolution() {
            return 0;
        }
        self.volume.reposition_from_frame(frame);

        let stride = self.config.mask_paint_stride.max(1) as usize;
        let radius = self.config.mask_brush_radius;
        let mut changed = 0;
        for pixel in mask.iter_set().step_by(stride) {
            if let Some(world) = frame.unproject_to_world(pixel, self.config.max_depth_meters) {
                changed += self.volume.paint_region(&world, radius, add);
            }
        }
        debug!(pixels = mask.count(), changed, add, "Painted segmentation mask");
        changed
    }

    /// Intersects a world-space ray with the frame's depth.
    #[must_use]
    pub fn intersect(&self, frame: &DepthFrame, ray: &Ray, max_distance: f64) -> Option<Point3<f64>> {
        check_frame(frame).ok()?;
        intersect_ray(frame, ray, max_distance, &self.config.intersect)
    }

    /// Intersects a ray out to the configured maximum depth.
    #[must_use]
    pub fn pick(&self, frame: &DepthFrame, ray: &Ray) -> Option<Point3<f64>> {
        self.intersect(frame, ray, f64::from(self.config.max_depth_meters))
    }

    /// Grows a region from `seed` with the configured tuning.
    pub fn grow(&mut self, frame: &DepthFrame, seed: PixelCoord) -> SegmentationMask {
        let params = self.config.grow;
        self.grow_with(frame, seed, &params)
    }

    /// Grows a region from `seed` with explicit tuning.
    pub fn grow_with(
        &mut self,
        frame: &DepthFrame,
        seed: PixelCoord,
        params: &GrowParams,
    ) -> SegmentationMask {
        if check_frame(frame).is_err() {
            return SegmentationMask::empty(frame.width, frame.height);
        }
        self.grower.grow(frame, seed, params)
    }

    /// Grows a region from `seed` and paints it. Returns the voxels changed.
    pub fn segment_and_paint(&mut self, frame: &DepthFrame, seed: PixelCoord, add: bool) -> usize {
        let mask = self.grow(frame, seed);
        if mask.is_empty() {
            return 0;
        }
        self.paint_mask(frame, &mask, add)
    }

    /// Integrates a frame now, outside the tick cadence.
    ///
    /// Recenters the volume on the frame's camera first. Returns the number
    /// of newly solid voxels.
    pub fn integrate(&mut self, frame: &DepthFrame) -> usize {
        if check_frame(frame).is_err() {
            return 0;
        }
        self.volume.reposition_from_frame(frame);
        self.volume.integrate(
            frame,
            self.config.integrate_stride,
            self.config.max_depth_meters,
        )
    }

    /// Rebuilds the mesh from the solid set and publishes it.
    pub fn remesh(&mut self) -> Arc<ReconstructedMesh> {
        let mesh = Arc::new(self.volume.extract_mesh());
        self.mesh_generation += 1;
        debug!(
            solid = self.volume.solid().len(),
            quads = mesh.quad_count(),
            vertices = mesh.vertex_count(),
            wide_indices = mesh.indices.is_u32(),
            generation = self.mesh_generation,
            "Published mesh"
        );
        self.mesh = Some(Arc::clone(&mesh));
        mesh
    }

    /// Empties ROI and solid and drops the published mesh.
    pub fn clear_all(&mut self) {
        self.volume.clear_all();
        if self.mesh.take().is_some() {
            self.mesh_generation += 1;
        }
        info!(generation = self.mesh_generation, "Cleared reconstruction");
    }
}

fn check_frame(frame: &DepthFrame) -> Result<(), SkipReason> {
    if let Err(error) = frame.validate() {
        warn!(%error, "Skipping unusable depth frame");
        return Err(SkipReason::InvalidFrame);
    }
    if frame.world_to_camera().is_none() {
        warn!("Skipping depth frame with singular camera pose");
        return Err(SkipReason::SingularPose);
    }
    Ok(())
}

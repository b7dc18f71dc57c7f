//! ROI-bounded depth reconstruction.
//!
//! Turns a stream of depth frames into a boundary-face triangle mesh of the
//! surfaces inside a painted region of interest.
//!
//! - [`intersect_ray`] - Ray–depth intersection for picking
//! - [`RegionGrower`] - Flood-fill segmentation over a depth image
//! - [`RoiVolume`] - Camera-anchored ROI and occupancy sets
//! - [`extract_boundary_mesh`] - Face-culled quad mesh from occupancy
//! - [`Reconstructor`] - Tick-driven session tying the above together
//!
//! # Data Flow
//!
//! ```text
//! DepthFrame ─┬─> intersect_ray ─> seed pixel
//!             └─> RegionGrower ─> SegmentationMask ─> paint ROI
//!                                                        │
//!     every N ticks: integrate (DepthFrame ∩ ROI) ─> solid
//!     every M integrations: extract_boundary_mesh(solid) ─> mesh
//! ```
//!
//! # Coordinate Conventions
//!
//! Camera space looks down `+z` with `+y` up; depth rows run top to bottom,
//! so projection flips the vertical axis. Voxels are keyed on a world-snapped
//! lattice, see [`voxel_spatial`].
//!
//! # Errors
//!
//! Only setup fails with [`ReconError`]. Missing frames, invalid samples and
//! out-of-volume voxels are ordinary runtime conditions and turn into no-ops
//! or empty results.
//!
//! # Example
//!
//! ```
//! use depth_types::{CameraIntrinsics, DepthFrame, PixelCoord};
//! use nalgebra::Matrix4;
//! use roi_recon::{ReconConfig, Reconstructor};
//!
//! let frame = DepthFrame::try_new(
//!     64,
//!     48,
//!     vec![1.5; 64 * 48],
//!     CameraIntrinsics::ideal(60.0, 64, 48),
//!     Matrix4::identity(),
//! )
//! .unwrap();
//!
//! let mut recon = Reconstructor::new(ReconConfig::default().with_cadence(1, 1)).unwrap();
//! let painted = recon.segment_and_paint(&frame, PixelCoord::new(32, 24), true);
//! assert!(painted > 0);
//!
//! let report = recon.tick(Some(&frame));
//! assert!(report.remeshed);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod config;
mod error;
mod intersect;
mod mesh;
mod mesher;
mod reconstructor;
mod segment;
mod volume;

pub use config::{GrowParams, IntersectParams, ReconConfig};
pub use error::{ReconError, ReconResult};
pub use intersect::intersect_ray;
pub use mesh::{IndexBuffer, ReconstructedMesh, U16_VERTEX_LIMIT};
pub use mesher::{FACE_CORNERS, FACE_DIRECTIONS, exposed_faces, extract_boundary_mesh};
pub use reconstructor::{Reconstructor, SkipReason, TickReport};
pub use segment::{RegionGrower, SegmentationMask, estimate_normal, grow_region};
pub use volume::RoiVolume;

//! Spatial building blocks for ROI reconstruction.
//!
//! - [`VoxelCoord`] - Integer coordinate on a world-snapped lattice
//! - [`VoxelLattice`] - World ↔ lattice conversion for a voxel size
//! - [`GridBounds`] and [`VolumeDims`] - Inclusive index boxes and extents
//! - [`VoxelSet`] - Sparse membership set over packed coordinate keys
//! - [`Aabb`], [`Sphere`] and [`Ray`] - World-space primitives
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero engine dependencies**.
//!
//! # World-Snapped Lattice
//!
//! Cells are addressed by `floor(world / voxel_size)` per axis, never
//! relative to a moving origin. A camera-anchored volume is a
//! [`GridBounds`] window over this lattice; moving the window does not
//! change what any stored coordinate means.
//!
//! # Example
//!
//! ```
//! use voxel_spatial::{Sphere, VoxelLattice, VoxelSet};
//! use nalgebra::Point3;
//!
//! let lattice = VoxelLattice::new(0.1).unwrap();
//! let brush = Sphere::new(Point3::new(0.5, 0.5, 0.5), 0.12);
//!
//! let mut painted = VoxelSet::new();
//! if let Some(bounds) = lattice.bounds_of(&brush.bounding_aabb()) {
//!     for coord in bounds {
//!         if brush.contains(&lattice.cell_center(coord)) {
//!             painted.insert(coord);
//!         }
//!     }
//! }
//! assert!(!painted.is_empty());
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod error;
mod grid;
mod overlap;
mod ray;
mod voxel;
mod voxel_set;

pub use error::SpatialError;
pub use grid::{GridBounds, GridBoundsIter, VolumeDims, VoxelLattice};
pub use overlap::{Aabb, Sphere};
pub use ray::Ray;
pub use voxel::VoxelCoord;
pub use voxel_set::VoxelSet;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

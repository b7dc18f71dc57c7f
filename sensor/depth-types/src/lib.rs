//! Depth frame contract for ROI reconstruction.
//!
//! This crate describes the data a head-mounted depth sensor pipeline hands
//! to the reconstruction core on every update tick:
//!
//! - [`DepthFrame`] - Row-major metric depth with intrinsics and camera pose
//! - [`CameraIntrinsics`] - Pinhole model with the image-row vertical flip
//! - [`PixelCoord`] - Integer pixel address
//! - [`CameraBasis`] - Pose position and right/up/forward axes
//!
//! # Layer 0 Crate
//!
//! Acquisition, GPU readback and unit conversion happen upstream. This crate
//! only validates and interprets the delivered buffer, so it has no engine or
//! device dependencies.
//!
//! # Invalid Samples
//!
//! Depth at or below [`MIN_VALID_DEPTH`] (0.2 m) is an absent sample and must
//! be skipped by every consumer. Range limits above that are per query.
//!
//! # Example
//!
//! ```
//! use depth_types::{CameraIntrinsics, DepthFrame, PixelCoord};
//! use nalgebra::Matrix4;
//!
//! let frame = DepthFrame::try_new(
//!     2,
//!     2,
//!     vec![1.0, 0.0, 1.2, 1.1],
//!     CameraIntrinsics::ideal(2.0, 2, 2),
//!     Matrix4::identity(),
//! )
//! .unwrap();
//!
//! assert_eq!(frame.valid_depth_at(PixelCoord::new(0, 1), 6.0), Some(1.2));
//! assert!(frame.valid_depth_at(PixelCoord::new(1, 0), 6.0).is_none());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod camera;
mod depth;
mod error;

pub use camera::{CameraIntrinsics, PixelCoord};
pub use depth::{CameraBasis, DepthFrame, MIN_VALID_DEPTH};
pub use error::{DepthError, DepthResult};

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};

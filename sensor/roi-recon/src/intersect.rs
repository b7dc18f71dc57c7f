//! Ray–depth intersection.
//!
//! Marches a world-space ray through the depth frame at a fixed number of
//! samples and returns the first sample whose camera depth agrees with the
//! depth the sensor measured at its pixel.
//!
//! The march is coarse and non-adaptive: `step_count` bounds the cost, and
//! the tolerance is loose relative to the step size at ranges up to ~6 m.

use depth_types::{DepthFrame, MIN_VALID_DEPTH};
use nalgebra::Point3;
use tracing::trace;
use voxel_spatial::Ray;

use crate::config::IntersectParams;

/// Finds where `ray` meets the surface seen in `frame`.
///
/// Returns `None` when no sample within `max_distance` lands within
/// tolerance, when the ray direction is degenerate, or when the camera pose
/// cannot be inverted.
///
/// # Example
///
/// ```
/// use depth_types::{CameraIntrinsics, DepthFrame};
/// use nalgebra::{Matrix4, Point3, Vector3};
/// use roi_recon::{IntersectParams, intersect_ray};
/// use voxel_spatial::Ray;
///
/// // A wall 2 m in front of the camera.
/// let frame = DepthFrame::try_new(
///     32,
///     24,
///     vec![2.0; 32 * 24],
///     CameraIntrinsics::ideal(30.0, 32, 24),
///     Matrix4::identity(),
/// )
/// .unwrap();
///
/// let ray = Ray::new(Point3::origin(), Vector3::z());
/// let hit = intersect_ray(&frame, &ray, 6.3, &IntersectParams::default()).unwrap();
/// assert!((hit.z - 2.0).abs() < 0.03);
/// ```
#[must_use]
pub fn intersect_ray(
    frame: &DepthFrame,
    ray: &Ray,
    max_distance: f64,
    params: &IntersectParams,
) -> Option<Point3<f64>> {
    if !(max_distance.is_finite() && max_distance > 0.0) || !frame.has_valid_buffer_size() {
        return None;
    }
    let ray = ray.normalized()?;
    let world_to_camera = frame.world_to_camera()?;
    let steps = params.step_count.max(2);
    let last = f64::from(steps - 1);

    for i in 0..steps {
        let t = max_distance * f64::from(i) / last;
        let world = ray.point_at(t);
        let camera = world_to_camera.transform_point(&world);
        if camera.z <= params.min_camera_depth {
            continue;
        }
        let Some(pixel) = frame
            .intrinsics
            .project_to_pixel(&camera, frame.width, frame.height)
        else {
            continue;
        };
        let Some(sampled) = frame.depth_at(pixel) else {
            continue;
        };
        let sampled = f64::from(sampled);
        // NaN fails both comparisons and is skipped with the sentinel.
        if !(sampled > f64::from(MIN_VALID_DEPTH) && sampled <= max_distance) {
            continue;
        }
        if (sampled - camera.z).abs() < params.tolerance_meters {
            trace!(step = i, t, sampled, "Ray hit depth surface");
            return Some(world);
        }
    }

    None
}

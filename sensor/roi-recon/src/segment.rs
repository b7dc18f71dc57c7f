//! Depth-image region growing.
//!
//! Breadth-first flood fill over 8-connected pixels. A neighbor joins the
//! region when:
//!
//! 1. its depth is valid and no farther than `max_depth`
//! 2. its depth differs from the current pixel's by at most `max_delta_z`
//! 3. its estimated normal is within `max_normal_angle_degrees` of the
//!    current pixel's normal
//! 4. its squared pixel distance from the seed is at most `max_pixel_radius²`
//!
//! The radius test is Euclidean, not path length, so growth along thin
//! ridges stays bounded while concave paths inside the disc still work.

use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use depth_types::{DepthFrame, PixelCoord};
use nalgebra::Vector3;
use tracing::debug;

use crate::config::GrowParams;

/// 8-connected neighbor offsets.
const NEIGHBORS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// A per-pixel membership mask aligned to a depth frame.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentationMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl SegmentationMask {
    /// Creates an all-false mask.
    #[must_use]
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    /// Mask width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Whether a pixel belongs to the region. Out-of-bounds pixels do not.
    #[must_use]
    pub fn get(&self, pixel: PixelCoord) -> bool {
        pixel.x < self.width
            && pixel.y < self.height
            && self.bits.get(pixel.index(self.width)).copied().unwrap_or(false)
    }

    /// Number of pixels in the region.
    #[must_use]
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Returns `true` if no pixel is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|&b| b)
    }

    /// Row-major view of the mask.
    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Pixels in the region, row-major order.
    pub fn iter_set(&self) -> impl Iterator<Item = PixelCoord> + '_ {
        let width = self.width.max(1) as usize;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .filter_map(move |(i, _)| {
                let x = u32::try_from(i % width).ok()?;
                let y = u32::try_from(i / width).ok()?;
                Some(PixelCoord::new(x, y))
            })
    }

    fn set(&mut self, pixel: PixelCoord) {
        if let Some(bit) = self.bits.get_mut(pixel.index(self.width)) {
            *bit = true;
        }
    }
}

/// Region grower that keeps frame-sized scratch buffers between requests.
///
/// Scratch buffers are resized when the frame resolution changes.
///
/// # Example
///
/// ```
/// use depth_types::{CameraIntrinsics, DepthFrame, PixelCoord};
/// use nalgebra::Matrix4;
/// use roi_recon::{GrowParams, RegionGrower};
///
/// let frame = DepthFrame::try_new(
///     8,
///     8,
///     vec![1.0; 64],
///     CameraIntrinsics::ideal(8.0, 8, 8),
///     Matrix4::identity(),
/// )
/// .unwrap();
///
/// let mut grower = RegionGrower::new();
/// let mask = grower.grow(&frame, PixelCoord::new(4, 4), &GrowParams::default());
/// assert_eq!(mask.count(), 64);
/// ```
#[derive(Debug, Default)]
pub struct RegionGrower {
    width: u32,
    height: u32,
    /// Cached normals, valid where `normal_stamp == generation`.
    normals: Vec<Vector3<f64>>,
    normal_stamp: Vec<u32>,
    generation: u32,
    queue: VecDeque<PixelCoord>,
}

impl RegionGrower {
    /// Creates a grower with no scratch allocated yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolution the scratch buffers are currently sized for.
    #[must_use]
    pub const fn scratch_resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn prepare(&mut self, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            debug!(
                old_width = self.width,
                old_height = self.height,
                width,
                height,
                "Resizing region grower scratch"
            );
            let len = width as usize * height as usize;
            self.width = width;
            self.height = height;
            self.normals = vec![Vector3::z(); len];
            self.normal_stamp = vec![0; len];
            self.generation = 0;
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.normal_stamp.fill(0);
            self.generation = 1;
        }
        self.queue.clear();
    }

    fn normal_at(&mut self, frame: &DepthFrame, pixel: PixelCoord, max_depth: f32) -> Vector3<f64> {
        let i = pixel.index(self.width);
        if self.normal_stamp[i] != self.generation {
            self.normals[i] = estimate_normal(frame, pixel, max_depth);
            self.normal_stamp[i] = self.generation;
        }
        self.normals[i]
    }

    /// Grows a region from `seed` and returns its mask.
    ///
    /// An out-of-bounds seed, an invalid seed depth or a frame whose buffer
    /// does not match its resolution gives an all-false mask.
    pub fn grow(
        &mut self,
        frame: &DepthFrame,
        seed: PixelCoord,
        params: &GrowParams,
    ) -> SegmentationMask {
        let mut mask = SegmentationMask::empty(frame.width, frame.height);
        if !frame.has_valid_buffer_size() {
            return mask;
        }
        if frame.valid_depth_at(seed, params.max_depth).is_none() {
            return mask;
        }

        self.prepare(frame.width, frame.height);
        let radius_sq = u64::from(params.max_pixel_radius).pow(2);
        let min_cosine = params.min_normal_cosine();

        mask.set(seed);
        self.queue.push_back(seed);

        while let Some(current) = self.queue.pop_front() {
            let Some(current_depth) = frame.valid_depth_at(current, params.max_depth) else {
                continue;
            };
            let current_normal = self.normal_at(frame, current, params.max_depth);

            for (dx, dy) in NEIGHBORS {
                let (nx, ny) = (i64::from(current.x) + dx, i64::from(current.y) + dy);
                if !frame.contains(nx, ny) {
                    continue;
                }
                let (Ok(nx), Ok(ny)) = (u32::try_from(nx), u32::try_from(ny)) else {
                    continue;
                };
                let neighbor = PixelCoord::new(nx, ny);
                if mask.get(neighbor) || neighbor.distance_squared(seed) > radius_sq {
                    continue;
                }
                let Some(depth) = frame.valid_depth_at(neighbor, params.max_depth) else {
                    continue;
                };
                if (depth - current_depth).abs() > params.max_delta_z {
                    continue;
                }
                let normal = self.normal_at(frame, neighbor, params.max_depth);
                if current_normal.dot(&normal) < min_cosine {
                    continue;
                }
                mask.set(neighbor);
                self.queue.push_back(neighbor);
            }
        }

        debug!(
            seed_x = seed.x,
            seed_y = seed.y,
            pixels = mask.count(),
            "Grew depth region"
        );
        mask
    }
}

/// One-shot region growing without reusable scratch.
#[must_use]
pub fn grow_region(frame: &DepthFrame, seed: PixelCoord, params: &GrowParams) -> SegmentationMask {
    RegionGrower::new().grow(frame, seed, params)
}

/// Estimates the unit surface normal at a pixel from central differences.
///
/// Neighbor lookups clamp to the image rectangle and invalid neighbors are
/// replaced by the center depth. Tangents are in metric camera units, so the
/// normal does not depend on the image resolution. The result faces the
/// `+z` hemisphere; degenerate cases return `+z`.
#[must_use]
pub fn estimate_normal(frame: &DepthFrame, pixel: PixelCoord, max_depth: f32) -> Vector3<f64> {
    let Some(center) = frame.valid_depth_at(pixel, max_depth) else {
        return Vector3::z();
    };
    let sample = |x: u32, y: u32| {
        frame
            .valid_depth_at(PixelCoord::new(x, y), max_depth)
            .map_or(f64::from(center), f64::from)
    };
    let z = f64::from(center);

    let (x0, x1) = (
        pixel.x.saturating_sub(1),
        (pixel.x + 1).min(frame.width.saturating_sub(1)),
    );
    let (y0, y1) = (
        pixel.y.saturating_sub(1),
        (pixel.y + 1).min(frame.height.saturating_sub(1)),
    );
    let span_x = f64::from((x1 - x0).max(1));
    let span_y = f64::from((y1 - y0).max(1));

    let tangent_x = Vector3::new(
        span_x * z / frame.intrinsics.fx,
        0.0,
        sample(x1, pixel.y) - sample(x0, pixel.y),
    );
    let tangent_y = Vector3::new(
        0.0,
        span_y * z / frame.intrinsics.fy,
        sample(pixel.x, y1) - sample(pixel.x, y0),
    );

    let normal = tangent_x
        .cross(&tangent_y)
        .try_normalize(f64::EPSILON)
        .unwrap_or_else(Vector3::z);
    if normal.z < 0.0 { -normal } else { normal }
}

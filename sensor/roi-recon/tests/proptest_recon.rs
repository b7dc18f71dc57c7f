//! Property-based tests for the reconstruction core.
//!
//! Run with: cargo test -p roi-recon -- proptest

#![allow(clippy::unwrap_used, clippy::cast_precision_loss)]

use depth_types::{CameraIntrinsics, DepthFrame, PixelCoord};
use nalgebra::{Matrix4, Point3, Translation3, Vector3};
use proptest::prelude::*;
use roi_recon::{GrowParams, RoiVolume, exposed_faces, extract_boundary_mesh, grow_region};
use voxel_spatial::{VolumeDims, VoxelCoord, VoxelLattice, VoxelSet};

// =============================================================================
// Strategies
// =============================================================================

/// A 20×20×20 volume of 0.1 m cells spanning z in [0, 2) in front of the origin.
fn test_volume() -> RoiVolume {
    let mut volume = RoiVolume::new(0.1, VolumeDims::new(20, 20, 20)).unwrap();
    volume.set_center_offset(Vector3::new(0.0, 0.0, 1.0));
    volume.reposition(&Matrix4::identity());
    volume
}

/// A point at least 100 m from the origin on some axis.
fn arb_far_point() -> impl Strategy<Value = Point3<f64>> {
    let far = prop_oneof![-1.0e9..-100.0f64, 100.0..1.0e9f64];
    let any = -1.0e9..1.0e9f64;
    (0..3usize, far, any.clone(), any).prop_map(|(axis, far, a, b)| match axis {
        0 => Point3::new(far, a, b),
        1 => Point3::new(a, far, b),
        _ => Point3::new(a, b, far),
    })
}

/// A point in a box slightly larger than the test volume.
fn arb_near_point() -> impl Strategy<Value = Point3<f64>> {
    (-1.5..1.5f64, -1.5..1.5f64, -0.5..2.5f64).prop_map(|(x, y, z)| Point3::new(x, y, z))
}

/// A sparse set of voxels inside a small cube.
fn arb_voxel_set(side: i32, max_len: usize) -> impl Strategy<Value = VoxelSet> {
    prop::collection::vec((0..side, 0..side, 0..side), 0..=max_len)
        .prop_map(|coords| coords.into_iter().map(VoxelCoord::from).collect())
}

/// A small depth frame with a mix of valid and invalid samples.
fn arb_depth_frame() -> impl Strategy<Value = DepthFrame> {
    (2u32..12, 2u32..12).prop_flat_map(|(w, h)| {
        let depth = prop_oneof![Just(0.0f32), 0.3f32..3.0, 0.9f32..1.1];
        prop::collection::vec(depth, (w * h) as usize).prop_map(move |depths| {
            DepthFrame::try_new(
                w,
                h,
                depths,
                CameraIntrinsics::ideal(f64::from(w), w, h),
                Matrix4::identity(),
            )
            .unwrap()
        })
    })
}

fn assert_inside_window(volume: &RoiVolume, set: &VoxelSet) -> Result<(), TestCaseError> {
    let dims = volume.dims();
    for coord in set.iter() {
        let local = volume.local_index(coord);
        prop_assert!(local.is_some(), "{coord:?} outside window");
        let [x, y, z] = local.unwrap();
        prop_assert!(x < dims.x && y < dims.y && z < dims.z);
    }
    Ok(())
}

// =============================================================================
// Property Tests: Bounds Respect
// =============================================================================

proptest! {
    /// Painting far outside the volume never adds membership.
    #[test]
    fn paint_far_outside_is_noop(center in arb_far_point(), radius in 0.0..5.0f64) {
        let mut volume = test_volume();
        prop_assert_eq!(volume.paint_region(&center, radius, true), 0);
        prop_assert!(volume.roi().is_empty());
    }

    /// A brush that covers the whole window paints every window cell.
    #[test]
    fn covering_brush_fills_window(center in arb_near_point(), radius in 5.0..1.0e12f64) {
        let mut volume = test_volume();
        prop_assert_eq!(volume.paint_region(&center, radius, true), 8000);
        assert_inside_window(&volume, volume.roi())?;
    }

    /// Painted voxels always have a local index inside the dimensions.
    #[test]
    fn paint_stays_inside_window(
        strokes in prop::collection::vec((arb_near_point(), 0.0..0.6f64), 1..8),
    ) {
        let mut volume = test_volume();
        for (center, radius) in &strokes {
            volume.paint_region(center, *radius, true);
        }
        assert_inside_window(&volume, volume.roi())?;
    }

    /// Integration only confirms voxels that are in ROI and inside the window.
    #[test]
    fn integrate_stays_inside_roi(
        frame in arb_depth_frame(),
        shift in (-0.5..0.5f64, -0.5..0.5f64, -0.5..0.5f64),
        strokes in prop::collection::vec((arb_near_point(), 0.0..0.6f64), 0..6),
        stride in 1u32..4,
    ) {
        let mut volume = test_volume();
        for (center, radius) in &strokes {
            volume.paint_region(center, *radius, true);
        }

        let mut frame = frame;
        frame.camera_to_world = Translation3::new(shift.0, shift.1, shift.2).to_homogeneous();
        volume.reposition_from_frame(&frame);
        volume.integrate(&frame, stride, 6.0);

        assert_inside_window(&volume, volume.solid())?;
        for coord in volume.solid().iter() {
            prop_assert!(volume.is_roi(coord));
        }
    }
}

// =============================================================================
// Property Tests: Face Culling
// =============================================================================

proptest! {
    /// Every quad sits between a solid voxel and a non-solid neighbor.
    #[test]
    fn quads_separate_solid_from_empty(solid in arb_voxel_set(6, 60)) {
        let lattice = VoxelLattice::new(1.0).unwrap();
        let mesh = extract_boundary_mesh(&solid, &lattice);

        let expected: usize = solid.iter().map(|c| exposed_faces(&solid, c)).sum();
        prop_assert_eq!(mesh.quad_count(), expected);

        for q in 0..mesh.quad_count() {
            let corners = &mesh.vertices[q * 4..q * 4 + 4];
            let center = corners.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / 4.0;
            let [a, b, c] = mesh.triangle(q * 2).unwrap();
            let normal = (b - a).cross(&(c - a)).normalize();

            let outside = lattice.world_to_grid(&Point3::from(center + normal * 0.5)).unwrap();
            let inside = lattice.world_to_grid(&Point3::from(center - normal * 0.5)).unwrap();
            prop_assert!(!solid.contains(outside), "quad {q} faces solid {outside:?}");
            prop_assert!(solid.contains(inside), "quad {q} not backed by {inside:?}");
        }
    }

    /// A full block only exposes its outer shell.
    #[test]
    fn full_block_has_no_interior_faces(side in 1i32..6) {
        let lattice = VoxelLattice::new(0.5).unwrap();
        let solid: VoxelSet = (0..side)
            .flat_map(|x| (0..side).flat_map(move |y| (0..side).map(move |z| VoxelCoord::new(x, y, z))))
            .collect();
        let mesh = extract_boundary_mesh(&solid, &lattice);
        let side = usize::try_from(side).unwrap();
        prop_assert_eq!(mesh.quad_count(), 6 * side * side);
    }

    /// One voxel anywhere on the lattice gives a closed box.
    #[test]
    fn single_voxel_is_six_quads(x in -1000i32..1000, y in -1000i32..1000, z in -1000i32..1000) {
        let lattice = VoxelLattice::new(0.03).unwrap();
        let solid: VoxelSet = [VoxelCoord::new(x, y, z)].into_iter().collect();
        let mesh = extract_boundary_mesh(&solid, &lattice);
        prop_assert_eq!(mesh.quad_count(), 6);
        prop_assert_eq!(mesh.triangle_count(), 12);
        prop_assert_eq!(mesh.vertex_count(), 24);
    }
}

// =============================================================================
// Property Tests: Region Growing
// =============================================================================

proptest! {
    /// Every grown pixel lies within the pixel radius of the seed.
    #[test]
    fn grow_respects_radius(
        frame in arb_depth_frame(),
        seed in (0u32..12, 0u32..12),
        radius in 0u32..6,
        angle in 10.0..90.0f64,
    ) {
        let seed = PixelCoord::new(seed.0, seed.1);
        let params = GrowParams {
            max_delta_z: 0.1,
            max_normal_angle_degrees: angle,
            max_pixel_radius: radius,
            max_depth: 6.0,
        };
        let mask = grow_region(&frame, seed, &params);
        let radius_sq = u64::from(radius).pow(2);

        for pixel in mask.iter_set() {
            prop_assert!(pixel.distance_squared(seed) <= radius_sq);
            prop_assert!(frame.valid_depth_at(pixel, 6.0).is_some());
        }
        let disc = (2 * radius + 1).pow(2) as usize;
        prop_assert!(mask.count() <= disc);
        if !mask.is_empty() {
            prop_assert!(mask.get(seed));
        }
    }
}

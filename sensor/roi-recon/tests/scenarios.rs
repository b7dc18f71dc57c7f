//! End-to-end scenarios driving a reconstruction session tick by tick.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use depth_types::{CameraIntrinsics, DepthFrame, PixelCoord};
use nalgebra::{Matrix4, Point3, Translation3, Vector3};
use roi_recon::{GrowParams, ReconConfig, Reconstructor, SkipReason, grow_region};
use voxel_spatial::{Ray, VolumeDims};

// =============================================================================
// Helpers
// =============================================================================

fn wall(width: u32, height: u32, depth: f32, pose: Matrix4<f64>) -> DepthFrame {
    DepthFrame::try_new(
        width,
        height,
        vec![depth; (width * height) as usize],
        CameraIntrinsics::ideal(f64::from(width), width, height),
        pose,
    )
    .unwrap()
}

/// 5 cm voxels in a 2.4 m cube centered 1.2 m ahead of the camera.
fn config() -> ReconConfig {
    let config = ReconConfig::default()
        .with_voxel_size(0.05)
        .with_volume_dims(VolumeDims::new(48, 48, 48))
        .with_center_offset(Vector3::new(0.0, 0.0, 1.2))
        .with_cadence(2, 2);
    ReconConfig {
        mask_brush_radius: 0.08,
        ..config
    }
}

// =============================================================================
// Full Loop
// =============================================================================

#[test]
fn pick_segment_integrate_remesh() {
    let mut recon = Reconstructor::new(config()).unwrap();
    let frame = wall(48, 36, 2.0, Matrix4::identity());

    let hit = recon
        .pick(&frame, &Ray::new(Point3::origin(), Vector3::z()))
        .unwrap();
    assert!((hit.z - 2.0).abs() < 0.03);

    let seed = frame
        .intrinsics
        .project_to_pixel(&hit, frame.width, frame.height)
        .unwrap();
    assert!(recon.segment_and_paint(&frame, seed, true) > 0);

    let mut published = None;
    for _ in 0..8 {
        let report = recon.tick(Some(&frame));
        assert_eq!(report.skipped, None);
        if report.remeshed {
            published = recon.mesh();
        }
    }

    let mesh = published.unwrap();
    assert!(!mesh.is_empty());
    assert_eq!(mesh.triangle_count(), mesh.quad_count() * 2);
    assert!(!mesh.indices.is_u32());

    // Every confirmed voxel sits on the wall.
    let volume = recon.volume();
    for coord in volume.solid().iter() {
        assert_eq!(coord.z, 40);
        assert!(volume.is_roi(coord));
    }
}

#[test]
fn ticks_without_frames_are_skipped() {
    let mut recon = Reconstructor::new(config().with_cadence(1, 1)).unwrap();
    for _ in 0..5 {
        assert_eq!(recon.tick(None).skipped, Some(SkipReason::NoFrame));
    }
    assert_eq!(recon.ticks(), 0);
    assert!(recon.mesh().is_none());
}

#[test]
fn resolution_change_between_ticks() {
    let mut recon = Reconstructor::new(config().with_cadence(1, 1)).unwrap();
    recon.paint_region(&Point3::new(0.0, 0.0, 1.0), 0.3, true);

    let small = wall(16, 12, 1.0, Matrix4::identity());
    let large = wall(64, 48, 1.0, Matrix4::identity());

    let a = recon.grow(&small, PixelCoord::new(8, 6));
    let b = recon.grow(&large, PixelCoord::new(32, 24));
    let c = recon.grow(&small, PixelCoord::new(8, 6));
    assert_eq!(a.count(), 16 * 12);
    assert_eq!(b.count(), 64 * 48);
    assert_eq!(a, c);

    assert!(recon.tick(Some(&small)).integrated.is_some());
    let before = recon.volume().solid().len();
    assert!(recon.tick(Some(&large)).integrated.is_some());
    assert!(recon.volume().solid().len() >= before);
}

// =============================================================================
// ClearAll
// =============================================================================

#[test]
fn clear_all_is_idempotent() {
    let mut recon = Reconstructor::new(config().with_cadence(1, 1)).unwrap();
    let frame = wall(32, 24, 1.0, Matrix4::identity());
    recon.tick(Some(&frame));
    recon.paint_region(&Point3::new(0.0, 0.0, 1.0), 0.3, true);
    assert!(recon.tick(Some(&frame)).remeshed);

    for _ in 0..2 {
        recon.clear_all();
        assert!(recon.volume().roi().is_empty());
        assert!(recon.volume().solid().is_empty());
        assert!(recon.volume().extract_mesh().is_empty());
        assert!(recon.mesh().is_none());
    }

    // With ROI gone the next integration is skipped.
    assert_eq!(recon.tick(Some(&frame)).integrated, None);
}

// =============================================================================
// Moving Camera
// =============================================================================

#[test]
fn solid_keeps_world_position_when_camera_moves() {
    let mut recon = Reconstructor::new(config().with_cadence(1, 1)).unwrap();
    let frame = wall(32, 24, 1.0, Matrix4::identity());
    recon.tick(Some(&frame));
    recon.paint_region(&Point3::new(0.0, 0.0, 1.0), 0.3, true);
    recon.tick(Some(&frame));
    let solid = recon.volume().solid().to_sorted_vec();
    assert!(!solid.is_empty());

    // Step back 0.5 m; the wall is now 1.5 m from the camera.
    let pose = Translation3::new(0.0, 0.0, -0.5).to_homogeneous();
    let moved = wall(32, 24, 1.5, pose);
    let report = recon.tick(Some(&moved));
    assert!(report.window_moved);
    assert!(report.integrated.is_some());

    let after = recon.volume().solid();
    assert!(solid.iter().all(|c| after.contains(*c)));
    assert!(after.iter().all(|c| c.z == 20));
}

// =============================================================================
// Erase Semantics
// =============================================================================

#[test]
fn erase_cascade_on_and_off() {
    for cascade in [false, true] {
        let mut recon =
            Reconstructor::new(config().with_cadence(1, 1).with_erase_cascade(cascade)).unwrap();
        let frame = wall(32, 24, 1.0, Matrix4::identity());
        recon.tick(Some(&frame));
        let center = Point3::new(0.0, 0.0, 1.0);
        recon.paint_region(&center, 0.3, true);
        recon.tick(Some(&frame));
        assert!(!recon.volume().solid().is_empty());

        recon.paint_region(&center, 0.3, false);
        assert!(recon.volume().roi().is_empty());
        assert_eq!(recon.volume().solid().is_empty(), cascade);
    }
}

// =============================================================================
// Region Growing
// =============================================================================

#[test]
fn bump_is_excluded_from_region() {
    let mut depths = vec![1.0; 16];
    depths[PixelCoord::new(2, 2).index(4)] = 1.5;
    let frame = DepthFrame::try_new(
        4,
        4,
        depths,
        CameraIntrinsics::ideal(2.0, 4, 4),
        Matrix4::identity(),
    )
    .unwrap();

    let params = GrowParams {
        max_delta_z: 0.05,
        max_normal_angle_degrees: 60.0,
        max_pixel_radius: 10,
        max_depth: 6.0,
    };
    let mask = grow_region(&frame, PixelCoord::new(1, 1), &params);
    assert!(!mask.get(PixelCoord::new(2, 2)));
    assert_eq!(mask.count(), 15);
}

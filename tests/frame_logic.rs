//! Integration tests for the frame logic that does not need a GPU device:
//! pass sequencing, the shared matrix snapshot, selection decode and the
//! pick/drag round trip.

use glam::{Mat4, Vec3};

use trackview::camera::{self, CameraMode};
use trackview::renderer::{
    drag_horizontal, first_hit, frame_plan, mouse_ray, point_instances, shadow_instances,
    AnimationClock, MatrixBlock, Pass, RippleState, HEIGHT_MAP_FRAMES, PICK_REGION,
};
use trackview::track::Track;

#[test]
fn test_frame_plan_order_is_fixed() {
    let plan = frame_plan(CameraMode::World);
    assert_eq!(plan, [Pass::Ripple, Pass::Scene, Pass::Shadow, Pass::Post]);

    let plan = frame_plan(CameraMode::Top);
    assert_eq!(plan, [Pass::Ripple, Pass::Scene, Pass::Post]);
}

#[test]
fn test_scene_and_shadow_share_one_snapshot() {
    // both passes bind the same published block; a second snapshot built
    // from the same matrices is byte-identical
    let proj = camera::perspective(40.0, 1.5);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 100.0, 250.0), Vec3::ZERO, Vec3::Y);
    let a = MatrixBlock::new(proj, view);
    let b = MatrixBlock::new(proj, view);
    assert_eq!(bytemuck::bytes_of(&a), bytemuck::bytes_of(&b));
}

#[test]
fn test_top_camera_extents() {
    assert_eq!(camera::top_extents(2.0), (110.0, 55.0));
    assert_eq!(camera::top_extents(0.5), (55.0, 110.0));
}

#[test]
fn test_animation_cycle_covers_all_frames_in_order() {
    let mut clock = AnimationClock::default();
    let mut previous = clock.frame;
    for _ in 0..(2 * HEIGHT_MAP_FRAMES) {
        clock.advance();
        let expected = (previous + 1) % HEIGHT_MAP_FRAMES;
        assert_eq!(clock.frame, expected, "frame index skipped or repeated");
        previous = clock.frame;
    }
    assert_eq!(clock.frame, 0);
}

#[test]
fn test_ripple_drop_used_once_then_sentinel() {
    let mut ripple = RippleState::default();
    ripple.arm(glam::Vec2::new(0.5, 0.5));
    assert_eq!(ripple.take(), glam::Vec2::new(0.5, 0.5));
    for _ in 0..3 {
        assert_eq!(ripple.take(), glam::Vec2::ZERO);
    }
}

#[test]
fn test_selection_decode_feeds_highlighting() {
    // a readback with point 3 (id 4) in the window selects index 3...
    let bytes_per_row = 256;
    let mut data = vec![0u8; (bytes_per_row * PICK_REGION) as usize];
    data[4..8].copy_from_slice(&4u32.to_le_bytes());
    let selected = first_hit(&data, PICK_REGION, PICK_REGION, bytes_per_row).map(|i| i as usize);
    assert_eq!(selected, Some(3));

    // ...and that index drives the highlight color
    let mut track = Track::new();
    track.add_point_after(0);
    let instances = point_instances(&track, selected, CameraMode::World);
    let highlighted: Vec<usize> = instances
        .iter()
        .enumerate()
        .filter(|(_, inst)| inst.color[1] > 0.5)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(highlighted, vec![3]);
}

#[test]
fn test_empty_window_clears_selection() {
    let bytes_per_row = 256;
    let data = vec![0u8; (bytes_per_row * PICK_REGION) as usize];
    assert_eq!(first_hit(&data, PICK_REGION, PICK_REGION, bytes_per_row), None);
}

#[test]
fn test_shadow_instances_have_no_color_bytes() {
    use std::mem::size_of;
    use trackview::renderer::{PointInstance, ShadowInstance};
    // a color would need 16 more bytes; the shadow layout is the bare matrix
    assert_eq!(size_of::<ShadowInstance>() + 16, size_of::<PointInstance>());

    let track = Track::new();
    let shadows = shadow_instances(&track, CameraMode::World);
    assert_eq!(shadows.len(), track.len());
}

#[test]
fn test_drag_round_trip_recovers_point() {
    // project a control point to the screen, cast the cursor ray back and
    // drag: the point should stay where it is
    let viewport = (800.0f32, 600.0f32);
    let proj = camera::perspective(40.0, viewport.0 / viewport.1);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 120.0, 250.0), Vec3::ZERO, Vec3::Y);
    let point = Vec3::new(50.0, 5.0, 0.0);

    let clip = (proj * view).project_point3(point);
    let cursor = (
        (clip.x + 1.0) * 0.5 * viewport.0,
        (1.0 - clip.y) * 0.5 * viewport.1,
    );

    let (origin, dir) = mouse_ray(cursor, viewport, proj, view);
    let moved = drag_horizontal(origin, dir, point).expect("ray hits the plane");
    assert!(
        (moved - point).length() < 0.1,
        "expected {point}, got {moved}"
    );
}

#[test]
fn test_train_mode_draws_no_points_but_keeps_plan() {
    let track = Track::new();
    assert!(point_instances(&track, None, CameraMode::Train).is_empty());
    assert!(frame_plan(CameraMode::Train).contains(&Pass::Shadow));
}

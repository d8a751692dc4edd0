//! Camera modes and projection selection.
//!
//! Three mutually exclusive cameras drive the scene: a dolly-based orbit rig
//! (world view), a fixed orthographic top-down view whose extents follow the
//! viewport aspect ratio, and a first-person train camera derived from the
//! track path. Exactly one mode is active per frame; a mode switch takes
//! effect at the next frame's matrix computation.

use dolly::prelude::*;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::track::{Track, TrainCamera};

/// Vertical FOV of the orbit camera, matching the original arcball setup.
const WORLD_FOV_DEG: f32 = 40.0;
/// Initial orbit distance from the scene origin.
pub const WORLD_DISTANCE: f32 = 250.0;
/// Half extent of the top-down view along the larger viewport axis.
const TOP_HALF_EXTENT: f32 = 110.0;

const NEAR: f32 = 1.0;
// the skybox cube is scaled to 600 units, keep it inside the far plane
const FAR: f32 = 3000.0;

/// Active camera, one of three mutually exclusive modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraMode {
    /// Orbit camera around the scene origin
    World,
    /// Orthographic, looking straight down
    Top,
    /// First person, riding the track
    Train,
}

/// Perspective projection for wgpu's 0..1 depth range.
pub fn perspective(fov_y_deg: f32, aspect: f32) -> Mat4 {
    Mat4::perspective_rh(fov_y_deg.to_radians(), aspect, NEAR, FAR)
}

/// Half extents (width, height) of the top-down orthographic view.
///
/// The larger viewport axis always spans 110 world units; the other axis
/// shrinks with the aspect ratio so the view never stretches.
pub fn top_extents(aspect: f32) -> (f32, f32) {
    if aspect >= 1.0 {
        (TOP_HALF_EXTENT, TOP_HALF_EXTENT / aspect)
    } else {
        (TOP_HALF_EXTENT * aspect, TOP_HALF_EXTENT)
    }
}

/// Projection and view matrices for the top-down camera.
pub fn top_matrices(aspect: f32) -> (Mat4, Mat4) {
    let (hw, hh) = top_extents(aspect);
    // depth spans y = +200 down to y = -200
    let proj = Mat4::orthographic_rh(-hw, hw, -hh, hh, 200.0, -200.0);
    let view = Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2);
    (proj, view)
}

/// Compute the projection/view pair for the active camera mode.
pub fn matrices(
    mode: CameraMode,
    aspect: f32,
    orbit: &OrbitCamera,
    train: &TrainCamera,
    track: &Track,
) -> (Mat4, Mat4) {
    match mode {
        CameraMode::World => (perspective(WORLD_FOV_DEG, aspect), orbit.view_matrix()),
        CameraMode::Top => top_matrices(aspect),
        CameraMode::Train => (perspective(60.0, aspect), train.view_matrix(track)),
    }
}

/// Orbit camera rig for the world view.
pub struct OrbitCamera {
    rig: CameraRig,
}

impl OrbitCamera {
    pub fn new(target: Vec3, distance: f32) -> Self {
        let rig = CameraRig::builder()
            .with(YawPitch::new().yaw_degrees(35.0).pitch_degrees(-25.0))
            .with(Smooth::new_rotation(0.8))
            .with(Arm::new(mint::Vector3 { x: 0.0, y: 0.0, z: distance }))
            .with(Smooth::new_position(0.8))
            .with(
                LookAt::new(mint::Point3 { x: target.x, y: target.y, z: target.z })
                    .tracking_smoothness(0.8),
            )
            .build();
        Self { rig }
    }

    /// Orbit around the target (drag).
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        let sensitivity = 0.4;
        self.rig
            .driver_mut::<YawPitch>()
            .rotate_yaw_pitch(-delta_x * sensitivity, -delta_y * sensitivity);
    }

    /// Dolly in/out (scroll).
    pub fn zoom(&mut self, delta: f32) {
        let arm = self.rig.driver_mut::<Arm>();
        let factor = 1.0 - delta * 0.1;
        arm.offset.z = (arm.offset.z * factor).clamp(10.0, 1200.0);
    }

    /// Reset to the default world view.
    pub fn reset(&mut self) {
        self.set_angles(35.0, -25.0);
        self.rig.driver_mut::<Arm>().offset.z = WORLD_DISTANCE;
    }

    pub fn distance(&self) -> f32 {
        self.rig.driver::<Arm>().offset.z
    }

    pub fn set_distance(&mut self, dist: f32) {
        self.rig.driver_mut::<Arm>().offset.z = dist.clamp(10.0, 1200.0);
    }

    /// Yaw and pitch in degrees, from the settled transform.
    pub fn angles(&self) -> (f32, f32) {
        let r = self.rig.final_transform.rotation;
        let q = glam::Quat::from_xyzw(r.v.x, r.v.y, r.v.z, r.s);
        let (yaw, pitch, _) = q.to_euler(glam::EulerRot::YXZ);
        (yaw.to_degrees(), pitch.to_degrees())
    }

    pub fn set_angles(&mut self, yaw: f32, pitch: f32) {
        self.rig
            .driver_mut::<YawPitch>()
            .set_rotation_quat(mint::Quaternion::from(glam::Quat::from_euler(
                glam::EulerRot::YXZ,
                yaw.to_radians(),
                pitch.to_radians(),
                0.0,
            )));
    }

    /// Advance the rig's smoothing (call once per frame).
    pub fn update(&mut self, dt: f32) {
        self.rig.update(dt);
    }

    pub fn position(&self) -> Vec3 {
        let p = self.rig.final_transform.position;
        Vec3::new(p.x, p.y, p.z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        let t = &self.rig.final_transform;
        let pos = Vec3::new(t.position.x, t.position.y, t.position.z);
        let fwd: Vec3 = t.forward();
        let up: Vec3 = t.up();
        Mat4::look_at_rh(pos, pos + fwd, up)
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, WORLD_DISTANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_extents_wide() {
        let (hw, hh) = top_extents(2.0);
        assert_eq!(hw, 110.0);
        assert_eq!(hh, 55.0);
    }

    #[test]
    fn test_top_extents_tall() {
        let (hw, hh) = top_extents(0.5);
        assert_eq!(hw, 55.0);
        assert_eq!(hh, 110.0);
    }

    #[test]
    fn test_top_extents_square() {
        assert_eq!(top_extents(1.0), (110.0, 110.0));
    }

    #[test]
    fn test_top_view_looks_down() {
        let (_, view) = top_matrices(1.0);
        // a point high above the scene ends up in front of the camera
        let v = view.transform_point3(Vec3::new(0.0, 100.0, 0.0));
        assert!(v.z < 0.0, "expected negative view-space z, got {}", v.z);
    }

    #[test]
    fn test_top_depth_range_spans_plus_minus_200() {
        let (proj, view) = top_matrices(1.0);
        let near = proj.project_point3(view.transform_point3(Vec3::new(0.0, 200.0, 0.0)));
        let far = proj.project_point3(view.transform_point3(Vec3::new(0.0, -200.0, 0.0)));
        assert!((near.z - 0.0).abs() < 1e-4);
        assert!((far.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_orbit_camera_distance_clamped() {
        let mut cam = OrbitCamera::default();
        cam.set_distance(5000.0);
        assert_eq!(cam.distance(), 1200.0);
        cam.set_distance(0.0);
        assert_eq!(cam.distance(), 10.0);
    }
}

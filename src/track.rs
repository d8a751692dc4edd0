//! Track model: ordered control points and the train camera path.
//!
//! The track is an external collaborator to the renderer: an ordered,
//! index-addressed sequence of control points forming a closed loop. The
//! renderer draws the points and the picking engine selects them by index;
//! the application mutates a selected point while dragging.

use glam::{Mat4, Quat, Vec3};

/// Minimum number of points that must remain on the track.
pub const MIN_POINTS: usize = 4;

/// One draggable track control point: position plus an orientation vector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlPoint {
    pub pos: Vec3,
    pub orient: Vec3,
}

impl ControlPoint {
    pub fn new(pos: Vec3) -> Self {
        Self { pos, orient: Vec3::Y }
    }

    /// Model matrix for drawing the point as an oriented cube.
    pub fn model_matrix(&self, half_size: f32) -> Mat4 {
        let rotation = match self.orient.try_normalize() {
            Some(o) => Quat::from_rotation_arc(Vec3::Y, o),
            None => Quat::IDENTITY,
        };
        Mat4::from_translation(self.pos)
            * Mat4::from_quat(rotation)
            * Mat4::from_scale(Vec3::splat(half_size))
    }
}

/// A closed loop of control points.
pub struct Track {
    pub points: Vec<ControlPoint>,
}

impl Track {
    /// The default square loop the editor starts with.
    pub fn new() -> Self {
        Self {
            points: vec![
                ControlPoint::new(Vec3::new(50.0, 5.0, 0.0)),
                ControlPoint::new(Vec3::new(0.0, 5.0, 50.0)),
                ControlPoint::new(Vec3::new(-50.0, 5.0, 0.0)),
                ControlPoint::new(Vec3::new(0.0, 5.0, -50.0)),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Insert a new point halfway between point `i` and its successor.
    pub fn add_point_after(&mut self, i: usize) -> Option<usize> {
        if i >= self.points.len() {
            return None;
        }
        let next = (i + 1) % self.points.len();
        let mid = (self.points[i].pos + self.points[next].pos) * 0.5;
        self.points.insert(i + 1, ControlPoint::new(mid));
        Some(i + 1)
    }

    /// Remove point `i`, refusing to shrink the loop below [`MIN_POINTS`].
    pub fn delete_point(&mut self, i: usize) -> bool {
        if self.points.len() <= MIN_POINTS || i >= self.points.len() {
            return false;
        }
        self.points.remove(i);
        true
    }

    /// Position on the closed loop at parameter `t`, one unit per segment,
    /// linearly interpolated and wrapping at the point count.
    pub fn sample(&self, t: f32) -> Vec3 {
        let n = self.points.len();
        let t = t.rem_euclid(n as f32);
        let i = t.floor() as usize % n;
        let frac = t - t.floor();
        let a = self.points[i].pos;
        let b = self.points[(i + 1) % n].pos;
        a.lerp(b, frac)
    }
}

impl Default for Track {
    fn default() -> Self {
        Self::new()
    }
}

/// First-person camera riding the track loop.
///
/// External collaborator to the projection selector: given the track it
/// yields a view matrix for the current path position.
pub struct TrainCamera {
    /// Path parameter, one unit per track segment
    pub t: f32,
}

/// Rider eye height above the track path.
const EYE_HEIGHT: f32 = 6.0;
/// How far ahead along the path the camera looks.
const LOOK_AHEAD: f32 = 0.08;

impl TrainCamera {
    pub fn new() -> Self {
        Self { t: 0.0 }
    }

    /// Advance along the path. `speed` is in segments per second.
    pub fn advance(&mut self, dt: f32, speed: f32) {
        self.t += dt * speed;
    }

    pub fn view_matrix(&self, track: &Track) -> Mat4 {
        let eye = track.sample(self.t) + Vec3::Y * EYE_HEIGHT;
        let ahead = track.sample(self.t + LOOK_AHEAD) + Vec3::Y * EYE_HEIGHT;
        let target = if ahead.distance_squared(eye) < 1e-6 {
            eye + Vec3::X
        } else {
            ahead
        };
        Mat4::look_at_rh(eye, target, Vec3::Y)
    }
}

impl Default for TrainCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_track_is_minimal_loop() {
        let track = Track::new();
        assert_eq!(track.len(), MIN_POINTS);
    }

    #[test]
    fn test_sample_hits_points_and_wraps() {
        let track = Track::new();
        assert_eq!(track.sample(0.0), track.points[0].pos);
        assert_eq!(track.sample(2.0), track.points[2].pos);
        // wraps around the loop
        assert_eq!(track.sample(4.0), track.points[0].pos);
        assert_eq!(track.sample(-1.0), track.points[3].pos);
    }

    #[test]
    fn test_sample_interpolates() {
        let track = Track::new();
        let mid = track.sample(0.5);
        let expected = (track.points[0].pos + track.points[1].pos) * 0.5;
        assert!((mid - expected).length() < 1e-5);
    }

    #[test]
    fn test_add_point_inserts_midpoint() {
        let mut track = Track::new();
        let idx = track.add_point_after(0).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(track.len(), 5);
        let expected = (track.points[0].pos + track.points[2].pos) * 0.5;
        assert_eq!(track.points[1].pos, expected);
    }

    #[test]
    fn test_delete_keeps_minimum_loop() {
        let mut track = Track::new();
        assert!(!track.delete_point(0));
        track.add_point_after(0);
        assert!(track.delete_point(0));
        assert_eq!(track.len(), MIN_POINTS);
    }

    #[test]
    fn test_model_matrix_places_cube_at_point() {
        let cp = ControlPoint::new(Vec3::new(10.0, 5.0, -3.0));
        let m = cp.model_matrix(2.5);
        let origin = m.transform_point3(Vec3::ZERO);
        assert!((origin - cp.pos).length() < 1e-5);
        // unit corner scales by the half size
        let corner = m.transform_point3(Vec3::ONE);
        assert!((corner - cp.pos).length() > 2.5);
    }

    #[test]
    fn test_train_view_matrix_is_valid_for_degenerate_track() {
        let mut track = Track::new();
        for p in &mut track.points {
            p.pos = Vec3::ZERO;
        }
        let cam = TrainCamera::new();
        let view = cam.view_matrix(&track);
        assert!(view.is_finite());
    }
}

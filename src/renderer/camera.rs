//! Orbit camera around the foil
//!
//! Drag rotates, wheel zooms, both eased out with damping.

use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Where the camera starts, looking at the origin
pub const CAMERA_START: Vec3 = Vec3::new(-38.0, 18.0, 28.0);
/// Vertical field of view (degrees)
pub const CAMERA_FOV_DEG: f32 = 30.0;
pub const CAMERA_MIN_DISTANCE: f32 = 15.0;
pub const CAMERA_MAX_DISTANCE: f32 = 75.0;
pub const CAMERA_DAMPING: f32 = 0.1;

const NEAR: f32 = 0.1;
const FAR: f32 = 500.0;
/// Keep away from the poles so the up vector stays valid
const MAX_PITCH: f32 = FRAC_PI_2 - 0.01;
const ZOOM_SENSITIVITY: f32 = 0.001;

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    /// Angle around the Y axis (radians)
    pub yaw: f32,
    /// Elevation above the XZ plane (radians)
    pub pitch: f32,
    pub distance: f32,
    /// Vertical field of view (radians)
    pub fov_y: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub damping: f32,
    yaw_delta: f32,
    pitch_delta: f32,
    zoom_delta: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_position(CAMERA_START, Vec3::ZERO)
    }
}

impl OrbitCamera {
    /// Build a camera at `eye` orbiting `target`
    pub fn from_position(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(f32::EPSILON);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.z.atan2(offset.x);

        Self {
            target,
            yaw,
            pitch: pitch.clamp(-MAX_PITCH, MAX_PITCH),
            distance: distance.clamp(CAMERA_MIN_DISTANCE, CAMERA_MAX_DISTANCE),
            fov_y: CAMERA_FOV_DEG.to_radians(),
            min_distance: CAMERA_MIN_DISTANCE,
            max_distance: CAMERA_MAX_DISTANCE,
            damping: CAMERA_DAMPING,
            yaw_delta: 0.0,
            pitch_delta: 0.0,
            zoom_delta: 0.0,
        }
    }

    /// Queue a rotation from a pointer drag of (dx, dy) pixels
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.yaw_delta += TAU * dx / height;
        self.pitch_delta += TAU * dy / height;
    }

    /// Queue a zoom from a wheel delta (positive = away)
    pub fn zoom(&mut self, wheel_delta: f32) {
        self.zoom_delta += (wheel_delta * ZOOM_SENSITIVITY).clamp(-0.5, 0.5);
    }

    /// Apply a share of the queued motion and let the rest decay
    pub fn update(&mut self) {
        self.yaw += self.yaw_delta * self.damping;
        self.pitch = (self.pitch + self.pitch_delta * self.damping).clamp(-MAX_PITCH, MAX_PITCH);
        self.distance = (self.distance * (1.0 + self.zoom_delta * self.damping))
            .clamp(self.min_distance, self.max_distance);

        let decay = 1.0 - self.damping;
        self.yaw_delta *= decay;
        self.pitch_delta *= decay;
        self.zoom_delta *= decay;
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        self.target + Vec3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw) * self.distance
    }

    /// (forward, right, up) unit vectors
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = (self.target - self.eye()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        (forward, right, up)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y, aspect.max(0.01), NEAR, FAR);
        let view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Y);
        proj * view
    }

    /// Project a world point to pixel coordinates (origin top-left).
    /// Returns None when the point is behind the camera or clipped.
    pub fn project(&self, world: Vec3, size: (f32, f32)) -> Option<Vec2> {
        let (w, h) = size;
        if w <= 0.0 || h <= 0.0 {
            return None;
        }
        let clip = self.view_proj(w / h) * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !(0.0..=1.0).contains(&ndc.z) {
            return None;
        }
        Some(Vec2::new(
            (ndc.x * 0.5 + 0.5) * w,
            (0.5 - ndc.y * 0.5) * h,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_lab_position() {
        let cam = OrbitCamera::default();
        assert!((cam.eye() - CAMERA_START).length() < 1e-3);
        assert!((cam.distance - CAMERA_START.length()).abs() < 1e-3);
    }

    #[test]
    fn test_target_projects_to_centre() {
        let cam = OrbitCamera::default();
        let p = cam.project(Vec3::ZERO, (800.0, 600.0)).unwrap();
        assert!((p.x - 400.0).abs() < 0.5);
        assert!((p.y - 300.0).abs() < 0.5);

        // Points above the target land above the centre
        let above = cam.project(Vec3::new(0.0, 5.0, 0.0), (800.0, 600.0)).unwrap();
        assert!(above.y < 300.0);
    }

    #[test]
    fn test_behind_camera_is_hidden() {
        let cam = OrbitCamera::default();
        let behind = cam.eye() + (cam.eye() - cam.target);
        assert!(cam.project(behind, (800.0, 600.0)).is_none());
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut cam = OrbitCamera::default();
        for _ in 0..500 {
            cam.zoom(-1000.0);
            cam.update();
        }
        assert!((cam.distance - CAMERA_MIN_DISTANCE).abs() < 1e-4);

        for _ in 0..500 {
            cam.zoom(1000.0);
            cam.update();
        }
        assert!((cam.distance - CAMERA_MAX_DISTANCE).abs() < 1e-4);
    }

    #[test]
    fn test_rotation_eases_out() {
        let mut cam = OrbitCamera::default();
        let yaw0 = cam.yaw;
        cam.rotate(100.0, 0.0, 600.0);
        cam.update();
        let first_step = cam.yaw - yaw0;
        let yaw1 = cam.yaw;
        cam.update();
        let second_step = cam.yaw - yaw1;
        assert!(first_step > 0.0);
        assert!(second_step < first_step);

        for _ in 0..2000 {
            cam.update();
        }
        let total = TAU * 100.0 / 600.0;
        assert!((cam.yaw - yaw0 - total).abs() < 1e-3);
    }

    #[test]
    fn test_pitch_never_reaches_pole() {
        let mut cam = OrbitCamera::default();
        for _ in 0..100 {
            cam.rotate(0.0, 5000.0, 600.0);
            cam.update();
        }
        assert!(cam.pitch <= MAX_PITCH);
        let (_, right, _) = cam.basis();
        assert!(right.length() > 0.9);
    }
}

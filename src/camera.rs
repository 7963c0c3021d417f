//! Orbit camera and billboard basis extraction.
//!
//! The camera orbits a target point; demos drive `yaw`, `pitch` and
//! `distance` from mouse input. Billboarding needs the camera's right and up
//! axes in world space, and those fall straight out of the view matrix: its
//! rotation rows are the camera axes expressed in world coordinates.

use glam::{Mat4, Vec3};

/// Pitch clamp just short of straight up/down, keeping the look-at basis
/// well defined.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// An orbit camera around a target point.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// Orbit angle around Y, radians.
    pub yaw: f32,
    /// Elevation angle, radians. Clamped to just short of the poles.
    pub pitch: f32,
    /// Distance from the target, world units.
    pub distance: f32,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Vertical field of view, radians.
    pub fov_y: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.3,
            distance: 3.0,
            target: Vec3::ZERO,
            fov_y: std::f32::consts::FRAC_PI_4,
        }
    }

    /// Applies a mouse-drag style orbit delta, clamping the pitch.
    pub fn orbit(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Applies a scroll-wheel style zoom delta.
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).clamp(0.3, 50.0);
    }

    /// Camera position in world space.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect.max(1e-3), 0.1, 100.0)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// World-space `(right, up)` axes for camera-facing quads.
    ///
    /// With `constrain_y` the up axis is pinned to world Y and right is the
    /// camera right flattened onto the ground plane, so quads spin only
    /// around the vertical. Looking straight down makes that projection
    /// degenerate; world X stands in.
    pub fn billboard_axes(&self, constrain_y: bool) -> (Vec3, Vec3) {
        let view = self.view_matrix();
        let right = view.row(0).truncate();
        if constrain_y {
            let flat = Vec3::new(right.x, 0.0, right.z);
            let right = if flat.length_squared() > 1e-6 {
                flat.normalize()
            } else {
                Vec3::X
            };
            (right, Vec3::Y)
        } else {
            (right, view.row(1).truncate())
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

// ===== TESTS =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_orbits_target() {
        let mut camera = Camera::new();
        camera.pitch = 0.0;
        camera.distance = 2.0;
        camera.target = Vec3::new(1.0, 0.0, 0.0);
        // Yaw 0, pitch 0 puts the camera straight down +Z from the target.
        assert!((camera.position() - Vec3::new(1.0, 0.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn test_billboard_axes_face_the_camera() {
        let mut camera = Camera::new();
        camera.pitch = 0.0;
        // Camera on +Z looking at the origin: right is +X, up is +Y.
        let (right, up) = camera.billboard_axes(false);
        assert!((right - Vec3::X).length() < 1e-5);
        assert!((up - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_billboard_axes_are_orthonormal() {
        let mut camera = Camera::new();
        camera.yaw = 1.1;
        camera.pitch = -0.7;
        let (right, up) = camera.billboard_axes(false);
        assert!((right.length() - 1.0).abs() < 1e-4);
        assert!((up.length() - 1.0).abs() < 1e-4);
        assert!(right.dot(up).abs() < 1e-4);
    }

    #[test]
    fn test_constrained_axes_pin_up_to_world_y() {
        let mut camera = Camera::new();
        camera.yaw = 0.8;
        camera.pitch = 1.2;
        let (right, up) = camera.billboard_axes(true);
        assert_eq!(up, Vec3::Y);
        assert!(right.y.abs() < 1e-6);
        assert!((right.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_pitch_clamps_at_poles() {
        let mut camera = Camera::new();
        camera.orbit(0.0, 10.0);
        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);
        camera.orbit(0.0, -20.0);
        assert!(camera.pitch > -std::f32::consts::FRAC_PI_2);
    }
}

/// Orbit camera state driven by mouse drags and wheel steps
use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::projection::{Camera, CameraSettings};
use crate::vector::{MathError, Vec3f};

/// Radians of rotation per pixel of drag
pub const DRAG_SENSITIVITY: f32 = 0.005;
/// Keeps theta away from the poles where the up vector degenerates
pub const POLAR_EPSILON: f32 = 0.01;
/// Radius change per wheel step
pub const ZOOM_STEP: f32 = 0.1;
pub const MIN_RADIUS: f32 = 0.3;
pub const MAX_RADIUS: f32 = 50.0;

/// World up axis used by the orbit camera
pub fn world_up() -> Vec3f {
    Vec3f::new(0.0, 1.0, 0.0)
}

/// Spherical coordinates of the eye around the target.
///
/// `phi` is the azimuth in the xz-plane, `theta` the polar angle from +y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitState {
    pub phi: f32,
    pub theta: f32,
    pub radius: f32,
}

impl OrbitState {
    pub fn new(phi: f32, theta: f32, radius: f32) -> Self {
        Self {
            phi,
            theta: theta.clamp(POLAR_EPSILON, PI - POLAR_EPSILON),
            radius: radius.clamp(MIN_RADIUS, MAX_RADIUS),
        }
    }

    /// Apply a drag of `dx`, `dy` pixels
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.phi += dx * DRAG_SENSITIVITY;
        self.theta = (self.theta - dy * DRAG_SENSITIVITY).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
    }

    /// Apply `steps` wheel notches; positive moves closer
    pub fn zoom(&mut self, steps: f32) {
        self.radius = (self.radius - steps * ZOOM_STEP).clamp(MIN_RADIUS, MAX_RADIUS);
    }

    pub fn eye(&self, target: &Vec3f) -> Vec3f {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        *target + Vec3f::new(cos_phi * sin_theta, cos_theta, sin_phi * sin_theta) * self.radius
    }

    /// Build this frame's camera looking at `target`
    pub fn camera(&self, target: Vec3f, settings: &CameraSettings) -> Result<Camera, MathError> {
        Camera::new(self.eye(&target), target, world_up(), settings)
    }
}

impl Default for OrbitState {
    fn default() -> Self {
        Self {
            phi: 1.5,
            theta: 1.5,
            radius: 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_upward_drags_clamp_theta() {
        let mut orbit = OrbitState::default();
        for _ in 0..1000 {
            orbit.drag(0.0, -10.0);
        }
        assert_eq!(orbit.theta, PI - POLAR_EPSILON);

        for _ in 0..1000 {
            orbit.drag(0.0, 10.0);
        }
        assert_eq!(orbit.theta, POLAR_EPSILON);
    }

    #[test]
    fn test_horizontal_drag_turns_phi() {
        let mut orbit = OrbitState::new(0.0, 1.0, 2.0);
        orbit.drag(100.0, 0.0);
        assert_relative_eq!(orbit.phi, 0.5, epsilon = 1e-6);
        assert_relative_eq!(orbit.theta, 1.0);
    }

    #[test]
    fn test_zoom_clamps_radius() {
        let mut orbit = OrbitState::default();
        orbit.zoom(1.0);
        assert_relative_eq!(orbit.radius, 2.9, epsilon = 1e-6);
        orbit.zoom(1000.0);
        assert_eq!(orbit.radius, MIN_RADIUS);
        orbit.zoom(-1000.0);
        assert_eq!(orbit.radius, MAX_RADIUS);
    }

    #[test]
    fn test_eye_sits_on_sphere() {
        let orbit = OrbitState::new(0.7, 1.1, 4.0);
        let target = Vec3f::new(1.0, -2.0, 0.5);
        assert_relative_eq!((orbit.eye(&target) - target).norm(), 4.0, epsilon = 1e-5);

        // phi = 0, theta = pi/2 looks from +x
        let side = OrbitState::new(0.0, PI / 2.0, 2.0).eye(&Vec3f::zeros());
        assert_relative_eq!(side.x(), 2.0, epsilon = 1e-6);
        assert_relative_eq!(side.y(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_camera_looks_at_target() {
        let orbit = OrbitState::default();
        let camera = orbit.camera(Vec3f::zeros(), &CameraSettings::default()).unwrap();
        let to_target = (camera.target() - camera.eye()).normalized().unwrap();
        assert_relative_eq!(camera.forward().dot(&to_target), 1.0, epsilon = 1e-6);
    }
}

/// Flat per-triangle shading and back-face gate
use serde::{Deserialize, Serialize};

use crate::buffer::Rgba;
use crate::geometry::Triangle;
use crate::projection::Camera;
use crate::vector::{MathError, Vec3f};

/// Where the single directional light comes from
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightMode {
    /// Shine along the viewing direction, from the eye into the scene
    #[default]
    Headlight,
    /// Fixed world-space direction the light travels in
    Fixed([f32; 3]),
}

/// A normalized light direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    direction: Vec3f,
}

impl Light {
    pub fn new(direction: Vec3f) -> Result<Self, MathError> {
        Ok(Self {
            direction: direction.normalized()?,
        })
    }

    pub fn headlight(camera: &Camera) -> Self {
        // forward() is already unit length
        Self {
            direction: camera.forward(),
        }
    }

    pub fn from_mode(mode: &LightMode, camera: &Camera) -> Result<Self, MathError> {
        match mode {
            LightMode::Headlight => Ok(Self::headlight(camera)),
            LightMode::Fixed(direction) => Self::new(Vec3f::from(*direction)),
        }
    }

    pub fn direction(&self) -> Vec3f {
        self.direction
    }

    /// Lambert term of the triangle's face normal.
    ///
    /// `None` when the triangle has no area and so no normal.
    pub fn intensity(&self, triangle: &Triangle) -> Option<f32> {
        let normal = triangle.normal().normalized().ok()?;
        Some(normal.dot(&self.direction))
    }
}

/// Gray fill color for `intensity`, or `None` when the face looks away
pub fn shade(intensity: f32) -> Option<Rgba> {
    if intensity <= 0.0 {
        return None;
    }
    let level = (intensity.min(1.0) * 255.0) as u8;
    Some(Rgba::gray(level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::CameraSettings;
    use approx::assert_relative_eq;

    // Counter-clockwise seen from +z
    fn facing_plus_z() -> Triangle {
        Triangle::new(
            Vec3f::new(0.0, 0.0, 0.0),
            Vec3f::new(1.0, 0.0, 0.0),
            Vec3f::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_light_into_screen_lights_front_faces() {
        let light = Light::new(Vec3f::new(0.0, 0.0, -1.0)).unwrap();
        assert_relative_eq!(light.intensity(&facing_plus_z()).unwrap(), 1.0);

        let [a, b, c] = facing_plus_z().vertices;
        let back = Triangle::new(a, c, b);
        assert_relative_eq!(light.intensity(&back).unwrap(), -1.0);
    }

    #[test]
    fn test_headlight_follows_camera() {
        let camera = Camera::new(
            Vec3f::new(0.0, 0.0, 3.0),
            Vec3f::zeros(),
            Vec3f::new(0.0, 1.0, 0.0),
            &CameraSettings::default(),
        )
        .unwrap();
        let light = Light::from_mode(&LightMode::Headlight, &camera).unwrap();
        assert_relative_eq!(light.direction().z(), -1.0, epsilon = 1e-6);
        assert!(light.intensity(&facing_plus_z()).unwrap() > 0.99);
    }

    #[test]
    fn test_fixed_light_is_normalized() {
        let camera = Camera::new(
            Vec3f::new(0.0, 0.0, 3.0),
            Vec3f::zeros(),
            Vec3f::new(0.0, 1.0, 0.0),
            &CameraSettings::default(),
        )
        .unwrap();
        let light = Light::from_mode(&LightMode::Fixed([0.0, 0.0, -4.0]), &camera).unwrap();
        assert_relative_eq!(light.direction().norm(), 1.0);
        assert!(Light::from_mode(&LightMode::Fixed([0.0; 3]), &camera).is_err());
    }

    #[test]
    fn test_degenerate_triangle_has_no_intensity() {
        let light = Light::new(Vec3f::new(0.0, 0.0, -1.0)).unwrap();
        let sliver = Triangle::new(
            Vec3f::zeros(),
            Vec3f::new(1.0, 1.0, 1.0),
            Vec3f::new(2.0, 2.0, 2.0),
        );
        assert_eq!(light.intensity(&sliver), None);
    }

    #[test]
    fn test_shade_culls_and_scales() {
        assert_eq!(shade(0.0), None);
        assert_eq!(shade(-0.3), None);
        assert_eq!(shade(1.0), Some(Rgba::gray(255)));
        assert_eq!(shade(0.5), Some(Rgba::gray(127)));
    }
}

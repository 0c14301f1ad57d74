/// Camera transform chain: model → view → projection → screen
use serde::{Deserialize, Serialize};

use crate::matrix::Mat4;
use crate::vector::{MathError, Vec3f, Vec4f};

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

/// Viewport and lens parameters the camera matrices are built from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub width: u32,
    pub height: u32,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Screen depth assigned to the near plane; the far plane maps to 0
    pub depth_resolution: f32,
    pub mode: ProjectionMode,
}

impl CameraSettings {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Focal length `f = 1 / tan(fov / 2)`
    pub fn focal_length(&self) -> f32 {
        1.0 / (self.fov_degrees.to_radians() / 2.0).tan()
    }

    /// Copy with near/far planes hugging a sphere of `extent` radius seen
    /// from `distance`, so the depth range is spent on the model.
    pub fn fit_depth(&self, distance: f32, extent: f32) -> Self {
        let near = (distance - extent).max(self.near.min(0.05));
        let far = (distance + extent).max(near * 2.0);
        Self { near, far, ..*self }
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            depth_resolution: 255.0,
            mode: ProjectionMode::Perspective,
        }
    }
}

/// Pixel coordinates plus the integer depth used by the depth test.
///
/// Row 0 is the bottom row of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
    pub depth: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32, depth: i32) -> Self {
        Self { x, y, depth }
    }
}

/// A look-at camera with its view, perspective and screen matrices
#[derive(Debug, Clone)]
pub struct Camera {
    eye: Vec3f,
    target: Vec3f,
    up: Vec3f,
    x_axis: Vec3f,
    y_axis: Vec3f,
    z_axis: Vec3f,
    view: Mat4,
    perspective: Mat4,
    screen: Mat4,
    view_perspective: Mat4,
}

impl Camera {
    /// Build the camera basis and matrices.
    ///
    /// Fails when `eye == target` or `up` is parallel to the viewing axis,
    /// since the basis cannot be normalized.
    pub fn new(
        eye: Vec3f,
        target: Vec3f,
        up: Vec3f,
        settings: &CameraSettings,
    ) -> Result<Self, MathError> {
        let z_axis = (eye - target).normalized()?;
        let x_axis = up.cross(&z_axis).normalized()?;
        let y_axis = z_axis.cross(&x_axis).normalized()?;

        let view = Mat4::from_rows([
            [x_axis.x(), x_axis.y(), x_axis.z(), -x_axis.dot(&eye)],
            [y_axis.x(), y_axis.y(), y_axis.z(), -y_axis.dot(&eye)],
            [z_axis.x(), z_axis.y(), z_axis.z(), -z_axis.dot(&eye)],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let perspective = match settings.mode {
            ProjectionMode::Perspective => perspective_matrix(settings),
            ProjectionMode::Orthographic => orthographic_matrix(settings, (eye - target).norm()),
        };
        let screen = screen_matrix(settings);

        Ok(Self {
            eye,
            target,
            up,
            x_axis,
            y_axis,
            z_axis,
            view,
            perspective,
            screen,
            view_perspective: perspective * view,
        })
    }

    pub fn eye(&self) -> Vec3f {
        self.eye
    }

    pub fn target(&self) -> Vec3f {
        self.target
    }

    pub fn up(&self) -> Vec3f {
        self.up
    }

    pub fn x_axis(&self) -> Vec3f {
        self.x_axis
    }

    pub fn y_axis(&self) -> Vec3f {
        self.y_axis
    }

    /// Unit vector from the target towards the eye
    pub fn z_axis(&self) -> Vec3f {
        self.z_axis
    }

    /// Unit viewing direction, from the eye towards the target
    pub fn forward(&self) -> Vec3f {
        -self.z_axis
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view
    }

    pub fn perspective_matrix(&self) -> &Mat4 {
        &self.perspective
    }

    pub fn screen_matrix(&self) -> &Mat4 {
        &self.screen
    }

    /// Homogeneous clip-space point, before the perspective divide
    pub fn clip(&self, point: &Vec3f) -> Vec4f {
        self.view_perspective * point.extend(1.0)
    }

    /// View and perspective transforms followed by the divide by `w`.
    ///
    /// A point with `w == 0` (on the eye plane) is returned undivided.
    pub fn view_persp(&self, point: &Vec3f) -> Vec3f {
        let p = self.clip(point);
        if p.w() != 0.0 {
            p.truncate() / p.w()
        } else {
            p.truncate()
        }
    }

    /// Map a normalized device point to pixel coordinates and depth
    pub fn screen(&self, ndc: &Vec3f) -> ScreenPoint {
        let p = self.screen * ndc.extend(1.0);
        ScreenPoint {
            x: p.x().floor() as i32,
            y: p.y().floor() as i32,
            depth: p.z().floor() as i32,
        }
    }

    /// Full model-to-screen transform, `None` for points at or behind the
    /// eye plane where the divide would mirror them.
    pub fn project(&self, point: &Vec3f) -> Option<ScreenPoint> {
        let clip = self.clip(point);
        if clip.w() <= 0.0 {
            return None;
        }
        Some(self.screen(&(clip.truncate() / clip.w())))
    }
}

fn perspective_matrix(settings: &CameraSettings) -> Mat4 {
    let f = settings.focal_length();
    let (near, far) = (settings.near, settings.far);
    Mat4::from_rows([
        [f / settings.aspect(), 0.0, 0.0, 0.0],
        [0.0, f, 0.0, 0.0],
        [0.0, 0.0, (far + near) / (near - far), 2.0 * far * near / (near - far)],
        [0.0, 0.0, -1.0, 0.0],
    ])
}

fn orthographic_matrix(settings: &CameraSettings, distance: f32) -> Mat4 {
    let half_height = distance * (settings.fov_degrees.to_radians() / 2.0).tan();
    let half_width = half_height * settings.aspect();
    let (near, far) = (settings.near, settings.far);
    Mat4::from_rows([
        [1.0 / half_width, 0.0, 0.0, 0.0],
        [0.0, 1.0 / half_height, 0.0, 0.0],
        [0.0, 0.0, -2.0 / (far - near), -(far + near) / (far - near)],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

// NDC [-1, 1]² → [0, width] × [0, height]; depth -1 (near) → resolution, +1 (far) → 0
fn screen_matrix(settings: &CameraSettings) -> Mat4 {
    let (w, h) = (settings.width as f32, settings.height as f32);
    let d = settings.depth_resolution;
    Mat4::from_rows([
        [w / 2.0, 0.0, 0.0, w / 2.0],
        [0.0, h / 2.0, 0.0, h / 2.0],
        [0.0, 0.0, -d / 2.0, d / 2.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn up() -> Vec3f {
        Vec3f::new(0.0, 1.0, 0.0)
    }

    fn front_camera(settings: &CameraSettings) -> Camera {
        Camera::new(Vec3f::new(0.0, 0.0, 3.0), Vec3f::zeros(), up(), settings).unwrap()
    }

    #[test]
    fn test_camera_basis_is_orthonormal() {
        let camera = Camera::new(
            Vec3f::new(2.0, 1.5, -3.0),
            Vec3f::new(0.5, 0.0, 0.0),
            up(),
            &CameraSettings::default(),
        )
        .unwrap();
        let (x, y, z) = (camera.x_axis(), camera.y_axis(), camera.z_axis());
        for axis in [x, y, z] {
            assert_relative_eq!(axis.norm(), 1.0, epsilon = 1e-6);
        }
        assert_relative_eq!(x.dot(&y), 0.0, epsilon = 1e-6);
        assert_relative_eq!(y.dot(&z), 0.0, epsilon = 1e-6);
        assert_relative_eq!(z.dot(&x), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_view_matrix_moves_eye_to_origin() {
        let camera = front_camera(&CameraSettings::default());
        let eye = *camera.view_matrix() * camera.eye().extend(1.0);
        assert_relative_eq!(eye.truncate().norm(), 0.0, epsilon = 1e-6);
        // the target lies straight down -z in camera space
        let target = *camera.view_matrix() * Vec3f::zeros().extend(1.0);
        assert_relative_eq!(target.z(), -3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_origin_projects_to_screen_center() {
        let settings = CameraSettings::new(800, 600);
        let camera = front_camera(&settings);
        let p = camera.project(&Vec3f::zeros()).unwrap();
        assert_eq!((p.x, p.y), (400, 300));
        assert_eq!(camera.screen(&camera.view_persp(&Vec3f::zeros())), p);
    }

    #[test]
    fn test_nearer_points_get_larger_depth() {
        let settings = CameraSettings::default().fit_depth(3.0, 1.0);
        let camera = front_camera(&settings);
        let near = camera.project(&Vec3f::new(0.0, 0.0, 0.9)).unwrap();
        let far = camera.project(&Vec3f::new(0.0, 0.0, -0.9)).unwrap();
        assert!(near.depth > far.depth);
        assert!((0..=255).contains(&near.depth));
        assert!((0..=255).contains(&far.depth));
    }

    #[test]
    fn test_near_and_far_planes_map_to_depth_range() {
        let settings = CameraSettings::default();
        let camera = front_camera(&settings);
        let on_near = camera.view_persp(&Vec3f::new(0.0, 0.0, 3.0 - settings.near));
        let on_far = camera.view_persp(&Vec3f::new(0.0, 0.0, 3.0 - settings.far));
        assert_relative_eq!(on_near.z(), -1.0, epsilon = 1e-4);
        assert_relative_eq!(on_far.z(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_perspective_shrinks_distant_offsets() {
        let camera = front_camera(&CameraSettings::default());
        let close = camera.view_persp(&Vec3f::new(1.0, 0.0, 1.0));
        let distant = camera.view_persp(&Vec3f::new(1.0, 0.0, -5.0));
        assert!(close.x() > distant.x());
        assert!(distant.x() > 0.0);
    }

    #[test]
    fn test_points_behind_eye_are_not_projected() {
        let camera = front_camera(&CameraSettings::default());
        assert!(camera.project(&Vec3f::new(0.0, 0.0, 5.0)).is_none());
        assert!(camera.project(&Vec3f::new(0.0, 0.0, 3.0)).is_none());
    }

    #[test]
    fn test_orthographic_ignores_distance() {
        let settings = CameraSettings {
            mode: ProjectionMode::Orthographic,
            ..CameraSettings::default()
        };
        let camera = front_camera(&settings);
        let close = camera.view_persp(&Vec3f::new(0.5, 0.0, 1.0));
        let distant = camera.view_persp(&Vec3f::new(0.5, 0.0, -5.0));
        assert_relative_eq!(close.x(), distant.x(), epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_basis_fails() {
        let settings = CameraSettings::default();
        assert_eq!(
            Camera::new(Vec3f::zeros(), Vec3f::zeros(), up(), &settings).unwrap_err(),
            MathError::DivisionByZero
        );
        assert!(Camera::new(Vec3f::new(0.0, 5.0, 0.0), Vec3f::zeros(), up(), &settings).is_err());
    }

    #[test]
    fn test_aspect_and_focal_length() {
        let settings = CameraSettings::new(320, 200);
        assert_relative_eq!(settings.aspect(), 1.6);
        assert_relative_eq!(
            settings.focal_length(),
            1.0 / (22.5f32).to_radians().tan(),
            epsilon = 1e-5
        );
    }
}

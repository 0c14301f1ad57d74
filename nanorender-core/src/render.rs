/// Frame pipeline: mesh → camera → lighting → rasterizer
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buffer::{ColorBuffer, FrameBuffers, Rgba};
use crate::geometry::{Mesh, Triangle};
use crate::lighting::{shade, Light, LightMode};
use crate::projection::{Camera, ScreenPoint};
use crate::raster::{draw_line, fill_triangle};
use crate::vector::MathError;

/// Errors that abort a frame
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("numeric fault while rendering: {0}")]
    Math(#[from] MathError),
}

/// Per-frame drawing options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub light: LightMode,
    pub background: Rgba,
    /// Overlay triangle edges in this color
    pub wireframe: Option<Rgba>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            light: LightMode::Headlight,
            background: Rgba::BLACK,
            wireframe: None,
        }
    }
}

/// What happened to the triangles of one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub triangles: usize,
    /// Handed to the rasterizer
    pub drawn: usize,
    /// Facing away from the light
    pub culled: usize,
    /// Zero-area in model space, or touching the eye plane
    pub skipped: usize,
    /// Pixels won by the depth test
    pub pixels: usize,
}

/// Owns the frame buffers and draws meshes into them
#[derive(Debug, Clone)]
pub struct RenderContext {
    frame: FrameBuffers,
    options: RenderOptions,
}

impl RenderContext {
    pub fn new(width: usize, height: usize, options: RenderOptions) -> Self {
        Self {
            frame: FrameBuffers::new(width, height, options.background),
            options,
        }
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn frame(&self) -> &FrameBuffers {
        &self.frame
    }

    pub fn color(&self) -> &ColorBuffer {
        self.frame.color()
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: RenderOptions) {
        self.frame.set_background(options.background);
        self.options = options;
    }

    pub fn toggle_wireframe(&mut self, color: Rgba) {
        self.options.wireframe = match self.options.wireframe {
            Some(_) => None,
            None => Some(color),
        };
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.frame.resize(width, height);
    }

    /// Clear the buffers and draw `mesh` as seen by `camera`
    pub fn render(&mut self, mesh: &Mesh, camera: &Camera) -> Result<FrameStats, RenderError> {
        self.frame.clear();
        let light = Light::from_mode(&self.options.light, camera)?;

        let mut stats = FrameStats {
            triangles: mesh.triangles().len(),
            ..FrameStats::default()
        };
        for triangle in mesh.triangles() {
            let Some(intensity) = light.intensity(triangle) else {
                stats.skipped += 1;
                continue;
            };
            let Some(color) = shade(intensity) else {
                stats.culled += 1;
                continue;
            };
            let Some(points) = project_triangle(camera, triangle) else {
                stats.skipped += 1;
                continue;
            };
            stats.drawn += 1;
            stats.pixels += fill_triangle(&mut self.frame, points, color);
        }

        if let Some(wire) = self.options.wireframe {
            for [a, b, c] in mesh.triangles().iter().filter_map(|t| project_triangle(camera, t)) {
                draw_line(&mut self.frame, a, b, wire);
                draw_line(&mut self.frame, b, c, wire);
                draw_line(&mut self.frame, c, a, wire);
            }
        }

        log::debug!(
            "frame {}x{}: {} triangles, {} drawn, {} culled, {} skipped, {} pixels",
            self.width(),
            self.height(),
            stats.triangles,
            stats.drawn,
            stats.culled,
            stats.skipped,
            stats.pixels
        );
        Ok(stats)
    }
}

fn project_triangle(camera: &Camera, triangle: &Triangle) -> Option<[ScreenPoint; 3]> {
    let [a, b, c] = triangle.vertices;
    Some([camera.project(&a)?, camera.project(&b)?, camera.project(&c)?])
}

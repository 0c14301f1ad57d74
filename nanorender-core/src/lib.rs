/// nanorender core library - software rasterization of triangle meshes
///
/// Fixed-size vector and matrix algebra, a look-at camera with
/// perspective and screen transforms, a depth-buffered triangle
/// rasterizer, and the mesh loaders and image export around them.

pub mod assets;
pub mod buffer;
pub mod export;
pub mod geometry;
pub mod lighting;
pub mod matrix;
pub mod obj;
pub mod orbit;
pub mod projection;
pub mod raster;
pub mod render;
pub mod stl;
pub mod vector;

// Re-export commonly used types
pub use buffer::{ColorBuffer, DepthBuffer, FrameBuffers, Rgba};
pub use geometry::{Bounds, Mesh, MeshError, MeshLoad, Triangle};
pub use lighting::{Light, LightMode};
pub use matrix::{Mat3, Mat4, Matrix};
pub use orbit::OrbitState;
pub use projection::{Camera, CameraSettings, ProjectionMode, ScreenPoint};
pub use render::{FrameStats, RenderContext, RenderError, RenderOptions};
pub use vector::{MathError, Vec2f, Vec3f, Vec4f, Vector};

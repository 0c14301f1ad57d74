/// Mesh model: vertex positions, polygon faces and the derived triangle list
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::vector::Vec3f;
use crate::{obj, stl};

/// Errors produced while building or loading a mesh
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("malformed mesh data: {0}")]
    Malformed(String),
    #[error("face {face} references vertex {index} but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: usize,
        vertex_count: usize,
    },
    #[error("face {face} has {count} vertices, at least 3 are required")]
    FaceTooSmall { face: usize, count: usize },
    #[error("unsupported mesh format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Three model-space positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Vec3f; 3],
}

impl Triangle {
    pub fn new(v0: Vec3f, v1: Vec3f, v2: Vec3f) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Unnormalized geometric normal `(v2 - v0) × (v1 - v0)`.
    ///
    /// Counter-clockwise faces (seen from outside) point this normal inward,
    /// so it lines up with a light shining from the viewer into the scene.
    pub fn normal(&self) -> Vec3f {
        let [v0, v1, v2] = self.vertices;
        (v2 - v0).cross(&(v1 - v0))
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3f,
    pub max: Vec3f,
}

impl Bounds {
    pub fn center(&self) -> Vec3f {
        self.min.lerp(&self.max, 0.5)
    }

    pub fn size(&self) -> Vec3f {
        self.max - self.min
    }

    /// Radius of the sphere around `center` that encloses the box
    pub fn radius(&self) -> f32 {
        self.size().norm() * 0.5
    }
}

/// An immutable polygon mesh.
///
/// Faces hold 0-based vertex indices. A face with more than three indices
/// is a flat fan and contributes one triangle per fan segment.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: Vec<Vec3f>,
    faces: Vec<Vec<usize>>,
    triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vec3f>, faces: Vec<Vec<usize>>) -> Result<Self, MeshError> {
        for (face_index, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(MeshError::FaceTooSmall {
                    face: face_index,
                    count: face.len(),
                });
            }
            if let Some(&index) = face.iter().find(|&&i| i >= vertices.len()) {
                return Err(MeshError::IndexOutOfRange {
                    face: face_index,
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }
        Ok(Self::assemble(vertices, faces))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a mesh from free-standing triangles, one face per triangle
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        let vertices = triangles.iter().flat_map(|t| t.vertices).collect();
        let faces = (0..triangles.len())
            .map(|i| vec![3 * i, 3 * i + 1, 3 * i + 2])
            .collect();
        Self {
            vertices,
            faces,
            triangles,
        }
    }

    // Indices must already be validated.
    fn assemble(vertices: Vec<Vec3f>, faces: Vec<Vec<usize>>) -> Self {
        let triangles = faces
            .iter()
            .flat_map(|face| {
                let vertices = &vertices;
                face.windows(2).skip(1).map(move |pair| {
                    Triangle::new(vertices[face[0]], vertices[pair[0]], vertices[pair[1]])
                })
            })
            .collect();
        Self {
            vertices,
            faces,
            triangles,
        }
    }

    pub fn vertices(&self) -> &[Vec3f] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold(
            Bounds {
                min: first,
                max: first,
            },
            |b, &v| Bounds {
                min: b.min.component_min(v),
                max: b.max.component_max(v),
            },
        ))
    }

    /// Copy recentred on the origin and scaled so the largest coordinate
    /// magnitude is 1.
    pub fn normalized(&self) -> Self {
        let Some(bounds) = self.bounds() else {
            return self.clone();
        };
        let center = bounds.center();
        let extent = self
            .vertices
            .iter()
            .fold(0.0f32, |acc, &v| acc.max((v - center).max_abs()));
        if extent == 0.0 {
            return self.clone();
        }
        let vertices = self.vertices.iter().map(|&v| (v - center) / extent).collect();
        Self::assemble(vertices, self.faces.clone())
    }

    /// Axis-aligned cube centred on the origin, 12 outward-wound triangles
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let vertices = vec![
            Vec3f::new(-h, -h, -h),
            Vec3f::new(h, -h, -h),
            Vec3f::new(h, h, -h),
            Vec3f::new(-h, h, -h),
            Vec3f::new(-h, -h, h),
            Vec3f::new(h, -h, h),
            Vec3f::new(h, h, h),
            Vec3f::new(-h, h, h),
        ];
        let faces = [
            [4, 5, 6], [4, 6, 7], // front
            [0, 3, 2], [0, 2, 1], // back
            [3, 7, 6], [3, 6, 2], // top
            [0, 1, 5], [0, 5, 4], // bottom
            [1, 2, 6], [1, 6, 5], // right
            [0, 4, 7], [0, 7, 3], // left
        ];
        Self::assemble(vertices, faces.iter().map(|f| f.to_vec()).collect())
    }

    /// Load a mesh, choosing the parser from the file extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MeshError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let io_error = |source| MeshError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mesh = match extension.as_deref() {
            Some("obj") => obj::parse_obj(&fs::read_to_string(path).map_err(io_error)?)?,
            Some("stl") => stl::parse_stl(&fs::read(path).map_err(io_error)?)?,
            _ => return Err(MeshError::UnsupportedFormat(path.to_path_buf())),
        };

        log::debug!(
            "loaded {}: {} vertices, {} faces, {} triangles",
            path.display(),
            mesh.vertices.len(),
            mesh.faces.len(),
            mesh.triangles.len()
        );
        Ok(mesh)
    }

    /// Load a mesh, degrading to an empty one when the file can't be read.
    ///
    /// Only I/O failures degrade; malformed content is still an error. The
    /// I/O failure is kept on the returned [`MeshLoad`] so callers can
    /// surface it, and rendering an empty mesh simply draws nothing.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Result<MeshLoad, MeshError> {
        match Self::load(path.as_ref()) {
            Ok(mesh) => Ok(MeshLoad {
                mesh,
                degraded: None,
            }),
            Err(err @ MeshError::Io { .. }) => {
                log::warn!("can't read {}: {}; using an empty mesh", path.as_ref().display(), err);
                Ok(MeshLoad {
                    mesh: Self::empty(),
                    degraded: Some(err),
                })
            }
            Err(err) => Err(err),
        }
    }
}

/// Outcome of [`Mesh::load_or_empty`]
#[derive(Debug)]
pub struct MeshLoad {
    pub mesh: Mesh,
    pub degraded: Option<MeshError>,
}

impl MeshLoad {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangles_resolve_face_indices() {
        let vertices = vec![
            Vec3f::new(0.0, 0.0, 0.0),
            Vec3f::new(1.0, 0.0, 0.0),
            Vec3f::new(0.0, 1.0, 0.0),
            Vec3f::new(1.0, 1.0, 0.0),
        ];
        let mesh = Mesh::new(vertices.clone(), vec![vec![0, 1, 2], vec![1, 3, 2]]).unwrap();
        assert_eq!(mesh.triangles().len(), 2);
        assert_eq!(
            mesh.triangles()[1],
            Triangle::new(vertices[1], vertices[3], vertices[2])
        );
    }

    #[test]
    fn test_polygon_faces_are_fanned() {
        let vertices = vec![
            Vec3f::new(0.0, 0.0, 0.0),
            Vec3f::new(1.0, 0.0, 0.0),
            Vec3f::new(1.0, 1.0, 0.0),
            Vec3f::new(0.0, 1.0, 0.0),
            Vec3f::new(-0.5, 0.5, 0.0),
        ];
        let mesh = Mesh::new(vertices.clone(), vec![vec![0, 1, 2, 3, 4]]).unwrap();
        let triangles = mesh.triangles();
        assert_eq!(triangles.len(), 3);
        assert_eq!(triangles[0], Triangle::new(vertices[0], vertices[1], vertices[2]));
        assert_eq!(triangles[2], Triangle::new(vertices[0], vertices[3], vertices[4]));
    }

    #[test]
    fn test_invalid_faces_are_rejected() {
        let vertices = vec![Vec3f::zeros(); 3];
        assert!(matches!(
            Mesh::new(vertices.clone(), vec![vec![0, 1, 3]]),
            Err(MeshError::IndexOutOfRange {
                face: 0,
                index: 3,
                vertex_count: 3
            })
        ));
        assert!(matches!(
            Mesh::new(vertices, vec![vec![0, 1, 2], vec![0, 1]]),
            Err(MeshError::FaceTooSmall { face: 1, count: 2 })
        ));
    }

    #[test]
    fn test_cube_normals_point_inward() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.triangles().len(), 12);
        for triangle in cube.triangles() {
            let [a, b, c] = triangle.vertices;
            let centroid = (a + b + c) / 3.0;
            assert!(triangle.normal().dot(&centroid) < 0.0);
        }
    }

    #[test]
    fn test_normalized_fits_unit_cube() {
        let vertices = vec![
            Vec3f::new(10.0, 10.0, 10.0),
            Vec3f::new(14.0, 10.0, 10.0),
            Vec3f::new(10.0, 12.0, 11.0),
        ];
        let mesh = Mesh::new(vertices, vec![vec![0, 1, 2]]).unwrap().normalized();
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.center(), Vec3f::zeros());
        assert_eq!(bounds.max.x(), 1.0);
        assert_eq!(bounds.min.x(), -1.0);
        assert_eq!(bounds.max.y(), 0.5);
        assert_eq!(mesh.triangles().len(), 1);
    }

    #[test]
    fn test_missing_file_degrades_to_empty_mesh() {
        let load = Mesh::load_or_empty("definitely/not/here.obj").unwrap();
        assert!(load.is_degraded());
        assert!(matches!(load.degraded, Some(MeshError::Io { .. })));
        assert!(load.mesh.is_empty());
        assert!(Mesh::empty().bounds().is_none());
    }

    #[test]
    fn test_malformed_file_is_an_error_not_an_empty_mesh() {
        let dir = std::env::temp_dir().join("nanorender_geometry_malformed");
        std::fs::create_dir_all(&dir).unwrap();
        let bad_index = dir.join("bad_index.obj");
        std::fs::write(&bad_index, "v 0 0 0\nv 1 0 0\nf 1 2 9\n").unwrap();
        let bad_record = dir.join("bad_record.obj");
        std::fs::write(&bad_record, "v 0 zero 0\n").unwrap();

        assert!(matches!(
            Mesh::load_or_empty(&bad_index),
            Err(MeshError::IndexOutOfRange { .. })
        ));
        assert!(matches!(Mesh::load_or_empty(&bad_record), Err(MeshError::Parse { line: 1, .. })));
        assert!(matches!(
            Mesh::load_or_empty("model.fbx"),
            Err(MeshError::UnsupportedFormat(_))
        ));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        assert!(matches!(
            Mesh::load("model.fbx"),
            Err(MeshError::UnsupportedFormat(_))
        ));
    }
}

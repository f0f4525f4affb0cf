//! Mesh data and OBJ loading
//!
//! Meshes come from OBJ files through tobj; a file that cannot be read or
//! parsed degrades to the built-in triangle so the frame keeps running
//! without the asset. Uploading to the GPU produces a [`GpuMesh`], a small
//! bundle of buffer handles plus the index count that the render walk turns
//! into draw entries.

use std::path::Path;

use cgmath::{InnerSpace, Vector3};
use log::warn;

use crate::gfx::error::GfxError;
use crate::gfx::rendering::vertex::Vertex3D;
use crate::gfx::resources::gpu::GpuResources;
use crate::gfx::resources::handles::Handle;

/// CPU-side vertex and index data for one mesh
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// The built-in fallback mesh: one triangle with red, green and blue
    /// corners facing the default camera
    pub fn triangle() -> Self {
        let normal = [0.0, 0.0, -1.0];
        let tangent = [1.0, 0.0, 0.0];
        Self {
            vertices: vec![
                Vertex3D {
                    position: [-0.5, -0.5, 1.0],
                    normal,
                    tangent,
                    uv: [0.0, 1.0],
                    color: [1.0, 0.0, 0.0, 1.0],
                },
                Vertex3D {
                    position: [0.5, -0.5, 1.0],
                    normal,
                    tangent,
                    uv: [1.0, 1.0],
                    color: [0.0, 1.0, 0.0, 1.0],
                },
                Vertex3D {
                    position: [0.0, 0.5, 1.0],
                    normal,
                    tangent,
                    uv: [0.5, 0.0],
                    color: [0.0, 0.0, 1.0, 1.0],
                },
            ],
            indices: vec![0, 1, 2],
        }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// Loads the first model of an OBJ file
///
/// Missing normals are synthesized from face geometry. Texture coordinates
/// default to zero when the file has none; vertex colors default to white.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<MeshData, GfxError> {
    let path = path.as_ref();
    let (models, _materials) =
        tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|err| GfxError::MeshLoad {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;

    let model = models.first().ok_or_else(|| GfxError::MeshLoad {
        path: path.display().to_string(),
        reason: "file contains no models".into(),
    })?;
    let mesh = &model.mesh;

    let vertex_count = mesh.positions.len() / 3;
    let has_normals = mesh.normals.len() == mesh.positions.len();
    let has_uvs = mesh.texcoords.len() / 2 == vertex_count;

    let mut vertices = Vec::with_capacity(vertex_count);
    for i in 0..vertex_count {
        vertices.push(Vertex3D {
            position: [
                mesh.positions[3 * i],
                mesh.positions[3 * i + 1],
                mesh.positions[3 * i + 2],
            ],
            normal: if has_normals {
                [
                    mesh.normals[3 * i],
                    mesh.normals[3 * i + 1],
                    mesh.normals[3 * i + 2],
                ]
            } else {
                [0.0, 0.0, 0.0]
            },
            tangent: [1.0, 0.0, 0.0],
            uv: if has_uvs {
                [mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1]]
            } else {
                [0.0, 0.0]
            },
            color: [1.0, 1.0, 1.0, 1.0],
        });
    }

    let indices = mesh.indices.clone();
    if !has_normals {
        synthesize_normals(&mut vertices, &indices);
    }

    Ok(MeshData { vertices, indices })
}

/// Loads an OBJ file, degrading to the built-in triangle on failure
pub fn load_or_fallback<P: AsRef<Path>>(path: P) -> MeshData {
    match load_obj(&path) {
        Ok(data) => data,
        Err(err) => {
            warn!("{}, using fallback triangle", err);
            MeshData::triangle()
        }
    }
}

/// Accumulates area-weighted face normals into the vertices
pub fn synthesize_normals(vertices: &mut [Vertex3D], indices: &[u32]) {
    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        let p0 = Vector3::from(vertices[i0].position);
        let p1 = Vector3::from(vertices[i1].position);
        let p2 = Vector3::from(vertices[i2].position);

        let face_normal = (p1 - p0).cross(p2 - p0);
        for index in [i0, i1, i2] {
            let n = Vector3::from(vertices[index].normal) + face_normal;
            vertices[index].normal = n.into();
        }
    }

    for vertex in vertices.iter_mut() {
        let n = Vector3::from(vertex.normal);
        if n.magnitude2() > 0.0 {
            vertex.normal = n.normalize().into();
        }
    }
}

/// Handles for one mesh's GPU buffers
#[derive(Debug, Clone, Copy)]
pub struct GpuMesh {
    pub vertex_buffer: Handle<wgpu::Buffer>,
    pub index_buffer: Handle<wgpu::Buffer>,
    pub index_count: u32,
}

impl GpuMesh {
    /// Uploads mesh data into the resource tables
    pub fn upload(
        resources: &mut GpuResources,
        device: &wgpu::Device,
        label: &str,
        data: &MeshData,
    ) -> Self {
        let vertex_buffer =
            resources.create_vertex_buffer(device, &format!("{} vertices", label), &data.vertices);
        let index_buffer =
            resources.create_index_buffer(device, &format!("{} indices", label), &data.indices);
        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.index_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_triangle_shape() {
        let triangle = MeshData::triangle();

        assert_eq!(triangle.vertices.len(), 3);
        assert_eq!(triangle.indices, vec![0, 1, 2]);
        assert_eq!(triangle.index_count(), 3);
        // Red, green, blue corners facing -z.
        assert_eq!(triangle.vertices[0].color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(triangle.vertices[1].color, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(triangle.vertices[2].color, [0.0, 0.0, 1.0, 1.0]);
        for vertex in &triangle.vertices {
            assert_eq!(vertex.normal, [0.0, 0.0, -1.0]);
        }
    }

    #[test]
    fn test_missing_file_falls_back_to_triangle() {
        let data = load_or_fallback("does/not/exist.obj");
        assert_eq!(data, MeshData::triangle());
    }

    #[test]
    fn test_load_obj_reports_missing_file() {
        assert!(matches!(
            load_obj("does/not/exist.obj"),
            Err(GfxError::MeshLoad { .. })
        ));
    }

    #[test]
    fn test_synthesized_normals_face_against_winding() {
        let mut vertices = vec![
            Vertex3D {
                position: [0.0, 0.0, 0.0],
                normal: [0.0; 3],
                tangent: [1.0, 0.0, 0.0],
                uv: [0.0; 2],
                color: [1.0; 4],
            },
            Vertex3D {
                position: [1.0, 0.0, 0.0],
                normal: [0.0; 3],
                tangent: [1.0, 0.0, 0.0],
                uv: [0.0; 2],
                color: [1.0; 4],
            },
            Vertex3D {
                position: [0.0, 1.0, 0.0],
                normal: [0.0; 3],
                tangent: [1.0, 0.0, 0.0],
                uv: [0.0; 2],
                color: [1.0; 4],
            },
        ];

        synthesize_normals(&mut vertices, &[0, 1, 2]);

        for vertex in &vertices {
            let n = Vector3::from(vertex.normal);
            assert!((n.magnitude() - 1.0).abs() < 1e-6);
            assert!(n.z > 0.99);
        }
    }
}

use crate::error::ResourceError;
use crate::figure::{IndexedMesh, Mesh, MeshPoint, RenderableMesh, Topology};
use gltf::mesh::Mode;
use gltf::Node;
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
use std::path::Path;

struct Imported<'a> {
    buffers: &'a [gltf::buffer::Data],
    points: Vec<MeshPoint>,
    indices: Vec<u32>,
}

impl<'a> Imported<'a> {
    fn visit(&mut self, node: Node, parent: &Matrix4<f32>) {
        let local = Matrix4::from(node.transform().matrix());
        let world = parent * local;
        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                if primitive.mode() != Mode::Triangles {
                    log::debug!(
                        "skipping primitive #{} of mode {:?}",
                        primitive.index(),
                        primitive.mode()
                    );
                    continue;
                }
                self.primitive(&primitive, &world);
            }
        }
        for child in node.children() {
            self.visit(child, &world);
        }
    }

    fn primitive(&mut self, primitive: &gltf::Primitive, world: &Matrix4<f32>) {
        let buffers = self.buffers;
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let positions: Vec<[f32; 3]> = match reader.read_positions() {
            Some(iter) => iter.collect(),
            None => return,
        };
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|iter| iter.collect())
            .unwrap_or_default();
        let uvs: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|tc| tc.into_f32().collect())
            .unwrap_or_default();
        let colors: Vec<[f32; 3]> = reader
            .read_colors(0)
            .map(|c| c.into_rgb_f32().collect())
            .unwrap_or_default();
        let base = primitive
            .material()
            .pbr_metallic_roughness()
            .base_color_factor();

        let normal_matrix = world
            .fixed_slice::<nalgebra::U3, nalgebra::U3>(0, 0)
            .into_owned()
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or_else(Matrix3::identity);

        let first = self.points.len() as u32;
        for (i, p) in positions.iter().enumerate() {
            let vert = world.transform_point(&Point3::new(p[0], p[1], p[2]));
            let n = normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]);
            let normal = (normal_matrix * Vector3::new(n[0], n[1], n[2]))
                .try_normalize(1e-6)
                .unwrap_or_else(Vector3::y);
            let c = colors.get(i).copied().unwrap_or([1.0, 1.0, 1.0]);
            let color = [c[0] * base[0], c[1] * base[1], c[2] * base[2]];
            let uv = uvs.get(i).copied().unwrap_or([0.0, 0.0]);
            self.points.push(
                MeshPoint::new([vert.x, vert.y, vert.z], color, normal.into()).with_uv(uv),
            );
        }
        match reader.read_indices() {
            Some(indices) => self
                .indices
                .extend(indices.into_u32().map(|i| i + first)),
            None => self
                .indices
                .extend((0..positions.len() as u32).map(|i| i + first)),
        }
    }
}

/// Imports every triangle primitive of the default scene as one indexed mesh,
/// with node transforms baked in and animation names kept as clips.
pub fn load_mesh(path: &Path, name: &str) -> Result<Mesh, ResourceError> {
    let (document, buffers, _) = gltf::import(path).map_err(|source| ResourceError::Gltf {
        path: path.to_owned(),
        source,
    })?;

    let mut imported = Imported {
        buffers: &buffers,
        points: Vec::new(),
        indices: Vec::new(),
    };
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());
    match scene {
        Some(scene) => {
            for node in scene.nodes() {
                imported.visit(node, &Matrix4::identity());
            }
        }
        None => {
            for node in document.nodes() {
                imported.visit(node, &Matrix4::identity());
            }
        }
    }

    if imported.indices.is_empty() {
        return Err(ResourceError::EmptyMesh(name.to_owned()));
    }

    let mut mesh = Mesh::new(
        name,
        Topology::TriangleList,
        RenderableMesh::Indexed(IndexedMesh {
            points: imported.points,
            indices: imported.indices,
        }),
    );

    for (i, animation) in document.animations().enumerate() {
        let length = animation
            .channels()
            .filter_map(|channel| {
                channel
                    .reader(|buffer| Some(&buffers[buffer.index()]))
                    .read_inputs()
                    .map(|times| times.fold(0.0f32, f32::max))
            })
            .fold(0.0f32, f32::max);
        let clip = animation
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Animation{}", i));
        mesh = mesh.with_clip(&clip, length);
    }

    log::info!(
        "mesh {} imported from {}: {} vertices, {} clips",
        name,
        path.display(),
        mesh.vertex_count(),
        mesh.clips.len()
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::fs;

    const TRIANGLE: &str = r#"{
        "asset": {"version": "2.0"},
        "scene": 0,
        "scenes": [{"nodes": [0]}],
        "nodes": [{"mesh": 0, "translation": [0.0, 10.0, 0.0]}],
        "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
        "buffers": [{"uri": "tri.bin", "byteLength": 68}],
        "bufferViews": [
            {"buffer": 0, "byteOffset": 0, "byteLength": 36},
            {"buffer": 0, "byteOffset": 36, "byteLength": 8},
            {"buffer": 0, "byteOffset": 44, "byteLength": 24}
        ],
        "accessors": [
            {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
             "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]},
            {"bufferView": 1, "componentType": 5126, "count": 2, "type": "SCALAR",
             "min": [0.0], "max": [1.5]},
            {"bufferView": 2, "componentType": 5126, "count": 2, "type": "VEC3"}
        ],
        "animations": [{
            "name": "Walk",
            "channels": [{"sampler": 0, "target": {"node": 0, "path": "translation"}}],
            "samplers": [{"input": 1, "output": 2, "interpolation": "LINEAR"}]
        }]
    }"#;

    fn write_triangle(dir: &Path) -> std::path::PathBuf {
        let floats: [f32; 17] = [
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, // positions
            0.0, 1.5, // key times
            0.0, 0.0, 0.0, 0.0, 0.0, 1.0, // translations
        ];
        let bytes: Vec<u8> = floats.iter().flat_map(|f| f.to_le_bytes().to_vec()).collect();
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("tri.bin"), bytes).unwrap();
        let path = dir.join("tri.gltf");
        fs::write(&path, TRIANGLE).unwrap();
        path
    }

    #[test]
    fn imports_geometry_and_clip_lengths() {
        let dir = std::env::temp_dir().join("butai-gltf-test");
        let path = write_triangle(&dir);
        let mesh = load_mesh(&path, "tri.mesh").unwrap();

        assert_eq!(mesh.vertex_count(), 3);
        assert_relative_eq!(mesh.height(), 11.0);
        assert_eq!(mesh.clips.len(), 1);
        assert_eq!(mesh.clips[0].name, "Walk");
        assert_relative_eq!(mesh.clips[0].length, 1.5);
        match &mesh.geometry {
            RenderableMesh::Indexed(ind) => assert_eq!(ind.indices, vec![0, 1, 2]),
            RenderableMesh::Regular(_) => panic!("expected indexed geometry"),
        }
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = load_mesh(Path::new("no/such/file.gltf"), "file.mesh").unwrap_err();
        assert!(matches!(err, ResourceError::Gltf { .. }));
    }
}

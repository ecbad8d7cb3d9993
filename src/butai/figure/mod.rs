pub mod prefab;

use crate::scene::material::Material;
use nalgebra::Point3;
use nalgebra_glm::Vec3;

#[derive(Default, Debug, Clone, Copy)]
pub struct PerVertexParams {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}
vulkano::impl_vertex!(PerVertexParams, position, color, normal, uv);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    TriangleList,
    LineList,
}

#[derive(Debug, Clone)]
pub enum RenderableMesh {
    Indexed(IndexedMesh),
    Regular(RegularMesh),
}

impl RenderableMesh {
    pub fn points(&self) -> &[MeshPoint] {
        match self {
            RenderableMesh::Indexed(ind) => &ind.points,
            RenderableMesh::Regular(reg) => &reg.points,
        }
    }

    pub fn vertices(&self) -> Vec<PerVertexParams> {
        self.points().iter().map(MeshPoint::to_vert).collect()
    }
}

#[derive(Debug, Clone)]
pub struct MeshPoint {
    pub vert: Point3<f32>,
    pub color: Vec3,
    pub normal: Vec3,
    pub uv: [f32; 2],
}

impl MeshPoint {
    pub fn new(vert: [f32; 3], color: [f32; 3], normal: [f32; 3]) -> Self {
        MeshPoint {
            vert: Point3::new(vert[0], vert[1], vert[2]),
            color: Vec3::new(color[0], color[1], color[2]),
            normal: Vec3::new(normal[0], normal[1], normal[2]),
            uv: [0.0, 0.0],
        }
    }

    pub fn with_uv(mut self, uv: [f32; 2]) -> Self {
        self.uv = uv;
        self
    }

    pub fn to_vert(&self) -> PerVertexParams {
        let p = self;
        PerVertexParams {
            position: [p.vert[0], p.vert[1], p.vert[2]],
            color: [p.color[0], p.color[1], p.color[2]],
            normal: [p.normal[0], p.normal[1], p.normal[2]],
            uv: p.uv,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndexedMesh {
    pub points: Vec<MeshPoint>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct RegularMesh {
    pub points: Vec<MeshPoint>,
}

#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
    pub color: [Vec3; 3],
    pub normale: Vec3,
}

impl Triangle {
    pub fn new(vertices: [Point3<f32>; 3], color: [Vec3; 3], normale: Vec3) -> Self {
        Self {
            vertices,
            color,
            normale,
        }
    }
}

pub struct TriangleBuilder {
    points: Vec<Point3<f32>>,
    color: Vec<Vec3>,
    normal: Vec3,
}

impl TriangleBuilder {
    pub fn with_norm(normal: Vec3) -> Self {
        TriangleBuilder {
            points: Vec::with_capacity(3),
            color: Vec::with_capacity(3),
            normal,
        }
    }

    /// Adds a corner; the third corner completes the triangle and is returned as `Err`.
    pub fn add(mut self, p: Point3<f32>, c: Vec3) -> Result<TriangleBuilder, Triangle> {
        self.points.push(p);
        self.color.push(c);
        if self.points.len() == 3 && self.color.len() == 3 {
            Err(Triangle::new(
                [self.points[0], self.points[1], self.points[2]],
                [self.color[0], self.color[1], self.color[2]],
                self.normal,
            ))
        } else {
            Ok(self)
        }
    }
}

/// Chained triangle soup builder used for the code-made stand-in meshes.
pub struct FigureBuilder {
    triangles: Vec<Triangle>,
    color: Vec3,
    current_triangle_builder: Option<TriangleBuilder>,
}

impl FigureBuilder {
    pub fn new(color: Vec3) -> Self {
        FigureBuilder {
            triangles: Vec::new(),
            color,
            current_triangle_builder: None,
        }
    }

    pub fn n(mut self, normal: Vec3) -> FigureBuilder {
        self.current_triangle_builder = Some(TriangleBuilder::with_norm(normal));
        self
    }

    pub fn p(mut self, p: Point3<f32>) -> FigureBuilder {
        match self.current_triangle_builder.take() {
            Some(b) => match b.add(p, self.color) {
                Ok(builder) => {
                    self.current_triangle_builder = Some(builder);
                    self
                }
                Err(t) => {
                    self.triangles.push(t);
                    self
                }
            },
            None => self,
        }
    }

    pub fn t_n(self, n: Vec3, a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> FigureBuilder {
        self.n(n).p(a).p(b).p(c)
    }

    pub fn t_n_c(
        mut self,
        n: Vec3,
        a: Point3<f32>,
        b: Point3<f32>,
        c: Point3<f32>,
        color: Vec3,
    ) -> FigureBuilder {
        let old_color = self.color;
        self.color = color;
        let mut b = self.n(n).p(a).p(b).p(c);
        b.color = old_color;
        b
    }

    /// Axis-aligned box between two corners, faces wound counter-clockwise from outside.
    pub fn cuboid(self, min: Point3<f32>, max: Point3<f32>, color: Vec3) -> FigureBuilder {
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);
        let p = Point3::new;
        self
            // +X
            .t_n_c(Vec3::x(), p(x1, y0, z1), p(x1, y0, z0), p(x1, y1, z0), color)
            .t_n_c(Vec3::x(), p(x1, y0, z1), p(x1, y1, z0), p(x1, y1, z1), color)
            // -X
            .t_n_c(-Vec3::x(), p(x0, y0, z0), p(x0, y0, z1), p(x0, y1, z1), color)
            .t_n_c(-Vec3::x(), p(x0, y0, z0), p(x0, y1, z1), p(x0, y1, z0), color)
            // +Y
            .t_n_c(Vec3::y(), p(x0, y1, z1), p(x1, y1, z1), p(x1, y1, z0), color)
            .t_n_c(Vec3::y(), p(x0, y1, z1), p(x1, y1, z0), p(x0, y1, z0), color)
            // -Y
            .t_n_c(-Vec3::y(), p(x0, y0, z0), p(x1, y0, z0), p(x1, y0, z1), color)
            .t_n_c(-Vec3::y(), p(x0, y0, z0), p(x1, y0, z1), p(x0, y0, z1), color)
            // +Z
            .t_n_c(Vec3::z(), p(x0, y0, z1), p(x1, y0, z1), p(x1, y1, z1), color)
            .t_n_c(Vec3::z(), p(x0, y0, z1), p(x1, y1, z1), p(x0, y1, z1), color)
            // -Z
            .t_n_c(-Vec3::z(), p(x1, y0, z0), p(x0, y0, z0), p(x0, y1, z0), color)
            .t_n_c(-Vec3::z(), p(x1, y0, z0), p(x0, y1, z0), p(x1, y1, z0), color)
    }

    pub fn build(self) -> Figure {
        log::trace!("figure of {} triangles", self.triangles.len());
        Figure::new(self.triangles)
    }
}

#[derive(Debug, Clone)]
pub struct Figure {
    pub triangles: Vec<Triangle>,
}

impl Figure {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    pub fn to_mesh(self) -> RenderableMesh {
        RenderableMesh::Regular(RegularMesh {
            points: self
                .triangles
                .into_iter()
                .flat_map(|triangle| {
                    let normal = triangle.normale;
                    let colors = triangle.color;
                    triangle
                        .vertices
                        .iter()
                        .zip(colors.iter())
                        .map(|(vert, color)| MeshPoint {
                            vert: *vert,
                            color: *color,
                            normal,
                            uv: [0.0, 0.0],
                        })
                        .collect::<Vec<MeshPoint>>()
                })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipInfo {
    pub name: String,
    pub length: f32,
}

impl ClipInfo {
    pub fn new(name: &str, length: f32) -> Self {
        ClipInfo {
            name: name.to_owned(),
            length,
        }
    }
}

/// Geometry shared by every entity created from the same mesh name.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub topology: Topology,
    pub geometry: RenderableMesh,
    pub material: Material,
    pub clips: Vec<ClipInfo>,
}

impl Mesh {
    pub fn new(name: &str, topology: Topology, geometry: RenderableMesh) -> Self {
        Mesh {
            name: name.to_owned(),
            topology,
            geometry,
            material: Material::new("BaseWhite"),
            clips: Vec::new(),
        }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_clip(mut self, name: &str, length: f32) -> Self {
        self.clips.push(ClipInfo::new(name, length));
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.geometry.points().len()
    }

    pub fn is_empty(&self) -> bool {
        match &self.geometry {
            RenderableMesh::Indexed(ind) => ind.indices.is_empty(),
            RenderableMesh::Regular(reg) => reg.points.is_empty(),
        }
    }

    /// Largest Y of any vertex, in mesh space.
    pub fn height(&self) -> f32 {
        self.geometry
            .points()
            .iter()
            .map(|p| p.vert.y)
            .fold(0.0, f32::max)
    }
}

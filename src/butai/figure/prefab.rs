//! Code-made stand-ins for the lab meshes, used when no glTF file with the
//! same stem is found in the resource locations.

use super::{
    FigureBuilder, IndexedMesh, Mesh, MeshPoint, RenderableMesh, Topology,
};
use crate::math;
use crate::scene::material::{Colour, Material};
use nalgebra::Point3;
use nalgebra_glm::Vec3;

pub const PREFAB_CUBE: &str = "Prefab_Cube";
pub const PREFAB_SPHERE: &str = "Prefab_Sphere";
pub const PREFAB_PLANE: &str = "Prefab_Plane";

/// Looks up a built-in mesh by resource name.
pub fn builtin(name: &str) -> Option<Mesh> {
    match name {
        PREFAB_CUBE => Some(cube(name, 100.0)),
        PREFAB_SPHERE => Some(sphere(name, 50.0, 16, 16)),
        PREFAB_PLANE => Some(plane(&PlaneParams::prefab(name))),
        "DustinBody.mesh" => Some(professor(name)),
        "ninja.mesh" => Some(ninja(name)),
        "fish.mesh" => Some(fish(name)),
        "axes.mesh" => Some(axes(name)),
        _ => None,
    }
}

fn rgb(r: f32, g: f32, b: f32) -> Vec3 {
    Vec3::new(r, g, b)
}

fn boxed(min: [f32; 3], max: [f32; 3]) -> (Point3<f32>, Point3<f32>) {
    (
        Point3::new(min[0], min[1], min[2]),
        Point3::new(max[0], max[1], max[2]),
    )
}

fn parts(name: &str, parts: &[([f32; 3], [f32; 3], Vec3)]) -> RenderableMesh {
    let figure = parts
        .iter()
        .fold(FigureBuilder::new(Vec3::zeros()), |builder, (min, max, color)| {
            let (a, b) = boxed(*min, *max);
            builder.cuboid(a, b, *color)
        })
        .build();
    log::trace!("built stand-in {}", name);
    figure.to_mesh()
}

pub fn cube(name: &str, size: f32) -> Mesh {
    let h = size * 0.5;
    let geometry = parts(name, &[([-h, -h, -h], [h, h, h], rgb(1.0, 1.0, 1.0))]);
    Mesh::new(name, Topology::TriangleList, geometry)
}

pub fn sphere(name: &str, radius: f32, rings: u32, segments: u32) -> Mesh {
    let mut points = Vec::new();
    let mut indices = Vec::new();
    for ring in 0..=rings {
        let phi = std::f32::consts::PI * ring as f32 / rings as f32;
        for seg in 0..=segments {
            let theta = 2.0 * std::f32::consts::PI * seg as f32 / segments as f32;
            let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            let vert = normal * radius;
            points.push(
                MeshPoint::new(vert.into(), [1.0, 1.0, 1.0], normal.into()).with_uv([
                    seg as f32 / segments as f32,
                    ring as f32 / rings as f32,
                ]),
            );
        }
    }
    let stride = segments + 1;
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    Mesh::new(
        name,
        Topology::TriangleList,
        RenderableMesh::Indexed(IndexedMesh { points, indices }),
    )
}

/// Parameters of a flat grid of quads, laid out like a mesh-manager plane.
#[derive(Debug, Clone)]
pub struct PlaneParams {
    pub name: String,
    pub normal: Vec3,
    pub distance: f32,
    pub width: f32,
    pub height: f32,
    pub x_segments: u32,
    pub y_segments: u32,
    pub u_tile: f32,
    pub v_tile: f32,
    pub up: Vec3,
}

impl PlaneParams {
    pub fn new(name: &str, normal: Vec3, width: f32, height: f32, up: Vec3) -> Self {
        PlaneParams {
            name: name.to_owned(),
            normal,
            distance: 0.0,
            width,
            height,
            x_segments: 1,
            y_segments: 1,
            u_tile: 1.0,
            v_tile: 1.0,
            up,
        }
    }

    fn prefab(name: &str) -> Self {
        PlaneParams::new(name, Vec3::z(), 200.0, 200.0, Vec3::y())
    }

    pub fn tiled(mut self, u_tile: f32, v_tile: f32) -> Self {
        self.u_tile = u_tile;
        self.v_tile = v_tile;
        self
    }

    pub fn segments(mut self, x_segments: u32, y_segments: u32) -> Self {
        self.x_segments = x_segments.max(1);
        self.y_segments = y_segments.max(1);
        self
    }
}

pub fn plane(params: &PlaneParams) -> Mesh {
    let z_axis = math::normalised(&params.normal);
    let y_axis = math::normalised(&params.up);
    let x_axis = y_axis.cross(&z_axis);
    let origin = z_axis * -params.distance;

    let (xs, ys) = (params.x_segments, params.y_segments);
    let x_space = params.width / xs as f32;
    let y_space = params.height / ys as f32;
    let half_width = params.width * 0.5;
    let half_height = params.height * 0.5;
    let x_tex = params.u_tile / xs as f32;
    let y_tex = params.v_tile / ys as f32;

    let mut points = Vec::with_capacity(((xs + 1) * (ys + 1)) as usize);
    for y in 0..=ys {
        for x in 0..=xs {
            let local_x = x as f32 * x_space - half_width;
            let local_y = y as f32 * y_space - half_height;
            let vert = origin + x_axis * local_x + y_axis * local_y;
            points.push(
                MeshPoint::new(vert.into(), [1.0, 1.0, 1.0], z_axis.into())
                    .with_uv([x as f32 * x_tex, 1.0 - y as f32 * y_tex]),
            );
        }
    }

    let stride = xs + 1;
    let mut indices = Vec::with_capacity((xs * ys * 6) as usize);
    for y in 0..ys {
        for x in 0..xs {
            let a = y * stride + x;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            indices.extend_from_slice(&[a, b, d, a, d, c]);
        }
    }

    Mesh::new(
        &params.name,
        Topology::TriangleList,
        RenderableMesh::Indexed(IndexedMesh { points, indices }),
    )
}

/// Three coloured bars along +X, +Y and +Z, ten units long.
pub fn axes(name: &str) -> Mesh {
    let t = 0.25;
    let geometry = parts(
        name,
        &[
            ([0.0, -t, -t], [10.0, t, t], rgb(1.0, 0.0, 0.0)),
            ([-t, 0.0, -t], [t, 10.0, t], rgb(0.0, 1.0, 0.0)),
            ([-t, -t, 0.0], [t, t, 10.0], rgb(0.0, 0.0, 1.0)),
        ],
    );
    let material = Material {
        lighting_enabled: false,
        self_illumination: Colour::WHITE,
        ..Material::new("axes")
    };
    Mesh::new(name, Topology::TriangleList, geometry).with_material(material)
}

/// Blocky humanoid about 180 units tall, facing +Z.
pub fn professor(name: &str) -> Mesh {
    let suit = rgb(0.25, 0.25, 0.35);
    let skin = rgb(0.95, 0.8, 0.65);
    let shirt = rgb(0.9, 0.9, 0.9);
    let shoes = rgb(0.15, 0.1, 0.05);
    let geometry = parts(
        name,
        &[
            ([-16.0, 0.0, -8.0], [-3.0, 8.0, 12.0], shoes),
            ([3.0, 0.0, -8.0], [16.0, 8.0, 12.0], shoes),
            ([-15.0, 8.0, -7.0], [-3.0, 90.0, 7.0], suit),
            ([3.0, 8.0, -7.0], [15.0, 90.0, 7.0], suit),
            ([-22.0, 90.0, -11.0], [22.0, 150.0, 11.0], suit),
            ([-6.0, 120.0, 11.0], [6.0, 148.0, 12.0], shirt),
            ([-32.0, 92.0, -6.0], [-22.0, 148.0, 6.0], suit),
            ([22.0, 92.0, -6.0], [32.0, 148.0, 6.0], suit),
            ([-31.0, 82.0, -5.0], [-23.0, 92.0, 5.0], skin),
            ([23.0, 82.0, -5.0], [31.0, 92.0, 5.0], skin),
            ([-5.0, 150.0, -5.0], [5.0, 156.0, 5.0], skin),
            ([-11.0, 156.0, -11.0], [11.0, 180.0, 11.0], skin),
            ([-2.0, 164.0, 11.0], [2.0, 170.0, 15.0], skin),
        ],
    );
    Mesh::new(name, Topology::TriangleList, geometry)
        .with_clip("Idle", 2.0)
        .with_clip("Walk", 1.0)
        .with_clip("Run", 0.7)
}

/// Blocky ninja about 190 units tall, facing -Z.
pub fn ninja(name: &str) -> Mesh {
    let cloth = rgb(0.1, 0.1, 0.12);
    let sash = rgb(0.6, 0.1, 0.1);
    let eyes = rgb(0.9, 0.85, 0.7);
    let geometry = parts(
        name,
        &[
            ([-16.0, 0.0, -12.0], [-3.0, 8.0, 8.0], cloth),
            ([3.0, 0.0, -12.0], [16.0, 8.0, 8.0], cloth),
            ([-15.0, 8.0, -7.0], [-3.0, 95.0, 7.0], cloth),
            ([3.0, 8.0, -7.0], [15.0, 95.0, 7.0], cloth),
            ([-21.0, 90.0, -10.0], [21.0, 100.0, 10.0], sash),
            ([-20.0, 100.0, -10.0], [20.0, 158.0, 10.0], cloth),
            ([-30.0, 100.0, -6.0], [-20.0, 156.0, 6.0], cloth),
            ([20.0, 100.0, -6.0], [30.0, 156.0, 6.0], cloth),
            ([-10.0, 160.0, -10.0], [10.0, 188.0, 10.0], cloth),
            ([-8.0, 172.0, -11.0], [8.0, 177.0, -10.0], eyes),
        ],
    );
    Mesh::new(name, Topology::TriangleList, geometry)
        .with_clip("Idle1", 3.0)
        .with_clip("Walk", 1.0)
        .with_clip("Attack1", 1.0)
}

/// Small fish stretched along X, nose at +X.
pub fn fish(name: &str) -> Mesh {
    let body = rgb(0.9, 0.55, 0.1);
    let fin = rgb(0.95, 0.8, 0.3);
    let geometry = parts(
        name,
        &[
            ([-3.0, -1.5, -0.8], [4.0, 1.5, 0.8], body),
            ([4.0, -1.0, -0.6], [5.0, 1.0, 0.6], body),
            ([-5.0, -2.0, -0.2], [-3.0, 2.0, 0.2], fin),
            ([-0.5, 1.5, -0.2], [1.5, 2.5, 0.2], fin),
        ],
    );
    Mesh::new(name, Topology::TriangleList, geometry).with_clip("swim", 1.0)
}

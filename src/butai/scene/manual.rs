use crate::error::SceneError;
use crate::figure::{Mesh, MeshPoint, RegularMesh, RenderableMesh, Topology};
use crate::math::Vec3;
use crate::scene::material::{Colour, Material};
use crate::scene::node::NodeId;
use std::sync::Arc;

struct Section {
    material: String,
    topology: Topology,
    points: Vec<MeshPoint>,
}

/// Geometry assembled vertex by vertex, one section per `begin`/`end` pair.
pub struct ManualObject {
    name: String,
    building: Option<Section>,
    sections: Vec<Arc<Mesh>>,
    visible: bool,
    pub(crate) node: Option<NodeId>,
}

impl std::fmt::Debug for ManualObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualObject")
            .field("name", &self.name)
            .field("sections", &self.sections.len())
            .field("building", &self.building.is_some())
            .finish()
    }
}

impl ManualObject {
    pub(crate) fn new(name: &str) -> Self {
        ManualObject {
            name: name.to_owned(),
            building: None,
            sections: Vec::new(),
            visible: true,
            node: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn begin(&mut self, material: &str, topology: Topology) -> Result<(), SceneError> {
        if self.building.is_some() {
            return Err(SceneError::InvalidParameters(format!(
                "{}: end() the current section before starting another",
                self.name
            )));
        }
        self.building = Some(Section {
            material: material.to_owned(),
            topology,
            points: Vec::new(),
        });
        Ok(())
    }

    fn current(&mut self) -> Result<&mut Section, SceneError> {
        let name = &self.name;
        self.building.as_mut().ok_or_else(|| {
            SceneError::InvalidParameters(format!("{}: call begin() before adding vertices", name))
        })
    }

    pub fn position(&mut self, x: f32, y: f32, z: f32) -> Result<(), SceneError> {
        let section = self.current()?;
        section
            .points
            .push(MeshPoint::new([x, y, z], [1.0, 1.0, 1.0], [0.0, 1.0, 0.0]));
        Ok(())
    }

    /// Colours the most recent vertex.
    pub fn colour(&mut self, colour: Colour) -> Result<(), SceneError> {
        let section = self.current()?;
        if let Some(last) = section.points.last_mut() {
            last.color = Vec3::new(colour.r, colour.g, colour.b);
        }
        Ok(())
    }

    pub fn normal(&mut self, normal: Vec3) -> Result<(), SceneError> {
        let section = self.current()?;
        if let Some(last) = section.points.last_mut() {
            last.normal = normal;
        }
        Ok(())
    }

    pub fn end(&mut self) -> Result<(), SceneError> {
        let section = self.building.take().ok_or_else(|| {
            SceneError::InvalidParameters(format!("{}: end() without begin()", self.name))
        })?;
        let per_primitive = match section.topology {
            Topology::LineList => 2,
            Topology::TriangleList => 3,
        };
        if section.points.len() % per_primitive != 0 {
            log::warn!(
                "{}: {} vertices do not form whole primitives",
                self.name,
                section.points.len()
            );
        }
        let index = self.sections.len();
        let mesh = Mesh::new(
            &format!("{}/{}", self.name, index),
            section.topology,
            RenderableMesh::Regular(RegularMesh {
                points: section.points,
            }),
        )
        .with_material(Material::new(&section.material));
        self.sections.push(Arc::new(mesh));
        Ok(())
    }

    pub fn clear(&mut self) {
        self.building = None;
        self.sections.clear();
    }

    pub fn sections(&self) -> &[Arc<Mesh>] {
        &self.sections
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

pub mod animation;
pub mod camera;
pub mod entity;
pub mod lights;
pub mod manual;
pub mod material;
pub mod node;

use crate::error::SceneError;
use crate::figure::Mesh;
use crate::math::{Quat, Vec3};
use crate::scene::camera::{Camera, CameraMatrices, ViewAndProject};
use crate::scene::entity::Entity;
use crate::scene::lights::{Light, PackedLight};
use crate::scene::manual::ManualObject;
use crate::scene::material::Colour;
use crate::scene::node::{CameraId, EntityId, LightId, ManualId, Movable, NodeId, SceneNode};
use nalgebra::{Matrix4, Translation3};
use slotmap::{Key, SlotMap};
use std::collections::HashMap;
use std::sync::Arc;

const ROOT_NODE_NAME: &str = "SceneRoot";

/// World-space pose of a node after walking its parent chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derived {
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,
}

impl Derived {
    fn identity() -> Self {
        Derived {
            position: Vec3::zeros(),
            orientation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    fn child(&self, node: &SceneNode) -> Self {
        Derived {
            orientation: self.orientation * node.orientation(),
            scale: self.scale.component_mul(&node.scale()),
            position: self.orientation * self.scale.component_mul(&node.position())
                + self.position,
        }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Translation3::from(self.position).to_homogeneous()
            * self.orientation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }
}

/// One mesh to draw this frame.
#[derive(Debug, Clone)]
pub struct Renderable {
    pub mesh: Arc<Mesh>,
    pub material: Option<String>,
    pub world: Matrix4<f32>,
}

/// Everything the renderer needs from the scene for one frame.
#[derive(Debug, Clone)]
pub struct SceneSnapshot {
    pub matrices: CameraMatrices,
    pub renderables: Vec<Renderable>,
    pub lights: Vec<PackedLight>,
    pub ambient: Colour,
    pub revision: u32,
}

struct Named<K: Key, V> {
    items: SlotMap<K, V>,
    names: HashMap<String, K>,
    kind: &'static str,
}

impl<K: Key, V> Named<K, V> {
    fn new(kind: &'static str) -> Self {
        Named {
            items: SlotMap::with_key(),
            names: HashMap::new(),
            kind,
        }
    }

    fn insert(&mut self, name: &str, value: V) -> Result<K, SceneError> {
        if self.names.contains_key(name) {
            return Err(SceneError::duplicate(self.kind, name));
        }
        let id = self.items.insert(value);
        self.names.insert(name.to_owned(), id);
        Ok(id)
    }

    fn id(&self, name: &str) -> Result<K, SceneError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| SceneError::not_found(self.kind, name))
    }

    fn get(&self, id: K) -> Result<&V, SceneError> {
        self.items.get(id).ok_or(SceneError::StaleHandle(self.kind))
    }

    fn get_mut(&mut self, id: K) -> Result<&mut V, SceneError> {
        self.items
            .get_mut(id)
            .ok_or(SceneError::StaleHandle(self.kind))
    }

    fn clear(&mut self) {
        self.items.clear();
        self.names.clear();
    }
}

/// Owns every node, entity, manual object, light and camera of one scene.
pub struct SceneManager {
    name: String,
    root: NodeId,
    nodes: Named<NodeId, SceneNode>,
    entities: Named<EntityId, Entity>,
    manuals: Named<ManualId, ManualObject>,
    lights: Named<LightId, Light>,
    cameras: Named<CameraId, Camera>,
    ambient: Colour,
    unnamed: u32,
    revision: u32,
}

impl SceneManager {
    pub fn new(name: &str) -> Self {
        log::trace!("instance of {}", std::any::type_name::<Self>());
        let mut nodes = Named::new("scene node");
        let root = nodes.items.insert(SceneNode::new(
            ROOT_NODE_NAME.to_owned(),
            None,
            Vec3::zeros(),
        ));
        nodes.names.insert(ROOT_NODE_NAME.to_owned(), root);
        SceneManager {
            name: name.to_owned(),
            root,
            nodes,
            entities: Named::new("entity"),
            manuals: Named::new("manual object"),
            lights: Named::new("light"),
            cameras: Named::new("camera"),
            ambient: Colour::BLACK,
            unnamed: 0,
            revision: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bumped on every structural change.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn root_scene_node(&self) -> NodeId {
        self.root
    }

    pub fn create_child_scene_node(
        &mut self,
        parent: NodeId,
        name: &str,
        position: Vec3,
    ) -> Result<NodeId, SceneError> {
        self.nodes.get(parent)?;
        let id = self
            .nodes
            .insert(name, SceneNode::new(name.to_owned(), Some(parent), position))?;
        self.nodes.get_mut(parent)?.children.push(id);
        self.touch();
        Ok(id)
    }

    pub fn create_anonymous_child(
        &mut self,
        parent: NodeId,
        position: Vec3,
    ) -> Result<NodeId, SceneError> {
        self.unnamed += 1;
        let name = format!("Unnamed_{}", self.unnamed);
        self.create_child_scene_node(parent, &name, position)
    }

    pub fn scene_node(&self, name: &str) -> Result<NodeId, SceneError> {
        self.nodes.id(name)
    }

    pub fn has_scene_node(&self, name: &str) -> bool {
        self.nodes.names.contains_key(name)
    }

    pub fn node(&self, id: NodeId) -> Result<&SceneNode, SceneError> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes.get_mut(id)
    }

    pub fn node_named_mut(&mut self, name: &str) -> Result<&mut SceneNode, SceneError> {
        let id = self.nodes.id(name)?;
        self.nodes.get_mut(id)
    }

    pub fn derived(&self, id: NodeId) -> Result<Derived, SceneError> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.nodes.get(current)?;
            chain.push(node);
            cursor = node.parent;
        }
        Ok(chain
            .iter()
            .rev()
            .fold(Derived::identity(), |acc, node| acc.child(node)))
    }

    pub fn derived_position(&self, id: NodeId) -> Result<Vec3, SceneError> {
        Ok(self.derived(id)?.position)
    }

    pub fn derived_orientation(&self, id: NodeId) -> Result<Quat, SceneError> {
        Ok(self.derived(id)?.orientation)
    }

    pub fn derived_scale(&self, id: NodeId) -> Result<Vec3, SceneError> {
        Ok(self.derived(id)?.scale)
    }

    /// False when the node or any ancestor is hidden.
    pub fn is_node_shown(&self, id: NodeId) -> Result<bool, SceneError> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.nodes.get(current)?;
            if !node.is_visible() {
                return Ok(false);
            }
            cursor = node.parent;
        }
        Ok(true)
    }

    pub fn create_entity(&mut self, name: &str, mesh: Arc<Mesh>) -> Result<EntityId, SceneError> {
        let id = self.entities.insert(name, Entity::new(name, mesh))?;
        self.touch();
        Ok(id)
    }

    pub fn entity_id(&self, name: &str) -> Result<EntityId, SceneError> {
        self.entities.id(name)
    }

    pub fn entity(&self, id: EntityId) -> Result<&Entity, SceneError> {
        self.entities.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity, SceneError> {
        self.entities.get_mut(id)
    }

    pub fn entity_named_mut(&mut self, name: &str) -> Result<&mut Entity, SceneError> {
        let id = self.entities.id(name)?;
        self.entities.get_mut(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.items.iter()
    }

    pub fn create_manual_object(&mut self, name: &str) -> Result<ManualId, SceneError> {
        let id = self.manuals.insert(name, ManualObject::new(name))?;
        self.touch();
        Ok(id)
    }

    pub fn manual_object_id(&self, name: &str) -> Result<ManualId, SceneError> {
        self.manuals.id(name)
    }

    pub fn manual_object(&self, id: ManualId) -> Result<&ManualObject, SceneError> {
        self.manuals.get(id)
    }

    pub fn manual_object_mut(&mut self, id: ManualId) -> Result<&mut ManualObject, SceneError> {
        self.manuals.get_mut(id)
    }

    pub fn create_light(&mut self, name: &str) -> Result<LightId, SceneError> {
        let id = self.lights.insert(name, Light::new(name))?;
        self.touch();
        Ok(id)
    }

    pub fn light_id(&self, name: &str) -> Result<LightId, SceneError> {
        self.lights.id(name)
    }

    pub fn light(&self, id: LightId) -> Result<&Light, SceneError> {
        self.lights.get(id)
    }

    pub fn light_mut(&mut self, id: LightId) -> Result<&mut Light, SceneError> {
        self.lights.get_mut(id)
    }

    pub fn light_named_mut(&mut self, name: &str) -> Result<&mut Light, SceneError> {
        let id = self.lights.id(name)?;
        self.lights.get_mut(id)
    }

    pub fn create_camera(&mut self, name: &str) -> Result<CameraId, SceneError> {
        self.cameras.insert(name, Camera::new(name))
    }

    pub fn camera_id(&self, name: &str) -> Result<CameraId, SceneError> {
        self.cameras.id(name)
    }

    pub fn camera(&self, id: CameraId) -> Result<&Camera, SceneError> {
        self.cameras.get(id)
    }

    pub fn camera_mut(&mut self, id: CameraId) -> Result<&mut Camera, SceneError> {
        self.cameras.get_mut(id)
    }

    pub fn set_ambient_light(&mut self, colour: Colour) {
        self.ambient = colour;
    }

    pub fn ambient_light(&self) -> Colour {
        self.ambient
    }

    fn attached_to(&self, object: Movable) -> Result<Option<NodeId>, SceneError> {
        Ok(match object {
            Movable::Entity(id) => self.entities.get(id)?.node,
            Movable::Manual(id) => self.manuals.get(id)?.node,
            Movable::Light(id) => self.lights.get(id)?.node,
            Movable::Camera(id) => self.cameras.get(id)?.node,
        })
    }

    fn set_attachment(&mut self, object: Movable, node: Option<NodeId>) -> Result<(), SceneError> {
        match object {
            Movable::Entity(id) => self.entities.get_mut(id)?.node = node,
            Movable::Manual(id) => self.manuals.get_mut(id)?.node = node,
            Movable::Light(id) => self.lights.get_mut(id)?.node = node,
            Movable::Camera(id) => match node {
                Some(node) => {
                    let parent = self.derived(node)?;
                    let camera = self.cameras.get_mut(id)?;
                    camera.node = Some(node);
                    camera.notify_parent(parent.position, parent.orientation);
                }
                None => self.cameras.get_mut(id)?.detach(),
            },
        }
        Ok(())
    }

    /// An object hangs from at most one node at a time.
    pub fn attach_object(&mut self, node: NodeId, object: Movable) -> Result<(), SceneError> {
        self.nodes.get(node)?;
        if let Some(owner) = self.attached_to(object)? {
            let owner_name = self.nodes.get(owner)?.name().to_owned();
            return Err(SceneError::InvalidParameters(format!(
                "object already attached to scene node '{}'",
                owner_name
            )));
        }
        self.set_attachment(object, Some(node))?;
        self.nodes.get_mut(node)?.objects.push(object);
        self.touch();
        Ok(())
    }

    pub fn detach_object(&mut self, node: NodeId, object: Movable) -> Result<(), SceneError> {
        let objects = &mut self.nodes.get_mut(node)?.objects;
        let before = objects.len();
        objects.retain(|o| *o != object);
        if objects.len() == before {
            return Err(SceneError::not_found("attached object", format!("{:?}", object)));
        }
        self.set_attachment(object, None)?;
        self.touch();
        Ok(())
    }

    /// Drops every node, entity, manual object and light. Cameras survive detached.
    pub fn clear_scene(&mut self) {
        let cameras: Vec<CameraId> = self.cameras.items.keys().collect();
        for id in cameras {
            if let Some(camera) = self.cameras.items.get_mut(id) {
                camera.detach();
            }
        }
        self.entities.clear();
        self.manuals.clear();
        self.lights.clear();
        self.nodes.clear();
        self.root = self.nodes.items.insert(SceneNode::new(
            ROOT_NODE_NAME.to_owned(),
            None,
            Vec3::zeros(),
        ));
        self.nodes.names.insert(ROOT_NODE_NAME.to_owned(), self.root);
        self.touch();
        log::debug!("scene {} cleared", self.name);
    }

    fn sync_camera(&mut self, id: CameraId) -> Result<(), SceneError> {
        if let Some(node) = self.cameras.get(id)?.node {
            let parent = self.derived(node)?;
            self.cameras
                .get_mut(id)?
                .notify_parent(parent.position, parent.orientation);
        }
        Ok(())
    }

    /// Refreshes every attached camera from its node.
    pub fn sync_cameras(&mut self) {
        let ids: Vec<CameraId> = self.cameras.items.keys().collect();
        for id in ids {
            if let Err(e) = self.sync_camera(id) {
                log::warn!("camera lost its node: {}", e);
            }
        }
    }

    pub fn camera_look_at(&mut self, id: CameraId, target: Vec3) -> Result<(), SceneError> {
        self.sync_camera(id)?;
        self.cameras.get_mut(id)?.look_at(target);
        Ok(())
    }

    pub fn camera_set_direction(&mut self, id: CameraId, direction: Vec3) -> Result<(), SceneError> {
        self.sync_camera(id)?;
        self.cameras.get_mut(id)?.set_direction(direction);
        Ok(())
    }

    pub fn camera_matrices(&mut self, id: CameraId) -> Result<CameraMatrices, SceneError> {
        self.sync_camera(id)?;
        Ok(self.cameras.get(id)?.get_matrices())
    }

    pub fn renderables(&self) -> Vec<Renderable> {
        let mut out = Vec::new();
        for (_, entity) in self.entities.items.iter() {
            if !entity.is_visible() {
                continue;
            }
            if let Some(world) = self.shown_world(entity.node) {
                out.push(Renderable {
                    mesh: entity.mesh().clone(),
                    material: entity.material_name().map(str::to_owned),
                    world,
                });
            }
        }
        for (_, manual) in self.manuals.items.iter() {
            if !manual.is_visible() {
                continue;
            }
            if let Some(world) = self.shown_world(manual.node) {
                out.extend(manual.sections().iter().map(|mesh| Renderable {
                    mesh: mesh.clone(),
                    material: None,
                    world,
                }));
            }
        }
        out
    }

    fn shown_world(&self, node: Option<NodeId>) -> Option<Matrix4<f32>> {
        let node = node?;
        match self.is_node_shown(node) {
            Ok(true) => self.derived(node).ok().map(|d| d.to_matrix()),
            _ => None,
        }
    }

    /// Visible lights in world space. Unattached lights use their own position.
    pub fn packed_lights(&self) -> Vec<PackedLight> {
        self.lights
            .items
            .values()
            .filter(|light| light.is_visible())
            .filter_map(|light| {
                let parent = match light.node {
                    Some(node) => {
                        if !self.is_node_shown(node).ok()? {
                            return None;
                        }
                        self.derived(node).ok()?
                    }
                    None => Derived::identity(),
                };
                let position = parent.orientation * parent.scale.component_mul(&light.position)
                    + parent.position;
                let direction = parent.orientation * light.direction();
                Some(PackedLight::pack(light, position, direction))
            })
            .collect()
    }

    pub fn snapshot(&mut self, camera: CameraId) -> Result<SceneSnapshot, SceneError> {
        self.sync_cameras();
        Ok(SceneSnapshot {
            matrices: self.camera_matrices(camera)?,
            renderables: self.renderables(),
            lights: self.packed_lights(),
            ambient: self.ambient,
            revision: self.revision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::prefab;
    use crate::math::{self, Angle};
    use approx::assert_relative_eq;

    fn manager_with_professor() -> (SceneManager, NodeId, EntityId) {
        let mut scene = SceneManager::new("main");
        let root = scene.root_scene_node();
        let node = scene
            .create_child_scene_node(root, "Professor", Vec3::zeros())
            .unwrap();
        let mesh = Arc::new(prefab::professor("DustinBody.mesh"));
        let entity = scene.create_entity("Professor", mesh).unwrap();
        scene.attach_object(node, Movable::Entity(entity)).unwrap();
        (scene, node, entity)
    }

    #[test]
    fn names_are_unique_and_looked_up() {
        let (mut scene, node, _) = manager_with_professor();
        assert_eq!(scene.scene_node("Professor").unwrap(), node);
        let root = scene.root_scene_node();
        assert_eq!(
            scene.create_child_scene_node(root, "Professor", Vec3::zeros()),
            Err(SceneError::duplicate("scene node", "Professor"))
        );
        assert_eq!(
            scene.scene_node("Ninja"),
            Err(SceneError::not_found("scene node", "Ninja"))
        );
    }

    #[test]
    fn children_inherit_orientation_and_scale() {
        let mut scene = SceneManager::new("main");
        let root = scene.root_scene_node();
        let centre = scene
            .create_child_scene_node(root, "CenterEntity", Vec3::new(0.0, 10.0, 0.0))
            .unwrap();
        scene.node_mut(centre).unwrap().yaw(Angle::Degree(90.0));
        scene
            .node_mut(centre)
            .unwrap()
            .set_scale(Vec3::new(2.0, 2.0, 2.0));
        let child = scene
            .create_child_scene_node(centre, "Child", Vec3::new(0.0, 0.0, 100.0))
            .unwrap();

        let d = scene.derived(child).unwrap();
        assert_relative_eq!(d.position, Vec3::new(200.0, 10.0, 0.0), epsilon = 1e-3);
        assert_relative_eq!(d.scale, Vec3::new(2.0, 2.0, 2.0));
        assert_relative_eq!(
            d.orientation,
            math::axis_angle(&Vec3::y(), Angle::Degree(90.0)),
            epsilon = 1e-5
        );
    }

    #[test]
    fn objects_attach_once() {
        let (mut scene, _, entity) = manager_with_professor();
        let root = scene.root_scene_node();
        let other = scene.create_anonymous_child(root, Vec3::zeros()).unwrap();
        assert!(matches!(
            scene.attach_object(other, Movable::Entity(entity)),
            Err(SceneError::InvalidParameters(_))
        ));
    }

    #[test]
    fn hidden_ancestors_hide_renderables() {
        let (mut scene, node, _) = manager_with_professor();
        assert_eq!(scene.renderables().len(), 1);
        scene.node_mut(node).unwrap().set_visible(false);
        assert!(scene.renderables().is_empty());
    }

    #[test]
    fn attached_camera_follows_its_node() {
        let mut scene = SceneManager::new("main");
        let root = scene.root_scene_node();
        let yaw = scene
            .create_child_scene_node(root, "CameraYaw", Vec3::new(0.0, 120.0, 0.0))
            .unwrap();
        let holder = scene
            .create_child_scene_node(yaw, "CameraHolder", Vec3::new(0.0, 80.0, 500.0))
            .unwrap();
        let camera = scene.create_camera("main").unwrap();
        scene.attach_object(holder, Movable::Camera(camera)).unwrap();
        scene
            .camera_look_at(camera, Vec3::new(0.0, 120.0, 0.0))
            .unwrap();

        scene.node_mut(yaw).unwrap().yaw(Angle::Degree(90.0));
        let m = scene.camera_matrices(camera).unwrap();
        assert_relative_eq!(m.eye, Vec3::new(500.0, 200.0, 0.0), epsilon = 1e-3);
        let cam = scene.camera(camera).unwrap();
        assert!(cam.direction().x < 0.0);
    }

    #[test]
    fn clear_scene_keeps_cameras() {
        let (mut scene, node, _) = manager_with_professor();
        let camera = scene.create_camera("main").unwrap();
        scene.attach_object(node, Movable::Camera(camera)).unwrap();
        scene.create_light("LightD").unwrap();
        scene.clear_scene();

        assert!(scene.scene_node("Professor").is_err());
        assert!(scene.light_id("LightD").is_err());
        assert!(scene.renderables().is_empty());
        assert_eq!(scene.camera_id("main").unwrap(), camera);
        assert!(scene.camera(camera).unwrap().node.is_none());
        let root = scene.root_scene_node();
        assert!(scene
            .create_child_scene_node(root, "Professor", Vec3::zeros())
            .is_ok());
    }

    #[test]
    fn hidden_lights_are_not_packed() {
        let mut scene = SceneManager::new("main");
        let light = scene.create_light("LightP").unwrap();
        scene.light_mut(light).unwrap().position = Vec3::new(-250.0, 50.0, 250.0);
        assert_eq!(scene.packed_lights().len(), 1);
        scene.light_mut(light).unwrap().set_visible(false);
        assert!(scene.packed_lights().is_empty());
    }
}

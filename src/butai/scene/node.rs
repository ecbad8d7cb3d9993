use crate::math::{self, Angle, Quat, Vec3};
use slotmap::new_key_type;

new_key_type! {
    pub struct NodeId;
    pub struct EntityId;
    pub struct ManualId;
    pub struct LightId;
    pub struct CameraId;
}

/// Anything a scene node can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movable {
    Entity(EntityId),
    Manual(ManualId),
    Light(LightId),
    Camera(CameraId),
}

/// Space a node transform is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformSpace {
    Local,
    Parent,
}

/// Local transform of one node. World-space values live on `SceneManager`,
/// which can walk the parent chain.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) objects: Vec<Movable>,
    position: Vec3,
    orientation: Quat,
    scale: Vec3,
    visible: bool,
}

impl SceneNode {
    pub(crate) fn new(name: String, parent: Option<NodeId>, position: Vec3) -> Self {
        SceneNode {
            name,
            parent,
            children: Vec::new(),
            objects: Vec::new(),
            position,
            orientation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            visible: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn attached_objects(&self) -> &[Movable] {
        &self.objects
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Moves the node in its parent's space.
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    pub fn translate_in(&mut self, offset: Vec3, space: TransformSpace) {
        match space {
            TransformSpace::Parent => self.translate(offset),
            TransformSpace::Local => self.position += self.orientation * offset,
        }
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation;
    }

    /// Rotates about the node's own axes.
    pub fn rotate(&mut self, rotation: Quat) {
        self.orientation = self.orientation * rotation;
    }

    pub fn rotate_axis(&mut self, axis: &Vec3, angle: Angle) {
        self.rotate(math::axis_angle(axis, angle));
    }

    pub fn yaw(&mut self, angle: Angle) {
        self.rotate_axis(&Vec3::y(), angle);
    }

    pub fn pitch(&mut self, angle: Angle) {
        self.rotate_axis(&Vec3::x(), angle);
    }

    pub fn roll(&mut self, angle: Angle) {
        self.rotate_axis(&Vec3::z(), angle);
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Multiplies the current scale.
    pub fn scale_by(&mut self, factor: Vec3) {
        self.scale.component_mul_assign(&factor);
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Local axis the node is looking down, mesh-space +Z rotated by the orientation.
    pub fn facing(&self) -> Vec3 {
        self.orientation * Vec3::z()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn yaw_is_local_and_translate_is_parent_space() {
        let mut node = SceneNode::new("n".into(), None, Vec3::zeros());
        node.yaw(Angle::Degree(90.0));
        node.translate(Vec3::new(0.0, 0.0, 10.0));
        assert_relative_eq!(node.position(), Vec3::new(0.0, 0.0, 10.0));
        assert_relative_eq!(node.facing(), Vec3::x(), epsilon = 1e-5);

        node.translate_in(Vec3::new(0.0, 0.0, 10.0), TransformSpace::Local);
        assert_relative_eq!(node.position(), Vec3::new(10.0, 0.0, 10.0), epsilon = 1e-4);
    }

    #[test]
    fn rotations_compose_on_the_right() {
        let mut node = SceneNode::new("n".into(), None, Vec3::zeros());
        node.yaw(Angle::Degree(90.0));
        node.pitch(Angle::Degree(90.0));
        let expected = math::axis_angle(&Vec3::y(), Angle::Degree(90.0))
            * math::axis_angle(&Vec3::x(), Angle::Degree(90.0));
        assert_relative_eq!(node.orientation(), expected, epsilon = 1e-5);
    }

    #[test]
    fn scale_by_multiplies() {
        let mut node = SceneNode::new("n".into(), None, Vec3::zeros());
        node.scale_by(Vec3::new(5.0, 5.0, 5.0));
        node.scale_by(Vec3::new(2.0, 1.0, 1.0));
        assert_relative_eq!(node.scale(), Vec3::new(10.0, 5.0, 5.0));
    }
}

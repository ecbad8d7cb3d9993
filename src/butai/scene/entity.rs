use crate::error::SceneError;
use crate::figure::Mesh;
use crate::scene::animation::AnimationState;
use crate::scene::node::NodeId;
use std::sync::Arc;

/// A mesh instance placed in the scene through a node.
#[derive(Debug, Clone)]
pub struct Entity {
    name: String,
    mesh: Arc<Mesh>,
    material: Option<String>,
    cast_shadows: bool,
    visible: bool,
    states: Vec<AnimationState>,
    pub(crate) node: Option<NodeId>,
}

impl Entity {
    pub(crate) fn new(name: &str, mesh: Arc<Mesh>) -> Self {
        let states = mesh
            .clips
            .iter()
            .map(|clip| AnimationState::new(&clip.name, clip.length))
            .collect();
        Entity {
            name: name.to_owned(),
            mesh,
            material: None,
            cast_shadows: true,
            visible: true,
            states,
            node: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    pub fn parent_node(&self) -> Option<NodeId> {
        self.node
    }

    /// Material name overriding the mesh's own.
    pub fn material_name(&self) -> Option<&str> {
        self.material.as_deref()
    }

    pub fn set_material_name(&mut self, name: &str) {
        self.material = Some(name.to_owned());
    }

    pub fn cast_shadows(&self) -> bool {
        self.cast_shadows
    }

    pub fn set_cast_shadows(&mut self, cast: bool) {
        self.cast_shadows = cast;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn has_animation_state(&self, name: &str) -> bool {
        self.states.iter().any(|s| s.name() == name)
    }

    pub fn animation_state(&self, name: &str) -> Result<&AnimationState, SceneError> {
        self.states
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| SceneError::not_found("animation state", name))
    }

    pub fn animation_state_mut(&mut self, name: &str) -> Result<&mut AnimationState, SceneError> {
        self.states
            .iter_mut()
            .find(|s| s.name() == name)
            .ok_or_else(|| SceneError::not_found("animation state", name))
    }

    pub fn animation_states(&self) -> &[AnimationState] {
        &self.states
    }

    pub fn enabled_animation_states(&self) -> impl Iterator<Item = &AnimationState> {
        self.states.iter().filter(|s| s.is_enabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::prefab;

    #[test]
    fn states_mirror_mesh_clips() {
        let mesh = Arc::new(prefab::professor("DustinBody.mesh"));
        let mut entity = Entity::new("Professor", mesh);
        assert!(entity.has_animation_state("Walk"));
        assert_eq!(entity.enabled_animation_states().count(), 0);

        entity.animation_state_mut("Run").unwrap().set_enabled(true);
        let enabled: Vec<&str> = entity.enabled_animation_states().map(|s| s.name()).collect();
        assert_eq!(enabled, vec!["Run"]);
    }

    #[test]
    fn unknown_clip_is_item_not_found() {
        let mesh = Arc::new(prefab::fish("fish.mesh"));
        let entity = Entity::new("Fish0", mesh);
        assert_eq!(
            entity.animation_state("Walk").unwrap_err(),
            SceneError::not_found("animation state", "Walk")
        );
    }
}

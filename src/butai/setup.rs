//! Scene pieces every lab builds the same way: the grid, the axes marker,
//! the logo ground, the three lab lights and the third-person camera rig.

use crate::error::{ButaiError, SceneError};
use crate::figure::prefab::PlaneParams;
use crate::figure::Topology;
use crate::math::{Angle, Vec3};
use crate::resources::{ResourceGroupManager, KPU_LOGO};
use crate::scene::lights::LightType;
use crate::scene::material::Colour;
use crate::scene::node::{CameraId, EntityId, LightId, ManualId, Movable, NodeId};
use crate::scene::SceneManager;

pub const GRID_PLANE: &str = "GridPlane";
pub const GRID_PLANE_NODE: &str = "GridPlaneNode";
pub const GRID_PLANE_MATERIAL: &str = "GridPlaneMaterial";
const GRID_LINES: usize = 21;
const GRID_SPACING: f32 = 50.0;
const GRID_HALF: f32 = 500.0;

pub const GROUND_MESH: &str = "Ground";
pub const GROUND_ENTITY: &str = "GroundPlane";

/// 1 km square of white lines every 50 units on the XZ plane.
pub fn draw_grid_plane(scene: &mut SceneManager) -> Result<ManualId, SceneError> {
    let grid = scene.create_manual_object(GRID_PLANE)?;
    let root = scene.root_scene_node();
    let node = scene.create_child_scene_node(root, GRID_PLANE_NODE, Vec3::zeros())?;

    let obj = scene.manual_object_mut(grid)?;
    obj.begin(GRID_PLANE_MATERIAL, Topology::LineList)?;
    for i in 0..GRID_LINES {
        let offset = i as f32 * GRID_SPACING;
        obj.position(-GRID_HALF, 0.0, GRID_HALF - offset)?;
        obj.position(GRID_HALF, 0.0, GRID_HALF - offset)?;

        obj.position(-GRID_HALF + offset, 0.0, GRID_HALF)?;
        obj.position(-GRID_HALF + offset, 0.0, -GRID_HALF)?;
    }
    obj.end()?;

    scene.attach_object(node, Movable::Manual(grid))?;
    Ok(grid)
}

/// The axes marker at the origin, scaled ×5.
pub fn draw_axes(
    scene: &mut SceneManager,
    resources: &mut ResourceGroupManager,
) -> Result<(NodeId, EntityId), ButaiError> {
    let mesh = resources.load_mesh("axes.mesh")?;
    let entity = scene.create_entity("Axes", mesh)?;
    let root = scene.root_scene_node();
    let node = scene.create_child_scene_node(root, "AxesNode", Vec3::zeros())?;
    scene.attach_object(node, Movable::Entity(entity))?;
    scene.node_mut(node)?.set_scale(Vec3::new(5.0, 5.0, 5.0));
    Ok((node, entity))
}

/// A 500×500 logo-textured ground plane, `tiles` repeats along each side.
///
/// The plane mesh outlives `clear_scene`, so a second call reuses it.
pub fn draw_ground_plane(
    scene: &mut SceneManager,
    resources: &mut ResourceGroupManager,
    tiles: f32,
) -> Result<EntityId, ButaiError> {
    let mesh = match resources.mesh(GROUND_MESH) {
        Some(mesh) => mesh.clone(),
        None => resources.create_plane(
            &PlaneParams::new(GROUND_MESH, Vec3::y(), 500.0, 500.0, -Vec3::z()).tiled(tiles, tiles),
        )?,
    };
    let entity = scene.create_entity(GROUND_ENTITY, mesh)?;
    let root = scene.root_scene_node();
    let node = scene.create_anonymous_child(root, Vec3::zeros())?;
    scene.attach_object(node, Movable::Entity(entity))?;
    let ground = scene.entity_mut(entity)?;
    ground.set_material_name(KPU_LOGO);
    ground.set_cast_shadows(false);
    Ok(entity)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabLights {
    pub directional: LightId,
    pub point: LightId,
    pub spot: LightId,
}

pub fn directional_light(scene: &mut SceneManager, visible: bool) -> Result<LightId, SceneError> {
    let id = scene.create_light("LightD")?;
    let light = scene.light_mut(id)?;
    light.light_type = LightType::Directional;
    light.set_direction(Vec3::new(1.0, -2.0, -1.0));
    light.set_visible(visible);
    Ok(id)
}

/// Black ambient plus hidden directional, point and spot lights.
pub fn set_lights(scene: &mut SceneManager) -> Result<LabLights, SceneError> {
    scene.set_ambient_light(Colour::BLACK);

    let directional = directional_light(scene, false)?;

    let point = scene.create_light("LightP")?;
    {
        let light = scene.light_mut(point)?;
        light.light_type = LightType::Point;
        light.position = Vec3::new(-250.0, 50.0, 250.0);
        light.set_visible(false);
    }

    let spot = scene.create_light("LightS")?;
    {
        let light = scene.light_mut(spot)?;
        light.light_type = LightType::Spotlight;
        light.set_direction(-Vec3::y());
        light.position = Vec3::new(250.0, 900.0, 250.0);
        light.set_spotlight_range(Angle::Degree(10.0), Angle::Degree(80.0));
        light.set_visible(false);
    }

    Ok(LabLights {
        directional,
        point,
        spot,
    })
}

/// Nodes of a third-person rig: the character hangs from `body`, the
/// camera from `holder`, which orbits through `yaw` and `pitch`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub root: NodeId,
    pub body: NodeId,
    pub yaw: NodeId,
    pub pitch: NodeId,
    pub holder: NodeId,
}

/// Builds `<prefix>Root`/`<prefix>Yaw` plus the camera nodes, attaches the
/// camera to the holder and points it at the yaw pivot.
pub fn camera_rig(
    scene: &mut SceneManager,
    prefix: &str,
    camera: CameraId,
) -> Result<CameraRig, SceneError> {
    let parent = scene.root_scene_node();
    let root = scene.create_child_scene_node(parent, &format!("{}Root", prefix), Vec3::zeros())?;
    let body = scene.create_child_scene_node(root, &format!("{}Yaw", prefix), Vec3::zeros())?;
    let yaw = scene.create_child_scene_node(root, "CameraYaw", Vec3::new(0.0, 120.0, 0.0))?;
    let pitch = scene.create_child_scene_node(yaw, "CameraPitch", Vec3::zeros())?;
    let holder =
        scene.create_child_scene_node(pitch, "CameraHolder", Vec3::new(0.0, 80.0, 500.0))?;

    scene.camera_mut(camera)?.set_position(Vec3::zeros());
    scene.attach_object(holder, Movable::Camera(camera))?;
    let pivot = scene.derived_position(yaw)?;
    scene.camera_look_at(camera, pivot)?;

    Ok(CameraRig {
        root,
        body,
        yaw,
        pitch,
        holder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::lights::PackedLight;
    use approx::assert_relative_eq;

    #[test]
    fn grid_has_84_line_vertices() {
        let mut scene = SceneManager::new("main");
        let grid = draw_grid_plane(&mut scene).unwrap();
        let obj = scene.manual_object(grid).unwrap();
        assert_eq!(obj.sections().len(), 1);
        let mesh = &obj.sections()[0];
        assert_eq!(mesh.topology, Topology::LineList);
        assert_eq!(mesh.vertex_count(), GRID_LINES * 4);
        assert_eq!(mesh.material.name, GRID_PLANE_MATERIAL);
        assert!(scene.has_scene_node(GRID_PLANE_NODE));
        assert_eq!(
            draw_grid_plane(&mut scene).unwrap_err(),
            SceneError::duplicate("manual object", GRID_PLANE)
        );
    }

    #[test]
    fn axes_are_scaled() {
        let mut scene = SceneManager::new("main");
        let mut resources = ResourceGroupManager::new();
        let (node, _) = draw_axes(&mut scene, &mut resources).unwrap();
        assert_relative_eq!(scene.derived_scale(node).unwrap(), Vec3::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn ground_mesh_survives_a_cleared_scene() {
        let mut scene = SceneManager::new("main");
        let mut resources = ResourceGroupManager::new();
        let ground = draw_ground_plane(&mut scene, &mut resources, 5.0).unwrap();
        let entity = scene.entity(ground).unwrap();
        assert_eq!(entity.material_name(), Some(KPU_LOGO));
        assert!(!entity.cast_shadows());

        scene.clear_scene();
        assert!(draw_ground_plane(&mut scene, &mut resources, 5.0).is_ok());
    }

    #[test]
    fn lab_lights_start_hidden() {
        let mut scene = SceneManager::new("main");
        let lights = set_lights(&mut scene).unwrap();
        assert!(scene.packed_lights().is_empty());

        scene.light_mut(lights.spot).unwrap().toggle();
        match scene.packed_lights().as_slice() {
            [PackedLight::Spot {
                position,
                direction,
                ..
            }] => {
                assert_relative_eq!(*position, Vec3::new(250.0, 900.0, 250.0));
                assert_relative_eq!(*direction, -Vec3::y());
            }
            other => panic!("unexpected lights {:?}", other),
        }
    }

    #[test]
    fn rig_camera_looks_at_the_pivot() {
        let mut scene = SceneManager::new("main");
        let camera = scene.create_camera("main").unwrap();
        let rig = camera_rig(&mut scene, "Professor", camera).unwrap();
        assert!(scene.has_scene_node("ProfessorRoot"));
        assert_relative_eq!(
            scene.derived_position(rig.holder).unwrap(),
            Vec3::new(0.0, 200.0, 500.0)
        );
        scene.sync_cameras();
        let cam = scene.camera(camera).unwrap();
        assert_relative_eq!(cam.real_position(), Vec3::new(0.0, 200.0, 500.0), epsilon = 1e-4);
        let expected = (Vec3::new(0.0, 120.0, 0.0) - Vec3::new(0.0, 200.0, 500.0)).normalize();
        assert_relative_eq!(cam.direction(), expected, epsilon = 1e-4);
    }
}

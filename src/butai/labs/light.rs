//! The professor walking in place on the logo ground under three
//! switchable lights, seen through a mouse-driven camera rig.

use super::{main_camera, CameraPose};
use crate::error::ButaiError;
use crate::listeners::{AnimationTicker, EscListener, LightToggle, RigInput};
use crate::math::Vec3;
use crate::root::Root;
use crate::scene::material::Colour;
use crate::scene::node::Movable;
use crate::setup;

pub const TITLE: &str = "Light : Copyleft by Dae-Hyun Lee 2010";
const GROUND_TILES: f32 = 10.0;

pub fn setup(root: &mut Root) -> Result<(), ButaiError> {
    let camera = main_camera(
        root,
        "main",
        CameraPose::new(Vec3::new(0.0, 0.0, 500.0), Vec3::zeros()),
        Colour::BLACK,
    )?;
    root.resources_mut().add_resource_location("./");
    root.resources_mut().initialise_all_resource_groups();

    let (scene, resources) = root.scene_and_resources();
    setup::draw_grid_plane(scene)?;
    let lights = setup::set_lights(scene)?;
    setup::draw_ground_plane(scene, resources, GROUND_TILES)?;

    let rig = setup::camera_rig(scene, "Professor", camera)?;
    let mesh = resources.load_mesh("DustinBody.mesh")?;
    let professor = scene.create_entity("Professor", mesh)?;
    scene.attach_object(rig.body, Movable::Entity(professor))?;
    scene.entity_mut(professor)?.set_cast_shadows(true);
    let walk = AnimationTicker::new(scene, "Professor", "Walk")?;

    root.add_frame_listener(walk);
    root.add_frame_listener(LightToggle::new(lights));
    root.add_frame_listener(RigInput::new(&rig));
    root.add_frame_listener(EscListener::on_release());
    Ok(())
}

//! Arrow keys drive the professor; a wandering ninja gives chase when the
//! professor comes close.

use super::{bright_world, main_camera, CameraPose, NAVY};
use crate::error::ButaiError;
use crate::listeners::{CameraInput, KeyDriver, NinjaChaser};
use crate::locomotion::{Facing, Locomotion};
use crate::math::{self, Angle, Vec3};
use crate::root::Root;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub const TITLE: &str = "Walking Around Professor Smooth Rotation : Copyleft by Dae-Hyun Lee";

pub fn setup(root: &mut Root) -> Result<(), ButaiError> {
    setup_with(root, StdRng::from_entropy())
}

pub fn setup_with(root: &mut Root, rng: StdRng) -> Result<(), ButaiError> {
    let pose = CameraPose::new(Vec3::new(0.0, 150.0, 600.0), Vec3::new(0.0, 100.0, 0.0));
    let camera = main_camera(root, "main", pose, NAVY)?;
    bright_world(root)?;

    let scene_root = root.scene().root_scene_node();
    root.create_entity("Professor", "DustinBody.mesh", scene_root, Vec3::zeros())?;
    let (ninja, _) = root.create_entity("Ninja", "ninja.mesh", scene_root, Vec3::zeros())?;
    let node = root.scene_mut().node_mut(ninja)?;
    node.translate(Vec3::new(300.0, 0.0, 0.0));
    node.set_orientation(math::axis_angle(&Vec3::y(), Angle::Degree(180.0)));

    let loco = Locomotion::new("Idle", "Walk")
        .with_speed(100.0)
        .with_facing(Facing::Smooth);
    let driver = KeyDriver::new(root.scene_mut(), "Professor", loco)?;
    let chaser = NinjaChaser::new(root.scene_mut(), "Ninja", "Professor", rng)?;

    root.add_frame_listener(CameraInput::new(camera));
    root.add_frame_listener(driver);
    root.add_frame_listener(chaser);
    Ok(())
}

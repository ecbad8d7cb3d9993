//! A ring of twelve professors around the ninja, watched by a camera
//! circling the origin.

use super::{bright_world, main_camera, CameraPose, NAVY};
use crate::error::ButaiError;
use crate::listeners::{EscListener, OrbitCamera};
use crate::math::Vec3;
use crate::root::Root;

pub const TITLE: &str = "Professor & Ninja : Copyleft by Dae-Hyun Lee";
pub const RING_RADIUS: f32 = 200.0;
pub const RING_SIZE: usize = 12;

pub fn setup(root: &mut Root) -> Result<(), ButaiError> {
    let pose = CameraPose::new(Vec3::new(0.0, 100.0, 500.0), Vec3::new(0.0, 100.0, 0.0))
        .with_near(5.0);
    let camera = main_camera(root, "camera", pose, NAVY)?;
    bright_world(root)?;

    let scene_root = root.scene().root_scene_node();
    let center = root
        .scene_mut()
        .create_child_scene_node(scene_root, "CenterEntity", Vec3::zeros())?;
    for i in 0..RING_SIZE {
        let angle = (30.0 * i as f32).to_radians();
        let position = Vec3::new(angle.cos() * RING_RADIUS, 0.0, angle.sin() * RING_RADIUS);
        root.create_entity(&format!("Professor{}", i), "DustinBody.mesh", center, position)?;
    }
    root.create_entity("Ninja", "ninja.mesh", scene_root, Vec3::zeros())?;

    root.add_frame_listener(OrbitCamera::new(camera));
    root.add_frame_listener(EscListener::polled());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labs::tests::{escape, headless};
    use approx::assert_relative_eq;

    #[test]
    fn professors_ring_the_ninja() {
        let mut root = headless(TITLE);
        setup(&mut root).unwrap();
        let scene = root.scene();

        let ninja = scene.scene_node("Ninja").unwrap();
        assert_relative_eq!(scene.derived_position(ninja).unwrap(), Vec3::zeros());
        for i in 0..RING_SIZE {
            let node = scene.scene_node(&format!("Professor{}", i)).unwrap();
            let position = scene.derived_position(node).unwrap();
            assert_relative_eq!(position.norm(), RING_RADIUS, epsilon = 1e-3);
            assert_relative_eq!(position.y, 0.0);
        }
        let third = scene.scene_node("Professor3").unwrap();
        assert_relative_eq!(
            scene.derived_position(third).unwrap(),
            Vec3::new(0.0, 0.0, RING_RADIUS),
            epsilon = 1e-3
        );
    }

    #[test]
    fn camera_circles_until_escape() {
        let mut root = headless(TITLE);
        setup(&mut root).unwrap();
        let camera = root.scene().camera_id("camera").unwrap();
        let before = root.scene().camera(camera).unwrap().position();
        assert!(root.step(0.016).unwrap());
        let after = root.scene().camera(camera).unwrap().position();
        assert!((after - before).norm() > 1.0);
        assert!(!escape(&mut root));
    }
}

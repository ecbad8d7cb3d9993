//! The professor walking a fixed list of waypoints, in two variants: one
//! that turns toward each leg and one that never turns.

use super::{bright_world, main_camera, CameraPose, NAVY};
use crate::error::ButaiError;
use crate::listeners::{CameraInput, EscListener, RouteWalker};
use crate::locomotion::route::Route;
use crate::locomotion::{Facing, Locomotion};
use crate::math::Vec3;
use crate::root::Root;

pub const TITLE: &str = "Walking Around Professor : Copyleft by Dae-Hyun Lee";
pub const FIXED_TITLE: &str = "Walking Around Professor Correct Facing : Copyleft by Dae-Hyun Lee";
pub const WALK_SPEED: f32 = 80.0;

pub fn route() -> Route {
    Route::new(vec![
        Vec3::new(150.0, 30.0, 200.0),
        Vec3::new(-150.0, -30.0, 200.0),
        Vec3::new(0.0, 50.0, -200.0),
        Vec3::zeros(),
    ])
}

pub fn fixed_route() -> Route {
    Route::new(vec![
        Vec3::new(150.0, 0.0, 200.0),
        Vec3::new(-150.0, 0.0, 200.0),
        Vec3::new(150.0, 0.0, -200.0),
        Vec3::new(-150.0, 0.0, -200.0),
        Vec3::zeros(),
    ])
}

pub fn setup(root: &mut Root) -> Result<(), ButaiError> {
    let pose = CameraPose::new(Vec3::new(0.0, 100.0, 500.0), Vec3::new(0.0, 100.0, 0.0))
        .with_near(5.0);
    main_camera(root, "main", pose, NAVY)?;
    bright_world(root)?;

    let scene_root = root.scene().root_scene_node();
    root.create_entity("Professor", "DustinBody.mesh", scene_root, Vec3::zeros())?;
    let loco = Locomotion::new("Idle", "Walk")
        .with_speed(WALK_SPEED)
        .with_facing(Facing::Snap);
    let walker = RouteWalker::new(root.scene_mut(), "Professor", loco, route())?;

    root.add_frame_listener(EscListener::polled());
    root.add_frame_listener(walker);
    Ok(())
}

pub fn setup_fixed(root: &mut Root) -> Result<(), ButaiError> {
    let pose = CameraPose::new(Vec3::new(0.0, 150.0, 600.0), Vec3::new(0.0, 100.0, 0.0));
    let camera = main_camera(root, "main", pose, NAVY)?;
    bright_world(root)?;

    let scene_root = root.scene().root_scene_node();
    root.create_entity("Professor", "DustinBody.mesh", scene_root, Vec3::zeros())?;

    let loco = Locomotion::new("Idle", "Walk")
        .with_speed(WALK_SPEED)
        .with_facing(Facing::Fixed);
    let walker = RouteWalker::new(root.scene_mut(), "Professor", loco, fixed_route())?;

    root.add_frame_listener(CameraInput::new(camera));
    root.add_frame_listener(walker);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;
    use crate::labs::tests::{escape, headless};
    use crate::math::{self, Quat};
    use crate::root::input::{InputEvent, KeyCode};
    use approx::assert_relative_eq;

    fn professor(root: &Root) -> (Vec3, Quat, bool) {
        let scene = root.scene();
        let node = scene.scene_node("Professor").unwrap();
        let entity = scene.entity_id("Professor").unwrap();
        let idle = scene
            .entity(entity)
            .unwrap()
            .animation_state("Idle")
            .unwrap()
            .is_enabled();
        let node = scene.node(node).unwrap();
        (node.position(), node.orientation(), idle)
    }

    fn walk(root: &mut Root, seconds: f32) {
        for _ in 0..(seconds * 10.0) as usize {
            assert!(root.step(0.1).unwrap());
        }
    }

    #[test]
    fn walks_the_route_and_rests_at_home() {
        let mut root = headless(TITLE);
        setup(&mut root).unwrap();

        walk(&mut root, 1.0);
        let (position, orientation, idle) = professor(&root);
        assert!(!idle);
        assert!(position.norm() > 70.0);
        let facing = orientation * Vec3::z();
        assert_relative_eq!(facing, math::normalised(&position), epsilon = 1e-3);

        walk(&mut root, 25.0);
        let (position, _, idle) = professor(&root);
        assert!(idle);
        assert_relative_eq!(position, Vec3::zeros(), epsilon = 1e-4);
        assert!(!escape(&mut root));
    }

    #[test]
    fn fixed_variant_never_turns() {
        let mut root = headless(FIXED_TITLE);
        setup_fixed(&mut root).unwrap();
        assert!(matches!(
            root.scene().scene_node("Ninja"),
            Err(SceneError::ItemNotFound { .. })
        ));

        walk(&mut root, 3.0);
        let (position, orientation, _) = professor(&root);
        assert!(position.x > 0.0 && position.z > 0.0);
        assert_relative_eq!(orientation, Quat::identity(), epsilon = 1e-6);

        walk(&mut root, 30.0);
        let (position, orientation, idle) = professor(&root);
        assert!(idle);
        assert_relative_eq!(position, Vec3::zeros(), epsilon = 1e-4);
        assert_relative_eq!(orientation, Quat::identity(), epsilon = 1e-6);
    }

    #[test]
    fn fixed_variant_quits_on_escape() {
        let mut root = headless(FIXED_TITLE);
        setup_fixed(&mut root).unwrap();
        assert!(root.step(0.1).unwrap());
        root.inject(InputEvent::KeyPressed(KeyCode::Escape));
        assert!(!root.step(0.1).unwrap());
    }
}

//! A school of fish drifting along X; number keys move the camera.

use super::{bright_world, main_camera, CameraPose, NAVY};
use crate::error::ButaiError;
use crate::listeners::{CameraPresets, EscListener, FishSwarm};
use crate::math::Vec3;
use crate::root::Root;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const TITLE: &str = "Moving Professor & Ninja : Copyleft by Dae-Hyun Lee";
pub const FISH_COUNT: usize = 50;
const FISH_SCATTER: i32 = 200;

pub fn setup(root: &mut Root) -> Result<(), ButaiError> {
    setup_with(root, StdRng::from_entropy())
}

/// Same as `setup` with a caller-supplied generator for the fish.
pub fn setup_with(root: &mut Root, mut rng: StdRng) -> Result<(), ButaiError> {
    let pose = CameraPose::new(Vec3::new(0.0, 100.0, 500.0), Vec3::new(0.0, 100.0, 0.0))
        .with_near(5.0);
    let camera = main_camera(root, "main", pose, NAVY)?;
    bright_world(root)?;

    let scene_root = root.scene().root_scene_node();
    for i in 0..FISH_COUNT {
        let position = Vec3::new(
            rng.gen_range(-FISH_SCATTER..FISH_SCATTER) as f32,
            0.0,
            rng.gen_range(-FISH_SCATTER..FISH_SCATTER) as f32,
        );
        let (node, _) = root.create_entity(&format!("Fish{}", i), "fish.mesh", scene_root, position)?;
        root.scene_mut()
            .node_mut(node)?
            .scale_by(Vec3::new(10.0, 10.0, 10.0));
    }
    let swarm = FishSwarm::new(root.scene(), "Fish", FISH_COUNT, &mut rng)?;

    root.add_frame_listener(CameraPresets::new(camera));
    root.add_frame_listener(swarm);
    root.add_frame_listener(EscListener::polled());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labs::tests::{escape, headless};
    use crate::root::input::{InputEvent, KeyCode};
    use approx::assert_relative_eq;

    fn fish_positions(root: &Root) -> Vec<Vec3> {
        (0..FISH_COUNT)
            .map(|i| {
                let node = root.scene().scene_node(&format!("Fish{}", i)).unwrap();
                root.scene().node(node).unwrap().position()
            })
            .collect()
    }

    #[test]
    fn fish_stay_in_their_lanes() {
        let mut root = headless(TITLE);
        setup_with(&mut root, StdRng::seed_from_u64(6)).unwrap();
        let before = fish_positions(&root);
        for p in &before {
            assert!(p.x >= -200.0 && p.x < 200.0);
            assert!(p.z >= -200.0 && p.z < 200.0);
        }

        assert!(root.step(1.0).unwrap());
        for (a, b) in before.iter().zip(fish_positions(&root)) {
            let moved = (b.x - a.x).abs();
            assert!(moved >= 10.0 && moved < 20.0);
            assert_relative_eq!(a.z, b.z);
        }

        let node = root.scene().scene_node("Fish0").unwrap();
        assert_relative_eq!(
            root.scene().node(node).unwrap().scale(),
            Vec3::new(10.0, 10.0, 10.0)
        );
    }

    #[test]
    fn key_two_moves_the_camera() {
        let mut root = headless(TITLE);
        setup_with(&mut root, StdRng::seed_from_u64(1)).unwrap();
        root.inject(InputEvent::KeyPressed(KeyCode::Key2));
        assert!(root.step(0.016).unwrap());
        let camera = root.scene().camera_id("main").unwrap();
        assert_relative_eq!(
            root.scene().camera(camera).unwrap().position(),
            Vec3::new(-500.0, 100.0, 0.0)
        );
        assert!(!escape(&mut root));
    }
}

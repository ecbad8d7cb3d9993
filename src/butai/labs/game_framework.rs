//! Title, play and option screens on a state stack.

use super::{main_camera, CameraPose};
use crate::error::ButaiError;
use crate::game_state::{GameManager, TitleState};
use crate::math::Vec3;
use crate::root::Root;
use crate::scene::material::Colour;

pub const TITLE: &str = "Game Framework : Copyleft by Dae-Hyun Lee";

pub fn setup(root: &mut Root) -> Result<(), ButaiError> {
    let camera = main_camera(
        root,
        "main",
        CameraPose::new(Vec3::new(0.0, 0.0, 500.0), Vec3::zeros()),
        Colour::BLACK,
    )?;
    root.resources_mut().initialise_all_resource_groups();
    root.add_frame_listener(GameManager::new(TitleState::new(camera)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labs::tests::headless;
    use crate::root::input::{InputEvent, KeyCode};

    #[test]
    fn return_starts_play_and_escape_twice_quits() {
        let mut root = headless(TITLE);
        setup(&mut root).unwrap();
        assert!(root.step(0.016).unwrap());

        root.inject(InputEvent::KeyPressed(KeyCode::Return));
        assert!(root.step(0.016).unwrap());
        assert!(root.scene().has_scene_node("ProfessorRoot"));

        root.inject(InputEvent::KeyPressed(KeyCode::Escape));
        root.inject(InputEvent::KeyReleased(KeyCode::Escape));
        assert!(root.step(0.016).unwrap());
        assert!(!root.scene().has_scene_node("ProfessorRoot"));

        root.inject(InputEvent::KeyPressed(KeyCode::Escape));
        assert!(!root.step(0.016).unwrap());
    }
}

//! An empty window with a camera; ESC closes it.

use super::{main_camera, CameraPose};
use crate::error::ButaiError;
use crate::listeners::EscListener;
use crate::math::Vec3;
use crate::root::Root;
use crate::scene::material::Colour;

pub const TITLE: &str = "Make Render Window : Copyleft by Dae-Hyun Lee";

pub fn setup(root: &mut Root) -> Result<(), ButaiError> {
    let pose = CameraPose::new(Vec3::new(500.0, 100.0, 0.0), Vec3::new(0.0, 100.0, 0.0))
        .with_near(5.0);
    main_camera(root, "camera", pose, Colour::BLACK)?;
    root.resources_mut().initialise_all_resource_groups();
    root.add_frame_listener(EscListener::polled());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labs::tests::{escape, headless};

    #[test]
    fn runs_until_escape() {
        let mut root = headless(TITLE);
        setup(&mut root).unwrap();
        assert!(root.step(0.016).unwrap());
        assert!(root.step(0.016).unwrap());

        let camera = root.scene().camera_id("camera").unwrap();
        approx::assert_relative_eq!(
            root.scene().camera(camera).unwrap().direction(),
            -Vec3::x(),
            epsilon = 1e-5
        );
        assert!(!escape(&mut root));
    }
}

use crate::error::{ButaiError, SceneError};
use crate::math::{Angle, Vec3};
use crate::root::input::{KeyCode, KeyEvent, MouseButton, MouseEvent};
use crate::root::listener::{FrameContext, FrameEvent, FrameListener};
use crate::scene::node::{CameraId, NodeId};
use crate::scene::SceneManager;
use crate::setup::CameraRig;

/// Wheel notches (in OIS units) to camera distance.
const WHEEL_DOLLY: f32 = 0.1;

/// Free camera: WASD slides it along its own up/right axes every frame,
/// right-drag turns it, the wheel dollies it. ESC either way quits.
#[derive(Debug, Clone)]
pub struct CameraInput {
    camera: CameraId,
    move_vector: Vec3,
    running: bool,
}

impl CameraInput {
    pub fn new(camera: CameraId) -> Self {
        CameraInput {
            camera,
            move_vector: Vec3::zeros(),
            running: true,
        }
    }

    pub fn move_vector(&self) -> Vec3 {
        self.move_vector
    }

    fn nudge(&mut self, key: KeyCode, sign: f32) {
        match key {
            KeyCode::W => self.move_vector.y += sign,
            KeyCode::S => self.move_vector.y -= sign,
            KeyCode::A => self.move_vector.x -= sign,
            KeyCode::D => self.move_vector.x += sign,
            KeyCode::Escape => self.running = false,
            _ => {}
        }
    }
}

impl FrameListener for CameraInput {
    fn frame_started(&mut self, ctx: &mut FrameContext, _evt: &FrameEvent) -> Result<bool, ButaiError> {
        ctx.scene
            .camera_mut(self.camera)?
            .move_relative(self.move_vector);
        Ok(self.running)
    }

    fn key_pressed(&mut self, _ctx: &mut FrameContext, evt: &KeyEvent) -> Result<(), ButaiError> {
        self.nudge(evt.key, 1.0);
        Ok(())
    }

    fn key_released(&mut self, _ctx: &mut FrameContext, evt: &KeyEvent) -> Result<(), ButaiError> {
        self.nudge(evt.key, -1.0);
        Ok(())
    }

    fn mouse_moved(&mut self, ctx: &mut FrameContext, evt: &MouseEvent) -> Result<(), ButaiError> {
        let camera = ctx.scene.camera_mut(self.camera)?;
        if evt.is_button_down(MouseButton::Right) {
            camera.yaw(Angle::Degree(-evt.rel_x));
            camera.pitch(Angle::Degree(-evt.rel_y));
        }
        camera.move_relative(Vec3::new(0.0, 0.0, -evt.rel_z * WHEEL_DOLLY));
        Ok(())
    }
}

/// Circles the camera around the Y axis, half a degree per frame.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    camera: CameraId,
    angle: f32,
    pub radius: f32,
    pub height: f32,
    pub step: Angle,
    pub target: Vec3,
}

impl OrbitCamera {
    pub fn new(camera: CameraId) -> Self {
        OrbitCamera {
            camera,
            angle: 0.0,
            radius: 500.0,
            height: 100.0,
            step: Angle::Degree(0.5),
            target: Vec3::new(0.0, 100.0, 0.0),
        }
    }

    /// Current angle around the orbit, in radians.
    pub fn angle(&self) -> f32 {
        self.angle
    }
}

impl FrameListener for OrbitCamera {
    fn frame_started(&mut self, ctx: &mut FrameContext, _evt: &FrameEvent) -> Result<bool, ButaiError> {
        self.angle = (self.angle + self.step.radians()) % std::f32::consts::TAU;
        let position = Vec3::new(
            self.angle.cos() * self.radius,
            self.height,
            self.angle.sin() * self.radius,
        );
        ctx.scene.camera_mut(self.camera)?.set_position(position);
        ctx.scene.camera_look_at(self.camera, self.target)?;
        Ok(true)
    }
}

/// Number keys jump the camera to fixed spots around the origin.
#[derive(Debug, Clone)]
pub struct CameraPresets {
    camera: CameraId,
    presets: Vec<(KeyCode, Vec3)>,
    target: Vec3,
}

impl CameraPresets {
    pub fn new(camera: CameraId) -> Self {
        CameraPresets {
            camera,
            presets: vec![
                (KeyCode::Key1, Vec3::new(500.0, 100.0, 0.0)),
                (KeyCode::Key2, Vec3::new(-500.0, 100.0, 0.0)),
                (KeyCode::Key3, Vec3::new(0.0, 100.0, 500.0)),
                (KeyCode::Key4, Vec3::new(0.0, 100.0, -500.0)),
            ],
            target: Vec3::new(0.0, 100.0, 0.0),
        }
    }
}

impl FrameListener for CameraPresets {
    fn frame_started(&mut self, ctx: &mut FrameContext, _evt: &FrameEvent) -> Result<bool, ButaiError> {
        for (key, position) in &self.presets {
            if ctx.input.is_key_down(*key) {
                ctx.scene.camera_mut(self.camera)?.set_position(*position);
                ctx.scene.camera_look_at(self.camera, self.target)?;
            }
        }
        Ok(true)
    }
}

/// Mouse drives a `CameraRig`: X yaws, Y pitches, the wheel moves the holder.
#[derive(Debug, Clone)]
pub struct RigInput {
    yaw: NodeId,
    pitch: NodeId,
    holder: NodeId,
}

impl RigInput {
    pub fn new(rig: &CameraRig) -> Self {
        RigInput {
            yaw: rig.yaw,
            pitch: rig.pitch,
            holder: rig.holder,
        }
    }

    /// Finds the rig nodes by the names `camera_rig` gives them.
    pub fn named(scene: &SceneManager) -> Result<Self, SceneError> {
        Ok(RigInput {
            yaw: scene.scene_node("CameraYaw")?,
            pitch: scene.scene_node("CameraPitch")?,
            holder: scene.scene_node("CameraHolder")?,
        })
    }

    pub(crate) fn orbit(&self, scene: &mut SceneManager, evt: &MouseEvent) -> Result<(), SceneError> {
        scene.node_mut(self.yaw)?.yaw(Angle::Degree(-evt.rel_x));
        scene.node_mut(self.pitch)?.pitch(Angle::Degree(-evt.rel_y));
        scene
            .node_mut(self.holder)?
            .translate(Vec3::new(0.0, 0.0, -evt.rel_z * WHEEL_DOLLY));
        Ok(())
    }
}

impl FrameListener for RigInput {
    fn mouse_moved(&mut self, ctx: &mut FrameContext, evt: &MouseEvent) -> Result<(), ButaiError> {
        self.orbit(ctx.scene, evt)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::root::input::InputEvent;
    use crate::root::Root;
    use crate::setup;
    use approx::assert_relative_eq;

    fn root_with_camera(position: Vec3) -> (Root, CameraId) {
        let mut root = Root::new(Config::default());
        let camera = root.scene_mut().create_camera("main").unwrap();
        root.scene_mut()
            .camera_mut(camera)
            .unwrap()
            .set_position(position);
        (root, camera)
    }

    #[test]
    fn held_w_slides_the_camera_up_each_frame() {
        let (mut root, camera) = root_with_camera(Vec3::new(0.0, 150.0, 600.0));
        root.add_frame_listener(CameraInput::new(camera));
        root.inject(InputEvent::KeyPressed(KeyCode::W));
        root.step(0.5).unwrap();
        root.step(0.5).unwrap();
        let position = root.scene().camera(camera).unwrap().position();
        assert_relative_eq!(position, Vec3::new(0.0, 152.0, 600.0), epsilon = 1e-4);

        root.inject(InputEvent::KeyReleased(KeyCode::W));
        root.step(0.5).unwrap();
        let position = root.scene().camera(camera).unwrap().position();
        assert_relative_eq!(position, Vec3::new(0.0, 152.0, 600.0), epsilon = 1e-4);
    }

    #[test]
    fn right_drag_turns_and_wheel_dollies() {
        let (mut root, camera) = root_with_camera(Vec3::zeros());
        root.add_frame_listener(CameraInput::new(camera));
        root.inject(InputEvent::MouseMoved {
            rel_x: 90.0,
            rel_y: 0.0,
            rel_z: 0.0,
        });
        root.step(0.016).unwrap();
        let direction = root.scene().camera(camera).unwrap().direction();
        assert_relative_eq!(direction, -Vec3::z(), epsilon = 1e-5);

        root.inject(InputEvent::MousePressed(MouseButton::Right));
        root.inject(InputEvent::MouseMoved {
            rel_x: 90.0,
            rel_y: 0.0,
            rel_z: 120.0,
        });
        root.step(0.016).unwrap();
        let cam = root.scene().camera(camera).unwrap();
        assert_relative_eq!(cam.direction(), Vec3::x(), epsilon = 1e-5);
        assert_relative_eq!(cam.position(), Vec3::new(12.0, 0.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn escape_release_also_quits() {
        let (mut root, camera) = root_with_camera(Vec3::zeros());
        root.add_frame_listener(CameraInput::new(camera));
        root.inject(InputEvent::KeyReleased(KeyCode::Escape));
        assert!(root.step(0.016).unwrap());
        root.inject(InputEvent::KeyPressed(KeyCode::Escape));
        assert!(!root.step(0.016).unwrap());
    }

    #[test]
    fn orbit_keeps_radius_and_height() {
        let (mut root, camera) = root_with_camera(Vec3::new(0.0, 100.0, 500.0));
        root.add_frame_listener(OrbitCamera::new(camera));
        for _ in 0..360 {
            root.step(0.016).unwrap();
        }
        let cam = root.scene().camera(camera).unwrap();
        assert_relative_eq!(cam.position(), Vec3::new(-500.0, 100.0, 0.0), epsilon = 1e-2);
        assert_relative_eq!(cam.direction(), Vec3::x(), epsilon = 1e-4);
    }

    #[test]
    fn number_keys_pick_presets() {
        let (mut root, camera) = root_with_camera(Vec3::new(0.0, 100.0, 500.0));
        root.add_frame_listener(CameraPresets::new(camera));
        root.inject(InputEvent::KeyPressed(KeyCode::Key2));
        root.step(0.016).unwrap();
        let cam = root.scene().camera(camera).unwrap();
        assert_relative_eq!(cam.position(), Vec3::new(-500.0, 100.0, 0.0));
        assert_relative_eq!(cam.direction(), Vec3::x(), epsilon = 1e-5);
    }

    #[test]
    fn rig_orbits_with_the_mouse() {
        let (mut root, camera) = root_with_camera(Vec3::zeros());
        let rig = setup::camera_rig(root.scene_mut(), "Professor", camera).unwrap();
        root.add_frame_listener(RigInput::new(&rig));
        root.inject(InputEvent::MouseMoved {
            rel_x: -90.0,
            rel_y: 0.0,
            rel_z: 1000.0,
        });
        root.step(0.016).unwrap();
        let holder = root.scene().derived_position(rig.holder).unwrap();
        assert_relative_eq!(holder, Vec3::new(400.0, 200.0, 0.0), epsilon = 1e-3);
    }
}

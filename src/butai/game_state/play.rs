use super::{GameHandle, GameState, OptionState, TitleState};
use crate::error::ButaiError;
use crate::listeners::{AnimationTicker, RigInput};
use crate::math::Vec3;
use crate::root::input::{KeyCode, KeyEvent, MouseEvent};
use crate::root::listener::{FrameContext, FrameEvent};
use crate::scene::material::Colour;
use crate::scene::node::{CameraId, Movable};
use crate::setup::{self, CameraRig};

const STATS_PERIOD: f32 = 1.0;

/// The professor running in place on the logo ground, with the camera on a
/// mouse-driven rig around him.
#[derive(Debug, Clone)]
pub struct PlayState {
    camera: CameraId,
    rig: Option<CameraRig>,
    run: Option<AnimationTicker>,
    since_stats: f32,
}

impl PlayState {
    pub fn new(camera: CameraId) -> Self {
        PlayState {
            camera,
            rig: None,
            run: None,
            since_stats: 0.0,
        }
    }

    pub fn rig(&self) -> Option<&CameraRig> {
        self.rig.as_ref()
    }
}

impl GameState for PlayState {
    fn name(&self) -> &str {
        "Play"
    }

    fn enter(&mut self, ctx: &mut FrameContext, _game: &mut GameHandle) -> Result<(), ButaiError> {
        let scene = &mut *ctx.scene;
        scene.camera_mut(self.camera)?.set_position(Vec3::zeros());

        setup::draw_axes(scene, ctx.resources)?;
        setup::draw_grid_plane(scene)?;
        scene.set_ambient_light(Colour::grey(0.7));
        setup::directional_light(scene, true)?;
        setup::draw_ground_plane(scene, ctx.resources, 5.0)?;

        let rig = setup::camera_rig(scene, "Professor", self.camera)?;
        let mesh = ctx.resources.load_mesh("DustinBody.mesh")?;
        let professor = scene.create_entity("Professor", mesh)?;
        scene.attach_object(rig.body, Movable::Entity(professor))?;
        scene.entity_mut(professor)?.set_cast_shadows(true);

        self.run = Some(AnimationTicker::new(scene, "Professor", "Run")?);
        self.rig = Some(rig);
        self.since_stats = 0.0;
        log::info!("play state entered");
        Ok(())
    }

    fn exit(&mut self, ctx: &mut FrameContext, _game: &mut GameHandle) -> Result<(), ButaiError> {
        ctx.scene.clear_scene();
        self.rig = None;
        self.run = None;
        Ok(())
    }

    fn pause(&mut self, ctx: &mut FrameContext, _game: &mut GameHandle) -> Result<(), ButaiError> {
        if let Some(run) = self.run.as_mut() {
            run.pause(ctx.scene)?;
        }
        Ok(())
    }

    fn resume(&mut self, ctx: &mut FrameContext, _game: &mut GameHandle) -> Result<(), ButaiError> {
        if let Some(run) = self.run.as_mut() {
            run.resume(ctx.scene)?;
        }
        Ok(())
    }

    fn frame_started(
        &mut self,
        ctx: &mut FrameContext,
        _game: &mut GameHandle,
        evt: &FrameEvent,
    ) -> Result<bool, ButaiError> {
        if let Some(run) = &self.run {
            run.tick(ctx.scene, evt.time_since_last_frame)?;
        }
        Ok(true)
    }

    fn frame_ended(
        &mut self,
        ctx: &mut FrameContext,
        _game: &mut GameHandle,
        evt: &FrameEvent,
    ) -> Result<bool, ButaiError> {
        self.since_stats += evt.time_since_last_frame;
        if self.since_stats >= STATS_PERIOD {
            self.since_stats = 0.0;
            let stats = ctx.stats;
            log::debug!(
                "current fps {:.1}, average {:.1}, best {:.1}, worst {:.1}",
                stats.last_fps,
                stats.avg_fps,
                stats.best_fps,
                stats.worst_fps
            );
        }
        Ok(true)
    }

    fn key_pressed(
        &mut self,
        _ctx: &mut FrameContext,
        game: &mut GameHandle,
        evt: &KeyEvent,
    ) -> Result<(), ButaiError> {
        match evt.key {
            KeyCode::O => game.push_state(OptionState),
            KeyCode::Escape => game.change_state(TitleState::new(self.camera)),
            _ => {}
        }
        Ok(())
    }

    fn mouse_moved(
        &mut self,
        ctx: &mut FrameContext,
        _game: &mut GameHandle,
        evt: &MouseEvent,
    ) -> Result<(), ButaiError> {
        if let Some(rig) = &self.rig {
            RigInput::new(rig).orbit(ctx.scene, evt)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::game_state::GameManager;
    use crate::root::input::InputEvent;
    use crate::root::Root;
    use approx::assert_relative_eq;

    fn tap(root: &mut Root, key: KeyCode) -> bool {
        root.inject(InputEvent::KeyPressed(key));
        root.inject(InputEvent::KeyReleased(key));
        root.step(0.1).unwrap()
    }

    fn run_clip(root: &Root) -> (bool, f32) {
        let scene = root.scene();
        let id = scene.entity_id("Professor").unwrap();
        let run = scene.entity(id).unwrap().animation_state("Run").unwrap();
        (run.is_enabled(), run.time_position())
    }

    #[test]
    fn title_play_option_round_trip() {
        let mut root = Root::new(Config::default());
        let camera = root.scene_mut().create_camera("main").unwrap();
        root.add_frame_listener(GameManager::new(TitleState::new(camera)));

        assert!(root.step(0.1).unwrap());
        assert!(!root.scene().has_scene_node("ProfessorRoot"));

        assert!(tap(&mut root, KeyCode::Return));
        assert!(root.scene().has_scene_node("CameraHolder"));
        assert_eq!(root.scene().ambient_light(), Colour::grey(0.7));
        assert_eq!(root.scene().packed_lights().len(), 1);
        let (enabled, _) = run_clip(&root);
        assert!(enabled);

        assert!(tap(&mut root, KeyCode::O));
        let (enabled, paused_at) = run_clip(&root);
        assert!(!enabled);
        root.step(0.1).unwrap();
        assert_relative_eq!(run_clip(&root).1, paused_at);

        assert!(tap(&mut root, KeyCode::Escape));
        assert!(run_clip(&root).0);

        assert!(tap(&mut root, KeyCode::Escape));
        assert!(!root.scene().has_scene_node("ProfessorRoot"));
        assert!(tap(&mut root, KeyCode::Return));
        assert!(root.scene().has_scene_node("ProfessorRoot"));

        assert!(tap(&mut root, KeyCode::Escape));
        assert!(!tap(&mut root, KeyCode::Escape));
    }

    #[test]
    fn mouse_orbits_the_rig() {
        let mut root = Root::new(Config::default());
        let camera = root.scene_mut().create_camera("main").unwrap();
        root.add_frame_listener(GameManager::new(PlayState::new(camera)));
        root.step(0.1).unwrap();
        root.inject(InputEvent::MouseMoved {
            rel_x: 0.0,
            rel_y: 0.0,
            rel_z: -1200.0,
        });
        root.step(0.1).unwrap();
        let holder = root.scene().scene_node("CameraHolder").unwrap();
        assert_relative_eq!(
            root.scene().derived_position(holder).unwrap(),
            Vec3::new(0.0, 200.0, 620.0),
            epsilon = 1e-3
        );
    }
}

//! Walk/rotate/idle controller that steers a character toward a heading or
//! a waypoint, blending its facing before it sets off.

pub mod route;

use crate::error::SceneError;
use crate::math::{self, Quat, Vec3};
use crate::scene::node::{EntityId, NodeId};
use crate::scene::SceneManager;

/// Seconds a facing change is blended over.
pub const ROTATION_TIME: f32 = 0.3;
/// Remaining distance under which a waypoint counts as reached.
pub const ARRIVAL_EPSILON: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocoState {
    Idle,
    Walking,
    Rotating,
}

/// How the character's orientation follows its heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Blend over `ROTATION_TIME` before walking on.
    Smooth,
    /// Turn instantly to each new heading.
    Snap,
    /// Never touch the orientation.
    Fixed,
}

/// What the controller needs from the thing it moves.
pub trait Body {
    fn position(&self) -> Result<Vec3, SceneError>;
    fn set_position(&mut self, position: Vec3) -> Result<(), SceneError>;
    fn translate(&mut self, offset: Vec3) -> Result<(), SceneError>;
    fn orientation(&self) -> Result<Quat, SceneError>;
    fn set_orientation(&mut self, orientation: Quat) -> Result<(), SceneError>;
    fn rotate(&mut self, rotation: Quat) -> Result<(), SceneError>;
    /// Stops `previous` (if any) and loops `clip` from where it was.
    fn play(&mut self, previous: Option<&str>, clip: &str) -> Result<(), SceneError>;
    fn advance(&mut self, clip: &str, dt: f32) -> Result<(), SceneError>;
}

/// A scene node and the entity on it, seen as a `Body`.
pub struct Puppet<'a> {
    scene: &'a mut SceneManager,
    node: NodeId,
    entity: EntityId,
}

impl<'a> Puppet<'a> {
    pub fn new(scene: &'a mut SceneManager, node: NodeId, entity: EntityId) -> Self {
        Puppet {
            scene,
            node,
            entity,
        }
    }

    /// Looks both up by the shared name the labs give them.
    pub fn named(scene: &'a mut SceneManager, name: &str) -> Result<Self, SceneError> {
        let node = scene.scene_node(name)?;
        let entity = scene.entity_id(name)?;
        Ok(Puppet::new(scene, node, entity))
    }
}

impl<'a> Body for Puppet<'a> {
    fn position(&self) -> Result<Vec3, SceneError> {
        Ok(self.scene.node(self.node)?.position())
    }

    fn set_position(&mut self, position: Vec3) -> Result<(), SceneError> {
        self.scene.node_mut(self.node)?.set_position(position);
        Ok(())
    }

    fn translate(&mut self, offset: Vec3) -> Result<(), SceneError> {
        self.scene.node_mut(self.node)?.translate(offset);
        Ok(())
    }

    fn orientation(&self) -> Result<Quat, SceneError> {
        Ok(self.scene.node(self.node)?.orientation())
    }

    fn set_orientation(&mut self, orientation: Quat) -> Result<(), SceneError> {
        self.scene.node_mut(self.node)?.set_orientation(orientation);
        Ok(())
    }

    fn rotate(&mut self, rotation: Quat) -> Result<(), SceneError> {
        self.scene.node_mut(self.node)?.rotate(rotation);
        Ok(())
    }

    fn play(&mut self, previous: Option<&str>, clip: &str) -> Result<(), SceneError> {
        let entity = self.scene.entity_mut(self.entity)?;
        if let Some(previous) = previous {
            entity.animation_state_mut(previous)?.set_enabled(false);
        }
        let state = entity.animation_state_mut(clip)?;
        state.set_loop(true);
        state.set_enabled(true);
        Ok(())
    }

    fn advance(&mut self, clip: &str, dt: f32) -> Result<(), SceneError> {
        self.scene
            .entity_mut(self.entity)?
            .animation_state_mut(clip)?
            .add_time(dt);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Locomotion {
    state: LocoState,
    facing: Facing,
    speed: f32,
    velocity: Vec3,
    direction: Vec3,
    target: Vec3,
    target_distance: f32,
    arrived: bool,
    rotating_time: f32,
    src: Quat,
    dest: Quat,
    basic_look: Vec3,
    idle_clip: String,
    walk_clip: String,
    clip: Option<String>,
}

impl Locomotion {
    pub fn new(idle_clip: &str, walk_clip: &str) -> Self {
        Locomotion {
            state: LocoState::Idle,
            facing: Facing::Smooth,
            speed: 0.0,
            velocity: Vec3::zeros(),
            direction: Vec3::zeros(),
            target: Vec3::zeros(),
            target_distance: 0.0,
            arrived: false,
            rotating_time: 0.0,
            src: Quat::identity(),
            dest: Quat::identity(),
            basic_look: Vec3::z(),
            idle_clip: idle_clip.to_owned(),
            walk_clip: walk_clip.to_owned(),
            clip: None,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    pub fn state(&self) -> LocoState {
        self.state
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn basic_look(&self) -> Vec3 {
        self.basic_look
    }

    pub fn target_distance(&self) -> f32 {
        self.target_distance
    }

    pub fn rotating_time(&self) -> f32 {
        self.rotating_time
    }

    pub fn current_clip(&self) -> Option<&str> {
        self.clip.as_deref()
    }

    pub fn is_moving_to_point(&self) -> bool {
        self.target_distance > 0.0
    }

    /// True once the last waypoint was reached and nothing new was asked
    /// for. The character holds still on the target, still walking.
    pub fn has_arrived(&self) -> bool {
        self.arrived
    }

    /// Starts the idle clip. Call once before the first `update`.
    pub fn start(&mut self, body: &mut dyn Body) -> Result<(), SceneError> {
        let idle = self.idle_clip.clone();
        self.switch_clip(body, &idle)
    }

    /// Turns the body so its mesh, which looks down +Z, looks down `to_look`
    /// instead, and remembers that as the rest heading.
    pub fn basic_rotate(&mut self, body: &mut dyn Body, to_look: Vec3) -> Result<(), SceneError> {
        let rotation = math::rotation_to(&Vec3::z(), &to_look);
        body.rotate(rotation)?;
        self.basic_look = rotation * Vec3::z();
        Ok(())
    }

    /// Adds an impulse to the held velocity, e.g. on key press (and its
    /// opposite on release). Cancels any waypoint.
    pub fn move_by(&mut self, body: &mut dyn Body, impulse: Vec3) -> Result<(), SceneError> {
        let before = self.velocity;
        self.velocity += impulse;
        self.direction = math::normalised(&self.velocity);
        let after = self.direction;
        self.change_state(body, before, after)?;
        self.target_distance = 0.0;
        self.arrived = false;
        Ok(())
    }

    /// Heads for `target`, replacing any impulse velocity.
    pub fn move_to_point(&mut self, body: &mut dyn Body, target: Vec3) -> Result<(), SceneError> {
        self.target = target;
        self.arrived = false;
        let mut heading = target - body.position()?;
        self.target_distance = math::normalise(&mut heading);
        let before = self.direction;
        self.change_state(body, before, heading)?;
        self.direction = heading;
        self.velocity = Vec3::zeros();
        if math::is_zero(&heading) {
            self.target_distance = 0.0;
        }
        Ok(())
    }

    /// Advances one frame of `dt` seconds.
    pub fn update(&mut self, body: &mut dyn Body, dt: f32) -> Result<(), SceneError> {
        if let Some(clip) = &self.clip {
            body.advance(clip, dt)?;
        }

        match self.state {
            LocoState::Idle => {}
            LocoState::Rotating => {
                self.rotating_time = (self.rotating_time + dt).min(ROTATION_TIME);
                let t = self.rotating_time / ROTATION_TIME;
                body.set_orientation(math::slerp_shortest(&self.src, &self.dest, t))?;
                if self.rotating_time >= ROTATION_TIME {
                    self.rotating_time = 0.0;
                    self.state = LocoState::Walking;
                    body.set_orientation(self.dest)?;
                }
            }
            LocoState::Walking => {
                if self.is_moving_to_point() {
                    self.target_distance -= self.speed * dt;
                    if self.target_distance < ARRIVAL_EPSILON {
                        body.set_position(self.target)?;
                        self.target_distance = 0.0;
                        self.arrived = true;
                        return Ok(());
                    }
                } else if self.arrived {
                    return Ok(());
                }
                body.translate(self.direction * self.speed * dt)?;
                if self.facing != Facing::Fixed {
                    body.set_orientation(math::rotation_to(&self.basic_look, &self.direction))?;
                }
            }
        }
        Ok(())
    }

    /// Drops any target or held velocity and plays the idle clip.
    pub fn stop(&mut self, body: &mut dyn Body) -> Result<(), SceneError> {
        self.state = LocoState::Idle;
        self.velocity = Vec3::zeros();
        self.direction = Vec3::zeros();
        self.target_distance = 0.0;
        self.arrived = false;
        if self.clip.as_deref() != Some(self.idle_clip.as_str()) {
            let idle = self.idle_clip.clone();
            self.switch_clip(body, &idle)?;
        }
        Ok(())
    }

    fn change_state(&mut self, body: &mut dyn Body, before: Vec3, after: Vec3) -> Result<bool, SceneError> {
        if math::is_zero(&after) {
            self.state = LocoState::Idle;
            let idle = self.idle_clip.clone();
            self.switch_clip(body, &idle)?;
            return Ok(false);
        }
        self.state = LocoState::Walking;
        let walk = self.walk_clip.clone();
        self.switch_clip(body, &walk)?;

        let heading = math::normalised(&after);
        if math::same_direction(&math::normalised(&before), &heading) {
            return Ok(false);
        }

        let dest = math::rotation_to(&self.basic_look, &heading);
        match self.facing {
            Facing::Smooth => {
                self.src = body.orientation()?;
                self.dest = dest;
                self.rotating_time = 0.0;
                self.state = LocoState::Rotating;
                Ok(true)
            }
            Facing::Snap => {
                body.set_orientation(dest)?;
                Ok(false)
            }
            Facing::Fixed => Ok(false),
        }
    }

    fn switch_clip(&mut self, body: &mut dyn Body, clip: &str) -> Result<(), SceneError> {
        body.play(self.clip.as_deref(), clip)?;
        self.clip = Some(clip.to_owned());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// In-memory body recording which clip plays.
    #[derive(Debug)]
    pub(crate) struct Dummy {
        pub position: Vec3,
        pub orientation: Quat,
        pub playing: Option<String>,
        pub clip_time: f32,
    }

    impl Default for Dummy {
        fn default() -> Self {
            Dummy {
                position: Vec3::zeros(),
                orientation: Quat::identity(),
                playing: None,
                clip_time: 0.0,
            }
        }
    }

    impl Body for Dummy {
        fn position(&self) -> Result<Vec3, SceneError> {
            Ok(self.position)
        }

        fn set_position(&mut self, position: Vec3) -> Result<(), SceneError> {
            self.position = position;
            Ok(())
        }

        fn translate(&mut self, offset: Vec3) -> Result<(), SceneError> {
            self.position += offset;
            Ok(())
        }

        fn orientation(&self) -> Result<Quat, SceneError> {
            Ok(self.orientation)
        }

        fn set_orientation(&mut self, orientation: Quat) -> Result<(), SceneError> {
            self.orientation = orientation;
            Ok(())
        }

        fn rotate(&mut self, rotation: Quat) -> Result<(), SceneError> {
            self.orientation *= rotation;
            Ok(())
        }

        fn play(&mut self, _previous: Option<&str>, clip: &str) -> Result<(), SceneError> {
            self.playing = Some(clip.to_owned());
            Ok(())
        }

        fn advance(&mut self, _clip: &str, dt: f32) -> Result<(), SceneError> {
            self.clip_time += dt;
            Ok(())
        }
    }

    fn facing(body: &Dummy) -> Vec3 {
        body.orientation * Vec3::z()
    }

    #[test]
    fn smooth_turn_blends_then_walks() {
        let mut body = Dummy::default();
        let mut loco = Locomotion::new("Idle", "Walk").with_speed(100.0);
        loco.start(&mut body).unwrap();
        assert_eq!(body.playing.as_deref(), Some("Idle"));

        loco.move_by(&mut body, Vec3::x()).unwrap();
        assert_eq!(loco.state(), LocoState::Rotating);
        assert_eq!(body.playing.as_deref(), Some("Walk"));

        loco.update(&mut body, 0.15).unwrap();
        assert_eq!(loco.state(), LocoState::Rotating);
        assert_relative_eq!(facing(&body), Vec3::new(1.0, 0.0, 1.0).normalize(), epsilon = 1e-4);
        assert_relative_eq!(body.position, Vec3::zeros());

        loco.update(&mut body, 0.2).unwrap();
        assert_eq!(loco.state(), LocoState::Walking);
        assert!(loco.rotating_time() <= ROTATION_TIME);
        assert_relative_eq!(facing(&body), Vec3::x(), epsilon = 1e-5);

        loco.update(&mut body, 0.5).unwrap();
        assert_relative_eq!(body.position, Vec3::new(50.0, 0.0, 0.0), epsilon = 1e-4);
        assert_relative_eq!(body.clip_time, 0.85, epsilon = 1e-5);
    }

    #[test]
    fn releasing_the_key_goes_idle_without_turning() {
        let mut body = Dummy::default();
        let mut loco = Locomotion::new("Idle", "Walk").with_speed(100.0);
        loco.move_by(&mut body, -Vec3::z()).unwrap();
        loco.update(&mut body, 1.0).unwrap();
        let turned = body.orientation;

        loco.move_by(&mut body, Vec3::z()).unwrap();
        assert_eq!(loco.state(), LocoState::Idle);
        assert_eq!(body.playing.as_deref(), Some("Idle"));
        loco.update(&mut body, 1.0).unwrap();
        assert_relative_eq!(body.orientation, turned);
        assert_relative_eq!(body.position, Vec3::zeros());
    }

    #[test]
    fn same_heading_does_not_rotate_again() {
        let mut body = Dummy::default();
        let mut loco = Locomotion::new("Idle", "Walk").with_speed(10.0);
        loco.move_to_point(&mut body, Vec3::new(0.0, 0.0, 100.0)).unwrap();
        assert_eq!(loco.state(), LocoState::Rotating);
        loco.update(&mut body, ROTATION_TIME).unwrap();
        assert_eq!(loco.state(), LocoState::Walking);
        loco.move_to_point(&mut body, Vec3::new(0.0, 0.0, 200.0)).unwrap();
        assert_eq!(loco.state(), LocoState::Walking);
    }

    #[test]
    fn waypoint_is_reached_exactly() {
        let mut body = Dummy::default();
        let mut loco = Locomotion::new("Idle", "Walk")
            .with_speed(80.0)
            .with_facing(Facing::Snap);
        let target = Vec3::new(150.0, 0.0, 200.0);
        loco.move_to_point(&mut body, target).unwrap();
        assert_eq!(loco.state(), LocoState::Walking);
        assert_relative_eq!(facing(&body), target.normalize(), epsilon = 1e-5);
        assert_relative_eq!(loco.target_distance(), 250.0, epsilon = 1e-3);

        for _ in 0..200 {
            loco.update(&mut body, 1.0 / 60.0).unwrap();
            if !loco.is_moving_to_point() {
                break;
            }
        }
        assert!(!loco.is_moving_to_point());
        assert!(loco.has_arrived());
        assert_eq!(loco.state(), LocoState::Walking);
        assert_eq!(body.position, target);
        assert_eq!(body.playing.as_deref(), Some("Walk"));

        loco.update(&mut body, 1.0).unwrap();
        assert_eq!(body.position, target);

        loco.stop(&mut body).unwrap();
        assert_eq!(loco.state(), LocoState::Idle);
        assert!(!loco.has_arrived());
        assert_eq!(body.playing.as_deref(), Some("Idle"));
    }

    #[test]
    fn new_target_after_arrival_walks_on() {
        let mut body = Dummy::default();
        let mut loco = Locomotion::new("Idle", "Walk")
            .with_speed(100.0)
            .with_facing(Facing::Snap);
        loco.move_to_point(&mut body, Vec3::new(0.0, 0.0, 50.0)).unwrap();
        loco.update(&mut body, 1.0).unwrap();
        assert!(loco.has_arrived());

        loco.move_to_point(&mut body, Vec3::new(0.0, 0.0, 150.0)).unwrap();
        assert!(!loco.has_arrived());
        loco.update(&mut body, 0.5).unwrap();
        assert_relative_eq!(body.position, Vec3::new(0.0, 0.0, 100.0), epsilon = 1e-4);
        assert_eq!(body.playing.as_deref(), Some("Walk"));
    }

    #[test]
    fn fixed_facing_never_turns() {
        let mut body = Dummy::default();
        let mut loco = Locomotion::new("Idle", "Walk")
            .with_speed(80.0)
            .with_facing(Facing::Fixed);
        loco.move_to_point(&mut body, Vec3::new(-150.0, 0.0, 0.0)).unwrap();
        loco.update(&mut body, 1.0).unwrap();
        assert_relative_eq!(body.orientation, Quat::identity());
        assert_relative_eq!(body.position, Vec3::new(-80.0, 0.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn zero_distance_target_stays_idle() {
        let mut body = Dummy::default();
        let mut loco = Locomotion::new("Idle", "Walk").with_speed(80.0);
        loco.move_to_point(&mut body, Vec3::zeros()).unwrap();
        assert_eq!(loco.state(), LocoState::Idle);
        assert!(!loco.is_moving_to_point());
    }

    #[test]
    fn basic_rotate_changes_the_rest_heading() {
        let mut body = Dummy::default();
        let mut loco = Locomotion::new("Walk", "Walk").with_speed(80.0);
        loco.basic_rotate(&mut body, -Vec3::z()).unwrap();
        assert_relative_eq!(loco.basic_look(), -Vec3::z(), epsilon = 1e-6);

        loco.move_to_point(&mut body, Vec3::new(0.0, 0.0, -100.0)).unwrap();
        loco.update(&mut body, ROTATION_TIME).unwrap();
        assert_eq!(loco.state(), LocoState::Walking);
        assert_relative_eq!(body.orientation * -Vec3::z(), -Vec3::z(), epsilon = 1e-5);
    }
}

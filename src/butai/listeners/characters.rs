use crate::error::{ButaiError, SceneError};
use crate::locomotion::route::Route;
use crate::locomotion::{Body, Facing, Locomotion, Puppet};
use crate::math::Vec3;
use crate::root::input::{KeyCode, KeyEvent};
use crate::root::listener::{FrameContext, FrameEvent, FrameListener};
use crate::scene::node::{EntityId, NodeId};
use crate::scene::SceneManager;
use rand::rngs::StdRng;
use rand::Rng;

/// Plays one looping clip of an entity in place.
#[derive(Debug, Clone)]
pub struct AnimationTicker {
    entity: EntityId,
    clip: String,
    paused: bool,
}

impl AnimationTicker {
    pub fn new(scene: &mut SceneManager, entity: &str, clip: &str) -> Result<Self, SceneError> {
        let id = scene.entity_id(entity)?;
        let state = scene.entity_mut(id)?.animation_state_mut(clip)?;
        state.set_loop(true);
        state.set_enabled(true);
        Ok(AnimationTicker {
            entity: id,
            clip: clip.to_owned(),
            paused: false,
        })
    }

    /// Stops the clip where it is and disables it.
    pub fn pause(&mut self, scene: &mut SceneManager) -> Result<(), SceneError> {
        let state = scene.entity_mut(self.entity)?.animation_state_mut(&self.clip)?;
        state.set_loop(false);
        state.set_enabled(false);
        self.paused = true;
        Ok(())
    }

    pub fn resume(&mut self, scene: &mut SceneManager) -> Result<(), SceneError> {
        let state = scene.entity_mut(self.entity)?.animation_state_mut(&self.clip)?;
        state.set_loop(true);
        state.set_enabled(true);
        self.paused = false;
        Ok(())
    }

    pub(crate) fn tick(&self, scene: &mut SceneManager, dt: f32) -> Result<(), SceneError> {
        if !self.paused {
            scene
                .entity_mut(self.entity)?
                .animation_state_mut(&self.clip)?
                .add_time(dt);
        }
        Ok(())
    }
}

impl FrameListener for AnimationTicker {
    fn frame_started(&mut self, ctx: &mut FrameContext, evt: &FrameEvent) -> Result<bool, ButaiError> {
        self.tick(ctx.scene, evt.time_since_last_frame)?;
        Ok(true)
    }
}

/// Walks a character through a fixed list of waypoints, then leaves it idle.
#[derive(Debug, Clone)]
pub struct RouteWalker {
    node: NodeId,
    entity: EntityId,
    loco: Locomotion,
    route: Route,
    finished: bool,
}

impl RouteWalker {
    /// `name` is both the node and the entity name.
    pub fn new(
        scene: &mut SceneManager,
        name: &str,
        mut loco: Locomotion,
        route: Route,
    ) -> Result<Self, SceneError> {
        let node = scene.scene_node(name)?;
        let entity = scene.entity_id(name)?;
        loco.start(&mut Puppet::new(scene, node, entity))?;
        Ok(RouteWalker {
            node,
            entity,
            loco,
            route,
            finished: false,
        })
    }

    pub fn locomotion(&self) -> &Locomotion {
        &self.loco
    }

    pub fn remaining(&self) -> usize {
        self.route.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Heads for the next waypoint, or idles once the route is used up.
    fn next_leg(&mut self, body: &mut dyn Body) -> Result<(), SceneError> {
        if self.route.next_location(&mut self.loco, body)?.is_none() {
            log::info!("route finished");
            self.loco.stop(body)?;
            self.finished = true;
        }
        Ok(())
    }
}

impl FrameListener for RouteWalker {
    fn frame_started(&mut self, ctx: &mut FrameContext, evt: &FrameEvent) -> Result<bool, ButaiError> {
        let mut body = Puppet::new(ctx.scene, self.node, self.entity);
        if !self.finished && !self.loco.is_moving_to_point() {
            self.next_leg(&mut body)?;
        }
        self.loco.update(&mut body, evt.time_since_last_frame)?;
        if !self.finished && self.loco.has_arrived() {
            self.next_leg(&mut body)?;
        }
        Ok(true)
    }
}

/// Arrow keys push a character around through its `Locomotion`.
#[derive(Debug, Clone)]
pub struct KeyDriver {
    node: NodeId,
    entity: EntityId,
    loco: Locomotion,
}

impl KeyDriver {
    pub fn new(scene: &mut SceneManager, name: &str, mut loco: Locomotion) -> Result<Self, SceneError> {
        let node = scene.scene_node(name)?;
        let entity = scene.entity_id(name)?;
        loco.start(&mut Puppet::new(scene, node, entity))?;
        Ok(KeyDriver { node, entity, loco })
    }

    pub fn locomotion(&self) -> &Locomotion {
        &self.loco
    }

    fn impulse(key: KeyCode) -> Option<Vec3> {
        match key {
            KeyCode::Left => Some(-Vec3::x()),
            KeyCode::Right => Some(Vec3::x()),
            KeyCode::Up => Some(-Vec3::z()),
            KeyCode::Down => Some(Vec3::z()),
            _ => None,
        }
    }

    fn push(&mut self, scene: &mut SceneManager, impulse: Vec3) -> Result<(), SceneError> {
        let mut body = Puppet::new(scene, self.node, self.entity);
        self.loco.move_by(&mut body, impulse)
    }
}

impl FrameListener for KeyDriver {
    fn frame_started(&mut self, ctx: &mut FrameContext, evt: &FrameEvent) -> Result<bool, ButaiError> {
        let mut body = Puppet::new(ctx.scene, self.node, self.entity);
        self.loco.update(&mut body, evt.time_since_last_frame)?;
        Ok(true)
    }

    fn key_pressed(&mut self, ctx: &mut FrameContext, evt: &KeyEvent) -> Result<(), ButaiError> {
        if let Some(impulse) = Self::impulse(evt.key) {
            self.push(ctx.scene, impulse)?;
        }
        Ok(())
    }

    fn key_released(&mut self, ctx: &mut FrameContext, evt: &KeyEvent) -> Result<(), ButaiError> {
        if let Some(impulse) = Self::impulse(evt.key) {
            self.push(ctx.scene, -impulse)?;
        }
        Ok(())
    }
}

/// Distance under which the ninja drops its wander target and heads for
/// the professor.
pub const CHASE_RADIUS: f32 = 100.0;
const WANDER_HALF: i32 = 250;

/// Ninja that wanders between random points and chases the professor
/// whenever the professor comes near.
#[derive(Debug, Clone)]
pub struct NinjaChaser {
    node: NodeId,
    entity: EntityId,
    prey: NodeId,
    loco: Locomotion,
    wander: Route,
    rng: StdRng,
}

impl NinjaChaser {
    pub fn new(
        scene: &mut SceneManager,
        name: &str,
        prey: &str,
        mut rng: StdRng,
    ) -> Result<Self, SceneError> {
        let node = scene.scene_node(name)?;
        let entity = scene.entity_id(name)?;
        let prey = scene.scene_node(prey)?;
        let wander = Route::new(vec![Self::random_point(&mut rng)]);
        let mut chaser = NinjaChaser {
            node,
            entity,
            prey,
            loco: Locomotion::new("Walk", "Walk")
                .with_speed(80.0)
                .with_facing(Facing::Smooth),
            wander,
            rng,
        };

        let mut body = Puppet::new(scene, node, entity);
        chaser.loco.start(&mut body)?;
        chaser.loco.basic_rotate(&mut body, -Vec3::z())?;
        chaser.next_location(&mut body)?;
        Ok(chaser)
    }

    pub fn locomotion(&self) -> &Locomotion {
        &self.loco
    }

    fn random_point(rng: &mut StdRng) -> Vec3 {
        Vec3::new(
            rng.gen_range(-WANDER_HALF..WANDER_HALF) as f32,
            0.0,
            rng.gen_range(-WANDER_HALF..WANDER_HALF) as f32,
        )
    }

    fn next_location(&mut self, body: &mut dyn Body) -> Result<(), SceneError> {
        if self.wander.next_location(&mut self.loco, body)?.is_some() {
            let point = Self::random_point(&mut self.rng);
            self.wander.push(point);
        }
        Ok(())
    }
}

impl FrameListener for NinjaChaser {
    fn frame_started(&mut self, ctx: &mut FrameContext, evt: &FrameEvent) -> Result<bool, ButaiError> {
        let prey = ctx.scene.node(self.prey)?.position();
        let mut body = Puppet::new(ctx.scene, self.node, self.entity);
        self.loco.update(&mut body, evt.time_since_last_frame)?;

        if (body.position()? - prey).norm() < CHASE_RADIUS {
            self.loco.move_to_point(&mut body, prey)?;
        } else if !self.loco.is_moving_to_point() {
            self.next_location(&mut body)?;
        }
        Ok(true)
    }
}

/// Fish drifting along ±X, each at its own speed.
#[derive(Debug, Clone)]
pub struct FishSwarm {
    fish: Vec<(NodeId, f32)>,
}

impl FishSwarm {
    /// Picks up nodes `<prefix>0` .. `<prefix>{count-1}` and gives each a
    /// speed in [10, 20) and a random sign.
    pub fn new(
        scene: &SceneManager,
        prefix: &str,
        count: usize,
        rng: &mut StdRng,
    ) -> Result<Self, SceneError> {
        let fish = (0..count)
            .map(|i| {
                let node = scene.scene_node(&format!("{}{}", prefix, i))?;
                let speed = rng.gen_range(10..20) as f32;
                let sign = if rng.gen_bool(0.5) { -1.0 } else { 1.0 };
                Ok((node, speed * sign))
            })
            .collect::<Result<Vec<_>, SceneError>>()?;
        Ok(FishSwarm { fish })
    }

    /// Signed X velocity of every fish.
    pub fn velocities(&self) -> impl Iterator<Item = f32> + '_ {
        self.fish.iter().map(|(_, v)| *v)
    }
}

impl FrameListener for FishSwarm {
    fn frame_started(&mut self, ctx: &mut FrameContext, evt: &FrameEvent) -> Result<bool, ButaiError> {
        for (node, velocity) in &self.fish {
            ctx.scene
                .node_mut(*node)?
                .translate(Vec3::new(velocity * evt.time_since_last_frame, 0.0, 0.0));
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::math::{self, Angle};
    use crate::root::input::InputEvent;
    use crate::root::Root;
    use crate::scene::node::Movable;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    fn place(root: &mut Root, name: &str, mesh: &str, position: Vec3) -> NodeId {
        let parent = root.scene().root_scene_node();
        root.create_entity(name, mesh, parent, position).unwrap().0
    }

    #[test]
    fn ticker_advances_only_while_running() {
        let mut root = Root::new(Config::default());
        place(&mut root, "Professor", "DustinBody.mesh", Vec3::zeros());
        let ticker = AnimationTicker::new(root.scene_mut(), "Professor", "Walk").unwrap();
        root.add_frame_listener(ticker);
        root.step(0.25).unwrap();
        let entity = root.scene().entity_id("Professor").unwrap();
        let state = root.scene().entity(entity).unwrap().animation_state("Walk").unwrap();
        assert!(state.is_enabled());
        assert_relative_eq!(state.time_position(), 0.25);
    }

    #[test]
    fn walker_follows_the_route_then_idles() {
        let mut root = Root::new(Config::default());
        let node = place(&mut root, "Professor", "DustinBody.mesh", Vec3::zeros());
        let loco = Locomotion::new("Idle", "Walk")
            .with_speed(80.0)
            .with_facing(Facing::Snap);
        let route = Route::new(vec![Vec3::new(160.0, 0.0, 0.0), Vec3::zeros()]);
        let walker = RouteWalker::new(root.scene_mut(), "Professor", loco, route).unwrap();
        root.add_frame_listener(walker);

        root.step(1.0).unwrap();
        let position = root.scene().node(node).unwrap().position();
        assert_relative_eq!(position, Vec3::new(80.0, 0.0, 0.0), epsilon = 1e-4);
        let facing = root.scene().node(node).unwrap().orientation() * Vec3::z();
        assert_relative_eq!(facing, Vec3::x(), epsilon = 1e-5);

        for _ in 0..10 {
            root.step(0.5).unwrap();
        }
        let position = root.scene().node(node).unwrap().position();
        assert_relative_eq!(position, Vec3::zeros(), epsilon = 1e-4);
        let entity = root.scene().entity_id("Professor").unwrap();
        let professor = root.scene().entity(entity).unwrap();
        assert!(professor.animation_state("Idle").unwrap().is_enabled());
        assert!(!professor.animation_state("Walk").unwrap().is_enabled());
    }

    #[test]
    fn walker_keeps_walking_through_a_waypoint() {
        let mut root = Root::new(Config::default());
        let node = place(&mut root, "Professor", "DustinBody.mesh", Vec3::zeros());
        let loco = Locomotion::new("Idle", "Walk")
            .with_speed(80.0)
            .with_facing(Facing::Snap);
        let route = Route::new(vec![Vec3::new(80.0, 0.0, 0.0), Vec3::new(80.0, 0.0, 80.0)]);
        let walker = RouteWalker::new(root.scene_mut(), "Professor", loco, route).unwrap();
        root.add_frame_listener(walker);

        root.step(0.5).unwrap();
        root.step(0.5).unwrap();
        let scene = root.scene();
        assert_eq!(scene.node(node).unwrap().position(), Vec3::new(80.0, 0.0, 0.0));
        let professor = scene.entity(scene.entity_id("Professor").unwrap()).unwrap();
        assert!(professor.animation_state("Walk").unwrap().is_enabled());
        assert!(!professor.animation_state("Idle").unwrap().is_enabled());
        let facing = scene.node(node).unwrap().orientation() * Vec3::z();
        assert_relative_eq!(facing, Vec3::z(), epsilon = 1e-5);

        root.step(0.5).unwrap();
        let position = root.scene().node(node).unwrap().position();
        assert_relative_eq!(position, Vec3::new(80.0, 0.0, 40.0), epsilon = 1e-4);
    }

    #[test]
    fn arrow_keys_walk_and_release_stops() {
        let mut root = Root::new(Config::default());
        let node = place(&mut root, "Professor", "DustinBody.mesh", Vec3::zeros());
        let loco = Locomotion::new("Idle", "Walk").with_speed(100.0);
        let driver = KeyDriver::new(root.scene_mut(), "Professor", loco).unwrap();
        root.add_frame_listener(driver);

        root.inject(InputEvent::KeyPressed(KeyCode::Right));
        root.step(0.3).unwrap();
        let facing = root.scene().node(node).unwrap().orientation() * Vec3::z();
        assert_relative_eq!(facing, Vec3::x(), epsilon = 1e-4);
        root.step(0.5).unwrap();
        let position = root.scene().node(node).unwrap().position();
        assert_relative_eq!(position, Vec3::new(50.0, 0.0, 0.0), epsilon = 1e-3);

        root.inject(InputEvent::KeyReleased(KeyCode::Right));
        root.step(0.5).unwrap();
        let position = root.scene().node(node).unwrap().position();
        assert_relative_eq!(position, Vec3::new(50.0, 0.0, 0.0), epsilon = 1e-3);
    }

    fn chase_scene(ninja_at: Vec3) -> (Root, NodeId) {
        let mut root = Root::new(Config::default());
        place(&mut root, "Professor", "DustinBody.mesh", Vec3::zeros());
        let scene = root.scene_mut();
        let parent = scene.root_scene_node();
        let ninja = scene.create_child_scene_node(parent, "Ninja", Vec3::zeros()).unwrap();
        scene.node_mut(ninja).unwrap().translate(ninja_at);
        scene
            .node_mut(ninja)
            .unwrap()
            .set_orientation(math::axis_angle(&Vec3::y(), Angle::Degree(180.0)));
        let mesh = root.resources_mut().load_mesh("ninja.mesh").unwrap();
        let scene = root.scene_mut();
        let entity = scene.create_entity("Ninja", mesh).unwrap();
        scene.attach_object(ninja, Movable::Entity(entity)).unwrap();
        (root, ninja)
    }

    #[test]
    fn ninja_wanders_inside_the_square() {
        let (mut root, ninja) = chase_scene(Vec3::new(300.0, 0.0, 0.0));
        let chaser = NinjaChaser::new(
            root.scene_mut(),
            "Ninja",
            "Professor",
            StdRng::seed_from_u64(8),
        )
        .unwrap();
        root.add_frame_listener(chaser);
        for _ in 0..600 {
            root.step(0.05).unwrap();
            let p = root.scene().node(ninja).unwrap().position();
            assert!(p.x.abs() <= 300.0 + 1e-3 && p.z.abs() <= 250.0 + 1e-3);
            assert_relative_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn ninja_chases_a_nearby_professor() {
        let (mut root, ninja) = chase_scene(Vec3::new(90.0, 0.0, 0.0));
        let chaser = NinjaChaser::new(
            root.scene_mut(),
            "Ninja",
            "Professor",
            StdRng::seed_from_u64(1),
        )
        .unwrap();
        root.add_frame_listener(chaser);
        for _ in 0..100 {
            root.step(0.05).unwrap();
        }
        let p = root.scene().node(ninja).unwrap().position();
        assert!(p.norm() < CHASE_RADIUS, "ninja wandered off to {:?}", p);
    }

    #[test]
    fn fish_drift_along_x() {
        let mut root = Root::new(Config::default());
        let parent = root.scene().root_scene_node();
        for i in 0..5 {
            root.create_entity(&format!("Fish{}", i), "fish.mesh", parent, Vec3::zeros())
                .unwrap();
        }
        let mut rng = StdRng::seed_from_u64(6);
        let swarm = FishSwarm::new(root.scene(), "Fish", 5, &mut rng).unwrap();
        let velocities: Vec<f32> = swarm.velocities().collect();
        assert!(velocities.iter().all(|v| (10.0..20.0).contains(&v.abs())));
        root.add_frame_listener(swarm);
        root.step(2.0).unwrap();
        for (i, v) in velocities.iter().enumerate() {
            let node = root.scene().scene_node(&format!("Fish{}", i)).unwrap();
            let p = root.scene().node(node).unwrap().position();
            assert_relative_eq!(p, Vec3::new(v * 2.0, 0.0, 0.0), epsilon = 1e-4);
        }
    }

    #[test]
    fn missing_character_is_reported() {
        let mut scene = SceneManager::new("main");
        let loco = Locomotion::new("Idle", "Walk");
        let err = RouteWalker::new(&mut scene, "Professor", loco, Route::default()).unwrap_err();
        assert_eq!(err, SceneError::not_found("scene node", "Professor"));
    }
}

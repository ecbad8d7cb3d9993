pub mod input;
pub mod listener;

use crate::config::{Config, WindowConfig};
use crate::debug::fps::StatsTracker;
use crate::error::{ButaiError, RenderError, SceneError};
use crate::resources::ResourceGroupManager;
use crate::root::input::{InputEvent, InputState, KeyEvent, MouseEvent};
use crate::root::listener::{FrameContext, FrameEvent, FrameListener};
use crate::scene::material::Colour;
use crate::scene::node::{CameraId, EntityId, Movable, NodeId};
use crate::scene::SceneManager;
use std::collections::VecDeque;
use std::mem;

pub const MAIN_SCENE: &str = "main";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderWindow {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
}

impl RenderWindow {
    fn new(title: &str, config: &WindowConfig) -> Self {
        RenderWindow {
            title: title.to_owned(),
            width: config.width,
            height: config.height,
            fullscreen: config.fullscreen,
            vsync: config.vsync,
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub camera: CameraId,
    pub background: Colour,
}

/// Owns the scene, resources, input and listeners of one lab.
///
/// The windowed loop lives in `start_rendering`; `step` runs the same frame
/// logic without a GPU.
pub struct Root {
    config: Config,
    scene: SceneManager,
    resources: ResourceGroupManager,
    input: InputState,
    pending: VecDeque<InputEvent>,
    listeners: Vec<Box<dyn FrameListener>>,
    window: Option<RenderWindow>,
    viewport: Option<Viewport>,
    stats: StatsTracker,
}

impl Root {
    pub fn new(config: Config) -> Self {
        log::trace!("instance of {}", std::any::type_name::<Self>());
        let mut resources = ResourceGroupManager::new();
        for location in &config.resources.locations {
            resources.add_resource_location(location);
        }
        Root {
            config,
            scene: SceneManager::new(MAIN_SCENE),
            resources,
            input: InputState::default(),
            pending: VecDeque::new(),
            listeners: Vec::new(),
            window: None,
            viewport: None,
            stats: StatsTracker::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn create_window(&mut self, title: &str) -> &RenderWindow {
        log::info!("render window '{}' requested", title);
        let config = &self.config.window;
        self.window
            .get_or_insert_with(|| RenderWindow::new(title, config))
    }

    pub fn window(&self) -> Option<&RenderWindow> {
        self.window.as_ref()
    }

    /// Binds the camera to the window and matches its aspect ratio.
    pub fn add_viewport(&mut self, camera: CameraId, background: Colour) -> Result<(), ButaiError> {
        let window = self.window.as_ref().ok_or(RenderError::NoViewport)?;
        let aspect = window.aspect_ratio();
        self.scene.camera_mut(camera)?.set_aspect_ratio(aspect);
        self.viewport = Some(Viewport { camera, background });
        Ok(())
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn set_background(&mut self, background: Colour) {
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.background = background;
        }
    }

    pub fn scene(&self) -> &SceneManager {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneManager {
        &mut self.scene
    }

    pub fn resources(&self) -> &ResourceGroupManager {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceGroupManager {
        &mut self.resources
    }

    pub fn scene_and_resources(&mut self) -> (&mut SceneManager, &mut ResourceGroupManager) {
        (&mut self.scene, &mut self.resources)
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn stats(&self) -> &crate::debug::fps::FrameStats {
        self.stats.stats()
    }

    /// Loads `mesh` and attaches a new entity to a new child of `parent`, both named `name`.
    pub fn create_entity(
        &mut self,
        name: &str,
        mesh: &str,
        parent: NodeId,
        position: crate::math::Vec3,
    ) -> Result<(NodeId, EntityId), ButaiError> {
        let mesh = self.resources.load_mesh(mesh)?;
        let entity = self.scene.create_entity(name, mesh)?;
        let node = self.scene.create_child_scene_node(parent, name, position)?;
        self.scene.attach_object(node, Movable::Entity(entity))?;
        Ok((node, entity))
    }

    pub fn add_frame_listener<L: FrameListener + 'static>(&mut self, listener: L) {
        self.listeners.push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn inject(&mut self, event: InputEvent) {
        self.pending.push_back(event);
    }

    pub fn inject_all<I: IntoIterator<Item = InputEvent>>(&mut self, events: I) {
        self.pending.extend(events);
    }

    /// Forgets held keys and buttons, e.g. when the window loses focus.
    pub fn release_input(&mut self) {
        self.pending.clear();
        self.input.release_all();
    }

    fn dispatch(
        &mut self,
        listeners: &mut [Box<dyn FrameListener>],
        event: InputEvent,
    ) -> Result<(), ButaiError> {
        if !self.input.apply(&event) {
            return Ok(());
        }
        let mut ctx = FrameContext {
            scene: &mut self.scene,
            resources: &mut self.resources,
            input: &self.input,
            stats: self.stats.stats(),
        };
        for listener in listeners.iter_mut() {
            match &event {
                InputEvent::KeyPressed(key) => {
                    listener.key_pressed(&mut ctx, &KeyEvent { key: *key })?
                }
                InputEvent::KeyReleased(key) => {
                    listener.key_released(&mut ctx, &KeyEvent { key: *key })?
                }
                InputEvent::MouseMoved { rel_x, rel_y, rel_z } => {
                    let evt = ctx.input.mouse_event(*rel_x, *rel_y, *rel_z);
                    listener.mouse_moved(&mut ctx, &evt)?
                }
                InputEvent::MousePressed(button) => {
                    let evt = ctx.input.mouse_event(0.0, 0.0, 0.0);
                    listener.mouse_pressed(&mut ctx, &evt, *button)?
                }
                InputEvent::MouseReleased(button) => {
                    let evt: MouseEvent = ctx.input.mouse_event(0.0, 0.0, 0.0);
                    listener.mouse_released(&mut ctx, &evt, *button)?
                }
            }
        }
        Ok(())
    }

    fn run_frame(
        &mut self,
        listeners: &mut [Box<dyn FrameListener>],
        dt: f32,
    ) -> Result<bool, ButaiError> {
        while let Some(event) = self.pending.pop_front() {
            self.dispatch(listeners, event)?;
        }

        let evt = FrameEvent {
            time_since_last_frame: dt,
            time_since_last_event: dt,
        };
        let mut ctx = FrameContext {
            scene: &mut self.scene,
            resources: &mut self.resources,
            input: &self.input,
            stats: self.stats.stats(),
        };
        for listener in listeners.iter_mut() {
            if !listener.frame_started(&mut ctx, &evt)? {
                return Ok(false);
            }
        }
        for listener in listeners.iter_mut() {
            if !listener.frame_ended(&mut ctx, &evt)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Runs one frame of `dt` seconds: queued input first, then every
    /// listener's `frame_started` and `frame_ended`. Returns false once a
    /// listener asks to stop.
    pub fn step(&mut self, dt: f32) -> Result<bool, ButaiError> {
        let mut listeners = mem::take(&mut self.listeners);
        let result = self.run_frame(&mut listeners, dt);
        listeners.append(&mut self.listeners);
        self.listeners = listeners;

        if let Some(fps) = self.stats.record(dt) {
            let stats = self.stats.stats();
            log::info!(
                "fps {:.1} (avg {:.1}, best {:.1}, worst {:.1}), {} batches",
                fps,
                stats.avg_fps,
                stats.best_fps,
                stats.worst_fps,
                stats.batch_count
            );
        }
        result
    }

    pub(crate) fn record_batches(&mut self, batches: usize) {
        self.stats.set_batch_count(batches);
    }

    pub(crate) fn viewport_camera(&self) -> Result<CameraId, SceneError> {
        self.viewport
            .map(|v| v.camera)
            .ok_or(SceneError::InvalidParameters("no viewport".to_owned()))
    }

    /// Opens the window and renders until a listener stops the loop.
    pub fn start_rendering(&mut self) -> Result<(), ButaiError> {
        if self.viewport.is_none() {
            return Err(RenderError::NoViewport.into());
        }
        crate::engine::State::run_loop(self)
    }
}

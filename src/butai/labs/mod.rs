//! Scene setup for each lecture lab and the shared start-up path of the
//! lab binaries.

pub mod game_framework;
pub mod light;
pub mod move_professor_ninja;
pub mod professor_chase;
pub mod professor_ninja;
pub mod render_window;
pub mod walking_professor;

use crate::config::{self, Config, ConfigSource};
use crate::debug::logging;
use crate::error::ButaiError;
use crate::math::Vec3;
use crate::root::Root;
use crate::scene::material::Colour;
use crate::scene::node::CameraId;
use crate::setup;

/// Deep blue most labs clear the viewport with.
pub const NAVY: Colour = Colour::rgb(0.0, 0.0, 0.5);

/// Parses the command line, starts logging, lets `setup` build the scene
/// and renders until a listener stops.
pub fn run<F>(name: &str, title: &str, setup: F) -> Result<(), ButaiError>
where
    F: FnOnce(&mut Root) -> Result<(), ButaiError>,
{
    let matches = config::cli_app(name).get_matches();
    let (config, source) = Config::from_matches(&matches)?;
    let _log = logging::init(&config.log)?;
    match &source {
        ConfigSource::File(path) => log::info!("configuration read from {}", path.display()),
        ConfigSource::Defaults(path) => log::warn!(
            "{} not found, running with the default configuration",
            path.display()
        ),
    }

    let mut root = Root::new(config);
    root.create_window(title);
    setup(&mut root)?;
    log::info!("{} set up with {} frame listeners", name, root.listener_count());
    root.start_rendering()
}

/// Where the lab camera stands and what it looks at.
#[derive(Debug, Clone, Copy)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
    pub near: Option<f32>,
}

impl CameraPose {
    pub fn new(eye: Vec3, target: Vec3) -> Self {
        CameraPose {
            eye,
            target,
            near: None,
        }
    }

    pub fn with_near(mut self, near: f32) -> Self {
        self.near = Some(near);
        self
    }
}

/// Creates the camera, points it and binds it to the window viewport.
pub fn main_camera(
    root: &mut Root,
    name: &str,
    pose: CameraPose,
    background: Colour,
) -> Result<CameraId, ButaiError> {
    let scene = root.scene_mut();
    let camera = scene.create_camera(name)?;
    scene.camera_mut(camera)?.set_position(pose.eye);
    scene.camera_look_at(camera, pose.target)?;
    if let Some(near) = pose.near {
        scene.camera_mut(camera)?.set_near_clip_distance(near);
    }
    root.add_viewport(camera, background)?;
    Ok(camera)
}

/// White ambient light with the axes marker and the grid.
pub(crate) fn bright_world(root: &mut Root) -> Result<(), ButaiError> {
    root.resources_mut().initialise_all_resource_groups();
    root.scene_mut().set_ambient_light(Colour::WHITE);
    let (scene, resources) = root.scene_and_resources();
    setup::draw_axes(scene, resources)?;
    setup::draw_grid_plane(scene)?;
    Ok(())
}

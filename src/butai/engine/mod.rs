pub mod cache;
mod queue;

use crate::engine::cache::SceneCache;
use crate::debug::tracing::{self, Tracer};
use crate::engine::queue::QueueFamilyIndices;
use crate::error::{ButaiError, RenderError};
use crate::frame::geometry::GeometryDrawSystem;
use crate::frame::system::FrameSystem;
use crate::frame::Pass;
use crate::root::input::{InputEvent, WHEEL_DELTA};
use crate::root::{RenderWindow, Root};
use crate::scene::lights::PackedLight;
use std::sync::Arc;
use std::time::{Duration, Instant};
use vulkano::command_buffer::DynamicState;
use vulkano::device::{Device, DeviceExtensions, Features, Queue};
use vulkano::format::Format;
use vulkano::image::{ImageUsage, SwapchainImage};
use vulkano::instance::{
    debug::DebugCallback, debug::MessageSeverity, debug::MessageType, layers_list, ApplicationInfo,
    Instance, InstanceExtensions, PhysicalDevice, Version,
};
use vulkano::pipeline::viewport::Viewport;
use vulkano::swapchain;
use vulkano::swapchain::AcquireError;
use vulkano::swapchain::{
    Capabilities, ColorSpace, FullscreenExclusive, PresentMode, SupportedPresentModes, Surface,
    Swapchain,
};
use vulkano::sync;
use vulkano::sync::{FlushError, GpuFuture, SharingMode};
use vulkano_win::VkSurfaceBuild;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, Event, MouseScrollDelta, WindowEvent};
use winit::event_loop::ControlFlow;
use winit::event_loop::EventLoop;
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::{Fullscreen, Window, WindowBuilder};

fn device_extensions() -> DeviceExtensions {
    DeviceExtensions {
        khr_swapchain: true,
        ..DeviceExtensions::none()
    }
}

#[cfg(debug_assertions)]
const ENABLE_VALIDATION_LAYERS: bool = true;
#[cfg(not(debug_assertions))]
const ENABLE_VALIDATION_LAYERS: bool = false;

const VALIDATION_LAYERS: &[&str] = &["VK_LAYER_KHRONOS_validation"];

/// Longest frame fed to the listeners, so a stall does not teleport
/// anything walking.
const MAX_FRAME_TIME: f32 = 0.25;

/// The GPU side of a running lab: device, swapchain and render systems.
pub struct State {
    instance: Arc<Instance>,
    #[allow(dead_code)]
    debug_callback: Option<DebugCallback>,
    physical_device_index: usize,
    device: Arc<Device>,
    graphics_queue: Arc<Queue>,
    present_queue: Arc<Queue>,
    surface: Arc<Surface<Window>>,
    vsync: bool,
    swap_chain: Arc<Swapchain<Window>>,
    swap_chain_images: Vec<Arc<SwapchainImage<Window>>>,
    dynamic_state: DynamicState,
    previous_frame_end: Option<Box<dyn GpuFuture>>,
    recreate_swap_chain: bool,
    scene_cache: SceneCache,
    upload_tracer: Tracer,
    frame_system: FrameSystem,
    geometry_draw_system: GeometryDrawSystem,
}

impl State {
    fn init(
        surface: Arc<Surface<Window>>,
        instance: Arc<Instance>,
        vsync: bool,
    ) -> Result<Self, RenderError> {
        let debug_callback = Self::setup_debug_callback(&instance);

        let physical_device_index = Self::pick_physical_device(&instance, &surface)?;
        let (device, graphics_queue, present_queue) =
            Self::create_logical_device(physical_device_index, &instance, &surface)?;
        let mut dynamic_state = DynamicState::none();

        let (swap_chain, swap_chain_images) = Self::create_swap_chain(
            &instance,
            &surface,
            physical_device_index,
            &device,
            &graphics_queue,
            &present_queue,
            vsync,
            None,
            &mut dynamic_state,
        )?;

        let dimensions = swap_chain.dimensions();
        let frame_system =
            FrameSystem::new(graphics_queue.clone(), swap_chain.format(), dimensions)?;
        let geometry_draw_system =
            GeometryDrawSystem::new(graphics_queue.clone(), frame_system.deferred_subpass()?)?;
        let scene_cache = SceneCache::new(graphics_queue.clone())?;

        let previous_frame_end = Some(sync::now(device.clone()).boxed());

        Ok(State {
            instance,
            debug_callback,
            physical_device_index,
            device,
            graphics_queue,
            present_queue,
            surface,
            vsync,
            swap_chain,
            swap_chain_images,
            dynamic_state,
            previous_frame_end,
            recreate_swap_chain: false,
            scene_cache,
            upload_tracer: Tracer::new("scene upload", Duration::from_secs(5)),
            frame_system,
            geometry_draw_system,
        })
    }

    fn init_loop(
        instance: &Arc<Instance>,
        window: &RenderWindow,
    ) -> Result<(EventLoop<()>, Arc<Surface<Window>>), RenderError> {
        let events_loop = EventLoop::new();
        let mut builder = WindowBuilder::new()
            .with_title(window.title.clone())
            .with_inner_size(LogicalSize::new(
                f64::from(window.width),
                f64::from(window.height),
            ));
        if window.fullscreen {
            builder = builder.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        let surface = builder.build_vk_surface(&events_loop, instance.clone())?;
        Ok((events_loop, surface))
    }

    fn create_instance() -> Result<Arc<Instance>, RenderError> {
        let validation = ENABLE_VALIDATION_LAYERS && Self::check_validation_layer_support();
        if ENABLE_VALIDATION_LAYERS && !validation {
            log::warn!("validation layers requested, but not available");
        }
        let app_info = ApplicationInfo {
            application_name: Some("Butai".into()),
            application_version: Some(Version {
                major: 0,
                minor: 1,
                patch: 0,
            }),
            engine_name: Some("Butai".into()),
            engine_version: Some(Version {
                major: 0,
                minor: 1,
                patch: 0,
            }),
        };
        let required_extensions = Self::get_required_extensions(validation);
        let instance = if validation {
            Instance::new(
                Some(&app_info),
                &required_extensions,
                VALIDATION_LAYERS.iter().cloned(),
            )?
        } else {
            Instance::new(Some(&app_info), &required_extensions, None)?
        };
        Ok(instance)
    }

    fn pick_physical_device(
        instance: &Arc<Instance>,
        surface: &Arc<Surface<Window>>,
    ) -> Result<usize, RenderError> {
        let index = PhysicalDevice::enumerate(instance)
            .position(|device| Self::is_device_suitable(&device, surface))
            .ok_or(RenderError::NoDevice)?;
        if let Some(device) = PhysicalDevice::from_index(instance, index) {
            log::info!("rendering on {}", device.name());
        }
        Ok(index)
    }

    fn create_logical_device(
        physical_device_idx: usize,
        instance: &Arc<Instance>,
        surface: &Arc<Surface<Window>>,
    ) -> Result<(Arc<Device>, Arc<Queue>, Arc<Queue>), RenderError> {
        let physical_device =
            PhysicalDevice::from_index(instance, physical_device_idx).ok_or(RenderError::NoDevice)?;
        let indices = Self::find_queue_families(surface, &physical_device);

        let queue_priority = 1.0;
        let queue_families = indices
            .unique()
            .into_iter()
            .filter_map(|i| physical_device.queue_families().nth(i))
            .map(|family| (family, queue_priority));

        let (device, mut queues) = Device::new(
            physical_device,
            &Features::none(),
            &device_extensions(),
            queue_families,
        )?;
        let graphics_queue = queues.next().ok_or(RenderError::NoDevice)?;
        let present_queue = queues.next().unwrap_or_else(|| graphics_queue.clone());
        Ok((device, graphics_queue, present_queue))
    }

    fn check_device_support_extension(device: &PhysicalDevice) -> bool {
        let available_extensions = DeviceExtensions::supported_by_device(*device);
        let device_extensions = device_extensions();
        available_extensions.intersection(&device_extensions) == device_extensions
    }

    fn is_device_suitable(device: &PhysicalDevice, surface: &Arc<Surface<Window>>) -> bool {
        let indices = Self::find_queue_families(surface, device);
        let extension_supported = Self::check_device_support_extension(device);
        let swap_chain_adequate = extension_supported
            && surface
                .capabilities(*device)
                .map(|caps| {
                    !caps.supported_formats.is_empty() && caps.present_modes.iter().next().is_some()
                })
                .unwrap_or(false);
        indices.is_complete() && swap_chain_adequate
    }

    fn find_queue_families(
        surface: &Arc<Surface<Window>>,
        device: &PhysicalDevice,
    ) -> QueueFamilyIndices {
        let mut indices = QueueFamilyIndices::new();
        for (i, queue_family) in device.queue_families().enumerate() {
            if queue_family.supports_graphics() && indices.graphics_family.is_none() {
                indices.graphics_family = Some(i);
            }
            if surface.is_supported(queue_family).unwrap_or(false)
                && indices.present_family.is_none()
            {
                indices.present_family = Some(i);
            }
            if indices.is_complete() {
                break;
            }
        }
        indices
    }

    #[allow(clippy::too_many_arguments)]
    fn create_swap_chain(
        instance: &Arc<Instance>,
        surface: &Arc<Surface<Window>>,
        physical_device_index: usize,
        device: &Arc<Device>,
        graphics_queue: &Arc<Queue>,
        present_queue: &Arc<Queue>,
        vsync: bool,
        old_swapchain: Option<Arc<Swapchain<Window>>>,
        dynamic_state: &mut DynamicState,
    ) -> Result<(Arc<Swapchain<Window>>, Vec<Arc<SwapchainImage<Window>>>), RenderError> {
        let physical_device =
            PhysicalDevice::from_index(instance, physical_device_index).ok_or(RenderError::NoDevice)?;
        let capabilities = surface.capabilities(physical_device)?;

        let surface_format = Self::choose_swap_surface_format(&capabilities.supported_formats)?;
        let present_mode = Self::choose_swap_present_mode(capabilities.present_modes, vsync);
        let extent = Self::choose_swap_extent(&capabilities, surface);

        let mut image_count = capabilities.min_image_count + 1;
        if let Some(max) = capabilities.max_image_count {
            image_count = image_count.min(max);
        }

        let alpha = capabilities
            .supported_composite_alpha
            .iter()
            .next()
            .ok_or(RenderError::Vulkan {
                what: "swapchain composite alpha",
                message: "surface supports no composite alpha mode".to_owned(),
            })?;

        let image_usage = ImageUsage {
            color_attachment: true,
            ..ImageUsage::none()
        };

        let indices = Self::find_queue_families(surface, &physical_device);
        let sharing: SharingMode = if indices.is_shared() {
            graphics_queue.into()
        } else {
            vec![graphics_queue, present_queue].as_slice().into()
        };

        let (swap_chain, images) = match old_swapchain {
            Some(old) => Swapchain::with_old_swapchain(
                device.clone(),
                surface.clone(),
                image_count,
                surface_format.0,
                extent,
                1,
                image_usage,
                sharing,
                capabilities.current_transform,
                alpha,
                present_mode,
                FullscreenExclusive::Default,
                true,
                ColorSpace::SrgbNonLinear,
                old,
            )?,
            None => Swapchain::new(
                device.clone(),
                surface.clone(),
                image_count,
                surface_format.0,
                extent,
                1,
                image_usage,
                sharing,
                capabilities.current_transform,
                alpha,
                present_mode,
                FullscreenExclusive::Default,
                true,
                ColorSpace::SrgbNonLinear,
            )?,
        };

        let swap_chain_extent = swap_chain.dimensions();
        dynamic_state.viewports = Some(vec![Viewport {
            origin: [0.0, 0.0],
            dimensions: [swap_chain_extent[0] as f32, swap_chain_extent[1] as f32],
            depth_range: 0.0..1.0,
        }]);

        Ok((swap_chain, images))
    }

    fn choose_swap_surface_format(
        available_formats: &[(Format, ColorSpace)],
    ) -> Result<(Format, ColorSpace), RenderError> {
        available_formats
            .iter()
            .find(|(format, color_space)| {
                *format == Format::B8G8R8A8Srgb && *color_space == ColorSpace::SrgbNonLinear
            })
            .or_else(|| available_formats.first())
            .copied()
            .ok_or(RenderError::Vulkan {
                what: "swapchain format",
                message: "surface reports no formats".to_owned(),
            })
    }

    fn choose_swap_present_mode(
        available_present_modes: SupportedPresentModes,
        vsync: bool,
    ) -> PresentMode {
        if vsync {
            PresentMode::Fifo
        } else if available_present_modes.mailbox {
            PresentMode::Mailbox
        } else if available_present_modes.immediate {
            PresentMode::Immediate
        } else {
            PresentMode::Fifo
        }
    }

    fn choose_swap_extent(capabilities: &Capabilities, surface: &Arc<Surface<Window>>) -> [u32; 2] {
        if let Some(current_extent) = capabilities.current_extent {
            current_extent
        } else {
            let actual_extent: [u32; 2] = surface.window().inner_size().into();
            [
                capabilities.min_image_extent[0]
                    .max(capabilities.max_image_extent[0].min(actual_extent[0])),
                capabilities.min_image_extent[1]
                    .max(capabilities.max_image_extent[1].min(actual_extent[1])),
            ]
        }
    }

    fn check_validation_layer_support() -> bool {
        let layers: Vec<String> = match layers_list() {
            Ok(layers) => layers.map(|l| l.name().to_owned()).collect(),
            Err(_) => return false,
        };
        VALIDATION_LAYERS
            .iter()
            .all(|layer_name| layers.iter().any(|l| l == layer_name))
    }

    fn get_required_extensions(validation: bool) -> InstanceExtensions {
        let mut extensions = vulkano_win::required_extensions();
        if validation {
            extensions.ext_debug_utils = true;
        }
        extensions
    }

    fn setup_debug_callback(instance: &Arc<Instance>) -> Option<DebugCallback> {
        if !ENABLE_VALIDATION_LAYERS {
            return None;
        }
        let msg_severity = MessageSeverity {
            error: true,
            warning: true,
            information: false,
            verbose: false,
        };
        DebugCallback::new(instance, msg_severity, MessageType::all(), |msg| {
            if msg.severity.error {
                log::error!("vulkan: {}", msg.description);
            } else {
                log::warn!("vulkan: {}", msg.description);
            }
        })
        .ok()
    }

    fn recreate_swap_chain(&mut self) -> Result<(), RenderError> {
        let (swap_chain, images) = Self::create_swap_chain(
            &self.instance,
            &self.surface,
            self.physical_device_index,
            &self.device,
            &self.graphics_queue,
            &self.present_queue,
            self.vsync,
            Some(self.swap_chain.clone()),
            &mut self.dynamic_state,
        )?;

        if swap_chain.format() != self.swap_chain.format() {
            self.frame_system
                .recreate_render_pass(swap_chain.format(), swap_chain.dimensions())?;
            self.geometry_draw_system = GeometryDrawSystem::new(
                self.graphics_queue.clone(),
                self.frame_system.deferred_subpass()?,
            )?;
        }
        self.swap_chain = swap_chain;
        self.swap_chain_images = images;
        Ok(())
    }

    fn aspect_ratio(&self) -> f32 {
        let [width, height] = self.swap_chain.dimensions();
        width as f32 / height.max(1) as f32
    }

    /// Runs the lab's frame listeners, then renders what they left in the
    /// scene. Returns false once a listener stops the loop.
    fn draw_frame(&mut self, root: &mut Root, dt: f32) -> Result<bool, ButaiError> {
        if let Some(previous) = self.previous_frame_end.as_mut() {
            previous.cleanup_finished();
        }

        if !root.step(dt)? {
            return Ok(false);
        }

        if self.recreate_swap_chain {
            log::trace!("recreate_swap_chain");
            tracing::timed("swapchain recreation", || self.recreate_swap_chain())?;
            let camera = root.viewport_camera()?;
            let aspect_ratio = self.aspect_ratio();
            root.scene_mut()
                .camera_mut(camera)?
                .set_aspect_ratio(aspect_ratio);
            self.recreate_swap_chain = false;
        }

        let (image_num, suboptimal, acquire_future) =
            match swapchain::acquire_next_image(self.swap_chain.clone(), None) {
                Ok(r) => r,
                Err(AcquireError::OutOfDate) => {
                    self.recreate_swap_chain = true;
                    return Ok(true);
                }
                Err(e) => {
                    return Err(RenderError::Vulkan {
                        what: "acquire next image",
                        message: e.to_string(),
                    }
                    .into())
                }
            };
        if suboptimal {
            self.recreate_swap_chain = true;
        }

        let background = root
            .viewport()
            .map(|v| v.background.to_array())
            .ok_or(RenderError::NoViewport)?;
        let camera = root.viewport_camera()?;
        let snapshot = root.scene_mut().snapshot(camera)?;
        let scene_cache = &mut self.scene_cache;
        let batches = self
            .upload_tracer
            .run(|| scene_cache.prepare(&snapshot, root.resources_mut()))?;
        root.record_batches(batches.len());

        let future = self
            .previous_frame_end
            .take()
            .unwrap_or_else(|| sync::now(self.device.clone()).boxed())
            .join(acquire_future);

        let mut after_future = None;
        let mut frame = self.frame_system.frame(
            future,
            self.swap_chain_images[image_num].clone(),
            background,
            self.dynamic_state.clone(),
        )?;

        while let Some(pass) = frame.next_pass()? {
            match pass {
                Pass::Deferred(mut draw_pass) => {
                    let cb = self.geometry_draw_system.draw(
                        &snapshot.matrices,
                        &batches,
                        draw_pass.dynamic_state(),
                    )?;
                    draw_pass.execute(cb)?;
                }
                Pass::Lighting(mut lighting) => {
                    lighting.ambient_light(snapshot.ambient)?;
                    for light in &snapshot.lights {
                        match *light {
                            PackedLight::Directional { direction, color } => {
                                lighting.directional_light(direction, color)?
                            }
                            PackedLight::Point { position, color } => {
                                lighting.point_light(position, color)?
                            }
                            PackedLight::Spot {
                                position,
                                direction,
                                color,
                                cos_inner,
                                cos_outer,
                            } => lighting
                                .spot_light(position, direction, color, cos_inner, cos_outer)?,
                        }
                    }
                }
                Pass::Finished(af) => {
                    after_future = Some(af);
                }
            }
        }

        let after_future = match after_future {
            Some(f) => f,
            None => return Ok(true),
        };
        let future = after_future
            .then_swapchain_present(
                self.graphics_queue.clone(),
                self.swap_chain.clone(),
                image_num,
            )
            .then_signal_fence_and_flush();

        match future {
            Ok(future) => {
                self.previous_frame_end = Some(future.boxed());
            }
            Err(FlushError::OutOfDate) => {
                self.recreate_swap_chain = true;
                self.previous_frame_end = Some(sync::now(self.device.clone()).boxed());
            }
            Err(e) => {
                log::warn!("failed to flush future: {:?}", e);
                self.previous_frame_end = Some(sync::now(self.device.clone()).boxed());
            }
        }
        Ok(true)
    }

    /// Opens the window described by the root's configuration and renders
    /// until a listener stops the loop or the window is closed.
    pub fn run_loop(root: &mut Root) -> Result<(), ButaiError> {
        let window = root.window().cloned().ok_or(RenderError::NoViewport)?;
        let instance = Self::create_instance()?;
        let (mut event_loop, surface) = Self::init_loop(&instance, &window)?;
        let mut state = Self::init(surface, instance, window.vsync)?;

        let camera = root.viewport_camera()?;
        let aspect_ratio = state.aspect_ratio();
        root.scene_mut()
            .camera_mut(camera)?
            .set_aspect_ratio(aspect_ratio);

        let mut failure: Option<ButaiError> = None;
        let mut last_frame = Instant::now();

        event_loop.run_return(|event, _, control_flow| {
            *control_flow = ControlFlow::Poll;
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,
                    WindowEvent::Resized(_) => state.recreate_swap_chain = true,
                    WindowEvent::Focused(false) => root.release_input(),
                    WindowEvent::KeyboardInput { input, .. } => {
                        if let Some(key) = input.virtual_keycode {
                            root.inject(InputEvent::key(key, input.state));
                        }
                    }
                    WindowEvent::MouseInput { state: pressed, button, .. } => {
                        root.inject(InputEvent::button(button.into(), pressed));
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let rel_z = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y * WHEEL_DELTA,
                            MouseScrollDelta::PixelDelta(p) => p.y as f32,
                        };
                        root.inject(InputEvent::MouseMoved {
                            rel_x: 0.0,
                            rel_y: 0.0,
                            rel_z,
                        });
                    }
                    _ => (),
                },
                Event::DeviceEvent {
                    event: DeviceEvent::MouseMotion { delta: (dx, dy) },
                    ..
                } => {
                    root.inject(InputEvent::MouseMoved {
                        rel_x: dx as f32,
                        rel_y: dy as f32,
                        rel_z: 0.0,
                    });
                }
                Event::RedrawEventsCleared => {
                    let now = Instant::now();
                    let dt = now
                        .duration_since(last_frame)
                        .as_secs_f32()
                        .min(MAX_FRAME_TIME);
                    last_frame = now;

                    match state.draw_frame(root, dt) {
                        Ok(true) => (),
                        Ok(false) => {
                            log::info!("frame listener requested exit");
                            *control_flow = ControlFlow::Exit;
                        }
                        Err(e) => {
                            failure = Some(e);
                            *control_flow = ControlFlow::Exit;
                        }
                    }
                }
                _ => (),
            }
        });

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

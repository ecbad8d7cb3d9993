use crate::error::{RenderError, VkResultExt};
use crate::frame::system::FrameSystem;
use crate::math::Vec3;
use crate::scene::material::Colour;
use std::sync::Arc;
use vulkano::command_buffer::AutoCommandBufferBuilder;
use vulkano::command_buffer::CommandBuffer;
use vulkano::command_buffer::DynamicState;
use vulkano::command_buffer::SubpassContents;
use vulkano::framebuffer::FramebufferAbstract;
use vulkano::sync::GpuFuture;

/// A frame being recorded. Walk it with `next_pass` until `Pass::Finished`.
pub struct Frame<'a> {
    pub system: &'a mut FrameSystem,

    // 0 before drawing, 1 once the scene is in the G-buffer, 2 once lit.
    pub num_pass: u8,

    pub before_main_cb_future: Option<Box<dyn GpuFuture>>,
    #[allow(dead_code)]
    pub framebuffer: Arc<dyn FramebufferAbstract + Send + Sync>,
    pub command_buffer_builder: Option<AutoCommandBufferBuilder>,
    pub dynamic_state: DynamicState,
}

fn finished_frame() -> RenderError {
    RenderError::Vulkan {
        what: "frame recording",
        message: "the frame was already submitted".to_owned(),
    }
}

impl<'a> Frame<'a> {
    fn builder(&mut self) -> Result<&mut AutoCommandBufferBuilder, RenderError> {
        self.command_buffer_builder.as_mut().ok_or_else(finished_frame)
    }

    pub fn next_pass<'f>(&'f mut self) -> Result<Option<Pass<'f, 'a>>, RenderError> {
        let current_pass = self.num_pass;
        self.num_pass = self.num_pass.saturating_add(1);
        match current_pass {
            0 => Ok(Some(Pass::Deferred(DrawPass { frame: self }))),
            1 => {
                self.builder()?
                    .next_subpass(SubpassContents::SecondaryCommandBuffers)
                    .vk("next subpass")?;
                Ok(Some(Pass::Lighting(LightingPass { frame: self })))
            }
            2 => {
                let mut builder = self.command_buffer_builder.take().ok_or_else(finished_frame)?;
                builder.end_render_pass().vk("end render pass")?;
                let command_buffer = builder.build().vk("command buffer build")?;

                let after_main_cb = self
                    .before_main_cb_future
                    .take()
                    .ok_or_else(finished_frame)?
                    .then_execute(self.system.gfx_queue.clone(), command_buffer)
                    .vk("command buffer execution")?;
                Ok(Some(Pass::Finished(Box::new(after_main_cb))))
            }
            _ => Ok(None),
        }
    }
}

pub enum Pass<'f, 's: 'f> {
    /// Draw the scene into the G-buffer.
    Deferred(DrawPass<'f, 's>),
    /// Add light sources on top of the G-buffer.
    Lighting(LightingPass<'f, 's>),
    /// The future that completes once the image is drawn.
    Finished(Box<dyn GpuFuture>),
}

pub struct DrawPass<'f, 's: 'f> {
    frame: &'f mut Frame<'s>,
}

impl<'f, 's: 'f> DrawPass<'f, 's> {
    pub fn dynamic_state(&self) -> &DynamicState {
        &self.frame.dynamic_state
    }

    /// Appends a secondary command buffer recorded for the deferred subpass.
    pub fn execute<C>(&mut self, command_buffer: C) -> Result<(), RenderError>
    where
        C: CommandBuffer + Send + Sync + 'static,
    {
        // Secondary buffers come from pipelines built for this subpass.
        unsafe {
            self.frame
                .builder()?
                .execute_commands(command_buffer)
                .vk("execute deferred commands")?;
        }
        Ok(())
    }
}

pub struct LightingPass<'f, 's: 'f> {
    frame: &'f mut Frame<'s>,
}

impl<'f, 's: 'f> LightingPass<'f, 's> {
    fn execute<C>(&mut self, command_buffer: C) -> Result<(), RenderError>
    where
        C: CommandBuffer + Send + Sync + 'static,
    {
        unsafe {
            self.frame
                .builder()?
                .execute_commands(command_buffer)
                .vk("execute lighting commands")?;
        }
        Ok(())
    }

    /// Writes every drawn pixel as its albedo times `color`; self-lit pixels
    /// keep their full albedo.
    pub fn ambient_light(&mut self, color: Colour) -> Result<(), RenderError> {
        let system = &*self.frame.system;
        let cb = system.lighting_system.ambient.draw(
            &system.gbuffer,
            color,
            &self.frame.dynamic_state,
        )?;
        self.execute(cb)
    }

    /// Adds light coming from `direction`, in world coordinates.
    pub fn directional_light(&mut self, direction: Vec3, color: [f32; 3]) -> Result<(), RenderError> {
        let system = &*self.frame.system;
        let cb = system.lighting_system.directional.draw(
            &system.gbuffer,
            direction,
            color,
            &self.frame.dynamic_state,
        )?;
        self.execute(cb)
    }

    /// Adds light radiating from `position`.
    pub fn point_light(&mut self, position: Vec3, color: [f32; 3]) -> Result<(), RenderError> {
        let system = &*self.frame.system;
        let cb = system.lighting_system.point.draw(
            &system.gbuffer,
            position,
            None,
            color,
            &self.frame.dynamic_state,
        )?;
        self.execute(cb)
    }

    /// Adds a cone of light; the cosines bound the soft edge of the cone.
    pub fn spot_light(
        &mut self,
        position: Vec3,
        direction: Vec3,
        color: [f32; 3],
        cos_inner: f32,
        cos_outer: f32,
    ) -> Result<(), RenderError> {
        let system = &*self.frame.system;
        let cb = system.lighting_system.point.draw(
            &system.gbuffer,
            position,
            Some((direction, cos_inner, cos_outer)),
            color,
            &self.frame.dynamic_state,
        )?;
        self.execute(cb)
    }
}

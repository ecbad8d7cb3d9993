use super::{additive_blend, gbuffer_set, screen_triangle, ScreenPipeline, ScreenVertex};
use crate::error::{RenderError, VkResultExt};
use crate::frame::system::GBuffer;
use crate::math::Vec3;
use std::sync::Arc;
use vulkano::buffer::CpuAccessibleBuffer;
use vulkano::command_buffer::AutoCommandBuffer;
use vulkano::command_buffer::AutoCommandBufferBuilder;
use vulkano::command_buffer::DynamicState;
use vulkano::device::Queue;
use vulkano::framebuffer::RenderPassAbstract;
use vulkano::framebuffer::Subpass;
use vulkano::pipeline::GraphicsPipeline;
use vulkano::pipeline::GraphicsPipelineAbstract;

/// Light from an infinitely distant source, such as the sun.
pub struct DirectionalLightingSystem {
    gfx_queue: Arc<Queue>,
    pipeline: Arc<ScreenPipeline>,
    vertex_buffer: Arc<CpuAccessibleBuffer<[ScreenVertex]>>,
}

impl DirectionalLightingSystem {
    pub fn new(
        gfx_queue: Arc<Queue>,
        subpass: Subpass<Arc<dyn RenderPassAbstract + Send + Sync + 'static>>,
    ) -> Result<DirectionalLightingSystem, RenderError> {
        let vs = super::vs::Shader::load(gfx_queue.device().clone())
            .vk("directional vertex shader")?;
        let fs =
            fs::Shader::load(gfx_queue.device().clone()).vk("directional fragment shader")?;

        let pipeline = Arc::new(
            GraphicsPipeline::start()
                .vertex_input_single_buffer::<ScreenVertex>()
                .vertex_shader(vs.main_entry_point(), ())
                .triangle_list()
                .viewports_dynamic_scissors_irrelevant(1)
                .fragment_shader(fs.main_entry_point(), ())
                .blend_collective(additive_blend())
                .render_pass(subpass)
                .build(gfx_queue.device().clone())
                .vk("directional pipeline")?,
        );
        let vertex_buffer = screen_triangle(&gfx_queue)?;

        Ok(DirectionalLightingSystem {
            gfx_queue,
            pipeline,
            vertex_buffer,
        })
    }

    /// Surfaces facing against `direction` receive `color`, scaled by the
    /// cosine between their normal and the light.
    pub fn draw(
        &self,
        gbuffer: &GBuffer,
        direction: Vec3,
        color: [f32; 3],
        dynamic_state: &DynamicState,
    ) -> Result<AutoCommandBuffer, RenderError> {
        let push_constants = fs::ty::PushData {
            color: [color[0], color[1], color[2], 1.0],
            direction: [direction.x, direction.y, direction.z, 0.0],
        };
        let set = gbuffer_set(&self.pipeline, gbuffer)?;

        let mut builder = AutoCommandBufferBuilder::secondary_graphics(
            self.gfx_queue.device().clone(),
            self.gfx_queue.family(),
            self.pipeline.clone().subpass(),
        )
        .vk("directional command buffer")?;
        builder
            .draw(
                self.pipeline.clone(),
                dynamic_state,
                self.vertex_buffer.clone(),
                set,
                push_constants,
            )
            .vk("directional draw")?;
        builder.build().vk("directional command buffer build")
    }
}

mod fs {
    vulkano_shaders::shader! {
        ty: "fragment",
        path: "src/butai/frame/shaders/directional.frag"
    }
}

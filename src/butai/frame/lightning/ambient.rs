use super::{gbuffer_set, screen_triangle, ScreenPipeline, ScreenVertex};
use crate::error::{RenderError, VkResultExt};
use crate::frame::system::GBuffer;
use crate::scene::material::Colour;
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

/// Writes the ambient term, replacing the cleared background wherever
/// something was drawn.
pub struct AmbientLightingSystem {
    gfx_queue: Arc<Queue>,
    pipeline: Arc<ScreenPipeline>,
    vertex_buffer: Arc<CpuAccessibleBuffer<[ScreenVertex]>>,
}

impl AmbientLightingSystem {
    pub fn new(
        gfx_queue: Arc<Queue>,
        subpass: Subpass<Arc<dyn RenderPassAbstract + Send + Sync + 'static>>,
    ) -> Result<AmbientLightingSystem, RenderError> {
        let vs = super::vs::Shader::load(gfx_queue.device().clone()).vk("ambient vertex shader")?;
        let fs = fs::Shader::load(gfx_queue.device().clone()).vk("ambient fragment shader")?;

        let pipeline = Arc::new(
            GraphicsPipeline::start()
                .vertex_input_single_buffer::<ScreenVertex>()
                .vertex_shader(vs.main_entry_point(), ())
                .triangle_list()
                .viewports_dynamic_scissors_irrelevant(1)
                .fragment_shader(fs.main_entry_point(), ())
                .render_pass(subpass)
                .build(gfx_queue.device().clone())
                .vk("ambient pipeline")?,
        );
        let vertex_buffer = screen_triangle(&gfx_queue)?;

        Ok(AmbientLightingSystem {
            gfx_queue,
            pipeline,
            vertex_buffer,
        })
    }

    pub fn draw(
        &self,
        gbuffer: &GBuffer,
        color: Colour,
        dynamic_state: &DynamicState,
    ) -> Result<AutoCommandBuffer, RenderError> {
        let push_constants = fs::ty::PushData {
            color: [color.r, color.g, color.b, 1.0],
        };
        let set = gbuffer_set(&self.pipeline, gbuffer)?;

        let mut builder = AutoCommandBufferBuilder::secondary_graphics(
            self.gfx_queue.device().clone(),
            self.gfx_queue.family(),
            self.pipeline.clone().subpass(),
        )
        .vk("ambient command buffer")?;
        builder
            .draw(
                self.pipeline.clone(),
                dynamic_state,
                self.vertex_buffer.clone(),
                set,
                push_constants,
            )
            .vk("ambient draw")?;
        builder.build().vk("ambient command buffer build")
    }
}

mod fs {
    vulkano_shaders::shader! {
        ty: "fragment",
        path: "src/butai/frame/shaders/ambient.frag"
    }
}

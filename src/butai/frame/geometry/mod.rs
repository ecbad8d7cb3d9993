use crate::engine::cache::DrawBatch;
use crate::error::{RenderError, VkResultExt};
use crate::figure::{PerVertexParams, Topology};
use crate::frame::MeshPipeline;
use crate::scene::camera::CameraMatrices;
use std::sync::Arc;
use vulkano::buffer::BufferUsage;
use vulkano::buffer::CpuAccessibleBuffer;
use vulkano::command_buffer::AutoCommandBuffer;
use vulkano::command_buffer::AutoCommandBufferBuilder;
use vulkano::command_buffer::DynamicState;
use vulkano::descriptor::descriptor_set::PersistentDescriptorSet;
use vulkano::device::Queue;
use vulkano::framebuffer::RenderPassAbstract;
use vulkano::framebuffer::Subpass;
use vulkano::pipeline::GraphicsPipeline;
use vulkano::pipeline::GraphicsPipelineAbstract;
use vulkano::sampler::{Filter, MipmapMode, Sampler, SamplerAddressMode};

/// Draws scene meshes into the G-buffer.
///
/// Triangles and lines get their own pipelines; both are double sided.
pub struct GeometryDrawSystem {
    gfx_queue: Arc<Queue>,
    triangles: Arc<MeshPipeline>,
    lines: Arc<MeshPipeline>,
    sampler: Arc<Sampler>,
}

impl GeometryDrawSystem {
    pub fn new(
        gfx_queue: Arc<Queue>,
        subpass: Subpass<Arc<dyn RenderPassAbstract + Send + Sync + 'static>>,
    ) -> Result<GeometryDrawSystem, RenderError> {
        log::trace!("instance of {}", std::any::type_name::<Self>());
        let vs = vs::Shader::load(gfx_queue.device().clone()).vk("geometry vertex shader")?;
        let fs = fs::Shader::load(gfx_queue.device().clone()).vk("geometry fragment shader")?;

        let triangles = Arc::new(
            GraphicsPipeline::start()
                .vertex_input_single_buffer::<PerVertexParams>()
                .vertex_shader(vs.main_entry_point(), ())
                .triangle_list()
                .cull_mode_disabled()
                .viewports_dynamic_scissors_irrelevant(1)
                .fragment_shader(fs.main_entry_point(), ())
                .depth_stencil_simple_depth()
                .render_pass(subpass.clone())
                .build(gfx_queue.device().clone())
                .vk("triangle pipeline")?,
        );
        let lines = Arc::new(
            GraphicsPipeline::start()
                .vertex_input_single_buffer::<PerVertexParams>()
                .vertex_shader(vs.main_entry_point(), ())
                .line_list()
                .cull_mode_disabled()
                .viewports_dynamic_scissors_irrelevant(1)
                .fragment_shader(fs.main_entry_point(), ())
                .depth_stencil_simple_depth()
                .render_pass(subpass)
                .build(gfx_queue.device().clone())
                .vk("line pipeline")?,
        );

        let sampler = Sampler::new(
            gfx_queue.device().clone(),
            Filter::Linear,
            Filter::Linear,
            MipmapMode::Nearest,
            SamplerAddressMode::Repeat,
            SamplerAddressMode::Repeat,
            SamplerAddressMode::Repeat,
            0.0,
            1.0,
            0.0,
            1.0,
        )
        .vk("texture sampler")?;

        Ok(GeometryDrawSystem {
            gfx_queue,
            triangles,
            lines,
            sampler,
        })
    }

    fn pipeline(&self, topology: Topology) -> &Arc<MeshPipeline> {
        match topology {
            Topology::TriangleList => &self.triangles,
            Topology::LineList => &self.lines,
        }
    }

    /// Builds a secondary command buffer drawing every batch on the
    /// deferred subpass.
    pub fn draw(
        &self,
        matrices: &CameraMatrices,
        batches: &[DrawBatch],
        dynamic_state: &DynamicState,
    ) -> Result<AutoCommandBuffer, RenderError> {
        let camera = CpuAccessibleBuffer::from_data(
            self.gfx_queue.device().clone(),
            BufferUsage::uniform_buffer(),
            false,
            vs::ty::Camera {
                view: matrices.aligned_view_matrix(),
                projection: matrices.aligned_projection_matrix(),
            },
        )?;

        let mut builder = AutoCommandBufferBuilder::secondary_graphics(
            self.gfx_queue.device().clone(),
            self.gfx_queue.family(),
            self.triangles.clone().subpass(),
        )
        .vk("geometry command buffer")?;

        for batch in batches {
            let pipeline = self.pipeline(batch.mesh.topology);
            let layout = pipeline
                .layout()
                .descriptor_set_layout(0)
                .ok_or(RenderError::Vulkan {
                    what: "geometry descriptor layout",
                    message: "pipeline has no set 0".to_owned(),
                })?;
            let set = PersistentDescriptorSet::start(layout.clone())
                .add_buffer(camera.clone())
                .vk("bind camera")?
                .add_sampled_image(batch.texture.clone(), self.sampler.clone())
                .vk("bind diffuse map")?
                .build()
                .vk("geometry descriptor set")?;
            let push_constants = vs::ty::PushData {
                model: batch.model,
                tint: batch.tint,
                params: batch.params,
            };

            match &batch.mesh.indices {
                Some(indices) => builder
                    .draw_indexed(
                        pipeline.clone(),
                        dynamic_state,
                        batch.mesh.vertices.clone(),
                        indices.clone(),
                        set,
                        push_constants,
                    )
                    .vk("indexed mesh draw")?,
                None => builder
                    .draw(
                        pipeline.clone(),
                        dynamic_state,
                        batch.mesh.vertices.clone(),
                        set,
                        push_constants,
                    )
                    .vk("mesh draw")?,
            };
        }

        builder.build().vk("geometry command buffer build")
    }
}

mod vs {
    vulkano_shaders::shader! {
        ty: "vertex",
        path: "src/butai/frame/shaders/geometry.vert"
    }
}

mod fs {
    vulkano_shaders::shader! {
        ty: "fragment",
        path: "src/butai/frame/shaders/geometry.frag"
    }
}

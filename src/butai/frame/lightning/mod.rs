mod ambient;
mod directional;
mod pointing;

pub use self::ambient::AmbientLightingSystem;
pub use self::directional::DirectionalLightingSystem;
pub use self::pointing::PointLightingSystem;

use crate::error::{RenderError, VkResultExt};
use crate::frame::system::GBuffer;
use std::sync::Arc;
use vulkano::buffer::BufferUsage;
use vulkano::buffer::CpuAccessibleBuffer;
use vulkano::descriptor::descriptor_set::PersistentDescriptorSet;
use vulkano::descriptor::DescriptorSet;
use vulkano::descriptor::PipelineLayoutAbstract;
use vulkano::device::Queue;
use vulkano::framebuffer::RenderPassAbstract;
use vulkano::framebuffer::Subpass;
use vulkano::pipeline::blend::AttachmentBlend;
use vulkano::pipeline::blend::BlendFactor;
use vulkano::pipeline::blend::BlendOp;
use vulkano::pipeline::vertex::SingleBufferDefinition;
use vulkano::pipeline::GraphicsPipeline;
use vulkano::pipeline::GraphicsPipelineAbstract;

pub type ScreenPipeline = GraphicsPipeline<
    SingleBufferDefinition<ScreenVertex>,
    Box<dyn PipelineLayoutAbstract + Send + Sync + 'static>,
    Arc<dyn RenderPassAbstract + Send + Sync + 'static>,
>;

#[derive(Default, Debug, Clone, Copy)]
pub struct ScreenVertex {
    position: [f32; 2],
}
vulkano::impl_vertex!(ScreenVertex, position);

/// One triangle that covers the whole viewport.
fn screen_triangle(
    gfx_queue: &Arc<Queue>,
) -> Result<Arc<CpuAccessibleBuffer<[ScreenVertex]>>, RenderError> {
    let vertices = [
        ScreenVertex {
            position: [-1.0, -1.0],
        },
        ScreenVertex {
            position: [-1.0, 3.0],
        },
        ScreenVertex {
            position: [3.0, -1.0],
        },
    ];
    Ok(CpuAccessibleBuffer::from_iter(
        gfx_queue.device().clone(),
        BufferUsage::vertex_buffer(),
        false,
        vertices.iter().cloned(),
    )?)
}

/// Adds each light on top of what is already in the final image.
fn additive_blend() -> AttachmentBlend {
    AttachmentBlend {
        enabled: true,
        color_op: BlendOp::Add,
        color_source: BlendFactor::One,
        color_destination: BlendFactor::One,
        alpha_op: BlendOp::Max,
        alpha_source: BlendFactor::One,
        alpha_destination: BlendFactor::One,
        mask_red: true,
        mask_green: true,
        mask_blue: true,
        mask_alpha: true,
    }
}

/// Binds the three G-buffer colour images as input attachments 0..2.
fn gbuffer_set(
    pipeline: &Arc<ScreenPipeline>,
    gbuffer: &GBuffer,
) -> Result<Arc<dyn DescriptorSet + Send + Sync>, RenderError> {
    let layout = pipeline
        .layout()
        .descriptor_set_layout(0)
        .ok_or(RenderError::Vulkan {
            what: "lighting descriptor layout",
            message: "pipeline has no set 0".to_owned(),
        })?;
    let set = PersistentDescriptorSet::start(layout.clone())
        .add_image(gbuffer.position.clone())
        .vk("bind position input")?
        .add_image(gbuffer.normals.clone())
        .vk("bind normal input")?
        .add_image(gbuffer.albedo.clone())
        .vk("bind albedo input")?
        .build()
        .vk("lighting descriptor set")?;
    Ok(Arc::new(set))
}

/// The lighting subpass: one ambient write, then one additive pass per light.
pub struct LightingSystem {
    pub ambient: AmbientLightingSystem,
    pub directional: DirectionalLightingSystem,
    pub point: PointLightingSystem,
}

impl LightingSystem {
    pub fn new(
        gfx_queue: Arc<Queue>,
        subpass: Subpass<Arc<dyn RenderPassAbstract + Send + Sync + 'static>>,
    ) -> Result<LightingSystem, RenderError> {
        log::trace!("instance of {}", std::any::type_name::<Self>());
        Ok(LightingSystem {
            ambient: AmbientLightingSystem::new(gfx_queue.clone(), subpass.clone())?,
            directional: DirectionalLightingSystem::new(gfx_queue.clone(), subpass.clone())?,
            point: PointLightingSystem::new(gfx_queue, subpass)?,
        })
    }
}

mod vs {
    vulkano_shaders::shader! {
        ty: "vertex",
        path: "src/butai/frame/shaders/fullscreen.vert"
    }
}

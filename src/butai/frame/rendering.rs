use crate::error::{RenderError, VkResultExt};
use std::sync::Arc;
use vulkano::device::Queue;
use vulkano::format::ClearValue;
use vulkano::format::Format;
use vulkano::framebuffer::RenderPass;
use vulkano::framebuffer::RenderPassAbstract;
use vulkano::framebuffer::{
    AttachmentDescription, LoadOp, PassDependencyDescription, PassDescription, RenderPassDesc,
    RenderPassDescClearValues, StoreOp,
};
use vulkano::image::ImageLayout;
use vulkano::sync::AccessFlagBits;
use vulkano::sync::PipelineStages;

pub const POSITION_FORMAT: Format = Format::R16G16B16A16Sfloat;
pub const NORMAL_FORMAT: Format = Format::R16G16B16A16Sfloat;
pub const ALBEDO_FORMAT: Format = Format::R8G8B8A8Unorm;
pub const DEPTH_FORMAT: Format = Format::D16Unorm;

/// Attachment order of the G-buffer render pass; framebuffers must add
/// their images in this order.
pub const POSITION: usize = 0;
pub const NORMAL: usize = 1;
pub const ALBEDO: usize = 2;
pub const FINAL_COLOR: usize = 3;
pub const DEPTH: usize = 4;

struct GBufferPassDesc {
    attachments: Vec<AttachmentDescription>,
    subpasses: Vec<PassDescription>,
    dependencies: Vec<PassDependencyDescription>,
}

unsafe impl RenderPassDesc for GBufferPassDesc {
    #[inline]
    fn num_attachments(&self) -> usize {
        self.attachments.len()
    }

    #[inline]
    fn attachment_desc(&self, id: usize) -> Option<AttachmentDescription> {
        self.attachments.get(id).cloned()
    }

    #[inline]
    fn num_subpasses(&self) -> usize {
        self.subpasses.len()
    }

    #[inline]
    fn subpass_desc(&self, id: usize) -> Option<PassDescription> {
        self.subpasses.get(id).cloned()
    }

    #[inline]
    fn num_dependencies(&self) -> usize {
        self.dependencies.len()
    }

    #[inline]
    fn dependency_desc(&self, id: usize) -> Option<PassDependencyDescription> {
        self.dependencies.get(id).cloned()
    }
}

unsafe impl RenderPassDescClearValues<Vec<ClearValue>> for GBufferPassDesc {
    fn convert_clear_values(&self, values: Vec<ClearValue>) -> Box<dyn Iterator<Item = ClearValue>> {
        Box::new(values.into_iter())
    }
}

fn gbuffer_attachment(format: Format) -> AttachmentDescription {
    AttachmentDescription {
        format,
        samples: 1,
        load: LoadOp::Clear,
        store: StoreOp::DontCare,
        stencil_load: LoadOp::DontCare,
        stencil_store: StoreOp::DontCare,
        initial_layout: ImageLayout::Undefined,
        final_layout: ImageLayout::ColorAttachmentOptimal,
    }
}

/// Clear values in attachment order: empty G-buffer, the viewport
/// background and the far plane.
pub fn clear_values(background: [f32; 4]) -> Vec<ClearValue> {
    vec![
        ClearValue::Float([0.0, 0.0, 0.0, 0.0]),
        ClearValue::Float([0.0, 0.0, 0.0, 0.0]),
        ClearValue::Float([0.0, 0.0, 0.0, 0.0]),
        ClearValue::Float(background),
        ClearValue::Depth(1.0),
    ]
}

/// Two subpasses: the scene is drawn into the G-buffer, then every light
/// reads it back as input attachments and writes the final image.
pub fn build_render_pass(
    gfx_queue: &Arc<Queue>,
    final_output_format: Format,
) -> Result<Arc<dyn RenderPassAbstract + Send + Sync>, RenderError> {
    let attachments = vec![
        gbuffer_attachment(POSITION_FORMAT),
        gbuffer_attachment(NORMAL_FORMAT),
        gbuffer_attachment(ALBEDO_FORMAT),
        AttachmentDescription {
            format: final_output_format,
            samples: 1,
            load: LoadOp::Clear,
            store: StoreOp::Store,
            stencil_load: LoadOp::DontCare,
            stencil_store: StoreOp::DontCare,
            initial_layout: ImageLayout::Undefined,
            final_layout: ImageLayout::PresentSrc,
        },
        AttachmentDescription {
            format: DEPTH_FORMAT,
            samples: 1,
            load: LoadOp::Clear,
            store: StoreOp::DontCare,
            stencil_load: LoadOp::DontCare,
            stencil_store: StoreOp::DontCare,
            initial_layout: ImageLayout::Undefined,
            final_layout: ImageLayout::DepthStencilAttachmentOptimal,
        },
    ];

    let subpasses = vec![
        PassDescription {
            color_attachments: vec![
                (POSITION, ImageLayout::ColorAttachmentOptimal),
                (NORMAL, ImageLayout::ColorAttachmentOptimal),
                (ALBEDO, ImageLayout::ColorAttachmentOptimal),
            ],
            depth_stencil: Some((DEPTH, ImageLayout::DepthStencilAttachmentOptimal)),
            input_attachments: Vec::new(),
            resolve_attachments: Vec::new(),
            preserve_attachments: Vec::new(),
        },
        PassDescription {
            color_attachments: vec![(FINAL_COLOR, ImageLayout::ColorAttachmentOptimal)],
            depth_stencil: None,
            input_attachments: vec![
                (POSITION, ImageLayout::ShaderReadOnlyOptimal),
                (NORMAL, ImageLayout::ShaderReadOnlyOptimal),
                (ALBEDO, ImageLayout::ShaderReadOnlyOptimal),
            ],
            resolve_attachments: Vec::new(),
            preserve_attachments: Vec::new(),
        },
    ];

    let dependencies = vec![
        PassDependencyDescription {
            source_subpass: vk_sys::SUBPASS_EXTERNAL as usize,
            destination_subpass: 0,
            source_stages: PipelineStages {
                bottom_of_pipe: true,
                ..PipelineStages::none()
            },
            destination_stages: PipelineStages {
                color_attachment_output: true,
                ..PipelineStages::none()
            },
            source_access: AccessFlagBits {
                memory_read: true,
                ..AccessFlagBits::none()
            },
            destination_access: AccessFlagBits {
                color_attachment_read: true,
                color_attachment_write: true,
                ..AccessFlagBits::none()
            },
            by_region: true,
        },
        PassDependencyDescription {
            source_subpass: 0,
            destination_subpass: 1,
            source_stages: PipelineStages {
                color_attachment_output: true,
                ..PipelineStages::none()
            },
            destination_stages: PipelineStages {
                fragment_shader: true,
                ..PipelineStages::none()
            },
            source_access: AccessFlagBits {
                color_attachment_write: true,
                ..AccessFlagBits::none()
            },
            destination_access: AccessFlagBits {
                shader_read: true,
                ..AccessFlagBits::none()
            },
            by_region: true,
        },
        PassDependencyDescription {
            source_subpass: 1,
            destination_subpass: vk_sys::SUBPASS_EXTERNAL as usize,
            source_stages: PipelineStages {
                color_attachment_output: true,
                ..PipelineStages::none()
            },
            destination_stages: PipelineStages {
                bottom_of_pipe: true,
                ..PipelineStages::none()
            },
            source_access: AccessFlagBits {
                color_attachment_read: true,
                color_attachment_write: true,
                ..AccessFlagBits::none()
            },
            destination_access: AccessFlagBits {
                memory_read: true,
                ..AccessFlagBits::none()
            },
            by_region: true,
        },
    ];

    let description = GBufferPassDesc {
        attachments,
        subpasses,
        dependencies,
    };
    let render_pass =
        RenderPass::new(gfx_queue.device().clone(), description).vk("render pass creation")?;
    Ok(Arc::new(render_pass))
}

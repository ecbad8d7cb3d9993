use crate::error::{RenderError, VkResultExt};
use crate::frame::frame::Frame;
use crate::frame::lightning::LightingSystem;
use crate::frame::rendering::{self, build_render_pass};
use std::sync::Arc;
use vulkano::command_buffer::AutoCommandBufferBuilder;
use vulkano::command_buffer::DynamicState;
use vulkano::command_buffer::SubpassContents;
use vulkano::device::Queue;
use vulkano::format::Format;
use vulkano::framebuffer::Framebuffer;
use vulkano::framebuffer::RenderPassAbstract;
use vulkano::framebuffer::Subpass;
use vulkano::image::AttachmentImage;
use vulkano::image::ImageAccess;
use vulkano::image::ImageUsage;
use vulkano::image::ImageViewAccess;
use vulkano::sync::GpuFuture;

/// G-buffer images, sized like the swapchain.
pub struct GBuffer {
    pub position: Arc<AttachmentImage>,
    pub normals: Arc<AttachmentImage>,
    pub albedo: Arc<AttachmentImage>,
    pub depth: Arc<AttachmentImage>,
}

impl GBuffer {
    fn new(gfx_queue: &Arc<Queue>, dimensions: [u32; 2]) -> Result<Self, RenderError> {
        let color_usage = ImageUsage {
            color_attachment: true,
            input_attachment: true,
            ..ImageUsage::none()
        };
        let depth_usage = ImageUsage {
            depth_stencil_attachment: true,
            ..ImageUsage::none()
        };
        let device = gfx_queue.device();

        Ok(GBuffer {
            position: AttachmentImage::with_usage(
                device.clone(),
                dimensions,
                rendering::POSITION_FORMAT,
                color_usage,
            )?,
            normals: AttachmentImage::with_usage(
                device.clone(),
                dimensions,
                rendering::NORMAL_FORMAT,
                color_usage,
            )?,
            albedo: AttachmentImage::with_usage(
                device.clone(),
                dimensions,
                rendering::ALBEDO_FORMAT,
                color_usage,
            )?,
            depth: AttachmentImage::with_usage(
                device.clone(),
                dimensions,
                rendering::DEPTH_FORMAT,
                depth_usage,
            )?,
        })
    }

    fn dimensions(&self) -> [u32; 2] {
        ImageAccess::dimensions(&self.albedo).width_height()
    }
}

/// Everything needed to render one frame into a swapchain image.
pub struct FrameSystem {
    pub gfx_queue: Arc<Queue>,
    pub render_pass: Arc<dyn RenderPassAbstract + Send + Sync>,
    pub gbuffer: GBuffer,
    pub lighting_system: LightingSystem,
}

impl FrameSystem {
    pub fn new(
        gfx_queue: Arc<Queue>,
        final_output_format: Format,
        dimensions: [u32; 2],
    ) -> Result<FrameSystem, RenderError> {
        log::trace!("instance of {}", std::any::type_name::<Self>());
        let render_pass = build_render_pass(&gfx_queue, final_output_format)?;
        let gbuffer = GBuffer::new(&gfx_queue, dimensions)?;
        let lighting_system = LightingSystem::new(gfx_queue.clone(), lighting_subpass(&render_pass)?)?;

        Ok(FrameSystem {
            gfx_queue,
            render_pass,
            gbuffer,
            lighting_system,
        })
    }

    /// Rebuilds the pass and its pipelines, e.g. after the swapchain format
    /// changed.
    pub fn recreate_render_pass(
        &mut self,
        final_output_format: Format,
        dimensions: [u32; 2],
    ) -> Result<(), RenderError> {
        *self = FrameSystem::new(self.gfx_queue.clone(), final_output_format, dimensions)?;
        Ok(())
    }

    /// The subpass that writes the G-buffer; scene pipelines are built for it.
    pub fn deferred_subpass(&self) -> Result<Subpass<Arc<dyn RenderPassAbstract + Send + Sync>>, RenderError> {
        Subpass::from(self.render_pass.clone(), 0).ok_or(RenderError::Vulkan {
            what: "deferred subpass lookup",
            message: "render pass has no subpass 0".to_owned(),
        })
    }

    /// Starts drawing a new frame into `final_image` once `before_future`
    /// has completed. The image is first cleared to `background`.
    pub fn frame<F, I>(
        &mut self,
        before_future: F,
        final_image: I,
        background: [f32; 4],
        dynamic_state: DynamicState,
    ) -> Result<Frame, RenderError>
    where
        F: GpuFuture + 'static,
        I: ImageAccess + ImageViewAccess + Clone + Send + Sync + 'static,
    {
        let img_dims = ImageAccess::dimensions(&final_image).width_height();
        if self.gbuffer.dimensions() != img_dims {
            log::debug!("resizing G-buffer to {:?}", img_dims);
            self.gbuffer = GBuffer::new(&self.gfx_queue, img_dims)?;
        }

        let framebuffer = Arc::new(
            Framebuffer::start(self.render_pass.clone())
                .add(self.gbuffer.position.clone())
                .vk("framebuffer position attachment")?
                .add(self.gbuffer.normals.clone())
                .vk("framebuffer normal attachment")?
                .add(self.gbuffer.albedo.clone())
                .vk("framebuffer albedo attachment")?
                .add(final_image)
                .vk("framebuffer color attachment")?
                .add(self.gbuffer.depth.clone())
                .vk("framebuffer depth attachment")?
                .build()
                .vk("framebuffer creation")?,
        );

        let mut command_buffer_builder = AutoCommandBufferBuilder::primary_one_time_submit(
            self.gfx_queue.device().clone(),
            self.gfx_queue.family(),
        )
        .vk("primary command buffer allocation")?;
        command_buffer_builder
            .begin_render_pass(
                framebuffer.clone(),
                SubpassContents::SecondaryCommandBuffers,
                rendering::clear_values(background),
            )
            .vk("begin render pass")?;

        Ok(Frame {
            system: self,
            before_main_cb_future: Some(Box::new(before_future)),
            framebuffer,
            num_pass: 0,
            command_buffer_builder: Some(command_buffer_builder),
            dynamic_state,
        })
    }
}

fn lighting_subpass(
    render_pass: &Arc<dyn RenderPassAbstract + Send + Sync>,
) -> Result<Subpass<Arc<dyn RenderPassAbstract + Send + Sync>>, RenderError> {
    Subpass::from(render_pass.clone(), 1).ok_or(RenderError::Vulkan {
        what: "lighting subpass lookup",
        message: "render pass has no subpass 1".to_owned(),
    })
}

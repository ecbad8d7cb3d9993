pub mod frame;
pub mod geometry;
pub mod lightning;
pub mod rendering;
pub mod system;

pub use self::frame::{DrawPass, Frame, LightingPass, Pass};
pub use self::system::FrameSystem;

use crate::figure::PerVertexParams;
use std::sync::Arc;
use vulkano::descriptor::PipelineLayoutAbstract;
use vulkano::framebuffer::RenderPassAbstract;
use vulkano::pipeline::vertex::SingleBufferDefinition;
use vulkano::pipeline::GraphicsPipeline;

/// Pipeline drawing scene meshes into the G-buffer.
pub type MeshPipeline = GraphicsPipeline<
    SingleBufferDefinition<PerVertexParams>,
    Box<dyn PipelineLayoutAbstract + Send + Sync + 'static>,
    Arc<dyn RenderPassAbstract + Send + Sync + 'static>,
>;

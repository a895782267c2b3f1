use anyhow::{Context, Result};

use crate::gfx::{
    BlendMode, BufferDesc, BufferKind, GraphicsDevice, PipelineDesc, ShaderModuleDesc,
    ShaderStage,
};

use super::geometry::{INDICES_PER_QUAD, VERTICES_PER_QUAD};
use super::vertex::Vertex;

const TEXTURE_SHADER: &str = include_str!("../shaders/texture.wgsl");

/// Size of the transform constant buffer: one column-major 4x4 f32 matrix.
pub const TRANSFORM_SIZE: u64 = std::mem::size_of::<glam::Mat4>() as u64;

/// GPU resources owned by a texture batcher, sized for one full batch.
///
/// Fields are created in declaration order. If a later step fails, the
/// already-created handles are dropped on the way out, which releases them.
pub struct BatchResources<D: GraphicsDevice> {
    pub(super) vertex_buffer: D::Buffer,
    pub(super) index_buffer: D::Buffer,
    pub(super) transform_buffer: D::Buffer,
    pub(super) pipeline: D::Pipeline,
}

impl<D: GraphicsDevice> BatchResources<D> {
    pub fn new(device: &D, max_quads: u32) -> Result<Self> {
        let max_vertices = u64::from(max_quads) * VERTICES_PER_QUAD as u64;
        let max_indices = u64::from(max_quads) * INDICES_PER_QUAD as u64;

        let vertex_buffer = device
            .create_buffer(&BufferDesc {
                label: "tessera batch vbo",
                kind: BufferKind::Vertex,
                size: max_vertices * Vertex::SIZE,
                dynamic: true,
            })
            .context("failed to create batch vertex buffer")?;

        let index_buffer = device
            .create_buffer(&BufferDesc {
                label: "tessera batch ibo",
                kind: BufferKind::Index,
                size: max_indices * std::mem::size_of::<u32>() as u64,
                dynamic: true,
            })
            .context("failed to create batch index buffer")?;

        let transform_buffer = device
            .create_buffer(&BufferDesc {
                label: "tessera batch transform",
                kind: BufferKind::Constant,
                size: TRANSFORM_SIZE,
                dynamic: true,
            })
            .context("failed to create batch transform buffer")?;

        // Modules are only needed until the pipeline exists.
        let vertex_module = device
            .create_shader_module(&ShaderModuleDesc {
                label: "tessera texture vs",
                stage: ShaderStage::Vertex,
                entry_point: "vs_main",
                source: TEXTURE_SHADER,
            })
            .context("failed to create texture vertex shader")?;

        let pixel_module = device
            .create_shader_module(&ShaderModuleDesc {
                label: "tessera texture fs",
                stage: ShaderStage::Pixel,
                entry_point: "fs_main",
                source: TEXTURE_SHADER,
            })
            .context("failed to create texture pixel shader")?;

        let pipeline = device
            .create_pipeline(&PipelineDesc {
                label: "tessera texture pipeline",
                vertex: &vertex_module,
                pixel: &pixel_module,
                input_layout: &Vertex::INPUT_LAYOUT,
                stride: Vertex::SIZE,
                blend: BlendMode::Alpha,
            })
            .context("failed to create texture pipeline")?;

        Ok(Self { vertex_buffer, index_buffer, transform_buffer, pipeline })
    }
}

use anyhow::Result;

use super::desc::{BufferDesc, IndexFormat, PipelineDesc, ShaderModuleDesc};
use super::texture::TextureHandle;

/// Creates GPU resources.
///
/// Every resource is owned by the returned handle and released when the handle
/// is dropped.
pub trait GraphicsDevice {
    type Buffer;
    type ShaderModule;
    type Pipeline;
    type Texture: TextureHandle;

    fn create_buffer(&self, desc: &BufferDesc<'_>) -> Result<Self::Buffer>;

    fn create_shader_module(&self, desc: &ShaderModuleDesc<'_>) -> Result<Self::ShaderModule>;

    fn create_pipeline(
        &self,
        desc: &PipelineDesc<'_, Self::ShaderModule>,
    ) -> Result<Self::Pipeline>;
}

/// Records GPU work for one frame.
///
/// Commands execute in recording order: a buffer update is visible to every
/// draw recorded after it and to none recorded before it. Binding state set
/// with the `set_*` calls persists until overwritten.
pub trait CommandRecorder<D: GraphicsDevice + ?Sized> {
    fn update_buffer(&mut self, buffer: &D::Buffer, offset: u64, data: &[u8]) -> Result<()>;

    fn set_pipeline(&mut self, pipeline: &D::Pipeline);

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &D::Buffer, stride: u64, offset: u64);

    fn set_index_buffer(&mut self, buffer: &D::Buffer, format: IndexFormat);

    fn set_constant_buffer(&mut self, slot: u32, buffer: &D::Buffer);

    fn set_texture(&mut self, slot: u32, texture: &D::Texture);

    /// Draws `index_count` indices starting at index 0 of the bound index buffer.
    fn draw_indexed(&mut self, index_count: u32) -> Result<()>;
}

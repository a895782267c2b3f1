//! Graphics device abstraction consumed by the renderers.
//!
//! The renderers never talk to a GPU API directly. They create resources
//! through a [`GraphicsDevice`] and record work through a [`CommandRecorder`].
//! `wgpu_backend` is the production implementation; tests use an in-memory
//! recording backend.

mod desc;
mod device;
mod texture;

pub mod wgpu_backend;

#[cfg(test)]
pub(crate) mod recording;

pub use desc::{
    BlendMode, BufferDesc, BufferKind, IndexFormat, InputElement, InputType, PipelineDesc,
    ShaderModuleDesc, ShaderStage, VertexFormat,
};
pub use device::{CommandRecorder, GraphicsDevice};
pub use texture::{TextureHandle, TextureId};

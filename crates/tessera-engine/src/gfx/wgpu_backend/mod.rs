//! wgpu implementation of the device abstraction.
//!
//! Binding model (shared by every pipeline this backend creates):
//! - group 0: one uniform buffer, visible to the vertex stage
//! - group 1: `texture_2d<f32>` at binding 0 + filtering sampler at binding 1
//!
//! `set_constant_buffer(slot, ..)` and `set_texture(slot, ..)` bind to group `slot`.

mod device;
mod recorder;
mod texture;

#[cfg(test)]
pub(crate) mod testing;

pub use device::{WgpuBuffer, WgpuDevice, WgpuPipeline, WgpuShaderModule};
pub use recorder::WgpuRecorder;
pub use texture::WgpuTexture;

//! Headless GPU context.
//!
//! Creates the wgpu Instance/Adapter/Device/Queue. Window and surface
//! management belong to the host application.

mod gpu;
mod init;

pub use gpu::Gpu;
pub use init::GpuInit;

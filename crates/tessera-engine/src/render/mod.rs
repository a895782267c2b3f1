//! Rendering subsystem.
//!
//! Renderers own their GPU resources and record work through
//! [`gfx::CommandRecorder`](crate::gfx::CommandRecorder).
//!
//! Convention:
//! - CPU geometry is in pixels (top-left origin, +Y down).
//! - The vertex shader maps pixels to clip space with a per-dispatch transform.

pub mod batcher;

pub use batcher::{
    BatcherConfig, DispatchStats, DrawRequest, MAX_BATCH_SIZE, TextureBatcher, screen_projection,
};

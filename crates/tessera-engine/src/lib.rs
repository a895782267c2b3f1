//! Tessera engine crate.
//!
//! A sprite/texture batching renderer: queue textured quads during a frame,
//! then flush them to the GPU as a minimal sequence of indexed draw calls.

pub mod coords;
pub mod device;
pub mod gfx;
pub mod logging;
pub mod render;

//! Plain numeric value types shared by the batcher and its callers.
//!
//! Canonical CPU space:
//! - pixels, origin top-left
//! - +X right, +Y down
//!
//! The batcher maps this space to clip space with an orthographic projection.

mod color;
mod vec2;
mod viewport;

pub use color::ColorRgba;
pub use vec2::Vec2;
pub use viewport::Viewport;

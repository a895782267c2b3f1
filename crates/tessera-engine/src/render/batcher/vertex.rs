use bytemuck::{Pod, Zeroable};

use crate::gfx::{InputElement, VertexFormat};

/// Batched sprite vertex.
///
/// Layout (32 bytes), mirrored by `VsIn` in `texture.wgsl`:
///
///  offset  0  position   [f32; 2]   loc 0
///  offset  8  tex_coord  [f32; 2]   loc 1
///  offset 16  tint       [f32; 4]   loc 2
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
    pub tint: [f32; 4],
}

const _: () = assert!(std::mem::size_of::<Vertex>() == 32);

impl Vertex {
    pub const SIZE: u64 = std::mem::size_of::<Vertex>() as u64;

    pub const INPUT_LAYOUT: [InputElement; 3] = [
        InputElement::per_vertex(VertexFormat::Float32x2, 0),  // position
        InputElement::per_vertex(VertexFormat::Float32x2, 8),  // tex_coord
        InputElement::per_vertex(VertexFormat::Float32x4, 16), // tint
    ];

    #[inline]
    pub const fn new(position: [f32; 2], tex_coord: [f32; 2], tint: [f32; 4]) -> Self {
        Self { position, tex_coord, tint }
    }
}

//! Quad → vertices/indices.

use super::queue::DrawRequest;
use super::vertex::Vertex;

pub const VERTICES_PER_QUAD: usize = 4;
pub const INDICES_PER_QUAD: usize = 6;

/// Unit-square texture coordinates for TL, TR, BR, BL.
const QUAD_TEX_COORDS: [[f32; 2]; VERTICES_PER_QUAD] = [
    [0.0, 0.0],
    [1.0, 0.0],
    [1.0, 1.0],
    [0.0, 1.0],
];

/// Triangles {0, 1, 3} and {1, 2, 3}: split along the TR–BL diagonal.
const QUAD_INDICES: [u32; INDICES_PER_QUAD] = [0, 1, 3, 1, 2, 3];

/// Vertices for one quad, ordered top-left, top-right, bottom-right, bottom-left.
pub fn quad_vertices<T>(request: &DrawRequest<T>) -> [Vertex; VERTICES_PER_QUAD] {
    let tint = request.tint.to_array();
    let corners = [
        request.top_left,
        request.top_right,
        request.bottom_right,
        request.bottom_left,
    ];
    std::array::from_fn(|i| Vertex::new(corners[i].to_array(), QUAD_TEX_COORDS[i], tint))
}

/// Indices for one quad whose first vertex sits at `base`.
#[inline]
pub fn quad_indices(base: u32) -> [u32; INDICES_PER_QUAD] {
    QUAD_INDICES.map(|i| base + i)
}

/// Host-side scratch arrays sized for one full batch.
///
/// Allocated once; every flush group overwrites them from slot 0.
pub struct BatchBuffers {
    vertices: Box<[Vertex]>,
    indices: Box<[u32]>,
}

impl BatchBuffers {
    pub fn new(max_quads: usize) -> Self {
        Self {
            vertices: vec![Vertex::default(); max_quads * VERTICES_PER_QUAD].into_boxed_slice(),
            indices: vec![0; max_quads * INDICES_PER_QUAD].into_boxed_slice(),
        }
    }

    /// Number of quads the arrays can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.vertices.len() / VERTICES_PER_QUAD
    }

    /// Writes `request` into quad slot `slot`: vertices `[4 * slot, 4 * slot + 4)`
    /// and indices `[6 * slot, 6 * slot + 6)`.
    ///
    /// # Panics
    /// Panics if `slot >= capacity()`.
    pub fn write_quad<T>(&mut self, slot: usize, request: &DrawRequest<T>) {
        let v = slot * VERTICES_PER_QUAD;
        let i = slot * INDICES_PER_QUAD;

        self.vertices[v..v + VERTICES_PER_QUAD].copy_from_slice(&quad_vertices(request));
        self.indices[i..i + INDICES_PER_QUAD].copy_from_slice(&quad_indices(v as u32));
    }

    /// Bytes of the first `quads` quads' vertices.
    #[inline]
    pub fn vertex_bytes(&self, quads: usize) -> &[u8] {
        bytemuck::cast_slice(&self.vertices[..quads * VERTICES_PER_QUAD])
    }

    /// Bytes of the first `quads` quads' indices.
    #[inline]
    pub fn index_bytes(&self, quads: usize) -> &[u8] {
        bytemuck::cast_slice(&self.indices[..quads * INDICES_PER_QUAD])
    }
}

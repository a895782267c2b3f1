//! Backend-neutral resource descriptors.

/// What a buffer is bound as.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
    /// Uniform data read by shaders (e.g. a transform matrix).
    Constant,
}

/// Parameters for [`GraphicsDevice::create_buffer`](super::GraphicsDevice::create_buffer).
#[derive(Debug, Copy, Clone)]
pub struct BufferDesc<'a> {
    pub label: &'a str,
    pub kind: BufferKind,
    /// Size in bytes.
    pub size: u64,
    /// `true` if the contents are rewritten through command recorders.
    pub dynamic: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

/// Parameters for [`GraphicsDevice::create_shader_module`](super::GraphicsDevice::create_shader_module).
///
/// `source` is WGSL text; shader authoring and cross-compilation live outside this crate.
#[derive(Debug, Copy, Clone)]
pub struct ShaderModuleDesc<'a> {
    pub label: &'a str,
    pub stage: ShaderStage,
    pub entry_point: &'a str,
    pub source: &'a str,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexFormat {
    Float32x2,
    Float32x4,
}

impl VertexFormat {
    #[inline]
    pub const fn size(self) -> u64 {
        match self {
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x4 => 16,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum InputType {
    PerVertex,
    PerInstance,
}

/// One vertex attribute. Shader locations follow declaration order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct InputElement {
    pub format: VertexFormat,
    /// Byte offset inside the vertex.
    pub offset: u32,
    /// Vertex buffer slot the attribute is read from.
    pub slot: u32,
    pub input_type: InputType,
}

impl InputElement {
    #[inline]
    pub const fn per_vertex(format: VertexFormat, offset: u32) -> Self {
        Self { format, offset, slot: 0, input_type: InputType::PerVertex }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum BlendMode {
    Opaque,
    /// Straight-alpha "over" blending.
    #[default]
    Alpha,
    Premultiplied,
}

/// Fixed pipeline state for one vertex/pixel shader pair.
#[derive(Debug)]
pub struct PipelineDesc<'a, M> {
    pub label: &'a str,
    pub vertex: &'a M,
    pub pixel: &'a M,
    pub input_layout: &'a [InputElement],
    /// Stride of every vertex buffer slot used by `input_layout`, in bytes.
    pub stride: u64,
    pub blend: BlendMode,
}

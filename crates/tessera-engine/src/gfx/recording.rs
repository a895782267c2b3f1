//! In-memory backend for tests.
//!
//! `RecordingDevice` hands out resources that count themselves as live until
//! dropped; `Recording` captures every command in order.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Result, bail};

use super::{
    BufferDesc, BufferKind, CommandRecorder, GraphicsDevice, IndexFormat, InputElement,
    PipelineDesc, ShaderModuleDesc, ShaderStage, TextureHandle, TextureId,
};

// ── live resource accounting ──────────────────────────────────────────────

#[derive(Debug)]
pub(crate) struct LiveToken(Rc<Cell<usize>>);

impl LiveToken {
    fn new(counter: &Rc<Cell<usize>>) -> Self {
        counter.set(counter.get() + 1);
        Self(Rc::clone(counter))
    }
}

impl Drop for LiveToken {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

// ── resources ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub(crate) struct RecordingBuffer {
    pub kind: BufferKind,
    pub size: u64,
    pub dynamic: bool,
    _live: LiveToken,
}

#[derive(Debug)]
pub(crate) struct RecordingShaderModule {
    pub stage: ShaderStage,
    _live: LiveToken,
}

#[derive(Debug)]
pub(crate) struct RecordingPipeline {
    pub input_layout: Vec<InputElement>,
    pub stride: u64,
    _live: LiveToken,
}

#[derive(Debug, Clone)]
pub(crate) struct RecordingTexture {
    id: TextureId,
}

impl RecordingTexture {
    pub fn new() -> Self {
        Self { id: TextureId::next() }
    }
}

impl TextureHandle for RecordingTexture {
    fn id(&self) -> TextureId {
        self.id
    }
}

// ── device ────────────────────────────────────────────────────────────────

/// Creation step that should fail.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum FailAt {
    Buffer(BufferKind),
    ShaderModule(ShaderStage),
    Pipeline,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingDevice {
    live: Rc<Cell<usize>>,
    fail_at: Option<FailAt>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(fail_at: FailAt) -> Self {
        Self { fail_at: Some(fail_at), ..Self::default() }
    }

    /// Resources created by this device that have not been dropped yet.
    pub fn live_resources(&self) -> usize {
        self.live.get()
    }

    fn check(&self, step: FailAt) -> Result<()> {
        if self.fail_at == Some(step) {
            bail!("simulated device failure at {step:?}");
        }
        Ok(())
    }
}

impl GraphicsDevice for RecordingDevice {
    type Buffer = RecordingBuffer;
    type ShaderModule = RecordingShaderModule;
    type Pipeline = RecordingPipeline;
    type Texture = RecordingTexture;

    fn create_buffer(&self, desc: &BufferDesc<'_>) -> Result<RecordingBuffer> {
        self.check(FailAt::Buffer(desc.kind))?;
        Ok(RecordingBuffer {
            kind: desc.kind,
            size: desc.size,
            dynamic: desc.dynamic,
            _live: LiveToken::new(&self.live),
        })
    }

    fn create_shader_module(&self, desc: &ShaderModuleDesc<'_>) -> Result<RecordingShaderModule> {
        self.check(FailAt::ShaderModule(desc.stage))?;
        Ok(RecordingShaderModule {
            stage: desc.stage,
            _live: LiveToken::new(&self.live),
        })
    }

    fn create_pipeline(
        &self,
        desc: &PipelineDesc<'_, RecordingShaderModule>,
    ) -> Result<RecordingPipeline> {
        self.check(FailAt::Pipeline)?;
        assert_eq!(desc.vertex.stage, ShaderStage::Vertex);
        assert_eq!(desc.pixel.stage, ShaderStage::Pixel);
        Ok(RecordingPipeline {
            input_layout: desc.input_layout.to_vec(),
            stride: desc.stride,
            _live: LiveToken::new(&self.live),
        })
    }
}

// ── recorder ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    UpdateBuffer { buffer: BufferKind, offset: u64, data: Vec<u8> },
    SetPipeline,
    SetVertexBuffer { slot: u32, buffer: BufferKind, stride: u64, offset: u64 },
    SetIndexBuffer { buffer: BufferKind, format: IndexFormat },
    SetConstantBuffer { slot: u32, buffer: BufferKind },
    SetTexture { slot: u32, texture: TextureId },
    DrawIndexed(u32),
}

#[derive(Debug, Default)]
pub(crate) struct Recording {
    pub commands: Vec<Command>,
    /// Fail the draw call with this zero-based index.
    pub fail_draw: Option<usize>,
    draws: usize,
}

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index counts of every draw call, in order.
    pub fn draw_calls(&self) -> Vec<u32> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::DrawIndexed(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Payloads of every update to a buffer of `kind`, in order.
    pub fn uploads(&self, kind: BufferKind) -> Vec<&[u8]> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::UpdateBuffer { buffer, data, .. } if *buffer == kind => {
                    Some(data.as_slice())
                }
                _ => None,
            })
            .collect()
    }

    /// Texture bound for each draw call, in order.
    pub fn draw_textures(&self) -> Vec<Option<TextureId>> {
        let mut bound = None;
        let mut out = Vec::new();
        for c in &self.commands {
            match c {
                Command::SetTexture { texture, .. } => bound = Some(*texture),
                Command::DrawIndexed(_) => out.push(bound),
                _ => {}
            }
        }
        out
    }
}

impl CommandRecorder<RecordingDevice> for Recording {
    fn update_buffer(&mut self, buffer: &RecordingBuffer, offset: u64, data: &[u8]) -> Result<()> {
        assert!(buffer.dynamic, "update of a static {:?} buffer", buffer.kind);
        assert!(
            offset + data.len() as u64 <= buffer.size,
            "update [{offset}, {}) overflows {:?} buffer of {} bytes",
            offset + data.len() as u64,
            buffer.kind,
            buffer.size
        );
        self.commands.push(Command::UpdateBuffer {
            buffer: buffer.kind,
            offset,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn set_pipeline(&mut self, _pipeline: &RecordingPipeline) {
        self.commands.push(Command::SetPipeline);
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &RecordingBuffer, stride: u64, offset: u64) {
        self.commands.push(Command::SetVertexBuffer { slot, buffer: buffer.kind, stride, offset });
    }

    fn set_index_buffer(&mut self, buffer: &RecordingBuffer, format: IndexFormat) {
        self.commands.push(Command::SetIndexBuffer { buffer: buffer.kind, format });
    }

    fn set_constant_buffer(&mut self, slot: u32, buffer: &RecordingBuffer) {
        self.commands.push(Command::SetConstantBuffer { slot, buffer: buffer.kind });
    }

    fn set_texture(&mut self, slot: u32, texture: &RecordingTexture) {
        self.commands.push(Command::SetTexture { slot, texture: texture.id });
    }

    fn draw_indexed(&mut self, index_count: u32) -> Result<()> {
        let n = self.draws;
        self.draws += 1;
        if self.fail_draw == Some(n) {
            bail!("simulated draw failure");
        }
        self.commands.push(Command::DrawIndexed(index_count));
        Ok(())
    }
}

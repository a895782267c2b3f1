use anyhow::{Context, Result};

use crate::gfx::{CommandRecorder, IndexFormat};

use super::device::{WgpuBuffer, WgpuDevice, WgpuPipeline};
use super::texture::WgpuTexture;

const MAX_BIND_GROUPS: usize = 2;

/// Binding state applied to the next render pass.
#[derive(Default)]
struct PendingState {
    pipeline: Option<wgpu::RenderPipeline>,
    vertex_buffers: Vec<Option<(wgpu::Buffer, u64)>>,
    index_buffer: Option<(wgpu::Buffer, wgpu::IndexFormat)>,
    bind_groups: [Option<wgpu::BindGroup>; MAX_BIND_GROUPS],
    /// First invalid binding since the last draw; reported by `draw_indexed`.
    binding_error: Option<String>,
}

/// [`CommandRecorder`] that records into a frame's command encoder.
///
/// Buffer updates are written through the device's staging belt and encoded as
/// copies so they stay ordered with draws; `Queue::write_buffer` would land
/// every update before the whole submission. Each `draw_indexed` opens its own
/// render pass that loads the current contents of `color_view`.
///
/// Call [`finish`](Self::finish) before finishing the encoder, then
/// [`WgpuDevice::recall_staging`] once it was submitted.
pub struct WgpuRecorder<'a> {
    device: &'a WgpuDevice,
    encoder: &'a mut wgpu::CommandEncoder,
    color_view: &'a wgpu::TextureView,
    state: PendingState,
}

impl<'a> WgpuRecorder<'a> {
    #[inline]
    pub fn new(
        device: &'a WgpuDevice,
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
    ) -> Self {
        Self { device, encoder, color_view, state: PendingState::default() }
    }

    /// Closes the staging chunks written by this recorder so the encoder can
    /// be finished and submitted.
    pub fn finish(self) {
        self.device.staging().finish();
    }

    fn binding_failed(&mut self, message: String) {
        log::error!("WgpuRecorder: {message}");
        self.state.binding_error.get_or_insert(message);
    }

    fn bind(&mut self, slot: u32, bind_group: wgpu::BindGroup) {
        match self.state.bind_groups.get_mut(slot as usize) {
            Some(bound) => *bound = Some(bind_group),
            None => self.binding_failed(format!(
                "bind slot {slot} out of range (max {MAX_BIND_GROUPS})"
            )),
        }
    }
}

impl CommandRecorder<WgpuDevice> for WgpuRecorder<'_> {
    fn update_buffer(&mut self, buffer: &WgpuBuffer, offset: u64, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        let size = data.len() as u64;
        anyhow::ensure!(
            offset % wgpu::COPY_BUFFER_ALIGNMENT == 0 && size % wgpu::COPY_BUFFER_ALIGNMENT == 0,
            "buffer update at offset {offset} with {size} bytes is not 4-byte aligned"
        );
        let end = offset.checked_add(size).context("buffer update range overflows")?;
        anyhow::ensure!(
            end <= buffer.size(),
            "buffer update [{offset}, {end}) exceeds buffer size {}",
            buffer.size()
        );

        let size = wgpu::BufferSize::new(size).context("buffer update is empty")?;
        let mut staging = self.device.staging();
        let mut view = staging.write_buffer(self.encoder, &buffer.buffer, offset, size);
        view.copy_from_slice(data);
        Ok(())
    }

    fn set_pipeline(&mut self, pipeline: &WgpuPipeline) {
        self.state.pipeline = Some(pipeline.pipeline.clone());
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &WgpuBuffer, _stride: u64, offset: u64) {
        // Stride is baked into the pipeline's vertex layout under wgpu.
        let slot = slot as usize;
        if self.state.vertex_buffers.len() <= slot {
            self.state.vertex_buffers.resize(slot + 1, None);
        }
        self.state.vertex_buffers[slot] = Some((buffer.buffer.clone(), offset));
    }

    fn set_index_buffer(&mut self, buffer: &WgpuBuffer, format: IndexFormat) {
        let format = match format {
            IndexFormat::Uint16 => wgpu::IndexFormat::Uint16,
            IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
        };
        self.state.index_buffer = Some((buffer.buffer.clone(), format));
    }

    fn set_constant_buffer(&mut self, slot: u32, buffer: &WgpuBuffer) {
        match buffer.bind_group.clone() {
            Some(bind_group) => self.bind(slot, bind_group),
            None => self.binding_failed(format!(
                "{:?} buffer bound as a constant buffer",
                buffer.kind
            )),
        }
    }

    fn set_texture(&mut self, slot: u32, texture: &WgpuTexture) {
        self.bind(slot, texture.bind_group.clone());
    }

    fn draw_indexed(&mut self, index_count: u32) -> Result<()> {
        if let Some(message) = self.state.binding_error.take() {
            anyhow::bail!("draw_indexed after an invalid binding: {message}");
        }
        if index_count == 0 {
            return Ok(());
        }

        let state = &self.state;
        let pipeline = state.pipeline.as_ref().context("draw_indexed without a pipeline")?;
        let (index_buffer, index_format) =
            state.index_buffer.as_ref().context("draw_indexed without an index buffer")?;

        let mut rpass = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tessera batch pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        for (index, bind_group) in state.bind_groups.iter().enumerate() {
            if let Some(bind_group) = bind_group {
                rpass.set_bind_group(index as u32, bind_group, &[]);
            }
        }
        for (slot, bound) in state.vertex_buffers.iter().enumerate() {
            if let Some((buffer, offset)) = bound {
                rpass.set_vertex_buffer(slot as u32, buffer.slice(*offset..));
            }
        }
        rpass.set_index_buffer(index_buffer.slice(..), *index_format);
        rpass.draw_indexed(0..index_count, 0, 0..1);

        Ok(())
    }
}

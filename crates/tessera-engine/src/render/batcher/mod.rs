//! Texture batcher.
//!
//! Callers queue textured quads with [`TextureBatcher::draw`] during a frame
//! and flush them once with [`TextureBatcher::dispatch_draw_queue`]. Adjacent
//! quads that use the same texture (by identity) share one indexed draw call,
//! up to the configured batch size. Quads are never reordered, so the result
//! matches drawing each quad on its own in submission order.

mod config;
mod geometry;
mod queue;
mod resources;
mod vertex;

use anyhow::{Context, Result};

use crate::coords::{ColorRgba, Vec2, Viewport};
use crate::gfx::{CommandRecorder, GraphicsDevice, IndexFormat, TextureHandle};

pub use config::{BatcherConfig, MAX_BATCH_SIZE};
pub use geometry::{BatchBuffers, INDICES_PER_QUAD, VERTICES_PER_QUAD, quad_indices, quad_vertices};
pub use queue::{DrawQueue, DrawRequest};
pub use resources::{BatchResources, TRANSFORM_SIZE};
pub use vertex::Vertex;

const TRANSFORM_SLOT: u32 = 0;
const TEXTURE_SLOT: u32 = 1;

/// Work done by one dispatch.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct DispatchStats {
    pub quads: usize,
    pub draw_calls: usize,
}

/// Pixel-space orthographic projection: x in `[0, width]` maps left to right,
/// y in `[0, height]` maps top to bottom, z in `[-1, 1]` maps to depth `[1, 0]`.
///
/// Degenerate viewports are clamped to one pixel per axis.
pub fn screen_projection(viewport: Viewport) -> glam::Mat4 {
    let vp = viewport.clamped();
    glam::Mat4::orthographic_rh(0.0, vp.width, vp.height, 0.0, -1.0, 1.0)
}

/// Batches textured quads into as few indexed draw calls as possible.
///
/// Owns its GPU resources exclusively; they are released when the batcher is
/// dropped or [disposed](Self::dispose). Not meant to be shared across threads:
/// queue, record and dispatch from the thread that renders the frame.
pub struct TextureBatcher<D: GraphicsDevice> {
    resources: BatchResources<D>,
    scratch: BatchBuffers,
    queue: DrawQueue<D::Texture>,
    warned_viewport: bool,
}

impl<D: GraphicsDevice> TextureBatcher<D> {
    /// Creates a batcher with [`MAX_BATCH_SIZE`] quads per draw call.
    pub fn new(device: &D) -> Result<Self> {
        Self::with_config(device, BatcherConfig::default())
    }

    pub fn with_config(device: &D, config: BatcherConfig) -> Result<Self> {
        config.validate()?;

        let resources = BatchResources::new(device, config.max_batch_size)
            .context("failed to create texture batcher resources")?;
        let scratch = BatchBuffers::new(config.max_batch_size as usize);

        log::debug!("texture batcher ready: {} quads per batch", config.max_batch_size);

        Ok(Self {
            resources,
            scratch,
            queue: DrawQueue::new(),
            warned_viewport: false,
        })
    }

    /// Maximum quads per draw call.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.scratch.capacity()
    }

    /// Quads waiting for the next dispatch.
    #[inline]
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// Queues a textured quad. Corners are in pixels, top-left origin.
    pub fn draw(
        &mut self,
        texture: &D::Texture,
        top_left: Vec2,
        top_right: Vec2,
        bottom_left: Vec2,
        bottom_right: Vec2,
        tint: ColorRgba,
    ) where
        D::Texture: Clone,
    {
        self.queue.enqueue(DrawRequest {
            texture: texture.clone(),
            top_left,
            top_right,
            bottom_left,
            bottom_right,
            tint,
        });
    }

    #[inline]
    pub fn draw_request(&mut self, request: DrawRequest<D::Texture>) {
        self.queue.enqueue(request);
    }

    /// Records every queued quad into `recorder` and empties the queue.
    ///
    /// The transform buffer is updated once, before any draw. Each flush group
    /// uploads its vertices/indices and issues one draw call.
    ///
    /// On error the rest of this frame's quads are discarded; the queue is
    /// empty afterwards either way.
    pub fn dispatch_draw_queue<R>(
        &mut self,
        recorder: &mut R,
        viewport: Viewport,
    ) -> Result<DispatchStats>
    where
        R: CommandRecorder<D> + ?Sized,
    {
        if !viewport.is_valid() && !self.warned_viewport {
            log::warn!("TextureBatcher: degenerate viewport {viewport:?}; clamping to 1x1");
            self.warned_viewport = true;
        }

        let requests = self.queue.drain_all();

        let projection = screen_projection(viewport);
        recorder
            .update_buffer(&self.resources.transform_buffer, 0, bytemuck::bytes_of(&projection))
            .context("failed to upload batch transform")?;

        let capacity = self.scratch.capacity();
        let mut stats = DispatchStats::default();
        let mut group_len = 0usize;
        let mut current: Option<D::Texture> = None;

        for request in requests {
            let same_texture = current
                .as_ref()
                .is_some_and(|t| t.id() == request.texture.id());

            if !same_texture || group_len >= capacity {
                if let Some(texture) = current.as_ref() {
                    if flush_group(&self.resources, &self.scratch, recorder, group_len, texture)? {
                        stats.draw_calls += 1;
                    }
                }
                group_len = 0;
            }

            self.scratch.write_quad(group_len, &request);
            group_len += 1;
            stats.quads += 1;
            current = Some(request.texture);
        }

        if let Some(texture) = current.as_ref() {
            if flush_group(&self.resources, &self.scratch, recorder, group_len, texture)? {
                stats.draw_calls += 1;
            }
        }

        log::trace!(
            "TextureBatcher: {} quads in {} draw calls",
            stats.quads,
            stats.draw_calls
        );

        Ok(stats)
    }

    /// Releases the GPU resources. Equivalent to dropping the batcher.
    pub fn dispose(self) {
        log::debug!("texture batcher disposed ({} quads dropped)", self.queue.len());
    }
}

/// Uploads the first `quads` scratch quads and draws them with `texture`.
///
/// Returns `false` (and records nothing) for an empty group.
fn flush_group<D, R>(
    resources: &BatchResources<D>,
    scratch: &BatchBuffers,
    recorder: &mut R,
    quads: usize,
    texture: &D::Texture,
) -> Result<bool>
where
    D: GraphicsDevice,
    R: CommandRecorder<D> + ?Sized,
{
    if quads == 0 {
        return Ok(false);
    }

    recorder
        .update_buffer(&resources.vertex_buffer, 0, scratch.vertex_bytes(quads))
        .context("failed to upload batch vertices")?;
    recorder
        .update_buffer(&resources.index_buffer, 0, scratch.index_bytes(quads))
        .context("failed to upload batch indices")?;

    recorder.set_pipeline(&resources.pipeline);
    recorder.set_vertex_buffer(0, &resources.vertex_buffer, Vertex::SIZE, 0);
    recorder.set_index_buffer(&resources.index_buffer, IndexFormat::Uint32);
    recorder.set_constant_buffer(TRANSFORM_SLOT, &resources.transform_buffer);
    recorder.set_texture(TEXTURE_SLOT, texture);

    // Bounded by BatcherConfig::validate.
    let index_count = u32::try_from(quads * INDICES_PER_QUAD).context("batch index count overflow")?;
    recorder.draw_indexed(index_count).context("batch draw failed")?;

    Ok(true)
}

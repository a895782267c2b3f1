//! Headless wgpu helpers shared by the backend tests.

use crate::device::{Gpu, GpuInit};

use super::WgpuDevice;

/// Color format of every offscreen target created here.
pub(crate) const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Opens a software adapter, falling back to any adapter the host offers.
///
/// Returns `None` when the machine has no usable adapter at all; callers skip.
pub(crate) fn headless_device() -> Option<WgpuDevice> {
    let init = |force_fallback_adapter| GpuInit {
        force_fallback_adapter,
        required_limits: wgpu::Limits::downlevel_defaults(),
        ..GpuInit::default()
    };

    let gpu = Gpu::new_blocking(init(true)).or_else(|_| Gpu::new_blocking(init(false)));
    match gpu {
        Ok(gpu) => Some(gpu.graphics_device(TARGET_FORMAT)),
        Err(err) => {
            eprintln!("skipping wgpu test: {err:#}");
            None
        }
    }
}

/// Offscreen color target that can be rendered to and read back.
pub(crate) fn render_target(device: &WgpuDevice, width: u32, height: u32) -> wgpu::Texture {
    device.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("test target"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

pub(crate) fn encoder(device: &WgpuDevice) -> wgpu::CommandEncoder {
    device
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("test encoder") })
}

/// Copies `target` into a mappable buffer as part of `encoder`, submits it and
/// returns one `[r, g, b, a]` per pixel, row-major.
pub(crate) fn submit_and_read(
    device: &WgpuDevice,
    mut encoder: wgpu::CommandEncoder,
    target: &wgpu::Texture,
) -> Vec<[u8; 4]> {
    let (width, height) = (target.width(), target.height());
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let bytes_per_row = unpadded.div_ceil(align) * align;

    let buffer = device.device().create_buffer(&wgpu::BufferDescriptor {
        label: Some("test readback"),
        size: (bytes_per_row * height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: target,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
    );

    device.queue().submit(Some(encoder.finish()));
    device.recall_staging();

    let slice = buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device
        .device()
        .poll(wgpu::PollType::Wait { submission_index: None, timeout: None })
        .expect("device poll failed");
    rx.recv().expect("map callback dropped").expect("readback map failed");

    let data = slice.get_mapped_range();
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for row in data.chunks(bytes_per_row as usize) {
        for px in row[..unpadded as usize].chunks_exact(4) {
            pixels.push([px[0], px[1], px[2], px[3]]);
        }
    }
    drop(data);
    buffer.unmap();

    pixels
}

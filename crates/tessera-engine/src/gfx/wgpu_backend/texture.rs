use anyhow::{Context, Result};

use crate::gfx::{TextureHandle, TextureId};

use super::device::WgpuDevice;

/// Sampled 2D texture with its group-1 bind group.
///
/// Cloning is cheap and keeps the same [`TextureId`], so clones batch together.
#[derive(Debug, Clone)]
pub struct WgpuTexture {
    id: TextureId,
    width: u32,
    height: u32,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    pub(super) bind_group: wgpu::BindGroup,
}

impl WgpuTexture {
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn raw(&self) -> &wgpu::Texture {
        &self.texture
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

impl TextureHandle for WgpuTexture {
    #[inline]
    fn id(&self) -> TextureId {
        self.id
    }
}

impl WgpuDevice {
    /// Uploads tightly packed sRGB RGBA8 pixels (`width * height * 4` bytes).
    pub fn create_texture_rgba8(
        &self,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<WgpuTexture> {
        anyhow::ensure!(width > 0 && height > 0, "texture '{label}' has zero size");

        let max = self.device().limits().max_texture_dimension_2d;
        anyhow::ensure!(
            width <= max && height <= max,
            "texture '{label}' is {width}x{height}; device limit is {max}"
        );

        let expected = width as usize * height as usize * 4;
        anyhow::ensure!(
            pixels.len() == expected,
            "texture '{label}': expected {expected} bytes of RGBA8, got {}",
            pixels.len()
        );

        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };

        let texture = self.device().create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = self.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: self.texture_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(self.sampler()),
                },
            ],
        });

        let id = TextureId::next();
        log::debug!("created texture '{label}' {width}x{height} as {id:?}");

        Ok(WgpuTexture { id, width, height, texture, view, bind_group })
    }

    /// Decodes an encoded image (PNG) and uploads it.
    pub fn load_texture(&self, label: &str, bytes: &[u8]) -> Result<WgpuTexture> {
        let image = image::load_from_memory(bytes)
            .with_context(|| format!("failed to decode texture '{label}'"))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        self.create_texture_rgba8(label, width, height, image.as_raw())
    }
}

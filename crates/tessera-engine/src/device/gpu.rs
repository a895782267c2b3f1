use anyhow::{Context, Result};

use crate::gfx::wgpu_backend::WgpuDevice;

use super::GpuInit;

/// Owns the wgpu instance, adapter, device and queue.
///
/// No surface is created; callers render into their own targets (a swapchain
/// view they manage, or an offscreen texture).
pub struct Gpu {
    /// Kept alive for the adapter's lifetime.
    #[allow(dead_code)]
    instance: wgpu::Instance,

    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl Gpu {
    /// Creates a GPU context without a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: GpuInit) -> Result<Self> {
        let GpuInit {
            power_preference,
            force_fallback_adapter,
            required_features,
            required_limits,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("tessera-engine device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        Ok(Self { instance, adapter, device, queue })
    }

    /// Blocking variant of [`Gpu::new`].
    pub fn new_blocking(init: GpuInit) -> Result<Self> {
        pollster::block_on(Self::new(init))
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Wraps this context as a [`GraphicsDevice`](crate::gfx::GraphicsDevice)
    /// whose pipelines render into `target_format`.
    pub fn graphics_device(&self, target_format: wgpu::TextureFormat) -> WgpuDevice {
        WgpuDevice::new(&self.device, &self.queue, target_format)
    }
}

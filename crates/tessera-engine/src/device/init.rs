/// Initialization parameters for the headless GPU context.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Adapter preference. Sprite workloads rarely need the discrete GPU.
    pub power_preference: wgpu::PowerPreference,

    /// Force a software adapter (useful on CI machines without a GPU).
    pub force_fallback_adapter: bool,

    /// Required wgpu features.
    ///
    /// The batcher needs none; keep this empty for portability.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}

use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};

use crate::gfx::{
    BlendMode, BufferDesc, BufferKind, GraphicsDevice, InputElement, InputType, PipelineDesc,
    ShaderModuleDesc, ShaderStage, VertexFormat,
};

use super::texture::WgpuTexture;

// ── resources ─────────────────────────────────────────────────────────────

/// GPU buffer. Constant buffers carry the group-0 bind group that exposes them.
#[derive(Debug)]
pub struct WgpuBuffer {
    pub(super) buffer: wgpu::Buffer,
    pub(super) kind: BufferKind,
    pub(super) bind_group: Option<wgpu::BindGroup>,
}

impl WgpuBuffer {
    #[inline]
    pub fn raw(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    #[inline]
    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.buffer.size()
    }
}

#[derive(Debug)]
pub struct WgpuShaderModule {
    pub(super) module: wgpu::ShaderModule,
    pub(super) stage: ShaderStage,
    pub(super) entry_point: String,
}

#[derive(Debug)]
pub struct WgpuPipeline {
    pub(super) pipeline: wgpu::RenderPipeline,
}

impl WgpuPipeline {
    #[inline]
    pub fn raw(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }
}

// ── device ────────────────────────────────────────────────────────────────

/// Initial chunk size of the upload staging belt; one full default batch of
/// vertices fits in a single chunk.
const STAGING_CHUNK_SIZE: wgpu::BufferAddress = 1 << 20;

/// [`GraphicsDevice`] backed by a wgpu device/queue pair.
///
/// Pipelines are created for a single color target format, fixed at construction.
///
/// Buffer updates recorded through [`WgpuRecorder`](super::WgpuRecorder) go
/// through a staging belt owned here. Call [`WgpuRecorder::finish`](super::WgpuRecorder::finish)
/// before finishing the encoder and [`WgpuDevice::recall_staging`] after the
/// submit so the belt can reuse its chunks.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    target_format: wgpu::TextureFormat,
    staging: Mutex<wgpu::util::StagingBelt>,

    constant_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl WgpuDevice {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target_format: wgpu::TextureFormat,
    ) -> Self {
        let constant_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessera constant bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessera texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tessera texture sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            device: device.clone(),
            queue: queue.clone(),
            target_format,
            staging: Mutex::new(wgpu::util::StagingBelt::new(device.clone(), STAGING_CHUNK_SIZE)),
            constant_layout,
            texture_layout,
            sampler,
        }
    }

    /// Makes staging chunks used by submitted work available again.
    ///
    /// Call once the command buffer holding the recorded uploads was submitted.
    pub fn recall_staging(&self) {
        self.staging().recall();
    }

    /// The belt only holds plain buffers, so a poisoned lock leaves it usable.
    pub(super) fn staging(&self) -> MutexGuard<'_, wgpu::util::StagingBelt> {
        self.staging.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    #[inline]
    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }

    #[inline]
    pub(super) fn texture_layout(&self) -> &wgpu::BindGroupLayout {
        &self.texture_layout
    }

    #[inline]
    pub(super) fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

impl GraphicsDevice for WgpuDevice {
    type Buffer = WgpuBuffer;
    type ShaderModule = WgpuShaderModule;
    type Pipeline = WgpuPipeline;
    type Texture = WgpuTexture;

    fn create_buffer(&self, desc: &BufferDesc<'_>) -> Result<WgpuBuffer> {
        let max = self.device.limits().max_buffer_size;
        anyhow::ensure!(desc.size > 0, "buffer '{}' has zero size", desc.label);
        anyhow::ensure!(
            desc.size <= max,
            "buffer '{}' needs {} bytes; device limit is {max}",
            desc.label,
            desc.size
        );
        anyhow::ensure!(
            desc.size % wgpu::COPY_BUFFER_ALIGNMENT == 0,
            "buffer '{}' size {} is not 4-byte aligned",
            desc.label,
            desc.size
        );

        let usage = match desc.kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
            BufferKind::Constant => wgpu::BufferUsages::UNIFORM,
        } | wgpu::BufferUsages::COPY_DST;

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(desc.label),
            size: desc.size,
            usage,
            mapped_at_creation: false,
        });

        let bind_group = (desc.kind == BufferKind::Constant).then(|| {
            self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(desc.label),
                layout: &self.constant_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            })
        });

        log::trace!(
            "created {:?} buffer '{}' ({} bytes, dynamic: {})",
            desc.kind,
            desc.label,
            desc.size,
            desc.dynamic
        );

        Ok(WgpuBuffer { buffer, kind: desc.kind, bind_group })
    }

    fn create_shader_module(&self, desc: &ShaderModuleDesc<'_>) -> Result<WgpuShaderModule> {
        anyhow::ensure!(!desc.entry_point.is_empty(), "shader '{}' has no entry point", desc.label);

        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(desc.label),
            source: wgpu::ShaderSource::Wgsl(desc.source.into()),
        });

        Ok(WgpuShaderModule {
            module,
            stage: desc.stage,
            entry_point: desc.entry_point.to_owned(),
        })
    }

    fn create_pipeline(&self, desc: &PipelineDesc<'_, WgpuShaderModule>) -> Result<WgpuPipeline> {
        anyhow::ensure!(
            desc.vertex.stage == ShaderStage::Vertex,
            "pipeline '{}': vertex module is a {:?} shader",
            desc.label,
            desc.vertex.stage
        );
        anyhow::ensure!(
            desc.pixel.stage == ShaderStage::Pixel,
            "pipeline '{}': pixel module is a {:?} shader",
            desc.label,
            desc.pixel.stage
        );

        let slots = group_attributes(desc.input_layout)
            .with_context(|| format!("pipeline '{}': invalid input layout", desc.label))?;

        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = slots
            .iter()
            .map(|(step_mode, attributes)| wgpu::VertexBufferLayout {
                array_stride: desc.stride,
                step_mode: *step_mode,
                attributes,
            })
            .collect();

        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(desc.label),
            bind_group_layouts: &[&self.constant_layout, &self.texture_layout],
            immediate_size: 0,
        });

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &desc.vertex.module,
                entry_point: Some(desc.vertex.entry_point.as_str()),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &desc.pixel.module,
                entry_point: Some(desc.pixel.entry_point.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.target_format,
                    blend: Some(blend_state(desc.blend)),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(WgpuPipeline { pipeline })
    }
}

// ── helpers ───────────────────────────────────────────────────────────────

fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    match mode {
        BlendMode::Opaque => wgpu::BlendState::REPLACE,
        BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
        BlendMode::Premultiplied => wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING,
    }
}

fn vertex_format(format: VertexFormat) -> wgpu::VertexFormat {
    match format {
        VertexFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
        VertexFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
    }
}

/// Splits an input layout into per-slot attribute lists.
///
/// Slots must be dense (`0..n`) and agree on their step mode. Shader locations
/// are assigned in declaration order across all slots.
fn group_attributes(
    layout: &[InputElement],
) -> Result<Vec<(wgpu::VertexStepMode, Vec<wgpu::VertexAttribute>)>> {
    let slot_count = layout.iter().map(|e| e.slot as usize + 1).max().unwrap_or(0);
    let mut slots: Vec<Option<(wgpu::VertexStepMode, Vec<wgpu::VertexAttribute>)>> =
        vec![None; slot_count];

    for (location, element) in layout.iter().enumerate() {
        let step_mode = match element.input_type {
            InputType::PerVertex => wgpu::VertexStepMode::Vertex,
            InputType::PerInstance => wgpu::VertexStepMode::Instance,
        };

        let (mode, attributes) =
            slots[element.slot as usize].get_or_insert_with(|| (step_mode, Vec::new()));
        anyhow::ensure!(
            *mode == step_mode,
            "slot {} mixes per-vertex and per-instance elements",
            element.slot
        );

        attributes.push(wgpu::VertexAttribute {
            format: vertex_format(element.format),
            offset: u64::from(element.offset),
            shader_location: location as u32,
        });
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(slot, entry)| entry.with_context(|| format!("vertex buffer slot {slot} is unused")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_follow_declaration_order() {
        let layout = [
            InputElement::per_vertex(VertexFormat::Float32x2, 0),
            InputElement::per_vertex(VertexFormat::Float32x2, 8),
            InputElement::per_vertex(VertexFormat::Float32x4, 16),
        ];
        let slots = group_attributes(&layout).unwrap();
        assert_eq!(slots.len(), 1);

        let (mode, attrs) = &slots[0];
        assert_eq!(*mode, wgpu::VertexStepMode::Vertex);
        let locations: Vec<u32> = attrs.iter().map(|a| a.shader_location).collect();
        let offsets: Vec<u64> = attrs.iter().map(|a| a.offset).collect();
        assert_eq!(locations, [0, 1, 2]);
        assert_eq!(offsets, [0, 8, 16]);
        assert_eq!(attrs[2].format, wgpu::VertexFormat::Float32x4);
    }

    #[test]
    fn sparse_slots_are_rejected() {
        let layout = [InputElement {
            format: VertexFormat::Float32x2,
            offset: 0,
            slot: 1,
            input_type: InputType::PerVertex,
        }];
        assert!(group_attributes(&layout).is_err());
    }

    #[test]
    fn mixed_step_modes_in_one_slot_are_rejected() {
        let layout = [
            InputElement::per_vertex(VertexFormat::Float32x2, 0),
            InputElement {
                format: VertexFormat::Float32x2,
                offset: 8,
                slot: 0,
                input_type: InputType::PerInstance,
            },
        ];
        assert!(group_attributes(&layout).is_err());
    }
}

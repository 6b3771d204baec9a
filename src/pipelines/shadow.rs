//! Depth-only pass that renders the scene from every light.

use std::num::NonZeroU64;

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        light::{Light, MAX_LIGHTS},
        scene_graph::PassSpec,
        texture::Texture,
    },
    pipelines::{self, SHADOW_BINDING, VertexLayout},
    render::{DRAW_BLOCK_SIZE, ProgramLayout},
};

pub const LIGHT_GROUP: u32 = 0;

/// Size of one light's viewing matrix in the light buffer.
const LIGHT_VIEW_SIZE: u64 = 64;

pub fn program_layout() -> ProgramLayout {
    ProgramLayout::default()
        .with_uniform("modeling", 0)
        .with_attribute("position", 0)
}

pub struct ShadowPipeline {
    pub layout: ProgramLayout,
    /// What every mesh's [`SHADOW_BINDING`] configuration has to match.
    pub vertex_layout: VertexLayout,
    pub pipeline: wgpu::RenderPipeline,
    pub light_layout: wgpu::BindGroupLayout,
}

impl ShadowPipeline {
    pub fn new(
        device: &wgpu::Device,
        draw_layout: &wgpu::BindGroupLayout,
        depth_bias: wgpu::DepthBiasState,
    ) -> anyhow::Result<Self> {
        let layout = program_layout();
        let light_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(LIGHT_VIEW_SIZE),
                },
                count: None,
            }],
            label: Some("shadow_light_bind_group_layout"),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[Some(&light_layout), Some(draw_layout)],
            immediate_size: 0,
        });
        let vertex_layout = VertexLayout::shape(&Self::locations(&layout))?;
        let shader = wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shadow.wgsl").into()),
        };
        let pipeline = pipelines::mk_render_pipeline(
            device,
            "Shadow Pipeline",
            &pipeline_layout,
            None,
            depth_bias,
            &[vertex_layout.buffer_layout()],
            shader,
        );
        Ok(Self {
            layout,
            vertex_layout,
            pipeline,
            light_layout,
        })
    }

    fn locations(layout: &ProgramLayout) -> [Option<u32>; 3] {
        [layout.attribute_location("position"), None, None]
    }

    /// Locations to bind a mesh's [`SHADOW_BINDING`] configuration to. Only
    /// the position is read.
    pub fn attribute_locations(&self) -> [Option<u32>; 3] {
        Self::locations(&self.layout)
    }

    /// Modeling matrix only: no per-node uniforms, no textures.
    pub fn pass_spec(&self) -> PassSpec {
        PassSpec {
            modeling: self.layout.uniform_location("modeling"),
            uniforms: Vec::new(),
            binding: SHADOW_BINDING,
            samplers: Vec::new(),
        }
    }
}

/// One shadow-map layer per light slot plus the viewing matrices that fill
/// them.
pub struct ShadowMaps {
    pub texture: Texture,
    layer_views: Vec<wgpu::TextureView>,
    light_buffer: wgpu::Buffer,
    light_bind_group: wgpu::BindGroup,
    /// What the lit pass samples: the whole array and the compare sampler.
    pub sample_bind_group: wgpu::BindGroup,
    resolution: u32,
}

impl ShadowMaps {
    pub fn new(
        device: &wgpu::Device,
        pipeline: &ShadowPipeline,
        sample_layout: &wgpu::BindGroupLayout,
        resolution: u32,
    ) -> anyhow::Result<Self> {
        let resolution = resolution.max(1);
        let texture = Texture::create_shadow_array(device, resolution, MAX_LIGHTS as u32, "shadow maps");
        let layer_views = (0..MAX_LIGHTS as u32).map(|layer| texture.layer_view(layer)).collect();

        // one 256 byte block per light keeps the dynamic offsets aligned
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shadow Light Buffer"),
            contents: &vec![0u8; MAX_LIGHTS * DRAW_BLOCK_SIZE as usize],
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &pipeline.light_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &light_buffer,
                    offset: 0,
                    size: NonZeroU64::new(LIGHT_VIEW_SIZE),
                }),
            }],
            label: Some("shadow_light_bind_group"),
        });

        let sampler = texture
            .sampler
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("shadow maps were created without a compare sampler"))?;
        let sample_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: sample_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
            label: Some("shadow_sample_bind_group"),
        });

        Ok(Self {
            texture,
            layer_views,
            light_buffer,
            light_bind_group,
            sample_bind_group,
            resolution,
        })
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Uploads the viewing matrix of each light into its block. Lights past
    /// [`MAX_LIGHTS`] are ignored.
    pub fn write_lights(&self, queue: &wgpu::Queue, lights: &[Light], near: f32, far: f32) {
        for (layer, light) in lights.iter().take(MAX_LIGHTS).enumerate() {
            let viewing: [[f32; 4]; 4] = light.viewing(near, far).into();
            queue.write_buffer(
                &self.light_buffer,
                layer as wgpu::BufferAddress * DRAW_BLOCK_SIZE,
                bytemuck::cast_slice(&viewing),
            );
        }
    }

    /// Starts the depth pass of light `layer`: clears its map, sets the
    /// viewport to the whole map and binds the light. Dropping the pass ends
    /// it.
    pub fn begin_depth_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        pipeline: &ShadowPipeline,
        layer: usize,
    ) -> Option<wgpu::RenderPass<'e>> {
        let view = self.layer_views.get(layer)?;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });
        let size = self.resolution as f32;
        pass.set_viewport(0.0, 0.0, size, size, 0.0, 1.0);
        pass.set_scissor_rect(0, 0, self.resolution, self.resolution);
        pass.set_pipeline(&pipeline.pipeline);
        let offset = layer as wgpu::BufferAddress * DRAW_BLOCK_SIZE;
        pass.set_bind_group(LIGHT_GROUP, &self.light_bind_group, &[offset as wgpu::DynamicOffset]);
        Some(pass)
    }
}

use bytemuck::Zeroable;
use cgmath::{Matrix4, Vector3};
use log::warn;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        light::{Light, LightUniform, MAX_LIGHTS},
        scene_graph::{PassSpec, UniformSlot},
    },
    pipelines::{self, MAIN_BINDING, VertexLayout},
    render::ProgramLayout,
    resources::texture::diffuse_layout,
};

pub const FRAME_GROUP: u32 = 0;
pub const SHADOW_GROUP: u32 = 2;
pub const TEXTURE0_GROUP: u32 = 3;

/// The inputs of `lit.wgsl`.
pub fn program_layout() -> ProgramLayout {
    ProgramLayout::default()
        .with_uniform("modeling", 0)
        .with_uniform("specular", 4)
        .with_attribute("position", 0)
        .with_attribute("texCoords", 1)
        .with_attribute("normal", 2)
        .with_sampler("texture0", TEXTURE0_GROUP)
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    viewing: [[f32; 4]; 4],
    cam_pos: [f32; 3],
    light_count: u32,
    ambient: f32,
    _padding: [u32; 3],
    lights: [LightUniform; MAX_LIGHTS],
}

impl FrameUniform {
    /// Packs the camera and up to [`MAX_LIGHTS`] lights. Extra lights are
    /// dropped.
    pub fn new(
        viewing: Matrix4<f32>,
        cam_pos: Vector3<f32>,
        lights: &[Light],
        ambient: f32,
        shadow_near: f32,
        shadow_far: f32,
    ) -> Self {
        if lights.len() > MAX_LIGHTS {
            warn!("{} lights given, only the first {MAX_LIGHTS} are shaded", lights.len());
        }
        let mut packed = [LightUniform::zeroed(); MAX_LIGHTS];
        for (dst, light) in packed.iter_mut().zip(lights) {
            *dst = light.to_raw(shadow_near, shadow_far);
        }
        Self {
            viewing: viewing.into(),
            cam_pos: cam_pos.into(),
            light_count: lights.len().min(MAX_LIGHTS) as u32,
            ambient,
            _padding: [0; 3],
            lights: packed,
        }
    }

    pub fn light_count(&self) -> u32 {
        self.light_count
    }
}

pub struct LitPipeline {
    pub layout: ProgramLayout,
    /// What every mesh's [`MAIN_BINDING`] configuration has to match.
    pub vertex_layout: VertexLayout,
    pub pipeline: wgpu::RenderPipeline,
    pub texture_layout: wgpu::BindGroupLayout,
    pub shadow_layout: wgpu::BindGroupLayout,
    frame_buffer: wgpu::Buffer,
    pub frame_bind_group: wgpu::BindGroup,
}

impl LitPipeline {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        draw_layout: &wgpu::BindGroupLayout,
    ) -> anyhow::Result<Self> {
        let layout = program_layout();

        let frame_layout = mk_frame_bind_group_layout(device);
        let shadow_layout = mk_shadow_sample_layout(device);
        let texture_layout = diffuse_layout(device);

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Buffer"),
            contents: bytemuck::cast_slice(&[FrameUniform::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
            label: Some("frame_bind_group"),
        });

        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Lit Pipeline Layout"),
            bind_group_layouts: &[Some(&frame_layout), Some(draw_layout), Some(&shadow_layout), Some(&texture_layout)],
            immediate_size: 0,
        });
        let vertex_layout = VertexLayout::shape(&Self::locations(&layout))?;
        let shader = wgpu::ShaderModuleDescriptor {
            label: Some("Lit Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("lit.wgsl").into()),
        };
        let pipeline = pipelines::mk_render_pipeline(
            device,
            "Lit Pipeline",
            &render_pipeline_layout,
            Some(color_format),
            wgpu::DepthBiasState::default(),
            &[vertex_layout.buffer_layout()],
            shader,
        );

        Ok(Self {
            layout,
            vertex_layout,
            pipeline,
            texture_layout,
            shadow_layout,
            frame_buffer,
            frame_bind_group,
        })
    }

    /// Traversal parameters of the lit pass: modeling matrix, a 3-float
    /// specular colour per node and one texture per node.
    pub fn pass_spec(&self) -> PassSpec {
        PassSpec {
            modeling: self.layout.uniform_location("modeling"),
            uniforms: vec![UniformSlot {
                dim: 3,
                location: self.layout.uniform_location("specular"),
            }],
            binding: MAIN_BINDING,
            samplers: vec![self.layout.sampler_location("texture0")],
        }
    }

    fn locations(layout: &ProgramLayout) -> [Option<u32>; 3] {
        [
            layout.attribute_location("position"),
            layout.attribute_location("texCoords"),
            layout.attribute_location("normal"),
        ]
    }

    /// Locations to bind a mesh's [`MAIN_BINDING`] configuration to.
    pub fn attribute_locations(&self) -> [Option<u32>; 3] {
        Self::locations(&self.layout)
    }

    pub fn write_frame(&self, queue: &wgpu::Queue, frame: &FrameUniform) {
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(frame));
    }

    pub fn bind_frame(&self, pass: &mut wgpu::RenderPass<'_>, shadow_group: &wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(FRAME_GROUP, &self.frame_bind_group, &[]);
        pass.set_bind_group(SHADOW_GROUP, shadow_group, &[]);
    }
}

fn mk_frame_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("frame_bind_group_layout"),
    })
}

/// Shadow maps as the lit pass samples them: every light's layer plus the
/// comparison sampler.
fn mk_shadow_sample_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2Array,
                    sample_type: wgpu::TextureSampleType::Depth,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                count: None,
            },
        ],
        label: Some("shadow_sample_bind_group_layout"),
    })
}

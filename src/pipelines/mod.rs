//! Render pipelines.
//!
//! - `lit` is the full program: textured, specular, lit by every light and
//!   shadowed by every shadow map
//! - `shadow` is the depth-only program that fills one shadow map per light
//!
//! Both draw the same meshes. Vertices are laid out as XYZ + ST + NOP
//! ([`SHAPE_ATTR_DIMS`]); the lit program reads all three attributes, the
//! shadow program only the position. Each program has its own binding
//! configuration on every [`GpuMesh`](crate::resources::gpu_mesh::GpuMesh):
//! [`MAIN_BINDING`] and [`SHADOW_BINDING`]. A pipeline only draws meshes
//! whose configuration matches its [`VertexLayout`].

use std::num::NonZeroU64;

use crate::{
    render::DRAW_BLOCK_SIZE,
    resources::gpu_mesh::{GpuMeshError, vertex_attributes},
};

pub mod lit;
pub mod shadow;

/// Attribute dimensions of every mesh the pipelines draw.
pub const SHAPE_ATTR_DIMS: [u32; 3] = [3, 2, 3];
/// Binding configuration used by the lit pass.
pub const MAIN_BINDING: usize = 0;
/// Binding configuration used by the shadow pass.
pub const SHADOW_BINDING: usize = 1;
/// Binding configurations every mesh needs.
pub const BINDING_COUNT: usize = 2;

/// The vertex buffer layout a pipeline is built with.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexLayout {
    pub array_stride: wgpu::BufferAddress,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

impl VertexLayout {
    /// [`SHAPE_ATTR_DIMS`] vertices with their attributes at `locations`.
    pub fn shape(locations: &[Option<u32>]) -> Result<Self, GpuMeshError> {
        Ok(Self {
            array_stride: (SHAPE_ATTR_DIMS.iter().sum::<u32>() * 4) as wgpu::BufferAddress,
            attributes: vertex_attributes(&SHAPE_ATTR_DIMS, locations)?,
        })
    }

    pub fn buffer_layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.array_stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

/// Bind group index of the per-draw uniform block in both programs.
pub const DRAW_GROUP: u32 = 1;

/// Layout of the per-draw uniform block, read at a dynamic offset.
pub fn mk_draw_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: NonZeroU64::new(DRAW_BLOCK_SIZE),
            },
            count: None,
        }],
        label: Some("draw_bind_group_layout"),
    })
}

/// Binds one block's worth of `buffer` under [`mk_draw_bind_group_layout`].
pub fn mk_draw_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: NonZeroU64::new(DRAW_BLOCK_SIZE),
            }),
        }],
        label: Some("draw_bind_group"),
    })
}

/// Shared pipeline boilerplate. Without a `color_format` the pipeline is
/// depth only and has no fragment stage.
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    color_format: Option<wgpu::TextureFormat>,
    depth_bias: wgpu::DepthBiasState,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);
    let targets = [color_format.map(|format| wgpu::ColorTargetState {
        format,
        blend: Some(wgpu::BlendState::REPLACE),
        write_mask: wgpu::ColorWrites::ALL,
    })];

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: color_format.map(|_| wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &targets,
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: crate::data_structures::texture::Texture::DEPTH_FORMAT,
            depth_write_enabled: Some(true),
            depth_compare: Some(wgpu::CompareFunction::LessEqual),
            stencil: wgpu::StencilState::default(),
            bias: depth_bias,
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}

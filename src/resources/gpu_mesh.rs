//! GPU-resident meshes.
//!
//! A [`GpuMesh`] uploads the interleaved vertices and the triangle indices of
//! a CPU [`Mesh`] once, into static buffers. On top of that single upload it
//! keeps several binding configurations, each of which maps the mesh's
//! attributes onto the input locations of one shader program. The lit pass
//! and the shadow pass draw the same buffers through different
//! configurations.

use log::{info, warn};
use thiserror::Error;
use wgpu::util::DeviceExt;

use crate::data_structures::mesh::Mesh;

#[derive(Error, Debug, PartialEq)]
pub enum GpuMeshError {
    #[error("attribute {index} has dimension {dim}, only 1 to 4 are supported")]
    InvalidDimension { index: usize, dim: u32 },
    #[error("attributes need {declared} floats per vertex but the mesh has {available}")]
    DimensionOverflow { declared: u32, available: usize },
    #[error("{given} shader locations for {expected} attributes")]
    LocationCount { given: usize, expected: usize },
    #[error("binding configuration {index} does not exist, the mesh has {count}")]
    BindingOutOfRange { index: usize, count: usize },
    #[error("binding configuration {index} was never bound")]
    Unbound { index: usize },
    #[error("binding configuration {index} has stride {stride}, the pipeline reads {expected}")]
    StrideMismatch {
        index: usize,
        stride: wgpu::BufferAddress,
        expected: wgpu::BufferAddress,
    },
    #[error("binding configuration {index} feeds other attributes than the pipeline reads")]
    AttributeMismatch { index: usize },
}

fn float_format(dim: u32) -> Option<wgpu::VertexFormat> {
    match dim {
        1 => Some(wgpu::VertexFormat::Float32),
        2 => Some(wgpu::VertexFormat::Float32x2),
        3 => Some(wgpu::VertexFormat::Float32x3),
        4 => Some(wgpu::VertexFormat::Float32x4),
        _ => None,
    }
}

/// Maps consecutive attributes of `attr_dims` floats onto `locations`.
///
/// Attribute `i` starts right after attribute `i - 1` ends. A location of
/// `None` leaves that attribute out of the configuration without moving the
/// ones after it.
pub fn vertex_attributes(
    attr_dims: &[u32],
    locations: &[Option<u32>],
) -> Result<Vec<wgpu::VertexAttribute>, GpuMeshError> {
    if attr_dims.len() != locations.len() {
        return Err(GpuMeshError::LocationCount {
            given: locations.len(),
            expected: attr_dims.len(),
        });
    }
    let mut attributes = Vec::with_capacity(attr_dims.len());
    let mut offset: wgpu::BufferAddress = 0;
    for (index, (dim, location)) in attr_dims.iter().zip(locations).enumerate() {
        let format = float_format(*dim).ok_or(GpuMeshError::InvalidDimension { index, dim: *dim })?;
        if let Some(shader_location) = location {
            attributes.push(wgpu::VertexAttribute {
                offset,
                shader_location: *shader_location,
                format,
            });
        }
        offset += format.size();
    }
    Ok(attributes)
}

#[derive(Debug)]
pub struct GpuMesh {
    label: String,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_count: usize,
    index_count: u32,
    attr_dims: Vec<u32>,
    array_stride: wgpu::BufferAddress,
    bindings: Vec<Option<Vec<wgpu::VertexAttribute>>>,
}

impl GpuMesh {
    /// Uploads `mesh` and reserves `binding_count` binding configurations,
    /// none of which is usable before [`bind_attributes`](Self::bind_attributes).
    ///
    /// `attr_dims` splits each vertex into attributes. The dimensions may add
    /// up to less than the mesh's `attr_dim`; trailing floats are then skipped.
    /// A mesh without triangles uploads fine and draws nothing.
    pub fn new(
        device: &wgpu::Device,
        mesh: &Mesh,
        attr_dims: &[u32],
        binding_count: usize,
        label: &str,
    ) -> Result<Self, GpuMeshError> {
        for (index, dim) in attr_dims.iter().enumerate() {
            if float_format(*dim).is_none() {
                return Err(GpuMeshError::InvalidDimension { index, dim: *dim });
            }
        }
        let declared: u32 = attr_dims.iter().sum();
        if declared as usize > mesh.attr_dim() {
            return Err(GpuMeshError::DimensionOverflow {
                declared,
                available: mesh.attr_dim(),
            });
        }
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(mesh.triangles()),
            usage: wgpu::BufferUsages::INDEX,
        });
        info!(
            "uploaded mesh {label}: {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );

        Ok(Self {
            label: label.to_string(),
            vertex_buffer,
            index_buffer,
            vertex_count: mesh.vertex_count(),
            index_count: (mesh.triangle_count() * 3) as u32,
            attr_dims: attr_dims.to_vec(),
            array_stride: (mesh.attr_dim() * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
            bindings: vec![None; binding_count],
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn is_empty(&self) -> bool {
        self.index_count == 0 || self.vertex_count == 0
    }

    /// Connects the declared attributes, in order, to `locations` for
    /// configuration `index`. The locations must belong to the program that
    /// will draw through this configuration.
    pub fn bind_attributes(&mut self, index: usize, locations: &[Option<u32>]) -> Result<(), GpuMeshError> {
        let count = self.bindings.len();
        let attributes = vertex_attributes(&self.attr_dims, locations)?;
        let slot = self
            .bindings
            .get_mut(index)
            .ok_or(GpuMeshError::BindingOutOfRange { index, count })?;
        *slot = Some(attributes);
        Ok(())
    }

    /// Vertex buffer layout of configuration `index`, or `None` while it is
    /// unbound.
    pub fn layout(&self, index: usize) -> Option<wgpu::VertexBufferLayout<'_>> {
        let attributes = self.bindings.get(index)?.as_deref()?;
        Some(wgpu::VertexBufferLayout {
            array_stride: self.array_stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        })
    }

    /// Checks that configuration `index` feeds exactly the vertex layout a
    /// pipeline was built with.
    pub fn check_layout(&self, index: usize, expected: &wgpu::VertexBufferLayout<'_>) -> Result<(), GpuMeshError> {
        let count = self.bindings.len();
        if index >= count {
            return Err(GpuMeshError::BindingOutOfRange { index, count });
        }
        let layout = self.layout(index).ok_or(GpuMeshError::Unbound { index })?;
        if layout.array_stride != expected.array_stride {
            return Err(GpuMeshError::StrideMismatch {
                index,
                stride: layout.array_stride,
                expected: expected.array_stride,
            });
        }
        if layout.attributes != expected.attributes {
            return Err(GpuMeshError::AttributeMismatch { index });
        }
        Ok(())
    }

    pub fn bind_buffers(&self, pass: &mut wgpu::RenderPass<'_>) {
        // empty buffers cannot be sliced
        if self.is_empty() {
            return;
        }
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    /// Draws the triangles through configuration `index`, assuming the buffers
    /// are already bound and a matching pipeline is set.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, index: usize) {
        match self.bindings.get(index) {
            Some(Some(_)) if self.is_empty() => {}
            Some(Some(_)) => pass.draw_indexed(0..self.index_count, 0, 0..1),
            Some(None) => warn!("mesh {}: binding configuration {index} was never bound", self.label),
            None => warn!("mesh {}: binding configuration {index} does not exist", self.label),
        }
    }

    /// Binds the buffers and draws through configuration `index`.
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>, index: usize) {
        self.bind_buffers(pass);
        self.draw(pass, index);
    }

    /// Releases both device buffers right away instead of when the last
    /// handle drops. The CPU mesh is untouched.
    pub fn destroy(self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

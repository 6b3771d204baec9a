//! GPU resources shared by the scene.
//!
//! Scene nodes refer to meshes and textures by handle. [`Assets`] owns the
//! resources behind the handles and outlives every traversal that uses them.

use log::{info, warn};

use crate::data_structures::texture::Texture;

pub mod gpu_mesh;
pub mod texture;

use gpu_mesh::GpuMesh;

/// Handle of a [`GpuMesh`] registered in [`Assets`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

/// Handle of a [`Texture`] registered in [`Assets`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

struct TextureEntry {
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// Owns every mesh and texture the scene graph refers to.
///
/// Handles are never reused, so a handle stays valid for the lifetime of the
/// registry.
pub struct Assets {
    meshes: Vec<GpuMesh>,
    textures: Vec<TextureEntry>,
    layout: wgpu::BindGroupLayout,
    fallback: TextureEntry,
}

impl Assets {
    /// Creates an empty registry. Texture bind groups are built against
    /// `layout`; draws that leave a sampler group unbound get a 1×1 white
    /// texture instead.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, layout: &wgpu::BindGroupLayout) -> anyhow::Result<Self> {
        let white = Texture::solid_colour(device, queue, [255; 4], [1, 1], "fallback texture")?;
        let bind_group = texture::mk_diffuse_bind_group(device, layout, &white, "fallback texture");
        Ok(Self {
            meshes: Vec::new(),
            textures: Vec::new(),
            layout: layout.clone(),
            fallback: TextureEntry {
                texture: white,
                bind_group,
            },
        })
    }

    /// Meshes come in through [`Context::add_mesh`](crate::context::Context::add_mesh),
    /// which checks them against the pipelines.
    pub(crate) fn add_mesh(&mut self, mesh: GpuMesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&GpuMesh> {
        self.meshes.get(id.0)
    }

    pub fn meshes(&self) -> &[GpuMesh] {
        &self.meshes
    }

    pub fn add_texture(&mut self, device: &wgpu::Device, texture: Texture, label: &str) -> TextureId {
        let bind_group = texture::mk_diffuse_bind_group(device, &self.layout, &texture, label);
        self.textures.push(TextureEntry { texture, bind_group });
        info!("registered texture {label}");
        TextureId(self.textures.len() - 1)
    }

    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id.0).map(|entry| &entry.texture)
    }

    /// The bind group of `id`, or of the fallback texture if `id` is `None`
    /// or unknown.
    pub fn texture_bind_group(&self, id: Option<TextureId>) -> &wgpu::BindGroup {
        match id.map(|id| self.textures.get(id.0)) {
            Some(Some(entry)) => &entry.bind_group,
            Some(None) => {
                warn!("unknown texture {id:?}, using the fallback");
                &self.fallback.bind_group
            }
            None => &self.fallback.bind_group,
        }
    }

    /// Releases the device buffers of every mesh.
    pub fn destroy(self) {
        for mesh in self.meshes {
            mesh.destroy();
        }
    }
}

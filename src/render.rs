//! Draw recording and batching.
//!
//! Scene traversal does not talk to wgpu directly. It talks to a [`Painter`],
//! which gets told about every uniform upload, texture bind and draw in order.
//! [`DrawList`] is the painter the renderer uses: it snapshots the uniform
//! state of each draw into a 256-byte block so that a whole frame can be
//! uploaded with one buffer write, then replays the draws into a render pass
//! using dynamic offsets.
//!
//! # Key types
//!
//! - [`Painter`] is the seam between the scene graph and a backend
//! - [`ProgramLayout`] names the inputs of a shader program
//! - [`DrawList`] records draws and replays them into a [`wgpu::RenderPass`]
//!

use std::collections::HashMap;

use cgmath::Matrix4;
use log::warn;

use crate::{
    data_structures::scene_graph::MAX_TEXTURE_UNITS,
    resources::{Assets, MeshId, TextureId},
};

/// Floats in one per-draw uniform block.
pub const DRAW_BLOCK_FLOATS: usize = 64;
/// Bytes in one per-draw uniform block, which is also the dynamic offset
/// stride and therefore a multiple of the offset alignment.
pub const DRAW_BLOCK_SIZE: wgpu::BufferAddress = (DRAW_BLOCK_FLOATS * 4) as wgpu::BufferAddress;

/// A `vec4` slot inside the per-draw uniform block. A 4×4 matrix takes four
/// consecutive slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// The bind group index a texture is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SamplerLocation(pub u32);

/// Receives the effects of a scene traversal.
pub trait Painter {
    fn set_modeling(&mut self, location: UniformLocation, modeling: &Matrix4<f32>);
    /// `values` holds 1 to 4 floats.
    fn set_uniform(&mut self, location: UniformLocation, values: &[f32]);
    fn bind_texture(&mut self, unit: usize, texture: TextureId, location: SamplerLocation);
    fn unbind_texture(&mut self, unit: usize, location: SamplerLocation);
    fn draw(&mut self, mesh: MeshId, binding: usize);
}

/// Name lookup for the inputs of one shader program.
///
/// Every lookup returns `None` if the program has no input of that name.
#[derive(Clone, Debug, Default)]
pub struct ProgramLayout {
    uniforms: HashMap<&'static str, UniformLocation>,
    attributes: HashMap<&'static str, u32>,
    samplers: HashMap<&'static str, SamplerLocation>,
}

impl ProgramLayout {
    pub fn with_uniform(mut self, name: &'static str, slot: u32) -> Self {
        self.uniforms.insert(name, UniformLocation(slot));
        self
    }

    pub fn with_attribute(mut self, name: &'static str, location: u32) -> Self {
        self.attributes.insert(name, location);
        self
    }

    pub fn with_sampler(mut self, name: &'static str, group: u32) -> Self {
        self.samplers.insert(name, SamplerLocation(group));
        self
    }

    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.get(name).copied()
    }

    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).copied()
    }

    pub fn sampler_location(&self, name: &str) -> Option<SamplerLocation> {
        self.samplers.get(name).copied()
    }

    /// Every sampler group the program declares, sorted by group index.
    pub fn sampler_groups(&self) -> Vec<SamplerLocation> {
        let mut groups: Vec<_> = self.samplers.values().copied().collect();
        groups.sort_by_key(|location| location.0);
        groups
    }
}

/// One recorded draw.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    pub mesh: MeshId,
    pub binding: usize,
    /// Index of the uniform block in the owning list.
    pub block: usize,
    pub textures: Vec<(SamplerLocation, TextureId)>,
}

/// A [`Painter`] that records draws for later replay.
///
/// Uniform state carries over from one draw to the next until overwritten,
/// the same way program uniforms do.
#[derive(Debug)]
pub struct DrawList {
    current: [f32; DRAW_BLOCK_FLOATS],
    bound: [Option<(SamplerLocation, TextureId)>; MAX_TEXTURE_UNITS],
    blocks: Vec<f32>,
    commands: Vec<DrawCommand>,
}

impl Default for DrawList {
    fn default() -> Self {
        Self {
            current: [0.0; DRAW_BLOCK_FLOATS],
            bound: [None; MAX_TEXTURE_UNITS],
            blocks: Vec::new(),
            commands: Vec::new(),
        }
    }
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// All uniform blocks, one per command, back to back.
    pub fn blocks(&self) -> &[f32] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&[f32]> {
        let start = index * DRAW_BLOCK_FLOATS;
        self.blocks.get(start..start + DRAW_BLOCK_FLOATS)
    }

    fn slot_mut(&mut self, location: UniformLocation, slots: usize) -> Option<&mut [f32]> {
        let start = location.0 as usize * 4;
        self.current.get_mut(start..start + 4 * slots)
    }

    /// Replays the list into `pass`.
    ///
    /// `first_block` is where this list's blocks start in the uniform buffer
    /// behind `draw_group`, which is set at `draw_group_index` with a dynamic
    /// offset per draw. Every group in `samplers` gets a texture for every
    /// draw; groups the draw did not bind fall back to the default texture.
    pub fn replay(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        assets: &Assets,
        draw_group_index: u32,
        draw_group: &wgpu::BindGroup,
        first_block: usize,
        samplers: &[SamplerLocation],
    ) {
        let mut last_mesh: Option<MeshId> = None;
        for command in &self.commands {
            let Some(mesh) = assets.mesh(command.mesh) else {
                warn!("draw of unknown mesh {:?} skipped", command.mesh);
                continue;
            };
            let offset = (first_block + command.block) as wgpu::BufferAddress * DRAW_BLOCK_SIZE;
            pass.set_bind_group(draw_group_index, draw_group, &[offset as wgpu::DynamicOffset]);
            for location in samplers {
                let texture = command
                    .textures
                    .iter()
                    .find(|(bound, _)| bound == location)
                    .map(|(_, texture)| *texture);
                pass.set_bind_group(location.0, assets.texture_bind_group(texture), &[]);
            }
            if last_mesh != Some(command.mesh) {
                mesh.bind_buffers(pass);
                last_mesh = Some(command.mesh);
            }
            mesh.draw(pass, command.binding);
        }
    }
}

impl Painter for DrawList {
    fn set_modeling(&mut self, location: UniformLocation, modeling: &Matrix4<f32>) {
        let columns: [[f32; 4]; 4] = (*modeling).into();
        match self.slot_mut(location, 4) {
            Some(dst) => dst.copy_from_slice(columns.as_flattened()),
            None => warn!("modeling location {} is outside the draw block", location.0),
        }
    }

    fn set_uniform(&mut self, location: UniformLocation, values: &[f32]) {
        let Some(dst) = self.slot_mut(location, 1) else {
            warn!("uniform location {} is outside the draw block", location.0);
            return;
        };
        dst.fill(0.0);
        for (dst, src) in dst.iter_mut().zip(values) {
            *dst = *src;
        }
    }

    fn bind_texture(&mut self, unit: usize, texture: TextureId, location: SamplerLocation) {
        match self.bound.get_mut(unit) {
            Some(slot) => *slot = Some((location, texture)),
            None => warn!("texture unit {unit} does not exist"),
        }
    }

    fn unbind_texture(&mut self, unit: usize, _location: SamplerLocation) {
        if let Some(slot) = self.bound.get_mut(unit) {
            *slot = None;
        }
    }

    fn draw(&mut self, mesh: MeshId, binding: usize) {
        let block = self.commands.len();
        self.blocks.extend_from_slice(&self.current);
        self.commands.push(DrawCommand {
            mesh,
            binding,
            block,
            textures: self.bound.iter().flatten().copied().collect(),
        });
    }
}

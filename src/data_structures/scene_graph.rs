//! Scene graph and hierarchical scene organization.
//!
//! A scene is a forest of [`SceneNode`]s. Every node owns its children, and
//! the children of one parent are siblings in insertion order. Each node
//! carries a local rigid transform, a flat uniform payload, a fixed number of
//! texture slots and a handle to the mesh it draws. Meshes and textures are
//! owned by [`Assets`](crate::resources::Assets); nodes only name them.
//!
//! [`render`] walks a forest depth first and reports everything it would do to
//! a [`Painter`], which either records GPU work or, in tests, just watches.

use std::collections::TryReserveError;

use cgmath::{Matrix3, Matrix4, SquareMatrix, Vector3};
use log::warn;
use thiserror::Error;

use crate::{
    linalg::matrix,
    render::{Painter, SamplerLocation, UniformLocation},
    resources::{MeshId, TextureId},
};

/// Texture units available to one draw.
pub const MAX_TEXTURE_UNITS: usize = 8;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("could not allocate node storage: {0}")]
    Allocation(#[from] TryReserveError),
    #[error("a node can hold at most {MAX_TEXTURE_UNITS} textures, {0} requested")]
    TooManyTextures(usize),
}

/// One shader uniform fed from a node's payload: the next `dim` floats
/// (1 to 4) go to `location`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformSlot {
    pub dim: usize,
    pub location: Option<UniformLocation>,
}

/// Everything a traversal needs to know about the program it draws with.
///
/// A `None` location means the program does not use that input; the value is
/// skipped but the payload offset still advances.
#[derive(Clone, Debug, Default)]
pub struct PassSpec {
    pub modeling: Option<UniformLocation>,
    pub uniforms: Vec<UniformSlot>,
    /// Which of the mesh's binding configurations to draw through.
    pub binding: usize,
    /// Sampler for texture slot `i` of every node, by index.
    pub samplers: Vec<Option<SamplerLocation>>,
}

impl PassSpec {
    /// Sum of the uniform dimensions, i.e. the payload length the pass reads.
    pub fn uniform_dim(&self) -> usize {
        self.uniforms.iter().map(|slot| slot.dim).sum()
    }
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    rotation: Matrix3<f32>,
    translation: Vector3<f32>,
    uniforms: Vec<f32>,
    textures: Vec<Option<TextureId>>,
    mesh: Option<MeshId>,
    children: Vec<SceneNode>,
}

impl SceneNode {
    /// Creates a node with identity rotation, zero translation, `uniform_dim`
    /// zeroed uniforms and `texture_count` empty texture slots. Both sizes are
    /// fixed for the lifetime of the node.
    pub fn new(uniform_dim: usize, texture_count: usize, mesh: Option<MeshId>) -> Result<Self, SceneError> {
        if texture_count > MAX_TEXTURE_UNITS {
            return Err(SceneError::TooManyTextures(texture_count));
        }
        let mut uniforms = Vec::new();
        uniforms.try_reserve_exact(uniform_dim)?;
        uniforms.resize(uniform_dim, 0.0);
        let mut textures = Vec::new();
        textures.try_reserve_exact(texture_count)?;
        textures.resize(texture_count, None);
        Ok(Self {
            rotation: Matrix3::identity(),
            translation: Vector3::new(0.0, 0.0, 0.0),
            uniforms,
            textures,
            mesh,
            children: Vec::new(),
        })
    }

    pub fn set_rotation(&mut self, rotation: Matrix3<f32>) {
        self.rotation = rotation;
    }

    pub fn set_translation(&mut self, translation: Vector3<f32>) {
        self.translation = translation;
    }

    pub fn rotation(&self) -> &Matrix3<f32> {
        &self.rotation
    }

    pub fn translation(&self) -> &Vector3<f32> {
        &self.translation
    }

    /// Copies as many values as the node holds; extra values are ignored and
    /// missing ones keep their current value.
    pub fn set_uniforms(&mut self, values: &[f32]) {
        for (dst, src) in self.uniforms.iter_mut().zip(values) {
            *dst = *src;
        }
    }

    pub fn set_uniform(&mut self, index: usize, value: f32) {
        if let Some(dst) = self.uniforms.get_mut(index) {
            *dst = value;
        }
    }

    pub fn uniforms(&self) -> &[f32] {
        &self.uniforms
    }

    pub fn set_textures(&mut self, textures: &[TextureId]) {
        for (dst, src) in self.textures.iter_mut().zip(textures) {
            *dst = Some(*src);
        }
    }

    pub fn set_texture(&mut self, index: usize, texture: TextureId) {
        if let Some(dst) = self.textures.get_mut(index) {
            *dst = Some(texture);
        }
    }

    pub fn textures(&self) -> &[Option<TextureId>] {
        &self.textures
    }

    pub fn set_mesh(&mut self, mesh: Option<MeshId>) {
        self.mesh = mesh;
    }

    pub fn mesh(&self) -> Option<MeshId> {
        self.mesh
    }

    /// Appends `child` as the youngest child.
    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    /// Detaches and returns child `index`, or `None` if there is no such child.
    /// Younger children move up by one.
    pub fn remove_child(&mut self, index: usize) -> Option<SceneNode> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [SceneNode] {
        &mut self.children
    }

    /// The node's own isometry: rotate, then translate.
    pub fn local_transform(&self) -> Matrix4<f32> {
        matrix::isometry(&self.rotation, &self.translation)
    }

    /// Number of nodes in this subtree, the node included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }
}

/// Texture binds of one node, released when dropped.
struct BoundTextures<'p, P: Painter + ?Sized> {
    painter: &'p mut P,
    units: Vec<(usize, SamplerLocation)>,
}

impl<'p, P: Painter + ?Sized> BoundTextures<'p, P> {
    fn bind(painter: &'p mut P, textures: &[Option<TextureId>], samplers: &[Option<SamplerLocation>]) -> Self {
        let mut units = Vec::with_capacity(textures.len());
        for (unit, texture) in textures.iter().enumerate() {
            let (Some(texture), Some(Some(location))) = (texture, samplers.get(unit)) else {
                continue;
            };
            painter.bind_texture(unit, *texture, *location);
            units.push((unit, *location));
        }
        Self { painter, units }
    }
}

impl<P: Painter + ?Sized> Drop for BoundTextures<'_, P> {
    fn drop(&mut self) {
        for (unit, location) in self.units.drain(..) {
            self.painter.unbind_texture(unit, location);
        }
    }
}

fn upload_uniforms<P: Painter + ?Sized>(painter: &mut P, values: &[f32], slots: &[UniformSlot]) {
    let mut offset = 0;
    for slot in slots {
        if !(1..=4).contains(&slot.dim) {
            warn!("skipping uniform of unsupported dimension {}", slot.dim);
            offset += slot.dim;
            continue;
        }
        let Some(chunk) = values.get(offset..offset + slot.dim) else {
            warn!(
                "node holds {} uniforms but the pass reads {} or more, skipping the rest",
                values.len(),
                offset + slot.dim
            );
            return;
        };
        if let Some(location) = slot.location {
            painter.set_uniform(location, chunk);
        }
        offset += slot.dim;
    }
}

/// Renders `nodes` and their descendants.
///
/// `parent` is the modeling transform of the nodes' parent, or the identity
/// for top-level nodes. For every node, in depth-first order with a node's
/// children before its younger siblings, this
///
/// 1. composes `parent * local` (the local isometry applies first),
/// 2. uploads it to the modeling location,
/// 3. uploads the uniform payload sliced per `pass.uniforms`,
/// 4. binds texture slot `i` to unit `i` and `pass.samplers[i]`,
/// 5. draws the mesh through `pass.binding`,
/// 6. unbinds the textures,
/// 7. recurses into the children with the composed transform.
///
/// Younger siblings receive the same `parent` as the node itself.
pub fn render<P: Painter + ?Sized>(nodes: &[SceneNode], parent: &Matrix4<f32>, pass: &PassSpec, painter: &mut P) {
    for node in nodes {
        let modeling = *parent * node.local_transform();
        if let Some(location) = pass.modeling {
            painter.set_modeling(location, &modeling);
        }
        upload_uniforms(painter, &node.uniforms, &pass.uniforms);
        {
            let mut bound = BoundTextures::bind(painter, &node.textures, &pass.samplers);
            if let Some(mesh) = node.mesh {
                bound.painter.draw(mesh, pass.binding);
            }
        }
        render(&node.children, &modeling, pass, painter);
    }
}

//! CPU-side triangle meshes.
//!
//! A [`Mesh`] stores `triangle_count` index triples and `vertex_count`
//! vertices of `attr_dim` floats each in one interleaved buffer, so the vertex
//! data can later be uploaded to the GPU unchanged. What the attributes mean
//! is up to the caller; the 3D generators in [`super::shapes`] use XYZ
//! position, ST texture coordinates and a NOP unit normal.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::linalg::vector;

/// Offset of the position inside a vertex.
pub const POSITION: usize = 0;
/// Offset of the texture coordinates inside a vertex of a 3D shape.
pub const TEX_COORDS: usize = 3;
/// Offset of the normal inside a vertex of a 3D shape.
pub const NORMAL: usize = 5;
/// XYZ + ST + NOP.
pub const SHAPE_ATTR_DIM: usize = 3 + 2 + 3;

#[derive(Error, Debug)]
pub enum MeshError {
    #[error("could not allocate mesh storage: {0}")]
    Allocation(#[from] TryReserveError),
    #[error("invalid revolution profile: {0}")]
    InvalidProfile(String),
    #[error("invalid landscape grid: {0}")]
    InvalidGrid(String),
    #[error("vertices have {attr_dim} attributes, but a normal at offset {offset} needs {needed}")]
    MissingAttributes {
        attr_dim: usize,
        offset: usize,
        needed: usize,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    vertex_count: usize,
    attr_dim: usize,
    triangles: Vec<[u32; 3]>,
    vertices: Vec<f32>,
}

impl Mesh {
    /// Allocates storage for the triangles and vertices in one go. Triangles
    /// start as `[0, 0, 0]` and vertices as zeros.
    pub fn new(triangle_count: usize, vertex_count: usize, attr_dim: usize) -> Result<Self, MeshError> {
        let mut triangles = Vec::new();
        triangles.try_reserve_exact(triangle_count)?;
        triangles.resize(triangle_count, [0; 3]);

        let mut vertices = Vec::new();
        vertices.try_reserve_exact(vertex_count.saturating_mul(attr_dim))?;
        vertices.resize(vertex_count * attr_dim, 0.0);

        Ok(Self {
            vertex_count,
            attr_dim,
            triangles,
            vertices,
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn attr_dim(&self) -> usize {
        self.attr_dim
    }

    /// Sets triangle `index` to the vertex indices `(i, j, k)`. Does nothing
    /// if `index` is out of range.
    pub fn set_triangle(&mut self, index: usize, i: u32, j: u32, k: u32) {
        if let Some(tri) = self.triangles.get_mut(index) {
            *tri = [i, j, k];
        }
    }

    pub fn triangle(&self, index: usize) -> Option<[u32; 3]> {
        self.triangles.get(index).copied()
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Copies the first `attr_dim` values of `attrs` into vertex `index`.
    /// Does nothing if `index` is out of range or `attrs` is too short.
    pub fn set_vertex(&mut self, index: usize, attrs: &[f32]) {
        let dim = self.attr_dim;
        if let (Some(vert), Some(src)) = (self.vertex_mut(index), attrs.get(..dim)) {
            vert.copy_from_slice(src);
        }
    }

    pub fn vertex(&self, index: usize) -> Option<&[f32]> {
        if index >= self.vertex_count {
            return None;
        }
        let start = index * self.attr_dim;
        self.vertices.get(start..start + self.attr_dim)
    }

    pub fn vertex_mut(&mut self, index: usize) -> Option<&mut [f32]> {
        if index >= self.vertex_count {
            return None;
        }
        let start = index * self.attr_dim;
        self.vertices.get_mut(start..start + self.attr_dim)
    }

    /// All vertex attributes, interleaved.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub(crate) fn vertices_mut(&mut self) -> &mut [f32] {
        &mut self.vertices
    }

    /// Three consecutive attributes starting at `offset` of vertex `index`.
    pub fn attribute3(&self, index: usize, offset: usize) -> Option<[f32; 3]> {
        self.vertex(index)?
            .get(offset..offset + 3)
            .and_then(|s| s.try_into().ok())
    }

    fn set_attribute3(&mut self, index: usize, offset: usize, value: [f32; 3]) {
        if let Some(dst) = self
            .vertex_mut(index)
            .and_then(|v| v.get_mut(offset..offset + 3))
        {
            dst.copy_from_slice(&value);
        }
    }

    /// Outward unit normal of triangle `index`, assuming attributes 0..3 are
    /// XYZ and the triangle is counter-clockwise seen from outside.
    pub fn triangle_normal(&self, index: usize) -> Option<[f32; 3]> {
        let [a, b, c] = self.triangle(index)?;
        Some(true_normal(
            &self.attribute3(a as usize, POSITION)?,
            &self.attribute3(b as usize, POSITION)?,
            &self.attribute3(c as usize, POSITION)?,
        ))
    }

    fn check_normal_offset(&self, offset: usize) -> Result<(), MeshError> {
        if self.attr_dim < offset + 3 || offset < POSITION + 3 {
            return Err(MeshError::MissingAttributes {
                attr_dim: self.attr_dim,
                offset,
                needed: offset + 3,
            });
        }
        Ok(())
    }

    /// Writes flat-shaded normals into attributes `offset..offset + 3`. A
    /// vertex shared by several triangles keeps the normal of whichever of
    /// them comes last.
    pub fn flat_normals(&mut self, offset: usize) -> Result<(), MeshError> {
        self.check_normal_offset(offset)?;
        for index in 0..self.triangles.len() {
            let Some(normal) = self.triangle_normal(index) else {
                continue;
            };
            for vert in self.triangles[index] {
                self.set_attribute3(vert as usize, offset, normal);
            }
        }
        Ok(())
    }

    /// Writes smooth normals into attributes `offset..offset + 3`: every
    /// vertex gets the normalized sum of the unit normals of the triangles
    /// around it. Coincident vertices are not merged.
    pub fn smooth_normals(&mut self, offset: usize) -> Result<(), MeshError> {
        self.check_normal_offset(offset)?;
        for index in 0..self.vertex_count() {
            self.set_attribute3(index, offset, [0.0; 3]);
        }
        for index in 0..self.triangles.len() {
            let Some(normal) = self.triangle_normal(index) else {
                continue;
            };
            for vert in self.triangles[index] {
                if let Some(sum) = self.attribute3(vert as usize, offset) {
                    self.set_attribute3(vert as usize, offset, vector::add(&sum, &normal));
                }
            }
        }
        for index in 0..self.vertex_count() {
            if let Some(sum) = self.attribute3(index, offset) {
                let mut normal = sum;
                vector::unit(&sum, &mut normal);
                self.set_attribute3(index, offset, normal);
            }
        }
        Ok(())
    }
}

/// Outward unit normal of the counter-clockwise triangle `(a, b, c)`. A
/// degenerate triangle yields the zero vector.
pub fn true_normal(a: &[f32; 3], b: &[f32; 3], c: &[f32; 3]) -> [f32; 3] {
    let normal = vector::cross(&vector::subtract(b, a), &vector::subtract(c, a));
    let mut unit = [0.0; 3];
    vector::unit(&normal, &mut unit);
    unit
}

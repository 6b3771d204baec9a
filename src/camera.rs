//! Camera collaborator.
//!
//! The renderer only ever asks a camera for its viewing matrix and its world
//! position, through [`CameraSource`]. [`Camera`] is the orbit camera the demo
//! uses: it sits on a sphere around a target point and looks at it.

use cgmath::{Matrix4, Rad, Vector3};

use crate::linalg::{matrix, vector};

/// Maps OpenGL clip space (z in -1..1) onto wgpu clip space (z in 0..1).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub trait CameraSource {
    /// Projection times world-to-eye transform.
    fn viewing(&self) -> Matrix4<f32>;
    fn position(&self) -> Vector3<f32>;
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub target: Vector3<f32>,
    pub distance: f32,
    pub phi: f32,
    pub theta: f32,
    pub fovy: Rad<f32>,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(target: Vector3<f32>, distance: f32, phi: f32, theta: f32) -> Self {
        Self {
            target,
            distance,
            phi,
            theta,
            fovy: Rad(std::f32::consts::FRAC_PI_6),
            aspect: 1.0,
            near: 0.1,
            far: 500.0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn add_phi(&mut self, delta: f32) {
        self.phi = (self.phi + delta).clamp(0.01, std::f32::consts::PI - 0.01);
    }

    pub fn add_theta(&mut self, delta: f32) {
        self.theta += delta;
    }

    pub fn add_distance(&mut self, delta: f32) {
        self.distance = (self.distance + delta).max(self.near);
    }

    fn projection(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.near, self.far)
    }
}

impl CameraSource for Camera {
    fn viewing(&self) -> Matrix4<f32> {
        let rotation = matrix::look_from(self.phi, self.theta);
        self.projection() * matrix::inverse_isometry(&rotation, &self.position())
    }

    fn position(&self) -> Vector3<f32> {
        self.target + Vector3::from(vector::spherical(self.distance, self.phi, self.theta))
    }
}

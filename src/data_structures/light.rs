//! Light sources.
//!
//! A [`Light`] has a pose like any scene node: its local -Z is the direction
//! it aims. Spot lights only reach points within `spot_angle` of that
//! direction; omni lights reach everything. Each light is rendered into its
//! own shadow-map layer through [`Light::viewing`].

use std::f32::consts::PI;

use cgmath::{Matrix3, Matrix4, Rad, SquareMatrix, Vector3};

use crate::{
    camera::OPENGL_TO_WGPU_MATRIX,
    linalg::{matrix, vector},
};

/// The most lights one frame can shade and shadow.
pub const MAX_LIGHTS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Spot,
    Omni,
}

#[derive(Clone, Debug)]
pub struct Light {
    pub kind: LightKind,
    pub translation: Vector3<f32>,
    pub rotation: Matrix3<f32>,
    pub color: [f32; 3],
    /// Constant, linear and quadratic falloff coefficients.
    pub attenuation: [f32; 3],
    /// Half-angle of the spot cone in radians.
    pub spot_angle: f32,
}

impl Light {
    /// A white light at the origin aiming down -Z, without falloff.
    pub fn new(kind: LightKind) -> Self {
        Self {
            kind,
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Matrix3::identity(),
            color: [1.0; 3],
            attenuation: [1.0, 0.0, 0.0],
            spot_angle: PI / 4.0,
        }
    }

    /// Places the light at `position`, aiming along the unit vector with
    /// co-latitude `phi` and azimuth `theta`.
    pub fn shine_from(&mut self, position: Vector3<f32>, phi: f32, theta: f32) {
        // local +Z must point away from the aim
        self.rotation = matrix::look_from(PI - phi, theta + PI);
        self.translation = position;
    }

    /// Unit direction the light shines in.
    pub fn aim(&self) -> Vector3<f32> {
        -self.rotation.z
    }

    /// Cosine of the cone half-angle. Omni lights report -1 so that every
    /// direction passes the cone test.
    pub fn cos_cutoff(&self) -> f32 {
        match self.kind {
            LightKind::Spot => self.spot_angle.cos(),
            LightKind::Omni => -1.0,
        }
    }

    /// Projection times world-to-light transform for rendering the light's
    /// shadow map. The frustum is square and just wide enough for the spot
    /// cone; omni lights get a 90 degree frustum.
    pub fn viewing(&self, near: f32, far: f32) -> Matrix4<f32> {
        let fovy = match self.kind {
            LightKind::Spot => (2.0 * self.spot_angle).min(PI - 0.01),
            LightKind::Omni => PI / 2.0,
        };
        let projection = OPENGL_TO_WGPU_MATRIX * cgmath::perspective(Rad(fovy), 1.0, near, far);
        projection * matrix::inverse_isometry(&self.rotation, &self.translation)
    }

    pub fn to_raw(&self, near: f32, far: f32) -> LightUniform {
        LightUniform {
            viewing: self.viewing(near, far).into(),
            position: self.translation.into(),
            cos_cutoff: self.cos_cutoff(),
            color: self.color,
            _padding: 0,
            attenuation: self.attenuation,
            _padding2: 0,
            aim: self.aim().into(),
            _padding3: 0,
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new(LightKind::Spot)
    }
}

/// One light as the lit shader reads it.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    viewing: [[f32; 4]; 4],
    position: [f32; 3],
    cos_cutoff: f32,
    color: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
    attenuation: [f32; 3],
    _padding2: u32,
    aim: [f32; 3],
    _padding3: u32,
}

impl LightUniform {
    pub fn viewing(&self) -> [[f32; 4]; 4] {
        self.viewing
    }
}

/// Direction helper for callers that think in spherical angles.
pub fn direction(phi: f32, theta: f32) -> Vector3<f32> {
    Vector3::from(vector::spherical(1.0, phi, theta))
}

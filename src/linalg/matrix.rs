//! Small square matrices and rigid transforms.
//!
//! Matrices are `cgmath` types. `cgmath` stores columns, so `m[c][r]` is the
//! entry in row `r` and column `c`, and its `Mul` implementations compute the
//! usual product `(AB)[i][j] = sum_k A[i][k] B[k][j]` on rows and columns.
//! Matrix-matrix and matrix-vector products are therefore plain `*`; this
//! module only adds the constructions the renderer needs on top of them.

use std::f32::consts::{FRAC_PI_2, PI};

use cgmath::{Matrix, Matrix2, Matrix3, Matrix4, SquareMatrix, Vector2, Vector3, Vector4};

use crate::linalg::vector;

/// Returns the determinant of `m`.
///
/// A zero determinant means `m` is singular and `inverse` is left untouched.
/// Otherwise the inverse is written into `inverse`.
pub fn mat22_invert(m: &Matrix2<f32>, inverse: &mut Matrix2<f32>) -> f32 {
    let det = m.x.x * m.y.y - m.y.x * m.x.y;
    if det == 0.0 {
        return det;
    }
    let recip = 1.0 / det;
    *inverse = Matrix2::new(
        recip * m.y.y,
        -recip * m.x.y,
        -recip * m.y.x,
        recip * m.x.x,
    );
    det
}

pub fn mat22_columns(col0: Vector2<f32>, col1: Vector2<f32>) -> Matrix2<f32> {
    Matrix2::from_cols(col0, col1)
}

/// Homogeneous 2D isometry: rotate counter-clockwise by `theta`, then
/// translate by `(x, y)`.
pub fn mat33_isometry(theta: f32, x: f32, y: f32) -> Matrix3<f32> {
    let (s, c) = theta.sin_cos();
    Matrix3::from_cols(
        Vector3::new(c, s, 0.0),
        Vector3::new(-s, c, 0.0),
        Vector3::new(x, y, 1.0),
    )
}

/// Rotation through `theta` radians about the unit vector `axis`, built with
/// Rodrigues' formula `R = I + sin(theta) U + (1 - cos(theta)) U^2` where `U`
/// is the cross-product matrix of `axis`.
pub fn angle_axis_rotation(theta: f32, axis: Vector3<f32>) -> Matrix3<f32> {
    let u = Matrix3::from_cols(
        Vector3::new(0.0, axis.z, -axis.y),
        Vector3::new(-axis.z, 0.0, axis.x),
        Vector3::new(axis.y, -axis.x, 0.0),
    );
    let (s, c) = theta.sin_cos();
    Matrix3::identity() + u * s + (u * u) * (1.0 - c)
}

/// Rotation taking the orthonormal pair `(u, v)` to the orthonormal pair
/// `(a, b)`.
///
/// With `R = [u v u×v]` and `S = [a b a×b]` as column matrices the result is
/// `S Rᵀ`.
pub fn basis_rotation(
    u: Vector3<f32>,
    v: Vector3<f32>,
    a: Vector3<f32>,
    b: Vector3<f32>,
) -> Matrix3<f32> {
    let r = Matrix3::from_cols(u, v, u.cross(v));
    let s = Matrix3::from_cols(a, b, a.cross(b));
    s * r.transpose()
}

/// Orientation of an eye placed on the sphere around the origin at
/// co-latitude `phi` and azimuth `theta`, with its local +Z pointing away from
/// the origin and its local +Y tilted towards world +Z.
///
/// An eye looks down its local -Z, so this eye looks back at the origin.
pub fn look_from(phi: f32, theta: f32) -> Matrix3<f32> {
    let z = vector::spherical(1.0, phi, theta);
    let y = vector::spherical(1.0, FRAC_PI_2 - phi, theta + PI);
    basis_rotation(
        Vector3::unit_z(),
        Vector3::unit_y(),
        Vector3::from(z),
        Vector3::from(y),
    )
}

/// Embeds a rotation and a translation as `[[R, t], [0, 0, 0, 1]]`: the
/// rotation is applied first, then the translation.
pub fn isometry(rotation: &Matrix3<f32>, translation: &Vector3<f32>) -> Matrix4<f32> {
    Matrix4::from_cols(
        rotation.x.extend(0.0),
        rotation.y.extend(0.0),
        rotation.z.extend(0.0),
        Vector4::new(translation.x, translation.y, translation.z, 1.0),
    )
}

/// Inverse of [`isometry`] for the same arguments: `[[Rᵀ, -Rᵀt], [0, 1]]`.
pub fn inverse_isometry(rotation: &Matrix3<f32>, translation: &Vector3<f32>) -> Matrix4<f32> {
    let transposed = rotation.transpose();
    isometry(&transposed, &(-(transposed * *translation)))
}

pub fn mat44_identity() -> Matrix4<f32> {
    Matrix4::identity()
}

//! Vectors of arbitrary dimension.
//!
//! A vector is a plain `[f32; N]`. The dimension travels with the type, so an
//! operation can never be asked to read more components than its inputs hold.
//! Every function is pure and returns a fresh value, except [`unit`], which
//! keeps an out-parameter so that callers can detect the degenerate case.

/// Componentwise sum `v + w`.
pub fn add<const N: usize>(v: &[f32; N], w: &[f32; N]) -> [f32; N] {
    std::array::from_fn(|i| v[i] + w[i])
}

/// Componentwise difference `v - w`.
pub fn subtract<const N: usize>(v: &[f32; N], w: &[f32; N]) -> [f32; N] {
    std::array::from_fn(|i| v[i] - w[i])
}

/// Scales `w` by the number `c`.
pub fn scale<const N: usize>(c: f32, w: &[f32; N]) -> [f32; N] {
    std::array::from_fn(|i| c * w[i])
}

pub fn dot<const N: usize>(v: &[f32; N], w: &[f32; N]) -> f32 {
    v.iter().zip(w.iter()).map(|(a, b)| a * b).sum()
}

pub fn length<const N: usize>(v: &[f32; N]) -> f32 {
    dot(v, v).sqrt()
}

/// Returns the length of `v`.
///
/// If the length is non-zero, `unit` receives `v` scaled to length one. If it
/// is zero, `unit` is left exactly as it was and the caller must not trust it
/// as a direction.
pub fn unit<const N: usize>(v: &[f32; N], unit: &mut [f32; N]) -> f32 {
    let len = length(v);
    if len != 0.0 {
        for (out, component) in unit.iter_mut().zip(v.iter()) {
            *out = component / len;
        }
    }
    len
}

/// Convenience wrapper around [`unit`] for callers that prefer an `Option`.
pub fn normalized<const N: usize>(v: &[f32; N]) -> Option<[f32; N]> {
    let mut out = [0.0; N];
    (unit(v, &mut out) != 0.0).then_some(out)
}

pub fn cross(v: &[f32; 3], w: &[f32; 3]) -> [f32; 3] {
    [
        v[1] * w[2] - v[2] * w[1],
        v[2] * w[0] - v[0] * w[2],
        v[0] * w[1] - v[1] * w[0],
    ]
}

/// Builds a 3D vector from spherical coordinates.
///
/// `rho >= 0` is the radius, `0 <= phi <= pi` the co-latitude measured from
/// +Z and `theta` the azimuth measured from +X towards +Y.
pub fn spherical(rho: f32, phi: f32, theta: f32) -> [f32; 3] {
    [
        rho * phi.sin() * theta.cos(),
        rho * phi.sin() * theta.sin(),
        rho * phi.cos(),
    ]
}

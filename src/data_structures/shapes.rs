//! Procedural mesh generators.
//!
//! 2D shapes carry XY position and ST texture coordinates. 3D shapes carry
//! XYZ position, ST texture coordinates and a NOP unit normal
//! ([`SHAPE_ATTR_DIM`] floats per vertex).
//!
//! Every generator allocates exactly one [`Mesh`]. On failure nothing needs
//! cleaning up; callers are expected to abort their whole setup.

use std::f32::consts::{FRAC_PI_2, PI};

use crate::{
    data_structures::mesh::{Mesh, MeshError, NORMAL, SHAPE_ATTR_DIM},
    linalg::vector,
};

/// Two triangles covering the rectangle. Vertices are counter-clockwise from
/// the bottom-left corner with texture coordinates spanning the unit square.
pub fn rectangle(left: f32, right: f32, bottom: f32, top: f32) -> Result<Mesh, MeshError> {
    let mut mesh = Mesh::new(2, 4, 2 + 2)?;
    mesh.set_triangle(0, 0, 1, 2);
    mesh.set_triangle(1, 0, 2, 3);
    mesh.set_vertex(0, &[left, bottom, 0.0, 0.0]);
    mesh.set_vertex(1, &[right, bottom, 1.0, 0.0]);
    mesh.set_vertex(2, &[right, top, 1.0, 1.0]);
    mesh.set_vertex(3, &[left, top, 0.0, 1.0]);
    Ok(mesh)
}

/// A fan of `side_count` triangles around the centre `(x, y)` with radii
/// `rx`, `ry`.
pub fn ellipse(x: f32, y: f32, rx: f32, ry: f32, side_count: u32) -> Result<Mesh, MeshError> {
    let sides = side_count as usize;
    let mut mesh = Mesh::new(sides, sides + 1, 2 + 2)?;
    mesh.set_vertex(0, &[x, y, 0.5, 0.5]);
    for i in 0..side_count {
        mesh.set_triangle(i as usize, 0, i + 1, (i + 1) % side_count + 1);
        let theta = i as f32 * 2.0 * PI / side_count as f32;
        let (sin, cos) = theta.sin_cos();
        mesh.set_vertex(
            i as usize + 1,
            &[x + rx * cos, y + ry * sin, 0.5 * cos + 0.5, 0.5 * sin + 0.5],
        );
    }
    Ok(mesh)
}

/// An axis-aligned box with flat-shaded faces.
///
/// Each face has its own four vertices so that every corner can carry the
/// normal of the face it belongs to: 24 vertices and 12 outward-wound
/// triangles in all.
pub fn cuboid(
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    base: f32,
    lid: f32,
) -> Result<Mesh, MeshError> {
    let mut mesh = Mesh::new(12, 24, SHAPE_ATTR_DIM)?;
    let (l, r, b, t) = (left, right, bottom, top);
    #[rustfmt::skip]
    let vertices: [[f32; SHAPE_ATTR_DIM]; 24] = [
        // base, facing -Z
        [l, b, base, 0.0, 0.0, 0.0, 0.0, -1.0],
        [r, b, base, 1.0, 0.0, 0.0, 0.0, -1.0],
        [r, t, base, 1.0, 1.0, 0.0, 0.0, -1.0],
        [l, t, base, 0.0, 1.0, 0.0, 0.0, -1.0],
        // lid, facing +Z
        [l, b, lid, 0.0, 0.0, 0.0, 0.0, 1.0],
        [r, b, lid, 1.0, 0.0, 0.0, 0.0, 1.0],
        [r, t, lid, 1.0, 1.0, 0.0, 0.0, 1.0],
        [l, t, lid, 0.0, 1.0, 0.0, 0.0, 1.0],
        // top, facing +Y
        [l, t, base, 0.0, 1.0, 0.0, 1.0, 0.0],
        [r, t, base, 1.0, 1.0, 0.0, 1.0, 0.0],
        [r, t, lid, 1.0, 1.0, 0.0, 1.0, 0.0],
        [l, t, lid, 0.0, 1.0, 0.0, 1.0, 0.0],
        // bottom, facing -Y
        [l, b, base, 0.0, 0.0, 0.0, -1.0, 0.0],
        [r, b, base, 1.0, 0.0, 0.0, -1.0, 0.0],
        [r, b, lid, 1.0, 0.0, 0.0, -1.0, 0.0],
        [l, b, lid, 0.0, 0.0, 0.0, -1.0, 0.0],
        // right, facing +X
        [r, t, base, 1.0, 1.0, 1.0, 0.0, 0.0],
        [r, b, base, 1.0, 0.0, 1.0, 0.0, 0.0],
        [r, b, lid, 1.0, 0.0, 1.0, 0.0, 0.0],
        [r, t, lid, 1.0, 1.0, 1.0, 0.0, 0.0],
        // left, facing -X
        [l, t, base, 0.0, 1.0, -1.0, 0.0, 0.0],
        [l, b, base, 0.0, 0.0, -1.0, 0.0, 0.0],
        [l, b, lid, 0.0, 0.0, -1.0, 0.0, 0.0],
        [l, t, lid, 0.0, 1.0, -1.0, 0.0, 0.0],
    ];
    for (index, vertex) in vertices.iter().enumerate() {
        mesh.set_vertex(index, vertex);
    }
    for face in 0..6u32 {
        let first = 4 * face;
        let index = 2 * face as usize;
        // Even faces are listed clockwise seen from outside.
        if face % 2 == 0 {
            mesh.set_triangle(index, first, first + 2, first + 1);
            mesh.set_triangle(index + 1, first, first + 3, first + 2);
        } else {
            mesh.set_triangle(index, first, first + 1, first + 2);
            mesh.set_triangle(index + 1, first, first + 2, first + 3);
        }
    }
    Ok(mesh)
}

fn rotate2(theta: f32, v: [f32; 2]) -> [f32; 2] {
    let (sin, cos) = theta.sin_cos();
    [cos * v[0] - sin * v[1], sin * v[0] + cos * v[1]]
}

/// Sweeps a profile curve around the Z axis.
///
/// The profile is sampled as `(z[k], r[k], t[k])`. `r` must be zero at the
/// first and last sample only; the first `z` should be below the last. Each
/// interior sample becomes a ring of `side_count + 1` vertices (the last one
/// repeats the first with texture coordinate `s = 1`), and the two end samples
/// become pole vertices closed off by triangle fans. Normals are smooth: at
/// each ring they bisect the two adjacent profile segments.
pub fn revolution(z: &[f32], r: &[f32], t: &[f32], side_count: u32) -> Result<Mesh, MeshError> {
    let z_count = z.len();
    if z_count < 3 {
        return Err(MeshError::InvalidProfile(format!(
            "need at least 3 samples, got {z_count}"
        )));
    }
    if r.len() != z_count || t.len() != z_count {
        return Err(MeshError::InvalidProfile(format!(
            "{} z, {} r and {} t samples",
            z_count,
            r.len(),
            t.len()
        )));
    }
    if side_count < 3 {
        return Err(MeshError::InvalidProfile(format!(
            "need at least 3 sides, got {side_count}"
        )));
    }
    let sides = side_count as usize;
    let ring = sides + 1;
    let vertex_count = (z_count - 2) * ring + 2;
    let mut mesh = Mesh::new((z_count - 2) * sides * 2, vertex_count, SHAPE_ATTR_DIM)?;

    let ring_start = |layer: usize| ((layer - 1) * ring + 1) as u32;
    let top = (vertex_count - 1) as u32;
    for i in 0..side_count {
        // bottom fan
        mesh.set_triangle(i as usize, 0, i + 2, i + 1);
        // top fan
        let last_ring = ring_start(z_count - 2);
        mesh.set_triangle(sides + i as usize, top, last_ring + i, last_ring + i + 1);
    }
    for j in 1..z_count - 2 {
        let below = ring_start(j);
        let above = ring_start(j + 1);
        for i in 0..side_count {
            let index = 2 * sides * j + 2 * i as usize;
            mesh.set_triangle(index, below + i, above + i + 1, above + i);
            mesh.set_triangle(index + 1, below + i, below + i + 1, above + i + 1);
        }
    }

    let step = 2.0 * PI / side_count as f32;
    for j in 1..z_count - 1 {
        // Rotating a profile segment (dr, dz) by -90 degrees gives its
        // outward normal (dz, -dr) in the XZ half-plane.
        let after = [z[j + 1] - z[j], 0.0, r[j] - r[j + 1]];
        let before = [z[j] - z[j - 1], 0.0, r[j - 1] - r[j]];
        let after = vector::normalized(&after).unwrap_or(after);
        let before = vector::normalized(&before).unwrap_or(before);
        let sum = vector::add(&after, &before);
        let normal = vector::normalized(&sum).unwrap_or([1.0, 0.0, 0.0]);

        let first = ring_start(j) as usize;
        let mut position = [r[j], 0.0];
        let mut normal_xy = [normal[0], normal[1]];
        for i in 0..sides {
            let s = i as f32 / side_count as f32;
            mesh.set_vertex(
                first + i,
                &[
                    position[0], position[1], z[j], s, t[j], normal_xy[0], normal_xy[1], normal[2],
                ],
            );
            position = rotate2(step, position);
            normal_xy = rotate2(step, normal_xy);
        }
        mesh.set_vertex(
            first + sides,
            &[r[j], 0.0, z[j], 1.0, t[j], normal[0], normal[1], normal[2]],
        );
    }
    mesh.set_vertex(0, &[0.0, 0.0, z[0], 0.5, t[0], 0.0, 0.0, -1.0]);
    mesh.set_vertex(
        top as usize,
        &[0.0, 0.0, z[z_count - 1], 0.5, t[z_count - 1], 0.0, 0.0, 1.0],
    );
    Ok(mesh)
}

/// A sphere of radius `radius` centred at the origin. Latitudes are spaced
/// evenly in angle, so their heights follow a cosine.
pub fn sphere(radius: f32, layer_count: u32, side_count: u32) -> Result<Mesh, MeshError> {
    let layers = layer_count as usize;
    let ts: Vec<f32> = (0..=layers).map(|i| i as f32 / layers as f32).collect();
    let zs: Vec<f32> = ts.iter().map(|t| -radius * (t * PI).cos()).collect();
    let mut rs: Vec<f32> = ts.iter().map(|t| radius * (t * PI).sin()).collect();
    // sin(pi) is not exactly zero in floating point
    if let Some(last) = rs.last_mut() {
        *last = 0.0;
    }
    revolution(&zs, &rs, &ts, side_count)
}

/// A cylinder of radius `radius` with hemispherical caps, centred at the
/// origin with total length `length > 2 * radius` along Z. Each cap is
/// sampled with `layer_count` rings.
pub fn capsule(radius: f32, length: f32, layer_count: u32, side_count: u32) -> Result<Mesh, MeshError> {
    let layers = layer_count as usize;
    let half = length / 2.0;
    let mut zs = Vec::with_capacity(2 * layers + 2);
    let mut rs = Vec::with_capacity(2 * layers + 2);
    zs.push(-half);
    rs.push(0.0);
    for i in 1..=layers {
        let theta = FRAC_PI_2 * (3.0 + i as f32 / layers as f32);
        zs.push(-half + radius + radius * theta.sin());
        rs.push(radius * theta.cos());
    }
    for i in 0..layers {
        let theta = FRAC_PI_2 * i as f32 / layers as f32;
        zs.push(half - radius + radius * theta.sin());
        rs.push(radius * theta.cos());
    }
    zs.push(half);
    rs.push(0.0);
    let ts: Vec<f32> = zs.iter().map(|z| (z + half) / length).collect();
    revolution(&zs, &rs, &ts, side_count)
}

/// Triangulates a `width × height` grid of heights.
///
/// Sample `(i, j)` is `data[i * height + j]` and becomes the vertex at
/// `(i * spacing, j * spacing, data[..])` with texture coordinates `(i, j)`.
/// Each grid cell is split along whichever diagonal has the smaller height
/// difference, which keeps ridges and valleys from folding the wrong way.
/// Normals are smooth.
pub fn landscape(width: u32, height: u32, spacing: f32, data: &[f32]) -> Result<Mesh, MeshError> {
    if width < 2 || height < 2 {
        return Err(MeshError::InvalidGrid(format!(
            "grid must be at least 2×2, got {width}×{height}"
        )));
    }
    let (w, h) = (width as usize, height as usize);
    if data.len() != w * h {
        return Err(MeshError::InvalidGrid(format!(
            "expected {} heights for {width}×{height}, got {}",
            w * h,
            data.len()
        )));
    }
    let mut mesh = Mesh::new(2 * (w - 1) * (h - 1), w * h, SHAPE_ATTR_DIM)?;
    for i in 0..w {
        for j in 0..h {
            let index = i * h + j;
            mesh.set_vertex(
                index,
                &[
                    i as f32 * spacing,
                    j as f32 * spacing,
                    data[index],
                    i as f32,
                    j as f32,
                    0.0,
                    0.0,
                    0.0,
                ],
            );
        }
    }
    for i in 0..w - 1 {
        for j in 0..h - 1 {
            let index = 2 * (i * (h - 1) + j);
            let a = (i * h + j) as u32;
            let b = ((i + 1) * h + j) as u32;
            let c = ((i + 1) * h + j + 1) as u32;
            let d = (i * h + j + 1) as u32;
            let diff_sw_ne = (data[a as usize] - data[c as usize]).abs();
            let diff_se_nw = (data[b as usize] - data[d as usize]).abs();
            if diff_se_nw < diff_sw_ne {
                mesh.set_triangle(index, d, a, b);
                mesh.set_triangle(index + 1, b, c, d);
            } else {
                mesh.set_triangle(index, a, b, c);
                mesh.set_triangle(index + 1, a, c, d);
            }
        }
    }
    mesh.smooth_normals(NORMAL)?;
    Ok(mesh)
}

/// Extracts the triangles of `land` by steepness.
///
/// With `no_more_than` set, keeps the triangles whose normal deviates from
/// vertical by at most `angle` (`normal.z >= cos(angle)`); otherwise keeps the
/// rest. All vertices of `land` are copied, so some may end up unused. Normals
/// are recomputed from the kept triangles only, which sharpens the shading
/// along the cut.
pub fn dissected_landscape(land: &Mesh, angle: f32, no_more_than: bool) -> Result<Mesh, MeshError> {
    let threshold = angle.cos();
    let keep = |index: usize| {
        let z = land.triangle_normal(index).map_or(0.0, |normal| normal[2]);
        if no_more_than {
            z >= threshold
        } else {
            z < threshold
        }
    };
    let kept: Vec<[u32; 3]> = (0..land.triangle_count())
        .filter(|&index| keep(index))
        .filter_map(|index| land.triangle(index))
        .collect();

    let mut mesh = Mesh::new(kept.len(), land.vertex_count(), land.attr_dim())?;
    mesh.vertices_mut().copy_from_slice(land.vertices());
    for (index, [i, j, k]) in kept.into_iter().enumerate() {
        mesh.set_triangle(index, i, j, k);
    }
    mesh.smooth_normals(NORMAL)?;
    Ok(mesh)
}

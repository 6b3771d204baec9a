use std::f32::consts::FRAC_1_SQRT_2;

use scene_ngin::data_structures::mesh::{self, Mesh, MeshError};

use crate::common::test_utils::assert_close3;

mod common;

/// Two unit right triangles folded along the X axis: one in the XY plane,
/// one in the XZ plane.
fn folded() -> Mesh {
    let mut mesh = Mesh::new(2, 4, 6).unwrap();
    mesh.set_vertex(0, &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    mesh.set_vertex(1, &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    mesh.set_vertex(2, &[0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    mesh.set_vertex(3, &[0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
    mesh.set_triangle(0, 0, 1, 2);
    mesh.set_triangle(1, 0, 3, 1);
    mesh
}

#[test]
fn new_mesh_is_zeroed() {
    let mesh = Mesh::new(3, 5, 8).unwrap();
    assert_eq!(mesh.triangle_count(), 3);
    assert_eq!(mesh.vertex_count(), 5);
    assert_eq!(mesh.attr_dim(), 8);
    assert_eq!(mesh.vertices().len(), 40);
    assert!(mesh.vertices().iter().all(|v| *v == 0.0));
    assert_eq!(mesh.triangle(2), Some([0, 0, 0]));
}

#[test]
fn out_of_range_access_is_ignored() {
    let mut mesh = Mesh::new(1, 2, 3).unwrap();
    mesh.set_triangle(5, 1, 1, 1);
    mesh.set_vertex(2, &[1.0, 2.0, 3.0]);
    // too short
    mesh.set_vertex(0, &[1.0]);
    assert_eq!(mesh.triangle(5), None);
    assert_eq!(mesh.vertex(2), None);
    assert!(mesh.vertex_mut(9).is_none());
    assert!(mesh.vertices().iter().all(|v| *v == 0.0));

    mesh.set_vertex(1, &[1.0, 2.0, 3.0, 4.0]);
    assert_eq!(mesh.vertex(1), Some(&[1.0, 2.0, 3.0][..]));
}

#[test]
fn true_normal_of_ccw_triangle_points_at_viewer() {
    let n = mesh::true_normal(&[0.0, 0.0, 0.0], &[2.0, 0.0, 0.0], &[0.0, 3.0, 0.0]);
    assert_close3(n, [0.0, 0.0, 1.0]);
    let degenerate = mesh::true_normal(&[1.0, 1.0, 1.0], &[2.0, 2.0, 2.0], &[3.0, 3.0, 3.0]);
    assert_eq!(degenerate, [0.0; 3]);
}

#[test]
fn smooth_normals_average_adjacent_faces() {
    let mut mesh = folded();
    mesh.smooth_normals(3).unwrap();
    let bent = [0.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2];
    assert_close3(mesh.attribute3(0, 3).unwrap(), bent);
    assert_close3(mesh.attribute3(1, 3).unwrap(), bent);
    assert_close3(mesh.attribute3(2, 3).unwrap(), [0.0, 0.0, 1.0]);
    assert_close3(mesh.attribute3(3, 3).unwrap(), [0.0, 1.0, 0.0]);
}

#[test]
fn flat_normals_keep_last_face() {
    let mut mesh = folded();
    mesh.flat_normals(3).unwrap();
    assert_close3(mesh.attribute3(0, 3).unwrap(), [0.0, 1.0, 0.0]);
    assert_close3(mesh.attribute3(2, 3).unwrap(), [0.0, 0.0, 1.0]);
}

#[test]
fn normals_need_room() {
    let mut mesh = Mesh::new(1, 3, 4).unwrap();
    assert!(matches!(
        mesh.smooth_normals(3),
        Err(MeshError::MissingAttributes { attr_dim: 4, offset: 3, needed: 6 })
    ));
    // normals may not overwrite the position
    let mut mesh = Mesh::new(1, 3, 8).unwrap();
    assert!(mesh.flat_normals(1).is_err());
}

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, PI};

use cgmath::{InnerSpace, Matrix, Matrix2, SquareMatrix, Vector2, Vector3, Vector4};
use scene_ngin::linalg::{matrix, vector};

use crate::common::test_utils::{assert_close, assert_close3};

mod common;

#[test]
fn unit_leaves_output_alone_for_zero_vector() {
    let mut out = [7.0, 8.0, 9.0];
    assert_eq!(vector::unit(&[0.0; 3], &mut out), 0.0);
    assert_eq!(out, [7.0, 8.0, 9.0]);
    assert_eq!(vector::normalized(&[0.0; 3]), None);

    assert_close(vector::unit(&[3.0, 4.0], &mut [0.0; 2]), 5.0);
    let mut out = [0.0; 2];
    vector::unit(&[3.0, 4.0], &mut out);
    assert_close(out[0], 0.6);
    assert_close(out[1], 0.8);
}

#[test]
fn should_follow_right_hand_rule() {
    assert_eq!(vector::cross(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]);
    assert_eq!(vector::cross(&[0.0, 1.0, 0.0], &[1.0, 0.0, 0.0]), [0.0, 0.0, -1.0]);
    let v = [1.0, 2.0, 3.0];
    assert_eq!(vector::add(&v, &vector::scale(-1.0, &v)), [0.0; 3]);
    assert_eq!(vector::subtract(&v, &v), [0.0; 3]);
    assert_eq!(vector::dot(&v, &v), 14.0);
}

#[test]
fn spherical_measures_phi_from_z() {
    assert_close3(vector::spherical(2.0, 0.0, 1.3), [0.0, 0.0, 2.0]);
    assert_close3(vector::spherical(1.0, FRAC_PI_2, 0.0), [1.0, 0.0, 0.0]);
    assert_close3(vector::spherical(1.0, FRAC_PI_2, FRAC_PI_2), [0.0, 1.0, 0.0]);
    assert_close(vector::length(&vector::spherical(3.0, 0.7, -2.1)), 3.0);
}

#[test]
fn singular_matrix_has_no_inverse() {
    let singular = Matrix2::new(1.0, 2.0, 2.0, 4.0);
    let before = Matrix2::new(9.0, 9.0, 9.0, 9.0);
    let mut inverse = before;
    assert_eq!(matrix::mat22_invert(&singular, &mut inverse), 0.0);
    assert_eq!(inverse, before);

    let m = matrix::mat22_columns(Vector2::new(2.0, 1.0), Vector2::new(1.0, 1.0));
    assert_close(matrix::mat22_invert(&m, &mut inverse), 1.0);
    let product = m * inverse;
    assert_close(product.x.x, 1.0);
    assert_close(product.y.x, 0.0);
    assert_close(product.x.y, 0.0);
    assert_close(product.y.y, 1.0);
}

#[test]
fn planar_isometry_rotates_then_translates() {
    let m = matrix::mat33_isometry(FRAC_PI_2, 1.0, 2.0);
    let p = m * Vector3::new(1.0, 0.0, 1.0);
    assert_close3(p.into(), [1.0, 3.0, 1.0]);
}

#[test]
fn rodrigues_rotation_is_orthonormal() {
    let axis = Vector3::new(1.0, 1.0, 1.0).normalize();
    let r = matrix::angle_axis_rotation(2.0 * PI / 3.0, axis);
    // a third of a turn about the diagonal cycles the axes
    assert_close3((r * Vector3::unit_x()).into(), [0.0, 1.0, 0.0]);
    assert_close3((r * Vector3::unit_y()).into(), [0.0, 0.0, 1.0]);
    assert_close3((r * axis).into(), axis.into());

    let should_be_identity = r * r.transpose();
    for c in 0..3 {
        for row in 0..3 {
            assert_close(should_be_identity[c][row], if c == row { 1.0 } else { 0.0 });
        }
    }
    assert_close(r.determinant(), 1.0);
}

#[test]
fn basis_rotation_maps_pair_onto_pair() {
    let u = Vector3::unit_x();
    let v = Vector3::unit_y();
    let a = Vector3::new(0.0, 0.0, 1.0);
    let b = Vector3::new(-1.0, 0.0, 0.0);
    let r = matrix::basis_rotation(u, v, a, b);
    assert_close3((r * u).into(), a.into());
    assert_close3((r * v).into(), b.into());
    assert_close3((r * u.cross(v)).into(), a.cross(b).into());
}

#[test]
fn look_from_points_z_away_and_y_up() {
    for (phi, theta) in [(FRAC_PI_4, FRAC_PI_4), (FRAC_PI_3, -2.0), (2.5, 0.3)] {
        let r = matrix::look_from(phi, theta);
        assert_close3(r.z.into(), vector::spherical(1.0, phi, theta));
        assert!(r.y.z > 0.0, "up vector {:?} points down", r.y);
        assert_close(r.x.dot(r.y), 0.0);
        assert_close(r.determinant(), 1.0);
        // the horizontal axis stays horizontal
        assert_close(r.x.z, 0.0);
    }
}

#[test]
fn inverse_isometry_undoes_isometry() {
    let rotation = matrix::angle_axis_rotation(0.8, Vector3::new(0.0, 0.6, 0.8));
    let translation = Vector3::new(3.0, -1.0, 2.5);
    let m = matrix::isometry(&rotation, &translation);
    let inverse = matrix::inverse_isometry(&rotation, &translation);

    for product in [inverse * m, m * inverse] {
        let identity = cgmath::Matrix4::identity();
        for c in 0..4 {
            for r in 0..4 {
                assert_close(product[c][r], identity[c][r]);
            }
        }
        // the bottom row stays (0, 0, 0, 1)
        assert_eq!([product.x.w, product.y.w, product.z.w, product.w.w], [0.0, 0.0, 0.0, 1.0]);
    }

    let p = Vector4::new(1.0, 2.0, 3.0, 1.0);
    let back = inverse * (m * p);
    for i in 0..4 {
        assert_close(back[i], p[i]);
    }
    assert_eq!(matrix::mat44_identity(), cgmath::Matrix4::identity());
    // rotation first, translation second
    let moved = m * Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert_close3(moved.truncate().into(), translation.into());
}

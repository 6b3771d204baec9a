use std::f32::consts::{FRAC_PI_3, FRAC_PI_4, PI};

use cgmath::{InnerSpace, Matrix4, Vector3, Vector4};
use scene_ngin::{
    camera::{Camera, CameraSource},
    data_structures::light::{self, Light, LightKind, LightUniform, MAX_LIGHTS},
    demo,
    pipelines::lit::FrameUniform,
};

use crate::common::test_utils::{assert_close, assert_close3};

mod common;

fn clip(m: &Matrix4<f32>, p: Vector3<f32>) -> Vector3<f32> {
    let c = m * p.extend(1.0);
    c.truncate() / c.w
}

#[test]
fn shine_from_aims_along_direction() {
    let mut light = Light::new(LightKind::Spot);
    light.shine_from(Vector3::new(1.0, 2.0, 3.0), 3.0 * FRAC_PI_4, 3.0 * FRAC_PI_4);
    let expected = light::direction(3.0 * FRAC_PI_4, 3.0 * FRAC_PI_4);
    assert_close3(light.aim().into(), expected.into());
    assert_close(light.aim().magnitude(), 1.0);
    assert_eq!(light.translation, Vector3::new(1.0, 2.0, 3.0));
}

#[test]
fn lit_point_projects_to_shadow_map_centre() {
    let mut light = Light::new(LightKind::Spot);
    light.spot_angle = FRAC_PI_3;
    light.shine_from(Vector3::new(0.0, 0.0, 20.0), PI, 0.0);
    assert_close3(light.aim().into(), [0.0, 0.0, -1.0]);

    let viewing = light.viewing(1.0, 100.0);
    let below = clip(&viewing, Vector3::new(0.0, 0.0, 0.0));
    assert_close(below.x, 0.0);
    assert_close(below.y, 0.0);
    assert!(below.z > 0.0 && below.z < 1.0);
    // farther along the aim means deeper
    let deeper = clip(&viewing, Vector3::new(0.0, 0.0, -10.0));
    assert!(deeper.z > below.z);
}

#[test]
fn omni_lights_pass_every_cone_test() {
    let omni = Light::new(LightKind::Omni);
    assert_eq!(omni.cos_cutoff(), -1.0);
    let mut spot = Light::new(LightKind::Spot);
    spot.spot_angle = FRAC_PI_3;
    assert_close(spot.cos_cutoff(), 0.5);
}

#[test]
fn gpu_records_are_tightly_packed() {
    assert_eq!(std::mem::size_of::<LightUniform>(), 128);
    assert_eq!(std::mem::size_of::<FrameUniform>(), 96 + MAX_LIGHTS * 128);
}

#[test]
fn frame_uniform_drops_extra_lights() {
    let lights = vec![Light::default(); MAX_LIGHTS + 2];
    let camera = demo::camera(4, 3);
    let frame = FrameUniform::new(camera.viewing(), camera.position(), &lights, 0.2, 1.0, 100.0);
    assert_eq!(frame.light_count(), MAX_LIGHTS as u32);
    let frame = FrameUniform::new(camera.viewing(), camera.position(), &lights[..1], 0.2, 1.0, 100.0);
    assert_eq!(frame.light_count(), 1);
}

#[test]
fn orbit_camera_looks_at_its_target() {
    let camera = Camera::new(Vector3::new(30.0, 30.0, 5.0), 100.0, FRAC_PI_4, FRAC_PI_4);
    let offset = camera.position() - camera.target;
    assert_close(offset.magnitude(), 100.0);
    assert!(offset.z > 0.0);

    let target = camera.viewing() * Vector4::new(30.0, 30.0, 5.0, 1.0);
    assert_close(target.x / target.w, 0.0);
    assert_close(target.y / target.w, 0.0);
    let depth = target.z / target.w;
    assert!(depth > 0.0 && depth < 1.0);
}

#[test]
fn demo_lights_point_down() {
    let lights = demo::lights();
    assert_eq!(lights.len(), 2);
    for light in &lights {
        assert!(light.aim().z < 0.0);
        assert_eq!(light.kind, LightKind::Spot);
    }
}

//! A fixed scene to look at: a small valley with cliffs, a lake and a tree,
//! lit by two spot lights.

use std::f32::consts::{FRAC_PI_3, FRAC_PI_4};

use anyhow::Context as _;
use cgmath::Vector3;

use crate::{
    camera::Camera,
    context::Context,
    data_structures::{
        light::{Light, LightKind},
        mesh::{Mesh, NORMAL, POSITION, TEX_COORDS},
        scene_graph::SceneNode,
        shapes,
        texture::Texture,
    },
    resources::{Assets, TextureId},
};

const GRID: u32 = 12;
const SPACING: f32 = 5.0;

#[rustfmt::skip]
const HEIGHTS: [f32; (GRID * GRID) as usize] = [
    5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 20.0,
    5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 20.0, 25.0,
    5.0, 5.0, 10.0, 12.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 20.0, 25.0,
    5.0, 5.0, 10.0, 10.0, 5.0, 5.0, 5.0, 5.0, 5.0, 20.0, 25.0, 27.0,
    0.0, 0.0, 5.0, 5.0, 5.0, 0.0, 0.0, 0.0, 0.0, 20.0, 20.0, 25.0,
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 20.0, 25.0,
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    0.0, 0.0, 0.0, 0.0, 0.0, 5.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    0.0, 0.0, 0.0, 0.0, 0.0, 5.0, 7.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 20.0, 20.0,
    5.0, 5.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 20.0, 20.0, 20.0,
    10.0, 10.0, 5.0, 5.0, 0.0, 0.0, 0.0, 5.0, 10.0, 15.0, 20.0, 25.0,
];

const WATER_LEVEL: f32 = 1.0;
/// Slopes steeper than this are cliff, the rest is grass.
const CLIFF_ANGLE: f32 = FRAC_PI_3;
/// World units per texture repeat on cliff faces.
const CLIFF_TEXTURE_SCALE: f32 = 20.0;

/// Re-projects cliff texture coordinates onto the vertical plane facing the
/// horizontal part of each vertex normal, so the texture runs along the cliff
/// face instead of being stretched over it.
fn wrap_cliff_texture(cliff: &mut Mesh) {
    for index in 0..cliff.vertex_count() {
        let Some(vertex) = cliff.vertex_mut(index) else {
            continue;
        };
        let (x, y, z) = (vertex[POSITION], vertex[POSITION + 1], vertex[POSITION + 2]);
        let (nx, ny) = (vertex[NORMAL], vertex[NORMAL + 1]);
        vertex[TEX_COORDS] = (x * -ny + y * nx) / CLIFF_TEXTURE_SCALE;
        vertex[TEX_COORDS + 1] = z / CLIFF_TEXTURE_SCALE;
    }
}

fn solid(ctx: &Context, assets: &mut Assets, rgba: [u8; 4], label: &str) -> anyhow::Result<TextureId> {
    let texture = Texture::solid_colour(&ctx.device, &ctx.queue, rgba, [1, 1], label)?;
    Ok(assets.add_texture(&ctx.device, texture, label))
}

fn node(
    ctx: &Context,
    assets: &mut Assets,
    mesh: &Mesh,
    texture: TextureId,
    specular: [f32; 3],
    label: &str,
) -> anyhow::Result<SceneNode> {
    let mesh = ctx.upload_mesh(assets, mesh, label)?;
    let mut node = SceneNode::new(3, 1, Some(mesh))?;
    node.set_uniforms(&specular);
    node.set_textures(&[texture]);
    Ok(node)
}

/// Builds the demo scene graph, uploading its meshes and textures into
/// `assets`. The grass is the single root; cliffs, tree and water hang off it.
pub fn build_scene(ctx: &Context, assets: &mut Assets) -> anyhow::Result<Vec<SceneNode>> {
    let land = shapes::landscape(GRID, GRID, SPACING, &HEIGHTS).context("building the landscape")?;
    let grass = shapes::dissected_landscape(&land, CLIFF_ANGLE, true)?;
    let mut cliff = shapes::dissected_landscape(&land, CLIFF_ANGLE, false)?;
    wrap_cliff_texture(&mut cliff);
    let water = shapes::landscape(GRID, GRID, SPACING, &[WATER_LEVEL; (GRID * GRID) as usize])?;
    let trunk = shapes::capsule(1.0, 10.0, 1, 8)?;
    let crown = shapes::sphere(5.0, 8, 16)?;

    let grass_texture = solid(ctx, assets, [86, 140, 52, 255], "grass")?;
    let cliff_texture = solid(ctx, assets, [128, 114, 98, 255], "cliff")?;
    let trunk_texture = solid(ctx, assets, [101, 67, 33, 255], "bark")?;
    let crown_texture = solid(ctx, assets, [40, 100, 30, 255], "leaves")?;
    let water_texture = solid(ctx, assets, [40, 80, 160, 255], "water")?;

    let no_shine = [0.0; 3];
    let mut h = node(ctx, assets, &grass, grass_texture, no_shine, "grass")?;
    let v = node(ctx, assets, &cliff, cliff_texture, no_shine, "cliff")?;
    let mut t = node(ctx, assets, &trunk, trunk_texture, no_shine, "trunk")?;
    let mut l = node(ctx, assets, &crown, crown_texture, no_shine, "crown")?;
    let w = node(ctx, assets, &water, water_texture, [1.0; 3], "water")?;

    t.set_translation(Vector3::new(40.0, 28.0, 5.0));
    l.set_translation(Vector3::new(0.0, 0.0, 7.0));
    t.add_child(l);

    h.add_child(v);
    h.add_child(t);
    h.add_child(w);
    Ok(vec![h])
}

/// A white and a cyan spot light above the valley.
pub fn lights() -> Vec<Light> {
    let spot = |position: Vector3<f32>, color: [f32; 3]| {
        let mut light = Light::new(LightKind::Spot);
        light.color = color;
        light.attenuation = [1.0, 0.0, 0.0];
        light.spot_angle = FRAC_PI_3;
        light.shine_from(position, 3.0 * FRAC_PI_4, 3.0 * FRAC_PI_4);
        light
    };
    vec![
        spot(Vector3::new(45.0, 30.0, 20.0), [1.0, 1.0, 1.0]),
        spot(Vector3::new(55.0, 35.0, 25.0), [0.0, 1.0, 1.0]),
    ]
}

/// Orbit camera looking down at the valley.
pub fn camera(width: u32, height: u32) -> Camera {
    let mut camera = Camera::new(Vector3::new(30.0, 30.0, 5.0), 100.0, FRAC_PI_4, FRAC_PI_4);
    camera.resize(width, height);
    camera
}

#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
mod gpu {
    use futures::executor::block_on;
    use scene_ngin::{
        camera::Camera,
        data_structures::{light::Light, scene_graph::SceneNode, shapes, texture::Texture},
        demo,
        flow::{self, Renderer},
        resources::Assets,
    };

    use crate::common::test_utils::headless_context;

    const SIZE: [u32; 2] = [64, 48];

    #[test]
    fn should_render_clear_colour() {
        let Some(mut ctx) = headless_context(SIZE) else {
            return;
        };
        ctx.config.clear_colour = wgpu::Color::WHITE;
        let assets = Assets::new(&ctx.device, &ctx.queue, &ctx.pipelines.lit.texture_layout).unwrap();
        let target = Texture::create_render_target(&ctx.device, SIZE, ctx.config.target_format, "target");
        let mut renderer = Renderer::new(&ctx);

        let camera = demo::camera(SIZE[0], SIZE[1]);
        let stats = renderer.render_frame(&ctx, &assets, &[], &camera, &demo::lights(), &target.view);
        assert_eq!(stats.main_draws, 0);
        assert_eq!(stats.lights, 2);

        let img = block_on(flow::read_texture(&ctx, &target)).unwrap();
        assert_eq!(img.dimensions(), (SIZE[0], SIZE[1]));
        for pixel in img.pixels() {
            assert_eq!(pixel.0, [255, 255, 255, 255]);
        }
    }

    #[test]
    fn should_render_demo_scene() {
        flow::init_logger();
        let Some(ctx) = headless_context(SIZE) else {
            return;
        };
        let mut assets = Assets::new(&ctx.device, &ctx.queue, &ctx.pipelines.lit.texture_layout).unwrap();
        let scene = demo::build_scene(&ctx, &mut assets).unwrap();
        assert_eq!(scene.len(), 1);
        assert_eq!(scene[0].node_count(), 5);

        let target = Texture::create_render_target(&ctx.device, SIZE, ctx.config.target_format, "target");
        let mut renderer = Renderer::new(&ctx);
        let camera = demo::camera(SIZE[0], SIZE[1]);
        let stats = renderer.render_frame(&ctx, &assets, &scene, &camera, &demo::lights(), &target.view);
        assert_eq!(stats.main_draws, 5);
        assert_eq!(stats.shadow_draws, 10);

        let img = block_on(flow::read_texture(&ctx, &target)).unwrap();
        let clear = img.get_pixel(0, 0).0;
        assert!(
            img.pixels().any(|pixel| pixel.0 != clear),
            "the scene left no mark on the target"
        );
        assets.destroy();
    }

    fn render_floor(with_occluder: bool) -> Option<[u8; 4]> {
        let ctx = headless_context(SIZE)?;
        let mut assets = Assets::new(&ctx.device, &ctx.queue, &ctx.pipelines.lit.texture_layout).unwrap();
        let white = Texture::solid_colour(&ctx.device, &ctx.queue, [255; 4], [1, 1], "white").unwrap();
        let white = assets.add_texture(&ctx.device, white, "white");

        let floor = shapes::landscape(2, 2, 40.0, &[0.0; 4]).unwrap();
        let floor = ctx.upload_mesh(&mut assets, &floor, "floor").unwrap();
        let mut root = SceneNode::new(3, 1, Some(floor)).unwrap();
        root.set_translation(cgmath::Vector3::new(-20.0, -20.0, 0.0));
        root.set_textures(&[white]);
        let mut scene = vec![root];

        if with_occluder {
            // close under the light, so its shadow is far wider than its
            // silhouette seen from the camera
            let block = shapes::cuboid(-5.0, 5.0, -5.0, 5.0, 30.0, 32.0).unwrap();
            let block = ctx.upload_mesh(&mut assets, &block, "block").unwrap();
            let mut occluder = SceneNode::new(3, 1, Some(block)).unwrap();
            occluder.set_textures(&[white]);
            scene.push(occluder);
        }

        let mut light = Light::default();
        light.spot_angle = std::f32::consts::FRAC_PI_3;
        light.shine_from(cgmath::Vector3::new(0.0, 0.0, 40.0), std::f32::consts::PI, 0.0);

        // straight down; screen up is world -X
        let mut camera = Camera::new(cgmath::Vector3::new(0.0, 0.0, 0.0), 90.0, 0.0, 0.0);
        camera.resize(SIZE[0], SIZE[1]);
        let target = Texture::create_render_target(&ctx.device, SIZE, ctx.config.target_format, "target");
        let mut renderer = Renderer::new(&ctx);
        renderer.render_frame(&ctx, &assets, &scene, &camera, &[light], &target.view);

        let img = block_on(flow::read_texture(&ctx, &target)).unwrap();
        // the floor point (12, 0, 0)
        Some(img.get_pixel(SIZE[0] / 2, 36).0)
    }

    #[test]
    fn occluder_casts_shadow_on_floor() {
        let (Some(lit), Some(shadowed)) = (render_floor(false), render_floor(true)) else {
            return;
        };
        assert!(
            lit[0] > shadowed[0].saturating_add(50),
            "lit {lit:?} vs shadowed {shadowed:?}"
        );
    }

    /// Floor seen and lit from straight above, so the centre pixel reflects
    /// the light right into the camera.
    fn render_highlight(specular: [f32; 3]) -> Option<[u8; 4]> {
        let ctx = headless_context(SIZE)?;
        let mut assets = Assets::new(&ctx.device, &ctx.queue, &ctx.pipelines.lit.texture_layout).unwrap();
        let white = Texture::solid_colour(&ctx.device, &ctx.queue, [255; 4], [1, 1], "white").unwrap();
        let white = assets.add_texture(&ctx.device, white, "white");

        let floor = shapes::landscape(2, 2, 40.0, &[0.0; 4]).unwrap();
        let floor = ctx.upload_mesh(&mut assets, &floor, "floor").unwrap();
        let mut root = SceneNode::new(3, 1, Some(floor)).unwrap();
        root.set_translation(cgmath::Vector3::new(-20.0, -20.0, 0.0));
        root.set_uniforms(&specular);
        root.set_textures(&[white]);

        let mut light = Light::default();
        light.attenuation = [4.0, 0.0, 0.0];
        light.spot_angle = std::f32::consts::FRAC_PI_3;
        light.shine_from(cgmath::Vector3::new(0.0, 0.0, 40.0), std::f32::consts::PI, 0.0);

        let mut camera = Camera::new(cgmath::Vector3::new(0.0, 0.0, 0.0), 90.0, 0.0, 0.0);
        camera.resize(SIZE[0], SIZE[1]);
        let target = Texture::create_render_target(&ctx.device, SIZE, ctx.config.target_format, "target");
        let mut renderer = Renderer::new(&ctx);
        renderer.render_frame(&ctx, &assets, &[root], &camera, &[light], &target.view);

        let img = block_on(flow::read_texture(&ctx, &target)).unwrap();
        Some(img.get_pixel(SIZE[0] / 2, SIZE[1] / 2).0)
    }

    #[test]
    fn attenuation_dims_highlight_like_diffuse() {
        let (Some(matte), Some(shiny)) = (render_highlight([0.0; 3]), render_highlight([1.0; 3])) else {
            return;
        };
        // a quarter of the light reaches the floor, both as diffuse and as
        // highlight
        assert!(shiny[0] > matte[0].saturating_add(30), "matte {matte:?} vs shiny {shiny:?}");
        assert!(shiny[0] < 255, "highlight not attenuated: {shiny:?}");
    }
}

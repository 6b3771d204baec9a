//! The frame.
//!
//! [`Renderer::render_frame`] runs the whole two-pass sequence: one depth pass
//! per light into that light's shadow-map layer, then the lit pass into the
//! caller's target. Scene traversal happens up front into [`DrawList`]s so
//! every per-draw uniform of the frame goes to the GPU in a single write.

use std::{iter, time::Duration};

use anyhow::Context as _;
use cgmath::{Matrix4, SquareMatrix};
use log::{debug, info, warn};

use crate::{
    camera::CameraSource,
    context::Context,
    data_structures::{
        light::{Light, MAX_LIGHTS},
        scene_graph::{self, SceneNode},
        texture::Texture,
    },
    pipelines::{self, DRAW_GROUP, lit::FrameUniform},
    render::{DRAW_BLOCK_FLOATS, DRAW_BLOCK_SIZE, DrawList},
    resources::Assets,
};

/// Installs `env_logger` as the `log` backend. Safe to call more than once.
pub fn init_logger() {
    if let Err(e) = env_logger::try_init() {
        warn!("logger already initialised: {e}");
    }
}

/// What one call to [`Renderer::render_frame`] drew.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub lights: usize,
    pub shadow_draws: usize,
    pub main_draws: usize,
}

/// Owns the per-draw uniform buffer, which grows to fit the largest frame
/// seen so far.
pub struct Renderer {
    draw_buffer: wgpu::Buffer,
    capacity: usize,
    draw_bind_group: wgpu::BindGroup,
}

impl Renderer {
    const INITIAL_BLOCKS: usize = 64;

    pub fn new(ctx: &Context) -> Self {
        let (draw_buffer, draw_bind_group) = Self::mk_draw_buffer(ctx, Self::INITIAL_BLOCKS);
        Self {
            draw_buffer,
            capacity: Self::INITIAL_BLOCKS,
            draw_bind_group,
        }
    }

    fn mk_draw_buffer(ctx: &Context, blocks: usize) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniform Buffer"),
            size: blocks as wgpu::BufferAddress * DRAW_BLOCK_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = pipelines::mk_draw_bind_group(&ctx.device, &ctx.draw_layout, &buffer);
        (buffer, bind_group)
    }

    fn reserve(&mut self, ctx: &Context, blocks: usize) {
        if blocks <= self.capacity {
            return;
        }
        let capacity = blocks.next_power_of_two();
        info!("growing draw uniform buffer from {} to {capacity} blocks", self.capacity);
        let (buffer, bind_group) = Self::mk_draw_buffer(ctx, capacity);
        self.draw_buffer.destroy();
        self.draw_buffer = buffer;
        self.draw_bind_group = bind_group;
        self.capacity = capacity;
    }

    /// Renders `scene` as seen by `camera`, lit and shadowed by `lights`, into
    /// `target`. The target must have the context's size and target format.
    pub fn render_frame(
        &mut self,
        ctx: &Context,
        assets: &Assets,
        scene: &[SceneNode],
        camera: &dyn CameraSource,
        lights: &[Light],
        target: &wgpu::TextureView,
    ) -> FrameStats {
        let lights = if lights.len() > MAX_LIGHTS {
            warn!("{} lights given, ignoring all past the first {MAX_LIGHTS}", lights.len());
            &lights[..MAX_LIGHTS]
        } else {
            lights
        };
        let identity = Matrix4::identity();

        let shadow_spec = ctx.pipelines.shadow.pass_spec();
        let shadow_lists: Vec<DrawList> = lights
            .iter()
            .map(|_| {
                let mut list = DrawList::new();
                scene_graph::render(scene, &identity, &shadow_spec, &mut list);
                list
            })
            .collect();
        let mut main_list = DrawList::new();
        scene_graph::render(scene, &identity, &ctx.pipelines.lit.pass_spec(), &mut main_list);

        let mut blocks = Vec::new();
        let mut first_blocks = Vec::with_capacity(shadow_lists.len() + 1);
        for list in shadow_lists.iter().chain(iter::once(&main_list)) {
            first_blocks.push(blocks.len() / DRAW_BLOCK_FLOATS);
            blocks.extend_from_slice(list.blocks());
        }
        self.reserve(ctx, blocks.len() / DRAW_BLOCK_FLOATS);
        if !blocks.is_empty() {
            ctx.queue.write_buffer(&self.draw_buffer, 0, bytemuck::cast_slice(&blocks));
        }

        let config = &ctx.config;
        ctx.shadow_maps
            .write_lights(&ctx.queue, lights, config.shadow_near, config.shadow_far);
        let frame = FrameUniform::new(
            camera.viewing(),
            camera.position(),
            lights,
            config.ambient,
            config.shadow_near,
            config.shadow_far,
        );
        ctx.pipelines.lit.write_frame(&ctx.queue, &frame);

        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        for (layer, list) in shadow_lists.iter().enumerate() {
            let Some(mut pass) = ctx
                .shadow_maps
                .begin_depth_pass(&mut encoder, &ctx.pipelines.shadow, layer)
            else {
                warn!("no shadow map layer {layer}");
                continue;
            };
            list.replay(&mut pass, assets, DRAW_GROUP, &self.draw_bind_group, first_blocks[layer], &[]);
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(config.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });
            // the depth passes left the viewport at the shadow resolution
            let (x, y, width, height) = ctx.viewport();
            pass.set_viewport(x, y, width, height, 0.0, 1.0);
            ctx.pipelines.lit.bind_frame(&mut pass, &ctx.shadow_maps.sample_bind_group);
            main_list.replay(
                &mut pass,
                assets,
                DRAW_GROUP,
                &self.draw_bind_group,
                first_blocks[shadow_lists.len()],
                &ctx.pipelines.lit.layout.sampler_groups(),
            );
        }

        ctx.queue.submit(iter::once(encoder.finish()));

        let stats = FrameStats {
            lights: lights.len(),
            shadow_draws: shadow_lists.iter().map(|list| list.commands().len()).sum(),
            main_draws: main_list.commands().len(),
        };
        debug!("frame: {stats:?}");
        stats
    }
}

/// Copies `texture` back to the host. The texture needs `COPY_SRC` usage and
/// a 4-byte RGBA format.
pub async fn read_texture(ctx: &Context, texture: &Texture) -> anyhow::Result<image::RgbaImage> {
    let size = texture.texture.size();
    let (width, height) = (size.width, size.height);
    let unpadded_row = 4 * width;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded_row = unpadded_row.div_ceil(align) * align;

    let output_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Buffer"),
        size: (padded_row * height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Readback Encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &texture.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &output_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    ctx.queue.submit(iter::once(encoder.finish()));

    let buffer_slice = output_buffer.slice(..);
    let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    ctx.device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        })
        .context("waiting for the readback copy")?;
    rx.receive()
        .await
        .context("readback channel closed")?
        .context("mapping the readback buffer")?;

    let mut pixels = Vec::with_capacity((unpadded_row * height) as usize);
    {
        let data = buffer_slice.get_mapped_range();
        for row in data.chunks(padded_row as usize) {
            pixels.extend_from_slice(&row[..unpadded_row as usize]);
        }
    }
    output_buffer.unmap();
    image::RgbaImage::from_raw(width, height, pixels).context("readback does not fill the image")
}

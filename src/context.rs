use anyhow::Context as _;
use log::{info, warn};

use crate::{
    data_structures::{mesh::Mesh, texture},
    pipelines::{
        self, BINDING_COUNT, MAIN_BINDING, SHADOW_BINDING, SHAPE_ATTR_DIMS,
        lit::LitPipeline,
        shadow::{ShadowMaps, ShadowPipeline},
    },
    resources::{Assets, MeshId, gpu_mesh::GpuMesh},
};

/// Tunables of the renderer. `Default` gives the values the demo scene was
/// tuned for.
#[derive(Clone, Debug)]
pub struct RendererConfig {
    pub clear_colour: wgpu::Color,
    /// Width and height of every shadow map.
    pub shadow_resolution: u32,
    pub shadow_near: f32,
    pub shadow_far: f32,
    pub depth_bias_constant: i32,
    pub depth_bias_slope: f32,
    /// Lower bound of the diffuse term, so unlit sides stay visible.
    pub ambient: f32,
    pub target_format: wgpu::TextureFormat,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_colour: wgpu::Color {
                r: 0.1,
                g: 0.2,
                b: 0.3,
                a: 1.0,
            },
            shadow_resolution: 1024,
            shadow_near: 1.0,
            shadow_far: 100.0,
            depth_bias_constant: 2,
            depth_bias_slope: 2.0,
            ambient: 0.2,
            target_format: wgpu::TextureFormat::Rgba8UnormSrgb,
        }
    }
}

impl RendererConfig {
    pub fn depth_bias(&self) -> wgpu::DepthBiasState {
        wgpu::DepthBiasState {
            constant: self.depth_bias_constant,
            slope_scale: self.depth_bias_slope,
            clamp: 0.0,
        }
    }
}

pub struct Pipelines {
    pub lit: LitPipeline,
    pub shadow: ShadowPipeline,
}

/// Everything that lives as long as the device: pipelines, the main depth
/// buffer and the shadow maps.
pub struct Context {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: RendererConfig,
    size: [u32; 2],
    pub(crate) depth_texture: texture::Texture,
    pub draw_layout: wgpu::BindGroupLayout,
    pub pipelines: Pipelines,
    pub shadow_maps: ShadowMaps,
}

impl Context {
    /// Opens a device without any surface, for off-screen rendering.
    pub async fn headless(config: RendererConfig, size: [u32; 2]) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..wgpu::InstanceDescriptor::new_without_display_handle()
        });
        Self::from_instance(&instance, config, size).await
    }

    /// Opens a device on the first adapter `instance` offers.
    pub async fn from_instance(instance: &wgpu::Instance, config: RendererConfig, size: [u32; 2]) -> anyhow::Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter available")?;
        info!("using adapter {} ({:?})", adapter.get_info().name, adapter.get_info().backend);
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("could not open the graphics device")?;
        Self::from_device(device, queue, config, size)
    }

    /// Builds the pipelines and targets on an already opened device.
    pub fn from_device(
        device: wgpu::Device,
        queue: wgpu::Queue,
        config: RendererConfig,
        size: [u32; 2],
    ) -> anyhow::Result<Self> {
        let draw_layout = pipelines::mk_draw_bind_group_layout(&device);
        let lit = LitPipeline::new(&device, config.target_format, &draw_layout)
            .context("building the lit pipeline")?;
        let shadow = ShadowPipeline::new(&device, &draw_layout, config.depth_bias())
            .context("building the shadow pipeline")?;
        let shadow_maps = ShadowMaps::new(&device, &shadow, &lit.shadow_layout, config.shadow_resolution)?;
        let depth_texture = texture::Texture::create_depth_texture(&device, size, "depth_texture");

        Ok(Self {
            device,
            queue,
            config,
            size,
            depth_texture,
            draw_layout,
            pipelines: Pipelines { lit, shadow },
            shadow_maps,
        })
    }

    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    /// Recreates the main depth buffer. Zero-sized requests are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            warn!("ignoring resize to {width}x{height}");
            return;
        }
        self.size = [width, height];
        self.depth_texture = texture::Texture::create_depth_texture(&self.device, self.size, "depth_texture");
    }

    /// Viewport of the main pass as `(x, y, width, height)`.
    pub fn viewport(&self) -> (f32, f32, f32, f32) {
        (0.0, 0.0, self.size[0] as f32, self.size[1] as f32)
    }

    /// Uploads a shape mesh and binds it for both passes.
    pub fn upload_mesh(&self, assets: &mut Assets, mesh: &Mesh, label: &str) -> anyhow::Result<MeshId> {
        let mut gpu_mesh = GpuMesh::new(&self.device, mesh, &SHAPE_ATTR_DIMS, BINDING_COUNT, label)
            .with_context(|| format!("uploading mesh {label}"))?;
        gpu_mesh.bind_attributes(MAIN_BINDING, &self.pipelines.lit.attribute_locations())?;
        gpu_mesh.bind_attributes(SHADOW_BINDING, &self.pipelines.shadow.attribute_locations())?;
        self.add_mesh(assets, gpu_mesh)
    }

    /// Registers an already uploaded mesh. Both of its pass configurations
    /// must match the vertex layouts the pipelines were built with.
    pub fn add_mesh(&self, assets: &mut Assets, gpu_mesh: GpuMesh) -> anyhow::Result<MeshId> {
        let label = gpu_mesh.label().to_string();
        gpu_mesh
            .check_layout(MAIN_BINDING, &self.pipelines.lit.vertex_layout.buffer_layout())
            .and_then(|()| gpu_mesh.check_layout(SHADOW_BINDING, &self.pipelines.shadow.vertex_layout.buffer_layout()))
            .with_context(|| format!("mesh {label} does not fit the pipelines"))?;
        Ok(assets.add_mesh(gpu_mesh))
    }
}

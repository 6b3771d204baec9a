use cgmath::Matrix4;
use scene_ngin::{
    context::{Context, RendererConfig},
    render::{Painter, SamplerLocation, UniformLocation},
    resources::{MeshId, TextureId},
};

/// Everything a traversal told the painter, in order.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Modeling(UniformLocation, Matrix4<f32>),
    Uniform(UniformLocation, Vec<f32>),
    Bind(usize, TextureId, SamplerLocation),
    Unbind(usize, SamplerLocation),
    Draw(MeshId, usize),
}

#[derive(Default)]
pub(crate) struct RecordingPainter {
    pub(crate) calls: Vec<Call>,
}

impl RecordingPainter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The modeling matrix in effect at each draw, in draw order.
    pub(crate) fn modeling_at_draws(&self) -> Vec<(MeshId, Matrix4<f32>)> {
        let mut current = None;
        let mut draws = Vec::new();
        for call in &self.calls {
            match call {
                Call::Modeling(_, m) => current = Some(*m),
                Call::Draw(mesh, _) => {
                    if let Some(m) = current {
                        draws.push((*mesh, m));
                    }
                }
                _ => {}
            }
        }
        draws
    }

    pub(crate) fn draws(&self) -> Vec<MeshId> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Draw(mesh, _) => Some(*mesh),
                _ => None,
            })
            .collect()
    }
}

impl Painter for RecordingPainter {
    fn set_modeling(&mut self, location: UniformLocation, modeling: &Matrix4<f32>) {
        self.calls.push(Call::Modeling(location, *modeling));
    }

    fn set_uniform(&mut self, location: UniformLocation, values: &[f32]) {
        self.calls.push(Call::Uniform(location, values.to_vec()));
    }

    fn bind_texture(&mut self, unit: usize, texture: TextureId, location: SamplerLocation) {
        self.calls.push(Call::Bind(unit, texture, location));
    }

    fn unbind_texture(&mut self, unit: usize, location: SamplerLocation) {
        self.calls.push(Call::Unbind(unit, location));
    }

    fn draw(&mut self, mesh: MeshId, binding: usize) {
        self.calls.push(Call::Draw(mesh, binding));
    }
}

pub(crate) fn assert_close(a: f32, b: f32) {
    assert!((a - b).abs() < 1e-4, "{a} != {b}");
}

pub(crate) fn assert_close3(a: [f32; 3], b: [f32; 3]) {
    for i in 0..3 {
        assert!((a[i] - b[i]).abs() < 1e-4, "{a:?} != {b:?}");
    }
}

fn test_config() -> RendererConfig {
    RendererConfig {
        shadow_resolution: 256,
        ..Default::default()
    }
}

/// A context on wgpu's noop backend. Every call is validated as on a real
/// device but nothing executes, so pixels cannot be read back.
pub(crate) fn noop_context(size: [u32; 2]) -> Context {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::NOOP,
        backend_options: wgpu::BackendOptions {
            noop: wgpu::NoopBackendOptions { enable: true },
            ..Default::default()
        },
        ..wgpu::InstanceDescriptor::new_without_display_handle()
    });
    futures::executor::block_on(Context::from_instance(&instance, test_config(), size)).unwrap()
}

/// A headless context, or `None` on machines without a usable adapter.
#[cfg(feature = "integration-tests")]
pub(crate) fn headless_context(size: [u32; 2]) -> Option<Context> {
    match futures::executor::block_on(Context::headless(test_config(), size)) {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("skipping GPU test: {e:#}");
            None
        }
    }
}

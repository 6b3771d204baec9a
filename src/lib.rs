//! scene-ngin
//!
//! A small retained-mode renderer. Procedural meshes hang off a scene graph
//! of rigid transforms, and every frame is drawn in two passes: a depth pass
//! per light into a shadow map, then a lit pass that shades with all lights
//! at once and looks each fragment up in every shadow map.
//!
//! High-level modules
//! - `linalg`: small vector kernel and matrix helpers on top of `cgmath`
//! - `data_structures`: meshes, shape generators, lights, textures, scene graph
//! - `resources`: GPU meshes and the asset registry scene nodes point into
//! - `render`: the painter seam between traversal and GPU, and draw batching
//! - `pipelines`: the lit and the shadow render pipelines
//! - `camera`: camera seam and an orbit camera
//! - `context`: device, queue, pipelines and renderer configuration
//! - `flow`: the per-frame pass sequence and logger setup
//! - `demo`: a fixed scene to render
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod demo;
pub mod flow;
pub mod linalg;
pub mod pipelines;
pub mod render;
pub mod resources;

// Re-exports so downstream code uses the same versions.
pub use cgmath;
pub use wgpu;

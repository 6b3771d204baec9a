//! Engine data structures: meshes, shapes, lights, textures and the scene
//! graph.
//!
//! - `mesh` is the CPU triangle mesh with interleaved vertex attributes
//! - `shapes` generates meshes procedurally (boxes, solids of revolution,
//!   landscapes)
//! - `scene_graph` enables hierarchical scene organization
//! - `light` holds spot and omni lights and their GPU record
//! - `texture` contains GPU texture wrapper and creation utilities

pub mod light;
pub mod mesh;
pub mod scene_graph;
pub mod shapes;
pub mod texture;

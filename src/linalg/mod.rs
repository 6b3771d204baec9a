//! Linear-algebra kernel.
//!
//! - `vector` holds dimension-generic vector arithmetic over `[f32; N]`
//! - `matrix` holds 2×2/3×3/4×4 helpers and rigid transforms on `cgmath` types

pub mod matrix;
pub mod vector;

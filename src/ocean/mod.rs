//! Ocean surface: wave field, shading rule and the grid they are evaluated on.
//!
//! These are the CPU reference kernels. `shaders/water.wgsl` runs the same math per vertex
//! and per fragment on the GPU.

mod mesh;
mod shading;
mod wave;

// Re-export public types
pub use mesh::{OceanGrid, Vertex};
pub use shading::{mix_factor, shade};
pub use wave::{elevation, SurfacePoint, WaveField};

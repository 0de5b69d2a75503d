//! Raging Sea - animated procedural ocean
//!
//! Analytic wave displacement and elevation-gated coloring, evaluated on the GPU each frame
//! and mirrored on the CPU for tests, previews and benchmarks.

pub mod camera;
pub mod error;
pub mod frame;
pub mod noise;
pub mod ocean;
pub mod panel;
pub mod params;
pub mod preview;
pub mod rendering;

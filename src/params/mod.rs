//! Parameter definitions with units and documented semantics.
//!
//! All tunable numbers live here:
//! - Units and meaning on every field
//! - Ranges mirrored by the parameter panel
//! - Presets built from the defaults

mod camera;
mod color;
mod ocean;
mod preset;
mod render;

// Re-export all types
pub use camera::OrbitConfig;
pub use color::{ColorParameters, Rgb, DEFAULT_DEPTH_COLOR, DEFAULT_SURFACE_COLOR};
pub use ocean::{OceanMesh, WaveParameters, MAX_SMALL_ITERATIONS};
pub use preset::{Preset, PresetSettings};
pub use render::{DepthOfFieldConfig, RecordingConfig, RenderConfig};
